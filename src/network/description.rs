//! Declarative description of a drainage network

use serde::{Deserialize, Serialize};

use super::error::{NetworkError, NetworkResult};
use crate::domain::{Area, Key, Point};

/// One subbasin as declared in a network file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubbasinRecord {
    pub id: Key,
    /// Subbasin this one drains into; absent for the outlet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Key>,
    pub start: Point,
    pub end: Point,
    /// Drained surface in km²
    #[serde(default)]
    pub area: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SubbasinRecord {
    pub fn to_area(&self) -> Area {
        let area = Area::new(self.start, self.end, self.area);
        match &self.name {
            Some(name) => area.named(name.clone()),
            None => area,
        }
    }
}

/// Flat list of subbasins linked by their parent keys.
///
/// ```toml
/// [[subbasin]]
/// id = 1
/// start = { x = 0.0, y = 10.0, elevation = 120.0 }
/// end = { x = 0.0, y = 0.0, elevation = 80.0 }
/// area = 12.5
///
/// [[subbasin]]
/// id = 2
/// parent = 1
/// start = { x = 3.0, y = 14.0, elevation = 160.0 }
/// end = { x = 0.0, y = 10.0, elevation = 120.0 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescription {
    #[serde(rename = "subbasin", default)]
    pub subbasins: Vec<SubbasinRecord>,
}

impl NetworkDescription {
    pub fn from_toml_str(content: &str) -> NetworkResult<Self> {
        toml::from_str(content).map_err(|e| NetworkError::Parse {
            message: e.to_string(),
        })
    }

    pub fn to_toml(&self) -> NetworkResult<String> {
        toml::to_string_pretty(self).map_err(|e| NetworkError::Parse {
            message: format!("serialize network: {e}"),
        })
    }
}
