//! Geometric / hydrological attribute entities attached to nodes

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point of the drainage network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub elevation: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64, elevation: f64) -> Self {
        Self { x, y, elevation }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.elevation)
    }
}

/// Payload bound to a node. The core only reads the two end points.
pub trait Entity: fmt::Debug + Send + Sync {
    fn start_point(&self) -> Point;
    fn end_point(&self) -> Point;
}

/// Subbasin area drained by one channel reach.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    /// Upstream end of the reach
    pub start: Point,
    /// Outlet of the reach
    pub end: Point,
    /// Drained surface in km²
    pub area_km2: f64,
    pub name: Option<String>,
}

impl Area {
    pub fn new(start: Point, end: Point, area_km2: f64) -> Self {
        Self {
            start,
            end,
            area_km2,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Entity for Area {
    fn start_point(&self) -> Point {
        self.start
    }

    fn end_point(&self) -> Point {
        self.end
    }
}

/// Zero-length junction where several streams meet; carried by ghost nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confluence {
    pub point: Point,
}

impl Entity for Confluence {
    fn start_point(&self) -> Point {
        self.point
    }

    fn end_point(&self) -> Point {
        self.point
    }
}
