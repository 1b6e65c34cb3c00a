//! The opaque computation a node performs once all its children finished

use std::fmt;
use std::thread;
use std::time::Duration;

use crate::domain::{Connections, WorkError};

/// One simulation step of a subbasin.
///
/// Implementations may block. A failed or interrupted step must be reported
/// as an error so that the parent is never notified for it.
pub trait UnitOfWork: Send + Sync {
    fn perform(&self, node: &Connections) -> Result<(), WorkError>;
}

impl<F> UnitOfWork for F
where
    F: Fn(&Connections) -> Result<(), WorkError> + Send + Sync,
{
    fn perform(&self, node: &Connections) -> Result<(), WorkError> {
        self(node)
    }
}

/// Placeholder step that only sleeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delay(pub Duration);

impl Delay {
    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }
}

impl UnitOfWork for Delay {
    fn perform(&self, _node: &Connections) -> Result<(), WorkError> {
        if !self.0.is_zero() {
            thread::sleep(self.0);
        }
        Ok(())
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delay {}ms", self.0.as_millis())
    }
}
