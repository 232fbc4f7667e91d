use std::fmt;

use serde::Serialize;

use crate::geometry::Vector2;

/// Scroll state of one gallery view
///
/// `velocity` is non-zero only while momentum decay or a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScrollState {
    pub displayed: Vector2,
    pub target: Vector2,
    /// Units per reference frame
    pub velocity: Vector2,
    pub dragging: bool,
    pub momentum_active: bool,
}

/// Frame integrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No frame requested
    #[default]
    Idle,
    /// A frame request is outstanding
    Animating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => f.write_str("idle"),
            Phase::Animating => f.write_str("animating"),
        }
    }
}
