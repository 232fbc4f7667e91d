use thiserror::Error;

use crate::geometry::Axis;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input on line {line}: {source}")]
    InvalidInput {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid boundary on {axis} axis: min {min} > max {max}")]
    InvalidBoundary { axis: Axis, min: f64, max: f64 },

    #[error("Invalid tuning profile: {0}")]
    InvalidProfile(String),

    #[error("Smooth scroll error: {0}")]
    SmoothScroll(String),

    #[error("Viewport controller has been unmounted")]
    Unmounted,
}

pub type Result<T> = std::result::Result<T, Error>;
