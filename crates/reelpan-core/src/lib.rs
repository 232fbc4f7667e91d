pub mod boundary;
pub mod config;
pub mod controller;
pub mod easing;
pub mod effects;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod keyboard;
pub mod momentum;
pub mod profile;
pub mod smooth_scroll;
pub mod state;
pub mod timing;
pub mod tween;
pub mod velocity;

pub use boundary::{Boundary, BoundaryPolicy};
pub use config::{AppConfig, KeymapConfig, PolicyKind};
pub use controller::{ControllerSettings, ViewportController};
pub use easing::EasingType;
pub use error::{Error, Result};
pub use frame::{FrameHandle, FrameQueue, FrameScheduler};
pub use geometry::{Axis, Vector2, Viewport};
pub use input::{parse_script, PointerButton, RawInput, SourceKind};
pub use keyboard::NavKey;
pub use profile::{DeviceClass, ProfileSet, TuningProfile};
pub use smooth_scroll::{SmoothScroll, SmoothScrollService};
pub use state::{Phase, ScrollState};
pub use tween::{Timeline, TweenScheduler};

/// Controller wired to the in-process frame queue and tween timeline
pub type GalleryController = ViewportController<FrameQueue, Timeline>;
