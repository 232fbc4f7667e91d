//! Per-device tuning constants
//!
//! One [`TuningProfile`] is active per controller. The profile is resolved
//! from the viewport width and swapped as a whole when the width crosses the
//! mobile breakpoint.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::EasingType;
use crate::error::{Error, Result};
use crate::geometry::Viewport;

/// Widths at or below this are treated as mobile
pub const DEFAULT_MOBILE_BREAKPOINT: f64 = 768.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

impl DeviceClass {
    pub fn for_viewport(viewport: Viewport, breakpoint: f64) -> Self {
        if viewport.width <= breakpoint {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            DeviceClass::Desktop => DeviceClass::Mobile,
            DeviceClass::Mobile => DeviceClass::Desktop,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Desktop => f.write_str("desktop"),
            DeviceClass::Mobile => f.write_str("mobile"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningProfile {
    /// Fraction of the remaining distance covered per reference frame
    pub smoothing_factor: f64,
    /// Convergence threshold in scroll units
    pub epsilon: f64,
    /// Multiplier on wheel deltas
    #[serde(alias = "sensitivity_multiplier")]
    pub wheel_sensitivity: f64,
    /// Target displacement per pointer pixel
    pub drag_multiplier: f64,
    /// Target displacement per touch pixel
    pub touch_multiplier: f64,
    /// Max momentum seed per axis, units per reference frame
    pub velocity_cap: f64,
    /// Responsiveness gain per px/ms of estimated speed
    pub responsiveness_gain: f64,
    /// Upper bound for the responsiveness multiplier
    pub responsiveness_ceiling: f64,
    /// Decay term of the velocity estimator
    pub velocity_smoothing: f64,
    /// Fraction of estimated velocity used as momentum seed
    pub release_velocity_factor: f64,
    /// Same, for wheel and trackpad gestures
    pub wheel_release_factor: f64,
    /// Minimum seed magnitude on either axis to start momentum
    pub release_threshold: f64,
    /// Wheel idle time before momentum starts
    pub release_delay_ms: u64,
    /// Applied to velocity on each decay tick
    pub momentum_scale: f64,
    pub decay_duration_ms: u64,
    pub decay_ease: EasingType,
}

impl TuningProfile {
    pub fn desktop() -> Self {
        Self {
            smoothing_factor: 0.1,
            epsilon: 0.1,
            wheel_sensitivity: 1.2,
            drag_multiplier: 2.0,
            touch_multiplier: 2.0,
            velocity_cap: 50.0,
            responsiveness_gain: 0.25,
            responsiveness_ceiling: 1.5,
            velocity_smoothing: 0.8,
            release_velocity_factor: 0.5,
            wheel_release_factor: 0.1,
            release_threshold: 1.0,
            release_delay_ms: 100,
            momentum_scale: 10.0,
            decay_duration_ms: 2000,
            decay_ease: EasingType::Power3Out,
        }
    }

    pub fn mobile() -> Self {
        Self {
            smoothing_factor: 0.15,
            epsilon: 0.1,
            wheel_sensitivity: 1.5,
            drag_multiplier: 2.5,
            touch_multiplier: 4.5,
            velocity_cap: 80.0,
            responsiveness_gain: 0.5,
            responsiveness_ceiling: 2.0,
            velocity_smoothing: 0.7,
            release_velocity_factor: 0.8,
            wheel_release_factor: 0.15,
            release_threshold: 1.0,
            release_delay_ms: 80,
            momentum_scale: 15.0,
            decay_duration_ms: 1500,
            decay_ease: EasingType::Power2Out,
        }
    }

    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.release_delay_ms)
    }

    pub fn decay_duration(&self) -> Duration {
        Duration::from_millis(self.decay_duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let unit = |name: &str, v: f64, allow_one: bool| -> Result<()> {
            let ok = v > 0.0 && (v < 1.0 || (allow_one && v == 1.0));
            if ok {
                Ok(())
            } else {
                Err(Error::InvalidProfile(format!("{} must be in (0, 1), got {}", name, v)))
            }
        };
        let positive = |name: &str, v: f64| -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidProfile(format!("{} must be positive, got {}", name, v)))
            }
        };
        let non_negative = |name: &str, v: f64| -> Result<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidProfile(format!("{} must not be negative, got {}", name, v)))
            }
        };

        unit("smoothing_factor", self.smoothing_factor, true)?;
        unit("velocity_smoothing", self.velocity_smoothing, false)?;
        positive("epsilon", self.epsilon)?;
        positive("wheel_sensitivity", self.wheel_sensitivity)?;
        positive("drag_multiplier", self.drag_multiplier)?;
        positive("touch_multiplier", self.touch_multiplier)?;
        positive("velocity_cap", self.velocity_cap)?;
        non_negative("responsiveness_gain", self.responsiveness_gain)?;
        non_negative("release_velocity_factor", self.release_velocity_factor)?;
        non_negative("wheel_release_factor", self.wheel_release_factor)?;
        non_negative("release_threshold", self.release_threshold)?;
        non_negative("momentum_scale", self.momentum_scale)?;
        if !(self.responsiveness_ceiling.is_finite() && self.responsiveness_ceiling >= 1.0) {
            return Err(Error::InvalidProfile(format!(
                "responsiveness_ceiling must be at least 1, got {}",
                self.responsiveness_ceiling
            )));
        }
        if self.decay_duration_ms == 0 {
            return Err(Error::InvalidProfile("decay_duration_ms must be positive".into()));
        }
        Ok(())
    }
}

impl Default for TuningProfile {
    fn default() -> Self {
        Self::desktop()
    }
}

/// Desktop and mobile profiles, picked by viewport width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSet {
    #[serde(default = "TuningProfile::desktop")]
    pub desktop: TuningProfile,
    #[serde(default = "TuningProfile::mobile")]
    pub mobile: TuningProfile,
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self {
            desktop: TuningProfile::desktop(),
            mobile: TuningProfile::mobile(),
        }
    }
}

impl ProfileSet {
    pub fn get(&self, class: DeviceClass) -> &TuningProfile {
        match class {
            DeviceClass::Desktop => &self.desktop,
            DeviceClass::Mobile => &self.mobile,
        }
    }

    pub fn resolve(&self, viewport: Viewport, breakpoint: f64) -> (DeviceClass, &TuningProfile) {
        let class = DeviceClass::for_viewport(viewport, breakpoint);
        (class, self.get(class))
    }

    pub fn validate(&self) -> Result<()> {
        self.desktop
            .validate()
            .map_err(|e| scoped(DeviceClass::Desktop, e))?;
        self.mobile
            .validate()
            .map_err(|e| scoped(DeviceClass::Mobile, e))
    }
}

fn scoped(class: DeviceClass, err: Error) -> Error {
    match err {
        Error::InvalidProfile(msg) => Error::InvalidProfile(format!("{}: {}", class, msg)),
        other => other,
    }
}
