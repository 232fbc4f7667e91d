//! Pure easing functions for tweens and momentum decay
//!
//! Maps progress in [0, 1] to eased progress in [0, 1]. Names follow the
//! tweening vocabulary used by the gallery configuration (`power2.out`, ...).

use serde::{Deserialize, Serialize};

/// Easing curve applied to tween progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EasingType {
    /// Jump to the end value when the tween completes
    #[serde(rename = "none")]
    None,
    #[serde(rename = "linear")]
    Linear,
    /// f(t) = 1 - (1-t)²
    #[serde(rename = "power1.out")]
    Power1Out,
    /// f(t) = 1 - (1-t)³
    #[default]
    #[serde(rename = "power2.out")]
    Power2Out,
    /// f(t) = 1 - (1-t)⁴
    #[serde(rename = "power3.out")]
    Power3Out,
    /// f(t) = 1 - (1-t)⁵
    #[serde(rename = "power4.out")]
    Power4Out,
    /// f(t) = 1 - 2^(-10t)
    #[serde(rename = "expo.out")]
    ExpoOut,
    /// Smooth-scroll curve: f(t) = min(1, 1.001 - 2^(-10t))
    #[serde(rename = "scroll")]
    Scroll,
}

impl EasingType {
    pub const ALL: [EasingType; 8] = [
        EasingType::None,
        EasingType::Linear,
        EasingType::Power1Out,
        EasingType::Power2Out,
        EasingType::Power3Out,
        EasingType::Power4Out,
        EasingType::ExpoOut,
        EasingType::Scroll,
    ];

    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value in range [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]
    #[inline]
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            EasingType::None => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            EasingType::Linear => t,
            EasingType::Power1Out => power_ease_out(t, 2),
            EasingType::Power2Out => power_ease_out(t, 3),
            EasingType::Power3Out => power_ease_out(t, 4),
            EasingType::Power4Out => power_ease_out(t, 5),
            EasingType::ExpoOut => exponential_ease_out(t),
            EasingType::Scroll => scroll_ease(t),
        }
    }

    /// Name as written in configuration files
    pub fn label(self) -> &'static str {
        match self {
            EasingType::None => "none",
            EasingType::Linear => "linear",
            EasingType::Power1Out => "power1.out",
            EasingType::Power2Out => "power2.out",
            EasingType::Power3Out => "power3.out",
            EasingType::Power4Out => "power4.out",
            EasingType::ExpoOut => "expo.out",
            EasingType::Scroll => "scroll",
        }
    }
}

#[inline]
fn power_ease_out(t: f64, exponent: i32) -> f64 {
    1.0 - (1.0 - t).powi(exponent)
}

#[inline]
fn exponential_ease_out(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2.0_f64.powf(-10.0 * t)
    }
}

/// Starts slightly above zero (0.001), like the smooth-scroll library it replaces.
#[inline]
fn scroll_ease(t: f64) -> f64 {
    (1.001 - 2.0_f64.powf(-10.0 * t)).min(1.0)
}
