//! Keyboard navigation steps

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::EasingType;
use crate::geometry::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    /// Return to the origin (Space)
    Reset,
}

impl NavKey {
    /// Arrow/WASD/Space as typed characters
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(NavKey::Up),
            's' => Some(NavKey::Down),
            'a' => Some(NavKey::Left),
            'd' => Some(NavKey::Right),
            ' ' => Some(NavKey::Reset),
            _ => None,
        }
    }
}

/// Step sizes and tween timing for keyboard navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardConfig {
    #[serde(default = "default_base_item_width")]
    pub base_item_width: f64,
    /// Viewport width at which the scale reaches 1
    #[serde(default = "default_reference_width")]
    pub reference_width: f64,
    #[serde(default = "default_scale_boost")]
    pub scale_boost: f64,
    #[serde(default = "default_horizontal_ratio")]
    pub horizontal_ratio: f64,
    #[serde(default = "default_vertical_ratio")]
    pub vertical_ratio: f64,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_reset_duration_ms")]
    pub reset_duration_ms: u64,
    #[serde(default)]
    pub ease: EasingType,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            base_item_width: default_base_item_width(),
            reference_width: default_reference_width(),
            scale_boost: default_scale_boost(),
            horizontal_ratio: default_horizontal_ratio(),
            vertical_ratio: default_vertical_ratio(),
            duration_ms: default_duration_ms(),
            reset_duration_ms: default_reset_duration_ms(),
            ease: EasingType::Power2Out,
        }
    }
}

fn default_base_item_width() -> f64 {
    280.0
}

fn default_reference_width() -> f64 {
    1920.0
}

fn default_scale_boost() -> f64 {
    1.2
}

fn default_horizontal_ratio() -> f64 {
    0.75
}

fn default_vertical_ratio() -> f64 {
    0.866
}

fn default_duration_ms() -> u64 {
    800
}

fn default_reset_duration_ms() -> u64 {
    1000
}

impl KeyboardConfig {
    /// Responsive scale: `min(width / reference, 1) × boost`
    pub fn scale(&self, viewport_width: f64) -> f64 {
        let ratio = if self.reference_width > 0.0 {
            (viewport_width / self.reference_width).min(1.0)
        } else {
            1.0
        };
        ratio.max(0.0) * self.scale_boost
    }

    /// Horizontal and vertical step for the given viewport width
    pub fn steps(&self, viewport_width: f64) -> Vector2 {
        let item = self.base_item_width * self.scale(viewport_width);
        Vector2::new(item * self.horizontal_ratio, item * self.vertical_ratio)
    }

    /// New target for a key press, starting from `current`
    pub fn next_target(&self, key: NavKey, current: Vector2, viewport_width: f64) -> Vector2 {
        let step = self.steps(viewport_width);
        match key {
            NavKey::Up => Vector2::new(current.x, current.y + step.y),
            NavKey::Down => Vector2::new(current.x, current.y - step.y),
            NavKey::Left => Vector2::new(current.x + step.x, current.y),
            NavKey::Right => Vector2::new(current.x - step.x, current.y),
            NavKey::Reset => Vector2::ZERO,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn reset_duration(&self) -> Duration {
        Duration::from_millis(self.reset_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_at_full_width() {
        let cfg = KeyboardConfig::default();
        let step = cfg.steps(1920.0);
        // 280 × 1.2 = 336
        assert!((step.x - 252.0).abs() < 1e-9);
        assert!((step.y - 336.0 * 0.866).abs() < 1e-9);
        // Wider screens do not grow the step.
        assert_eq!(cfg.steps(3840.0), step);
    }

    #[test]
    fn test_steps_scale_down() {
        let cfg = KeyboardConfig::default();
        let half = cfg.steps(960.0);
        assert!((half.x - 126.0).abs() < 1e-9);
    }

    #[test]
    fn test_directions() {
        let cfg = KeyboardConfig::default();
        let start = Vector2::new(10.0, 10.0);
        assert!(cfg.next_target(NavKey::Up, start, 1920.0).y > 10.0);
        assert!(cfg.next_target(NavKey::Down, start, 1920.0).y < 10.0);
        assert!(cfg.next_target(NavKey::Left, start, 1920.0).x > 10.0);
        assert!(cfg.next_target(NavKey::Right, start, 1920.0).x < 10.0);
        assert_eq!(cfg.next_target(NavKey::Reset, start, 1920.0), Vector2::ZERO);
    }

    #[test]
    fn test_from_char() {
        assert_eq!(NavKey::from_char('W'), Some(NavKey::Up));
        assert_eq!(NavKey::from_char('d'), Some(NavKey::Right));
        assert_eq!(NavKey::from_char(' '), Some(NavKey::Reset));
        assert_eq!(NavKey::from_char('x'), None);
    }
}
