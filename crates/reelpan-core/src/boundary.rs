//! Boundary rectangle and the policy applied when the displayed offset leaves it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Axis, Vector2};

/// Default elastic pullback fraction
pub const DEFAULT_PULLBACK: f64 = 0.1;

/// Rectangle the displayed offset is kept inside. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoundaryRepr", into = "BoundaryRepr")]
pub struct Boundary {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

#[derive(Serialize, Deserialize)]
struct BoundaryRepr {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl TryFrom<BoundaryRepr> for Boundary {
    type Error = Error;

    fn try_from(r: BoundaryRepr) -> Result<Self> {
        Boundary::new(r.min_x, r.max_x, r.min_y, r.max_y)
    }
}

impl From<Boundary> for BoundaryRepr {
    fn from(b: Boundary) -> Self {
        Self {
            min_x: b.min_x,
            max_x: b.max_x,
            min_y: b.min_y,
            max_y: b.max_y,
        }
    }
}

impl Boundary {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self> {
        check_axis(Axis::X, min_x, max_x)?;
        check_axis(Axis::Y, min_y, max_y)?;
        Ok(Self {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Rectangle `[-half_w, half_w] × [-half_h, half_h]`
    pub fn symmetric(half_width: f64, half_height: f64) -> Result<Self> {
        Self::new(-half_width, half_width, -half_height, half_height)
    }

    pub fn min(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.min_x,
            Axis::Y => self.min_y,
        }
    }

    pub fn max(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.max_x,
            Axis::Y => self.max_y,
        }
    }

    pub fn contains(&self, p: Vector2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn clamp(&self, p: Vector2) -> Vector2 {
        Vector2::new(
            p.x.clamp(self.min_x, self.max_x),
            p.y.clamp(self.min_y, self.max_y),
        )
    }

    /// Signed distance outside the rectangle per axis; zero when inside.
    pub fn overflow(&self, p: Vector2) -> Vector2 {
        p - self.clamp(p)
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            min_x: -5000.0,
            max_x: 5000.0,
            min_y: -5000.0,
            max_y: 5000.0,
        }
    }
}

fn check_axis(axis: Axis, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(Error::InvalidBoundary { axis, min, max });
    }
    Ok(())
}

/// What happens when the displayed offset crosses the boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Clamp displayed and target to the rectangle
    HardClamp,
    /// Pull displayed and target back toward the edge by `pullback × overflow` each tick
    Elastic { pullback: f64 },
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy::Elastic {
            pullback: DEFAULT_PULLBACK,
        }
    }
}

/// Result of one policy application
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundaryOutcome {
    /// Axes on which the displayed offset was outside the rectangle
    pub clamped_x: bool,
    pub clamped_y: bool,
}

impl BoundaryOutcome {
    pub fn any(&self) -> bool {
        self.clamped_x || self.clamped_y
    }

    pub fn on(&self, axis: Axis) -> bool {
        match axis {
            Axis::X => self.clamped_x,
            Axis::Y => self.clamped_y,
        }
    }
}

impl BoundaryPolicy {
    pub fn validate(&self) -> Result<()> {
        if let BoundaryPolicy::Elastic { pullback } = *self {
            if !(pullback > 0.0 && pullback <= 1.0) {
                return Err(Error::Config(format!(
                    "elastic pullback must be in (0, 1], got {}",
                    pullback
                )));
            }
        }
        Ok(())
    }

    pub fn label(&self) -> &'static str {
        match self {
            BoundaryPolicy::HardClamp => "clamp",
            BoundaryPolicy::Elastic { .. } => "elastic",
        }
    }

    /// Apply the policy to `displayed` and `target` in place.
    pub fn apply(
        &self,
        boundary: &Boundary,
        displayed: &mut Vector2,
        target: &mut Vector2,
    ) -> BoundaryOutcome {
        let overflow = boundary.overflow(*displayed);
        let outcome = BoundaryOutcome {
            clamped_x: overflow.x != 0.0,
            clamped_y: overflow.y != 0.0,
        };
        if !outcome.any() {
            return outcome;
        }

        match *self {
            BoundaryPolicy::HardClamp => {
                for axis in Axis::BOTH {
                    if outcome.on(axis) {
                        let edge = displayed.get(axis) - overflow.get(axis);
                        displayed.set(axis, edge);
                        target.set(axis, edge);
                    }
                }
            }
            BoundaryPolicy::Elastic { pullback } => {
                let pull = overflow * pullback;
                *displayed -= pull;
                *target -= pull;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_axis() {
        let err = Boundary::new(10.0, -10.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, Error::InvalidBoundary { axis: Axis::X, .. }));
        assert!(Boundary::new(0.0, 0.0, 5.0, 1.0).is_err());
        assert!(Boundary::new(f64::NAN, 1.0, 0.0, 1.0).is_err());
        assert!(Boundary::new(0.0, 0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_overflow_sign() {
        let b = Boundary::symmetric(100.0, 50.0).unwrap();
        assert_eq!(b.overflow(Vector2::new(150.0, -60.0)), Vector2::new(50.0, -10.0));
        assert_eq!(b.overflow(Vector2::new(10.0, 10.0)), Vector2::ZERO);
        assert!(b.contains(Vector2::new(100.0, -50.0)));
    }

    #[test]
    fn test_hard_clamp_pins_target_on_offending_axis() {
        let b = Boundary::symmetric(100.0, 100.0).unwrap();
        let mut displayed = Vector2::new(120.0, 10.0);
        let mut target = Vector2::new(300.0, 40.0);
        let outcome = BoundaryPolicy::HardClamp.apply(&b, &mut displayed, &mut target);
        assert!(outcome.clamped_x && !outcome.clamped_y);
        assert_eq!(displayed, Vector2::new(100.0, 10.0));
        assert_eq!(target, Vector2::new(100.0, 40.0));
    }

    #[test]
    fn test_elastic_pulls_by_fraction() {
        let b = Boundary::symmetric(100.0, 100.0).unwrap();
        let mut displayed = Vector2::new(200.0, 0.0);
        let mut target = Vector2::new(250.0, 0.0);
        BoundaryPolicy::default().apply(&b, &mut displayed, &mut target);
        assert!((displayed.x - 190.0).abs() < 1e-9);
        assert!((target.x - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_pullback_validation() {
        assert!(BoundaryPolicy::Elastic { pullback: 0.0 }.validate().is_err());
        assert!(BoundaryPolicy::Elastic { pullback: 1.5 }.validate().is_err());
        assert!(BoundaryPolicy::Elastic { pullback: 1.0 }.validate().is_ok());
        assert!(BoundaryPolicy::HardClamp.validate().is_ok());
    }

    #[test]
    fn test_boundary_deserialize_validates() {
        let ok: Boundary = toml::from_str("min_x = -1.0\nmax_x = 1.0\nmin_y = -2.0\nmax_y = 2.0").unwrap();
        assert_eq!(ok.max(Axis::Y), 2.0);
        let bad: std::result::Result<Boundary, _> =
            toml::from_str("min_x = 1.0\nmax_x = -1.0\nmin_y = 0.0\nmax_y = 0.0");
        assert!(bad.is_err());
    }
}
