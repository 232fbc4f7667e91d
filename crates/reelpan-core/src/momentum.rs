//! Post-release momentum decay
//!
//! The decay is a tween of the remaining velocity fraction from 1 to 0. Each
//! update the owner multiplies the seed by that fraction, so velocity is
//! non-increasing and exactly zero on completion.

use crate::geometry::{Axis, Vector2};
use crate::profile::TuningProfile;
use crate::tween::{TweenHandle, TweenScheduler, TweenSpec};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Momentum {
    seed: Vector2,
    handle: Option<TweenHandle>,
}

impl Momentum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start decaying `seed` if it exceeds the profile's release threshold on either axis.
    pub fn start<T: TweenScheduler>(
        &mut self,
        tweens: &mut T,
        seed: Vector2,
        profile: &TuningProfile,
        now: Duration,
    ) -> bool {
        self.cancel(tweens);
        if !seed.is_finite() || seed.max_abs() <= profile.release_threshold {
            return false;
        }
        let spec = TweenSpec::new([1.0], [0.0], profile.decay_duration())
            .with_ease(profile.decay_ease);
        self.handle = Some(tweens.animate(spec, now));
        self.seed = seed;
        true
    }

    /// Kill the decay tween. Returns whether one was running.
    pub fn cancel<T: TweenScheduler>(&mut self, tweens: &mut T) -> bool {
        self.seed = Vector2::ZERO;
        match self.handle.take() {
            Some(handle) => tweens.kill(handle),
            None => false,
        }
    }

    /// Forget the decay after its tween completed
    pub fn finish(&mut self) {
        self.seed = Vector2::ZERO;
        self.handle = None;
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn owns(&self, handle: TweenHandle) -> bool {
        self.handle == Some(handle)
    }

    pub fn seed(&self) -> Vector2 {
        self.seed
    }

    /// Stop contributing on one axis (hard boundary hit)
    pub fn zero_axis(&mut self, axis: Axis) {
        self.seed.set(axis, 0.0);
    }

    /// Velocity for a remaining fraction reported by the decay tween
    pub fn velocity_at(&self, fraction: f64) -> Vector2 {
        self.seed * fraction.clamp(0.0, 1.0)
    }
}
