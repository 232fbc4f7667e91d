//! Exponentially smoothed input speed

use std::time::Duration;

use crate::geometry::Vector2;
use crate::timing::REFERENCE_FRAME;

/// Tracks gesture speed in px/ms from timestamped deltas.
///
/// `velocity' = velocity × decay + raw × (1 - decay)` with `raw = delta / elapsed`.
/// Samples whose elapsed time is not positive are skipped.
#[derive(Debug, Clone)]
pub struct VelocityEstimator {
    decay: f64,
    velocity: Vector2,
    last_timestamp: Option<Duration>,
}

impl VelocityEstimator {
    pub fn new(decay: f64) -> Self {
        Self {
            decay: decay.clamp(0.0, 1.0),
            velocity: Vector2::ZERO,
            last_timestamp: None,
        }
    }

    pub fn set_decay(&mut self, decay: f64) {
        self.decay = decay.clamp(0.0, 1.0);
    }

    /// Start a new gesture; the next sample only primes the clock.
    pub fn reset(&mut self) {
        self.velocity = Vector2::ZERO;
        self.last_timestamp = None;
    }

    /// Prime the clock without recording movement
    pub fn prime(&mut self, timestamp: Duration) {
        self.last_timestamp = Some(timestamp);
    }

    /// Feed one delta. Returns `false` if the sample was skipped.
    pub fn record(&mut self, delta: Vector2, timestamp: Duration) -> bool {
        let Some(last) = self.last_timestamp else {
            self.last_timestamp = Some(timestamp);
            return false;
        };
        if timestamp <= last || !delta.is_finite() {
            return false;
        }
        self.last_timestamp = Some(timestamp);

        let elapsed_ms = (timestamp - last).as_secs_f64() * 1000.0;
        let raw = delta * (1.0 / elapsed_ms);
        if !raw.is_finite() {
            return false;
        }
        self.velocity = self.velocity * self.decay + raw * (1.0 - self.decay);
        true
    }

    /// Smoothed velocity in px/ms
    pub fn velocity(&self) -> Vector2 {
        self.velocity
    }

    /// Displacement multiplier for drag/touch: `min(1 + |v| × gain, ceiling)`
    pub fn responsiveness(&self, gain: f64, ceiling: f64) -> f64 {
        (1.0 + self.velocity.length() * gain).min(ceiling).max(1.0)
    }

    /// Momentum seed in units per reference frame, clamped per axis to `cap`
    pub fn momentum_seed(&self, factor: f64, cap: f64) -> Vector2 {
        let per_frame = REFERENCE_FRAME.as_secs_f64() * 1000.0;
        (self.velocity * (per_frame * factor)).clamp_abs(cap)
    }
}
