//! Time calculation utilities for tweens and the frame integrator
//!
//! All timestamps are `Duration`s on a host-supplied monotonic clock.

use std::time::Duration;

/// Interval at which per-frame tuning constants are defined (60 Hz).
pub const REFERENCE_FRAME: Duration = Duration::from_micros(16_667);

/// Frame intervals outside this range are clamped before integration.
pub const MIN_FRAME_DT: Duration = Duration::from_millis(1);
pub const MAX_FRAME_DT: Duration = Duration::from_millis(100);

/// Calculate tween progress (0.0 to 1.0) from elapsed time and duration
///
/// # Returns
/// Progress value clamped to [0.0, 1.0]
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Number of reference frames covered by `dt`, after clamping.
#[inline]
pub fn frame_ratio(dt: Duration) -> f64 {
    let dt = dt.clamp(MIN_FRAME_DT, MAX_FRAME_DT);
    dt.as_secs_f64() / REFERENCE_FRAME.as_secs_f64()
}

/// Interpolation factor for one integrator tick
///
/// Uncompensated, this is `factor` per tick regardless of frame rate. With
/// compensation, `1 - (1 - factor)^(dt / reference)`, which equals `factor`
/// when `dt` is exactly one reference frame.
#[inline]
pub fn smoothing_alpha(factor: f64, dt: Duration, compensate: bool) -> f64 {
    let factor = factor.clamp(0.0, 1.0);
    if !compensate {
        return factor;
    }
    1.0 - (1.0 - factor).powf(frame_ratio(dt))
}

/// Convert milliseconds from configuration into a `Duration`
#[inline]
pub fn millis(ms: u64) -> Duration {
    Duration::from_millis(ms)
}
