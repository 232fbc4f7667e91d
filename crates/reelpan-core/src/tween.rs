//! Tween scheduling
//!
//! A tween interpolates a set of numeric properties from `from` to `to` over
//! a duration with an easing curve. Instead of invoking update/complete
//! callbacks, the scheduler reports [`TweenEvent`]s from [`TweenScheduler::advance`];
//! the owner applies them to its own state. A killed tween is removed
//! immediately, so it can never report another event.

use std::time::Duration;

use super::easing::EasingType;
use super::timing::{lerp, progress};

/// Opaque identifier returned by [`TweenScheduler::animate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenHandle(u64);

impl TweenHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Declarative description of one tween
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSpec {
    pub from: Vec<f64>,
    pub to: Vec<f64>,
    pub duration: Duration,
    /// Time to wait before the tween starts moving
    pub delay: Duration,
    pub ease: EasingType,
}

impl TweenSpec {
    pub fn new(from: impl Into<Vec<f64>>, to: impl Into<Vec<f64>>, duration: Duration) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            duration,
            delay: Duration::ZERO,
            ease: EasingType::default(),
        }
    }

    pub fn with_ease(mut self, ease: EasingType) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Property values at eased progress `eased`. Extra entries on either side are dropped.
    pub fn values_at(&self, eased: f64) -> Vec<f64> {
        self.from
            .iter()
            .zip(&self.to)
            .map(|(&from, &to)| lerp(from, to, eased))
            .collect()
    }

    /// Total time from scheduling to completion
    pub fn total_duration(&self) -> Duration {
        self.delay + self.duration
    }
}

/// Progress notification produced by [`TweenScheduler::advance`]
#[derive(Debug, Clone, PartialEq)]
pub enum TweenEvent {
    /// The tween moved; `values` are the current interpolated properties
    Update { handle: TweenHandle, values: Vec<f64> },
    /// The tween reached its end values and has been removed
    Complete { handle: TweenHandle, values: Vec<f64> },
}

impl TweenEvent {
    pub fn handle(&self) -> TweenHandle {
        match self {
            TweenEvent::Update { handle, .. } | TweenEvent::Complete { handle, .. } => *handle,
        }
    }

    pub fn values(&self) -> &[f64] {
        match self {
            TweenEvent::Update { values, .. } | TweenEvent::Complete { values, .. } => values,
        }
    }
}

/// Time-driven tween scheduler contract
pub trait TweenScheduler {
    /// Start a tween at `now`
    fn animate(&mut self, spec: TweenSpec, now: Duration) -> TweenHandle;

    /// Cancel a tween. Returns `false` if it had already completed or been killed.
    fn kill(&mut self, handle: TweenHandle) -> bool;

    fn is_active(&self, handle: TweenHandle) -> bool;

    fn has_active(&self) -> bool;

    /// Advance every live tween to `now` and report what changed
    fn advance(&mut self, now: Duration) -> Vec<TweenEvent>;

    fn kill_all(&mut self);
}

#[derive(Debug, Clone)]
struct ActiveTween {
    handle: TweenHandle,
    start: Duration,
    spec: TweenSpec,
}

/// In-process [`TweenScheduler`]
///
/// Events are reported in the order the tweens were started.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    tweens: Vec<ActiveTween>,
    next_id: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}

impl TweenScheduler for Timeline {
    fn animate(&mut self, spec: TweenSpec, now: Duration) -> TweenHandle {
        self.next_id += 1;
        let handle = TweenHandle(self.next_id);
        self.tweens.push(ActiveTween {
            handle,
            start: now,
            spec,
        });
        handle
    }

    fn kill(&mut self, handle: TweenHandle) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.handle != handle);
        self.tweens.len() != before
    }

    fn is_active(&self, handle: TweenHandle) -> bool {
        self.tweens.iter().any(|t| t.handle == handle)
    }

    fn has_active(&self) -> bool {
        !self.tweens.is_empty()
    }

    fn advance(&mut self, now: Duration) -> Vec<TweenEvent> {
        let mut events = Vec::with_capacity(self.tweens.len());

        self.tweens.retain(|tween| {
            let begin = tween.start + tween.spec.delay;
            if now < begin {
                return true;
            }

            let elapsed = now - begin;
            if elapsed >= tween.spec.duration {
                events.push(TweenEvent::Complete {
                    handle: tween.handle,
                    values: tween.spec.to.clone(),
                });
                return false;
            }

            let eased = tween.spec.ease.apply(progress(elapsed, tween.spec.duration));
            events.push(TweenEvent::Update {
                handle: tween.handle,
                values: tween.spec.values_at(eased),
            });
            true
        });

        events
    }

    fn kill_all(&mut self) {
        self.tweens.clear();
    }
}
