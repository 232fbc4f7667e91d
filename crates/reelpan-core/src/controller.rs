//! Inertial viewport controller
//!
//! Owns the [`ScrollState`] of one gallery view. Input handlers move the
//! target; the frame integrator eases the displayed offset toward it one
//! display refresh at a time, applies the boundary policy, and decides
//! whether another frame is needed. Releases seed a momentum decay that keeps
//! nudging the target until it settles.
//!
//! The controller is a plain struct driven from the host loop through
//! `&mut self`; it never blocks and never spawns.

use std::time::Duration;

use tracing::{debug, info, trace};

use crate::boundary::{Boundary, BoundaryOutcome, BoundaryPolicy};
use crate::effects::{ContainerStyle, ItemAnimator, ItemStyle};
use crate::error::Result;
use crate::frame::{FrameHandle, FrameQueue, FrameScheduler};
use crate::geometry::{Axis, Vector2, Viewport};
use crate::input::{Gesture, InputNormalizer, InputSample, RawInput, SourceKind};
use crate::keyboard::{KeyboardConfig, NavKey};
use crate::momentum::Momentum;
use crate::profile::{DeviceClass, ProfileSet, TuningProfile, DEFAULT_MOBILE_BREAKPOINT};
use crate::smooth_scroll::SmoothScroll;
use crate::state::{Phase, ScrollState};
use crate::timing::{frame_ratio, smoothing_alpha, REFERENCE_FRAME};
use crate::tween::{TweenEvent, TweenHandle, TweenScheduler, TweenSpec};
use crate::velocity::VelocityEstimator;

/// Everything fixed for the lifetime of one controller
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub boundary: Boundary,
    pub policy: BoundaryPolicy,
    pub profiles: ProfileSet,
    pub mobile_breakpoint: f64,
    /// When off, releases never start momentum
    pub inertia_enabled: bool,
    /// Scale per-frame constants by the actual frame interval
    pub frame_rate_compensation: bool,
    pub keyboard: KeyboardConfig,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            boundary: Boundary::default(),
            policy: BoundaryPolicy::default(),
            profiles: ProfileSet::default(),
            mobile_breakpoint: DEFAULT_MOBILE_BREAKPOINT,
            inertia_enabled: true,
            frame_rate_compensation: true,
            keyboard: KeyboardConfig::default(),
        }
    }
}

impl ControllerSettings {
    pub fn validate(&self) -> Result<()> {
        self.policy.validate()?;
        self.profiles.validate()
    }
}

/// Which keyboard-driven tween is moving the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavTween {
    Step(TweenHandle),
    Reset(TweenHandle),
}

impl NavTween {
    fn handle(self) -> TweenHandle {
        match self {
            NavTween::Step(h) | NavTween::Reset(h) => h,
        }
    }
}

pub struct ViewportController<F: FrameScheduler, T: TweenScheduler> {
    settings: ControllerSettings,
    viewport: Viewport,
    device: DeviceClass,
    device_override: Option<DeviceClass>,
    profile: TuningProfile,
    state: ScrollState,
    phase: Phase,
    frames: F,
    tweens: T,
    frame: Option<FrameHandle>,
    normalizer: InputNormalizer,
    estimator: VelocityEstimator,
    momentum: Momentum,
    nav: Option<NavTween>,
    effects: ItemAnimator,
    release_deadline: Option<Duration>,
    last_frame: Option<Duration>,
    clock: Duration,
    smooth_scroll: Option<SmoothScroll>,
    mounted: bool,
}

impl<F: FrameScheduler, T: TweenScheduler> ViewportController<F, T> {
    /// Create the scroll state for a newly mounted view
    pub fn mount(settings: ControllerSettings, viewport: Viewport, frames: F, tweens: T) -> Result<Self> {
        settings.validate()?;
        let (device, profile) = settings.profiles.resolve(viewport, settings.mobile_breakpoint);
        let profile = profile.clone();
        info!(
            %device,
            policy = settings.policy.label(),
            width = viewport.width,
            "Viewport controller mounted"
        );

        Ok(Self {
            estimator: VelocityEstimator::new(profile.velocity_smoothing),
            settings,
            viewport,
            device,
            device_override: None,
            profile,
            state: ScrollState::default(),
            phase: Phase::Idle,
            frames,
            tweens,
            frame: None,
            normalizer: InputNormalizer::new(),
            momentum: Momentum::new(),
            nav: None,
            effects: ItemAnimator::default(),
            release_deadline: None,
            last_frame: None,
            clock: Duration::ZERO,
            smooth_scroll: None,
            mounted: true,
        })
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_animating(&self) -> bool {
        self.phase == Phase::Animating
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device
    }

    pub fn profile(&self) -> &TuningProfile {
        &self.profile
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Latest timestamp seen from input or frames
    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    pub fn tweens(&self) -> &T {
        &self.tweens
    }

    /// Deadline of the pending wheel release, for hosts that sleep between events
    pub fn next_deadline(&self) -> Option<Duration> {
        self.release_deadline
    }

    pub fn attach_smooth_scroll(&mut self, scroll: SmoothScroll) {
        if self.mounted {
            self.smooth_scroll = Some(scroll);
        }
    }

    pub fn smooth_scroll(&self) -> Option<&SmoothScroll> {
        self.smooth_scroll.as_ref()
    }

    pub fn smooth_scroll_mut(&mut self) -> Option<&mut SmoothScroll> {
        self.smooth_scroll.as_mut()
    }

    /// Apply one raw input. A no-op after unmount.
    pub fn handle_input(&mut self, input: RawInput) {
        if !self.mounted {
            return;
        }
        self.clock = self.clock.max(input.timestamp());

        match self.normalizer.normalize(input, self.profile.wheel_sensitivity) {
            Gesture::Ignored => {}
            Gesture::Begin { source, timestamp } => {
                self.cancel_motion();
                self.release_deadline = None;
                self.estimator.reset();
                self.estimator.prime(timestamp);
                self.state.dragging = true;
                self.state.velocity = Vector2::ZERO;
                trace!(%source, "gesture started");
            }
            Gesture::Move(sample) => self.apply_sample(sample),
            Gesture::End { source, timestamp } => {
                self.state.dragging = false;
                self.release(source, timestamp);
            }
            Gesture::Navigate { key, timestamp } => {
                self.cancel_momentum();
                self.release_deadline = None;
                self.navigate(key, timestamp);
            }
        }
    }

    fn apply_sample(&mut self, sample: InputSample) {
        self.cancel_motion();

        if sample.source.is_wheel_like() {
            // Content moves opposite to the wheel.
            let motion = -sample.delta;
            if self.release_deadline.is_none() {
                self.estimator.reset();
                self.estimator.prime(sample.timestamp);
            } else {
                self.estimator.record(motion, sample.timestamp);
            }
            self.state.target += motion;
            self.release_deadline = Some(sample.timestamp + self.profile.release_delay());
        } else {
            self.estimator.record(sample.delta, sample.timestamp);
            let multiplier = match sample.source {
                SourceKind::Touch => self.profile.touch_multiplier,
                _ => self.profile.drag_multiplier,
            };
            let responsiveness = self
                .estimator
                .responsiveness(self.profile.responsiveness_gain, self.profile.responsiveness_ceiling);
            self.state.target += sample.delta * (multiplier * responsiveness);
            self.state.velocity = self.estimator.momentum_seed(1.0, f64::INFINITY);
        }

        self.wake();
    }

    /// Kill momentum and any keyboard tween; input always wins.
    fn cancel_motion(&mut self) {
        self.cancel_momentum();
        self.cancel_nav();
    }

    fn cancel_momentum(&mut self) {
        if self.momentum.cancel(&mut self.tweens) {
            debug!("Momentum cancelled by input");
        }
        self.state.momentum_active = false;
        if !self.state.dragging {
            self.state.velocity = Vector2::ZERO;
        }
    }

    fn cancel_nav(&mut self) {
        if let Some(nav) = self.nav.take() {
            self.tweens.kill(nav.handle());
        }
    }

    fn release(&mut self, source: SourceKind, now: Duration) {
        let factor = if source.is_wheel_like() {
            self.profile.wheel_release_factor
        } else {
            self.profile.release_velocity_factor
        };
        let seed = self.estimator.momentum_seed(factor, self.profile.velocity_cap);
        self.estimator.reset();
        self.state.velocity = Vector2::ZERO;

        if !self.settings.inertia_enabled {
            self.wake();
            return;
        }
        if self.momentum.start(&mut self.tweens, seed, &self.profile, now) {
            self.state.momentum_active = true;
            self.state.velocity = seed;
            debug!(%source, %seed, "Momentum started");
        }
        self.wake();
    }

    /// Fire the wheel release if its deadline has passed. Returns whether it fired.
    pub fn poll_timers(&mut self, now: Duration) -> bool {
        if !self.mounted {
            return false;
        }
        match self.release_deadline {
            Some(deadline) if deadline <= now => {
                self.release_deadline = None;
                self.clock = self.clock.max(now);
                self.release(SourceKind::Wheel, now);
                true
            }
            _ => false,
        }
    }

    /// Animate the target one keyboard step
    pub fn navigate(&mut self, key: NavKey, now: Duration) {
        if !self.mounted {
            return;
        }
        let to = self
            .settings
            .keyboard
            .next_target(key, self.state.target, self.viewport.width);
        let duration = self.settings.keyboard.duration();
        let handle = self.animate_target(to, duration, now);
        self.nav = Some(NavTween::Step(handle));
    }

    /// Animate the target back to the origin
    pub fn reset_position(&mut self, now: Duration) {
        if !self.mounted {
            return;
        }
        self.cancel_momentum();
        self.release_deadline = None;
        let duration = self.settings.keyboard.reset_duration();
        let handle = self.animate_target(Vector2::ZERO, duration, now);
        self.nav = Some(NavTween::Reset(handle));
    }

    fn animate_target(&mut self, to: Vector2, duration: Duration, now: Duration) -> TweenHandle {
        self.cancel_nav();
        self.clock = self.clock.max(now);
        let from = self.state.target;
        let spec = TweenSpec::new([from.x, from.y], [to.x, to.y], duration)
            .with_ease(self.settings.keyboard.ease);
        let handle = self.tweens.animate(spec, now);
        self.wake();
        handle
    }

    /// Update device facts; swaps the tuning profile when the breakpoint is crossed
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if !self.mounted {
            return;
        }
        self.viewport = viewport;
        if self.device_override.is_none() {
            let device = DeviceClass::for_viewport(viewport, self.settings.mobile_breakpoint);
            self.switch_profile(device);
        }
    }

    /// Pin the profile to a device class, or `None` to follow the viewport again
    pub fn override_device(&mut self, device: Option<DeviceClass>) {
        if !self.mounted {
            return;
        }
        self.device_override = device;
        let device = device.unwrap_or_else(|| {
            DeviceClass::for_viewport(self.viewport, self.settings.mobile_breakpoint)
        });
        self.switch_profile(device);
    }

    fn switch_profile(&mut self, device: DeviceClass) {
        if device == self.device {
            return;
        }
        debug!(from = %self.device, to = %device, "Tuning profile switched");
        self.device = device;
        self.profile = self.settings.profiles.get(device).clone();
        self.estimator.set_decay(self.profile.velocity_smoothing);
    }

    fn wake(&mut self) {
        if self.frame.is_none() {
            self.frame = Some(self.frames.request_frame());
            self.phase = Phase::Animating;
        }
    }

    /// One integrator tick. Stale or cancelled handles are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, now: Duration) {
        if !self.mounted || self.frame != Some(handle) {
            return;
        }
        self.frame = None;
        self.clock = self.clock.max(now);

        let dt = self
            .last_frame
            .map(|last| now.saturating_sub(last))
            .unwrap_or(REFERENCE_FRAME);
        self.last_frame = Some(now);

        self.poll_timers(now);

        for event in self.tweens.advance(now) {
            self.dispatch(event, dt);
        }

        let compensate = self.settings.frame_rate_compensation;
        let alpha = smoothing_alpha(self.profile.smoothing_factor, dt, compensate);
        let delta = (self.state.target - self.state.displayed) * alpha;
        self.state.displayed += delta;

        let outcome = self.settings.policy.apply(
            &self.settings.boundary,
            &mut self.state.displayed,
            &mut self.state.target,
        );
        self.on_boundary(outcome);

        let eps = self.profile.epsilon;
        let boundary = &self.settings.boundary;
        let outside = boundary.overflow(self.state.displayed).max_abs() > eps
            || boundary.overflow(self.state.target).max_abs() > eps;
        let keep_going = delta.max_abs() > eps
            || self.momentum.is_active()
            || self.tweens.has_active()
            || self.release_deadline.is_some()
            || outside;

        if keep_going {
            // The release timer may already have requested this tick's successor.
            self.wake();
        } else {
            if self.settings.policy == BoundaryPolicy::HardClamp {
                self.state.target = self.settings.boundary.clamp(self.state.target);
            }
            self.state.displayed = self.state.target;
            self.phase = Phase::Idle;
            self.last_frame = None;
            if !self.state.dragging {
                self.state.velocity = Vector2::ZERO;
            }
            trace!(position = %self.state.displayed, "integrator idle");
        }
    }

    fn on_boundary(&mut self, outcome: BoundaryOutcome) {
        if !outcome.any() || self.settings.policy != BoundaryPolicy::HardClamp {
            return;
        }
        for axis in Axis::BOTH {
            if outcome.on(axis) {
                self.momentum.zero_axis(axis);
                self.state.velocity.set(axis, 0.0);
            }
        }
    }

    fn dispatch(&mut self, event: TweenEvent, dt: Duration) {
        let handle = event.handle();

        if self.momentum.owns(handle) {
            match event {
                TweenEvent::Update { values, .. } => {
                    let fraction = values.first().copied().unwrap_or(0.0);
                    let velocity = self.momentum.velocity_at(fraction);
                    let step = if self.settings.frame_rate_compensation {
                        frame_ratio(dt)
                    } else {
                        1.0
                    };
                    self.state.target += velocity * (self.profile.momentum_scale * step);
                    self.state.velocity = velocity;
                }
                TweenEvent::Complete { .. } => {
                    self.momentum.finish();
                    self.state.momentum_active = false;
                    self.state.velocity = Vector2::ZERO;
                    debug!("Momentum settled");
                }
            }
            return;
        }

        if let Some(nav) = self.nav.filter(|n| n.handle() == handle) {
            if let [x, y] = *event.values() {
                self.state.target = Vector2::new(x, y);
            }
            if let TweenEvent::Complete { .. } = event {
                self.nav = None;
                if let NavTween::Reset(_) = nav {
                    debug!("Position reset complete");
                }
            }
            return;
        }

        self.effects.apply(&event);
    }

    /// Number of gallery items whose effects this controller drives
    pub fn set_item_count(&mut self, count: usize) {
        self.effects.set_count(count);
    }

    pub fn item_style(&self, index: usize) -> ItemStyle {
        self.effects.style(index)
    }

    pub fn container_style(&self) -> ContainerStyle {
        self.effects.container()
    }

    pub fn hover_item(&mut self, index: usize, now: Duration) {
        if self.mounted && self.effects.hover(&mut self.tweens, index, now) {
            self.wake();
        }
    }

    pub fn leave_item(&mut self, index: usize, now: Duration) {
        if self.mounted && self.effects.leave(&mut self.tweens, index, now) {
            self.wake();
        }
    }

    pub fn page_enter(&mut self, now: Duration) {
        if self.mounted {
            self.effects.page_enter(&mut self.tweens, now);
            self.wake();
        }
    }

    pub fn reveal_item(&mut self, index: usize, visible: bool, now: Duration) {
        if self.mounted && self.effects.reveal(&mut self.tweens, index, visible, now) {
            self.wake();
        }
    }

    /// Tear down: cancel the frame request, every tween, the release timer and
    /// the smooth-scroll service. Safe to call more than once.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;

        if let Some(handle) = self.frame.take() {
            self.frames.cancel_frame(handle);
        }
        self.momentum.cancel(&mut self.tweens);
        self.cancel_nav();
        self.effects.clear(&mut self.tweens);
        self.tweens.kill_all();
        self.release_deadline = None;
        self.normalizer.reset();
        if let Some(mut scroll) = self.smooth_scroll.take() {
            scroll.destroy();
        }

        self.state.dragging = false;
        self.state.momentum_active = false;
        self.state.velocity = Vector2::ZERO;
        self.phase = Phase::Idle;
        self.last_frame = None;
        info!("Viewport controller unmounted");
    }
}

impl<T: TweenScheduler> ViewportController<FrameQueue, T> {
    /// Deliver the queued frame, if any. Returns whether a tick ran.
    pub fn pump(&mut self, now: Duration) -> bool {
        match self.frames.take_pending() {
            Some(handle) => {
                self.on_frame(handle, now);
                true
            }
            None => self.poll_timers(now),
        }
    }
}

impl<F: FrameScheduler, T: TweenScheduler> Drop for ViewportController<F, T> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerButton;
    use crate::tween::Timeline;

    type Controller = ViewportController<FrameQueue, Timeline>;

    const FRAME: Duration = Duration::from_millis(16);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn settings(policy: BoundaryPolicy) -> ControllerSettings {
        ControllerSettings {
            policy,
            frame_rate_compensation: false,
            ..ControllerSettings::default()
        }
    }

    fn controller(policy: BoundaryPolicy) -> Controller {
        Controller::mount(settings(policy), Viewport::default(), FrameQueue::new(), Timeline::new()).unwrap()
    }

    /// Pump frames every 16 ms until idle; returns the clock and tick count.
    fn run_until_idle(c: &mut Controller, mut now: Duration, max_ticks: usize) -> (Duration, usize) {
        let mut ticks = 0;
        while c.is_animating() && ticks < max_ticks {
            now += FRAME;
            c.pump(now);
            ticks += 1;
        }
        (now, ticks)
    }

    fn set_target(c: &mut Controller, target: Vector2) {
        c.state.target = target;
        c.wake();
    }

    fn drag(c: &mut Controller, points: &[(f64, f64)], start: Duration) -> Duration {
        let mut now = start;
        let (x, y) = points[0];
        c.handle_input(RawInput::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            timestamp: now,
        });
        for &(x, y) in &points[1..] {
            now += FRAME;
            c.handle_input(RawInput::PointerMove { x, y, timestamp: now });
            c.pump(now);
        }
        c.handle_input(RawInput::PointerUp {
            button: PointerButton::Primary,
            timestamp: now,
        });
        now
    }

    #[test]
    fn test_mount_rejects_invalid_settings() {
        let mut s = ControllerSettings::default();
        s.policy = BoundaryPolicy::Elastic { pullback: 2.0 };
        assert!(Controller::mount(s, Viewport::default(), FrameQueue::new(), Timeline::new()).is_err());
    }

    #[test]
    fn test_converges_then_stops_requesting_frames() {
        let mut c = controller(BoundaryPolicy::default());
        set_target(&mut c, Vector2::new(300.0, -200.0));

        // log(eps / (α·d)) / log(1 - s) with d = 300, eps = 0.1, s = 0.1
        let bound = ((0.1f64 / (0.1 * 300.0)).ln() / 0.9f64.ln()).ceil() as usize + 2;
        let (now, ticks) = run_until_idle(&mut c, ms(0), 1000);
        assert!(ticks <= bound, "{} ticks, bound {}", ticks, bound);
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.state().displayed, c.state().target);

        let requested = c.frames().requested();
        assert!(!c.pump(now + FRAME));
        assert_eq!(c.frames().requested(), requested);
    }

    #[test]
    fn test_hard_clamp_never_leaves_boundary() {
        let mut c = controller(BoundaryPolicy::HardClamp);
        set_target(&mut c, Vector2::new(6000.0, 0.0));
        let boundary = c.settings().boundary;

        let mut now = ms(0);
        while c.is_animating() {
            now += FRAME;
            c.pump(now);
            assert!(boundary.contains(c.state().displayed));
        }
        assert_eq!(c.state().displayed.x, 5000.0);
        assert_eq!(c.state().target.x, 5000.0);
    }

    #[test]
    fn test_hard_clamp_snap_stays_inside_boundary() {
        let mut c = controller(BoundaryPolicy::HardClamp);
        // Past the edge by less than epsilon, so the integrator settles before touching it.
        set_target(&mut c, Vector2::new(5000.05, 0.0));
        let boundary = c.settings().boundary;

        let mut now = ms(0);
        let mut ticks = 0;
        while c.is_animating() && ticks < 5000 {
            now += FRAME;
            c.pump(now);
            ticks += 1;
            assert!(boundary.contains(c.state().displayed), "left boundary: {}", c.state().displayed.x);
        }
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.state().displayed.x, 5000.0);
        assert_eq!(c.state().target.x, 5000.0);
    }

    #[test]
    fn test_elastic_settles_at_edge() {
        let mut c = controller(BoundaryPolicy::default());
        set_target(&mut c, Vector2::new(6000.0, 0.0));

        let mut now = ms(0);
        let mut peak = f64::MIN;
        let mut after_peak = false;
        let mut last = f64::MIN;
        let mut ticks = 0;
        while c.is_animating() && ticks < 5000 {
            now += FRAME;
            c.pump(now);
            ticks += 1;
            let x = c.state().displayed.x;
            if x > 5000.0 {
                if x < last {
                    after_peak = true;
                }
                if after_peak {
                    // The final snap may land on the target, up to epsilon past the last tick.
                    assert!(x <= last + 0.1 + 1e-9, "excursion grew again at tick {}", ticks);
                }
                peak = peak.max(x);
            }
            last = x;
        }
        assert!(!c.is_animating());
        assert!(peak < 6000.0);
        assert!((c.state().displayed.x - 5000.0).abs() <= 0.1 + 1e-9);
    }

    #[test]
    fn test_wheel_moves_target_per_event() {
        let mut c = controller(BoundaryPolicy::default());
        let mut now = ms(0);
        let mut expected = 0.0;
        while now <= ms(500) {
            c.handle_input(RawInput::Wheel {
                delta_x: 10.0,
                delta_y: 0.0,
                shift: false,
                timestamp: now,
            });
            expected -= 12.0;
            assert!((c.state().target.x - expected).abs() < 1e-9);
            c.pump(now);
            now += FRAME;
        }
        assert!(c.state().target.x < 0.0);
    }

    #[test]
    fn test_wheel_idle_starts_momentum() {
        let mut c = controller(BoundaryPolicy::default());
        let mut now = ms(0);
        for _ in 0..10 {
            c.handle_input(RawInput::Wheel {
                delta_x: 0.0,
                delta_y: 40.0,
                shift: false,
                timestamp: now,
            });
            c.pump(now);
            now += FRAME;
        }
        let last_event = now - FRAME;
        assert_eq!(c.next_deadline(), Some(last_event + ms(100)));

        while c.next_deadline().is_some() {
            now += FRAME;
            c.pump(now);
        }
        assert!(c.state().momentum_active);
        assert!(c.state().velocity.y < 0.0);
    }

    #[test]
    fn test_momentum_decays_monotonically() {
        let mut c = controller(BoundaryPolicy::default());
        let points: Vec<(f64, f64)> = (0..12).map(|i| (500.0 + i as f64 * 20.0, 300.0)).collect();
        let mut now = drag(&mut c, &points, ms(0));
        assert!(c.state().momentum_active);
        let released_at = now;

        let mut last = c.state().velocity.length();
        while c.state().momentum_active {
            now += FRAME;
            c.pump(now);
            let v = c.state().velocity.length();
            assert!(v <= last + 1e-9);
            last = v;
        }
        assert_eq!(c.state().velocity, Vector2::ZERO);
        assert!(now - released_at <= c.profile().decay_duration() + FRAME);
    }

    #[test]
    fn test_input_cancels_momentum_immediately() {
        let mut c = controller(BoundaryPolicy::default());
        let points: Vec<(f64, f64)> = (0..12).map(|i| (500.0, 300.0 - i as f64 * 25.0)).collect();
        let mut now = drag(&mut c, &points, ms(0));
        for _ in 0..5 {
            now += FRAME;
            c.pump(now);
        }
        assert!(c.state().momentum_active);

        c.handle_input(RawInput::TouchStart {
            touches: 1,
            x: 10.0,
            y: 10.0,
            timestamp: now,
        });
        assert!(!c.state().momentum_active);
        let frozen = c.state().target;

        for _ in 0..20 {
            now += FRAME;
            c.pump(now);
        }
        assert_eq!(c.state().target, frozen);
    }

    #[test]
    fn test_inertia_disabled() {
        let mut s = settings(BoundaryPolicy::default());
        s.inertia_enabled = false;
        let mut c = Controller::mount(s, Viewport::default(), FrameQueue::new(), Timeline::new()).unwrap();
        let points: Vec<(f64, f64)> = (0..12).map(|i| (i as f64 * 30.0, 0.0)).collect();
        drag(&mut c, &points, ms(0));
        assert!(!c.state().momentum_active);
        assert_eq!(c.state().velocity, Vector2::ZERO);
    }

    #[test]
    fn test_keyboard_step_and_retarget() {
        let mut c = controller(BoundaryPolicy::default());
        let step = c.settings().keyboard.steps(1920.0);
        c.handle_input(RawInput::Key {
            key: NavKey::Right,
            timestamp: ms(0),
        });
        let (now, _) = run_until_idle(&mut c, ms(0), 2000);
        assert!((c.state().target.x + step.x).abs() < 1e-9);
        assert!((c.state().displayed.x + step.x).abs() < 1e-9);

        // Retarget halfway through a step starts from the current target.
        c.handle_input(RawInput::Key {
            key: NavKey::Up,
            timestamp: now,
        });
        c.pump(now + ms(400));
        c.handle_input(RawInput::Key {
            key: NavKey::Up,
            timestamp: now + ms(400),
        });
        assert_eq!(c.tweens().len(), 1);
        run_until_idle(&mut c, now + ms(400), 2000);
        assert!(c.state().target.y > step.y);
        assert!(c.state().target.y < 2.0 * step.y);
    }

    #[test]
    fn test_pointer_input_cancels_keyboard_tween() {
        let mut c = controller(BoundaryPolicy::default());
        c.navigate(NavKey::Down, ms(0));
        c.pump(ms(16));
        c.handle_input(RawInput::Wheel {
            delta_x: 0.0,
            delta_y: 5.0,
            shift: false,
            timestamp: ms(20),
        });
        assert!(!c.tweens().has_active());
    }

    #[test]
    fn test_reset_position_returns_to_origin() {
        let mut c = controller(BoundaryPolicy::default());
        set_target(&mut c, Vector2::new(800.0, -400.0));
        let (now, _) = run_until_idle(&mut c, ms(0), 2000);
        c.reset_position(now);
        run_until_idle(&mut c, now, 2000);
        assert_eq!(c.state().target, Vector2::ZERO);
        assert!(c.state().displayed.max_abs() <= 0.1);
    }

    #[test]
    fn test_viewport_crossing_breakpoint_swaps_profile() {
        let mut c = controller(BoundaryPolicy::default());
        assert_eq!(c.device_class(), DeviceClass::Desktop);
        c.set_viewport(Viewport::new(600.0, 900.0));
        assert_eq!(c.device_class(), DeviceClass::Mobile);
        assert_eq!(c.profile().smoothing_factor, 0.15);

        c.override_device(Some(DeviceClass::Desktop));
        c.set_viewport(Viewport::new(500.0, 900.0));
        assert_eq!(c.device_class(), DeviceClass::Desktop);
        c.override_device(None);
        assert_eq!(c.device_class(), DeviceClass::Mobile);
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let mut c = controller(BoundaryPolicy::default());
        let points: Vec<(f64, f64)> = (0..12).map(|i| (i as f64 * 30.0, 0.0)).collect();
        let now = drag(&mut c, &points, ms(0));
        c.hover_item(0, now);
        c.handle_input(RawInput::Wheel {
            delta_x: 0.0,
            delta_y: 10.0,
            shift: false,
            timestamp: now,
        });
        assert!(c.frames().is_pending());

        c.unmount();
        c.unmount();
        assert!(!c.is_mounted());
        assert!(!c.frames().is_pending());
        assert!(!c.tweens().has_active());
        assert_eq!(c.next_deadline(), None);

        let requested = c.frames().requested();
        c.handle_input(RawInput::Key {
            key: NavKey::Up,
            timestamp: now,
        });
        c.reset_position(now);
        c.page_enter(now);
        assert!(!c.pump(now + ms(500)));
        assert_eq!(c.frames().requested(), requested);
        assert!(!c.tweens().has_active());
    }

    /// Scheduler that keeps every undelivered request, like a host with a real refresh callback list.
    #[derive(Debug, Default)]
    struct TrackingFrames {
        ids: FrameQueue,
        outstanding: Vec<FrameHandle>,
        peak: usize,
    }

    impl TrackingFrames {
        fn deliver(&mut self) -> Option<FrameHandle> {
            if self.outstanding.is_empty() {
                None
            } else {
                Some(self.outstanding.remove(0))
            }
        }
    }

    impl FrameScheduler for TrackingFrames {
        fn request_frame(&mut self) -> FrameHandle {
            let handle = self.ids.request_frame();
            self.outstanding.push(handle);
            self.peak = self.peak.max(self.outstanding.len());
            handle
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.outstanding.retain(|h| *h != handle);
        }
    }

    #[test]
    fn test_wheel_release_keeps_one_frame_request() {
        let mut c = ViewportController::mount(
            settings(BoundaryPolicy::default()),
            Viewport::default(),
            TrackingFrames::default(),
            Timeline::new(),
        )
        .unwrap();

        let mut now = ms(0);
        for _ in 0..10 {
            c.handle_input(RawInput::Wheel {
                delta_x: 0.0,
                delta_y: 40.0,
                shift: false,
                timestamp: now,
            });
            now += FRAME;
            if let Some(handle) = c.frames_mut().deliver() {
                c.on_frame(handle, now);
            }
        }
        while !c.state().momentum_active && now < ms(1000) {
            now += FRAME;
            if let Some(handle) = c.frames_mut().deliver() {
                c.on_frame(handle, now);
            }
        }
        assert!(c.state().momentum_active);
        assert_eq!(c.frames().peak, 1);
        assert_eq!(c.frames().outstanding.len(), 1);

        c.unmount();
        assert!(c.frames().outstanding.is_empty());
    }

    #[test]
    fn test_stale_frame_handle_ignored() {
        let mut c = controller(BoundaryPolicy::default());
        set_target(&mut c, Vector2::new(100.0, 0.0));
        let stale = c.frames_mut().take_pending().unwrap();
        c.on_frame(stale, ms(16));
        let displayed = c.state().displayed;
        c.on_frame(stale, ms(32));
        assert_eq!(c.state().displayed, displayed);
    }

    #[test]
    fn test_frame_rate_compensation_matches_wall_time() {
        let mut s = ControllerSettings::default();
        s.frame_rate_compensation = true;
        let mut fast = Controller::mount(s.clone(), Viewport::default(), FrameQueue::new(), Timeline::new()).unwrap();
        let mut slow = Controller::mount(s, Viewport::default(), FrameQueue::new(), Timeline::new()).unwrap();
        set_target(&mut fast, Vector2::new(1000.0, 0.0));
        set_target(&mut slow, Vector2::new(1000.0, 0.0));

        // Prime both clocks so later ticks see real intervals.
        fast.pump(ms(0));
        slow.pump(ms(0));
        let half = crate::timing::REFERENCE_FRAME / 2;
        let mut t = Duration::ZERO;
        for _ in 0..60 {
            t += half;
            fast.pump(t);
        }
        let mut t = Duration::ZERO;
        for _ in 0..30 {
            t += crate::timing::REFERENCE_FRAME;
            slow.pump(t);
        }
        let a = fast.state().displayed.x;
        let b = slow.state().displayed.x;
        assert!((a - b).abs() < 1.0, "{} vs {}", a, b);
    }

    #[test]
    fn test_effects_request_frames() {
        let mut c = controller(BoundaryPolicy::default());
        c.set_item_count(3);
        c.page_enter(ms(0));
        assert!(c.is_animating());
        assert_eq!(c.container_style().opacity, 0.0);
        let (_, ticks) = run_until_idle(&mut c, ms(0), 500);
        assert!(ticks > 0);
        assert_eq!(c.container_style(), ContainerStyle::default());
        assert_eq!(c.item_style(2).opacity, 1.0);
    }
}
