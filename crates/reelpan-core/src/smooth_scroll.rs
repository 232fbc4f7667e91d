//! Page-level smooth scrolling
//!
//! [`SmoothScrollService`] is the contract; [`DampedScroller`] the kept
//! implementation. [`SmoothScroll`] owns an optional service and degrades to
//! plain jumps when the service cannot be created or initialised.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::easing::EasingType;
use crate::error::{Error, Result};
use crate::timing::{lerp, progress};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothScrollConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_wheel_multiplier")]
    pub wheel_multiplier: f64,
    #[serde(default = "default_touch_multiplier")]
    pub touch_multiplier: f64,
    /// Duration of `scroll_to_top`
    #[serde(default = "default_top_duration_ms")]
    pub top_duration_ms: u64,
    #[serde(default = "default_ease")]
    pub ease: EasingType,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            duration_ms: default_duration_ms(),
            wheel_multiplier: default_wheel_multiplier(),
            touch_multiplier: default_touch_multiplier(),
            top_duration_ms: default_top_duration_ms(),
            ease: default_ease(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_duration_ms() -> u64 {
    1200
}

fn default_wheel_multiplier() -> f64 {
    1.2
}

fn default_touch_multiplier() -> f64 {
    2.0
}

fn default_top_duration_ms() -> u64 {
    1500
}

fn default_ease() -> EasingType {
    EasingType::Scroll
}

impl SmoothScrollConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn top_duration(&self) -> Duration {
        Duration::from_millis(self.top_duration_ms)
    }
}

/// Where to scroll
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollTarget {
    Top,
    Offset(f64),
    /// An element whose top edge sits at `top` in page coordinates
    Element { top: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOptions {
    /// Defaults to the service duration
    pub duration: Option<Duration>,
    /// Added to the resolved target
    pub offset: f64,
    /// Jump without animating
    pub immediate: bool,
    pub ease: Option<EasingType>,
}

impl ScrollOptions {
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn immediate() -> Self {
        Self {
            immediate: true,
            ..Self::default()
        }
    }
}

/// Published whenever the scroll position changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollEvent {
    pub position: f64,
    /// Position change since the previous event
    pub velocity: f64,
    /// `position / limit`, 0 when there is nothing to scroll
    pub progress: f64,
    /// -1 up, 0 still, 1 down
    pub direction: i8,
}

#[async_trait]
pub trait SmoothScrollService: Send {
    /// Await readiness. Must succeed before any other call has an effect.
    async fn init(&mut self) -> Result<()>;

    fn scroll_to(&mut self, target: ScrollTarget, options: ScrollOptions, now: Duration) -> Result<()>;

    fn on_wheel(&mut self, delta: f64, now: Duration);

    fn on_touch(&mut self, delta: f64, now: Duration);

    /// Largest reachable position (content extent minus viewport)
    fn set_limit(&mut self, limit: f64);

    fn subscribe(&self) -> broadcast::Receiver<ScrollEvent>;

    fn tick(&mut self, now: Duration);

    fn position(&self) -> f64;

    fn is_animating(&self) -> bool;

    /// Stop animating and refuse further work. Idempotent.
    fn destroy(&mut self);
}

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: f64,
    to: f64,
    start: Duration,
    duration: Duration,
    ease: EasingType,
}

/// Duration-eased scroller: every request animates from the current position
/// to the new target.
#[derive(Debug)]
pub struct DampedScroller {
    config: SmoothScrollConfig,
    position: f64,
    limit: f64,
    animation: Option<ScrollAnimation>,
    tx: broadcast::Sender<ScrollEvent>,
    ready: bool,
    destroyed: bool,
}

impl DampedScroller {
    pub fn new(config: SmoothScrollConfig) -> Result<Self> {
        if config.duration_ms == 0 {
            return Err(Error::SmoothScroll("duration must be positive".into()));
        }
        for (name, v) in [
            ("wheel_multiplier", config.wheel_multiplier),
            ("touch_multiplier", config.touch_multiplier),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::SmoothScroll(format!("{} must be positive, got {}", name, v)));
            }
        }
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            config,
            position: 0.0,
            limit: 0.0,
            animation: None,
            tx,
            ready: false,
            destroyed: false,
        })
    }

    fn live(&self) -> bool {
        self.ready && !self.destroyed
    }

    /// Target the scroller is heading to
    pub fn destination(&self) -> f64 {
        self.animation.map(|a| a.to).unwrap_or(self.position)
    }

    fn animate_to(&mut self, to: f64, duration: Duration, ease: EasingType, now: Duration) {
        self.animation = Some(ScrollAnimation {
            from: self.position,
            to: to.clamp(0.0, self.limit),
            start: now,
            duration,
            ease,
        });
    }

    fn jump(&mut self, to: f64) {
        self.animation = None;
        let to = to.clamp(0.0, self.limit);
        self.move_to(to);
    }

    fn move_to(&mut self, to: f64) {
        let velocity = to - self.position;
        if velocity == 0.0 {
            return;
        }
        self.position = to;
        let _ = self.tx.send(event_for(to, velocity, self.limit));
    }

    fn nudge(&mut self, delta: f64, now: Duration) {
        if !self.live() || !delta.is_finite() {
            return;
        }
        let to = self.destination() + delta;
        self.animate_to(to, self.config.duration(), self.config.ease, now);
    }
}

fn event_for(position: f64, velocity: f64, limit: f64) -> ScrollEvent {
    ScrollEvent {
        position,
        velocity,
        progress: if limit > 0.0 { position / limit } else { 0.0 },
        direction: if velocity > 0.0 {
            1
        } else if velocity < 0.0 {
            -1
        } else {
            0
        },
    }
}

fn resolve(target: ScrollTarget, options: &ScrollOptions) -> f64 {
    let base = match target {
        ScrollTarget::Top => 0.0,
        ScrollTarget::Offset(v) => v,
        ScrollTarget::Element { top } => top,
    };
    base + options.offset
}

#[async_trait]
impl SmoothScrollService for DampedScroller {
    async fn init(&mut self) -> Result<()> {
        if self.destroyed {
            return Err(Error::SmoothScroll("scroller was destroyed".into()));
        }
        self.ready = true;
        debug!(limit = self.limit, "smooth scroller ready");
        Ok(())
    }

    fn scroll_to(&mut self, target: ScrollTarget, options: ScrollOptions, now: Duration) -> Result<()> {
        if self.destroyed {
            return Err(Error::Unmounted);
        }
        if !self.ready {
            return Err(Error::SmoothScroll("scroller is not initialised".into()));
        }
        let to = resolve(target, &options);
        if !to.is_finite() {
            return Err(Error::SmoothScroll(format!("invalid scroll target {}", to)));
        }
        if options.immediate {
            self.jump(to);
        } else {
            let duration = options.duration.unwrap_or_else(|| self.config.duration());
            let ease = options.ease.unwrap_or(self.config.ease);
            self.animate_to(to, duration, ease, now);
        }
        Ok(())
    }

    fn on_wheel(&mut self, delta: f64, now: Duration) {
        let multiplier = self.config.wheel_multiplier;
        self.nudge(delta * multiplier, now);
    }

    fn on_touch(&mut self, delta: f64, now: Duration) {
        let multiplier = self.config.touch_multiplier;
        self.nudge(delta * multiplier, now);
    }

    fn set_limit(&mut self, limit: f64) {
        self.limit = if limit.is_finite() { limit.max(0.0) } else { 0.0 };
        if let Some(anim) = self.animation.as_mut() {
            anim.to = anim.to.min(self.limit);
        }
        if self.position > self.limit {
            let limit = self.limit;
            self.move_to(limit);
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ScrollEvent> {
        self.tx.subscribe()
    }

    fn tick(&mut self, now: Duration) {
        if !self.live() {
            return;
        }
        let Some(anim) = self.animation else {
            return;
        };
        let elapsed = now.saturating_sub(anim.start);
        let t = progress(elapsed, anim.duration);
        let next = if t >= 1.0 {
            self.animation = None;
            anim.to
        } else {
            lerp(anim.from, anim.to, anim.ease.apply(t))
        };
        self.move_to(next);
    }

    fn position(&self) -> f64 {
        self.position
    }

    fn is_animating(&self) -> bool {
        self.live() && self.animation.is_some()
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.animation = None;
        debug!("smooth scroller destroyed");
    }
}

/// Owner of the page scroller
pub struct SmoothScroll {
    service: Option<Box<dyn SmoothScrollService>>,
    config: SmoothScrollConfig,
    position: f64,
    limit: f64,
    tx: broadcast::Sender<ScrollEvent>,
}

impl std::fmt::Debug for SmoothScroll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmoothScroll")
            .field("degraded", &self.is_degraded())
            .field("position", &self.position())
            .field("limit", &self.limit)
            .finish()
    }
}

impl SmoothScroll {
    /// Build the configured scroller, falling back to plain jumps on failure
    pub async fn start(config: &SmoothScrollConfig, limit: f64) -> Self {
        if !config.enabled {
            info!("Smooth scrolling disabled");
            return Self::fallback(config.clone(), limit);
        }
        match DampedScroller::new(config.clone()) {
            Ok(scroller) => Self::with_service(Box::new(scroller), config.clone(), limit).await,
            Err(e) => {
                warn!(error = %e, "Smooth scroll unavailable, using plain jumps");
                Self::fallback(config.clone(), limit)
            }
        }
    }

    /// Wrap an existing service, awaiting its readiness
    pub async fn with_service(
        mut service: Box<dyn SmoothScrollService>,
        config: SmoothScrollConfig,
        limit: f64,
    ) -> Self {
        service.set_limit(limit);
        match service.init().await {
            Ok(()) => {
                let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
                Self {
                    service: Some(service),
                    config,
                    position: 0.0,
                    limit,
                    tx,
                }
            }
            Err(e) => {
                warn!(error = %e, "Smooth scroll failed to initialise, using plain jumps");
                Self::fallback(config, limit)
            }
        }
    }

    pub fn fallback(config: SmoothScrollConfig, limit: f64) -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service: None,
            config,
            position: 0.0,
            limit: limit.max(0.0),
            tx,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.service.is_none()
    }

    pub fn position(&self) -> f64 {
        match &self.service {
            Some(s) => s.position(),
            None => self.position,
        }
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    pub fn is_animating(&self) -> bool {
        self.service.as_ref().is_some_and(|s| s.is_animating())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScrollEvent> {
        match &self.service {
            Some(s) => s.subscribe(),
            None => self.tx.subscribe(),
        }
    }

    pub fn set_limit(&mut self, limit: f64) {
        self.limit = limit.max(0.0);
        match self.service.as_mut() {
            Some(s) => s.set_limit(limit),
            None => {
                let limit = self.limit;
                if self.position > limit {
                    self.jump(limit);
                }
            }
        }
    }

    pub fn scroll_to(&mut self, target: ScrollTarget, options: ScrollOptions, now: Duration) {
        if let Some(service) = self.service.as_mut() {
            match service.scroll_to(target, options, now) {
                Ok(()) => return,
                Err(e) => warn!(error = %e, "Smooth scroll request failed, jumping"),
            }
        }
        let to = resolve(target, &options);
        if to.is_finite() {
            self.jump(to);
        }
    }

    pub fn scroll_to_top(&mut self, now: Duration) {
        let options = ScrollOptions::with_duration(self.config.top_duration());
        self.scroll_to(ScrollTarget::Top, options, now);
    }

    pub fn scroll_to_element(&mut self, top: f64, offset: f64, now: Duration) {
        let options = ScrollOptions {
            offset,
            ..ScrollOptions::with_duration(self.config.duration())
        };
        self.scroll_to(ScrollTarget::Element { top }, options, now);
    }

    pub fn on_wheel(&mut self, delta: f64, now: Duration) {
        match self.service.as_mut() {
            Some(s) => s.on_wheel(delta, now),
            None if delta.is_finite() => {
                let to = self.position + delta;
                self.jump(to);
            }
            None => {}
        }
    }

    pub fn on_touch(&mut self, delta: f64, now: Duration) {
        match self.service.as_mut() {
            Some(s) => s.on_touch(delta, now),
            None if delta.is_finite() => {
                let to = self.position + delta;
                self.jump(to);
            }
            None => {}
        }
    }

    pub fn tick(&mut self, now: Duration) {
        if let Some(s) = self.service.as_mut() {
            s.tick(now);
        }
    }

    /// Tear down the service. Later calls behave as plain jumps.
    pub fn destroy(&mut self) {
        if let Some(mut service) = self.service.take() {
            self.position = service.position();
            service.destroy();
            info!("Smooth scroll destroyed");
        }
    }

    fn jump(&mut self, to: f64) {
        let to = to.clamp(0.0, self.limit);
        let velocity = to - self.position;
        if velocity != 0.0 {
            self.position = to;
            let _ = self.tx.send(event_for(to, velocity, self.limit));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    async fn ready(limit: f64) -> DampedScroller {
        let mut s = DampedScroller::new(SmoothScrollConfig::default()).unwrap();
        s.set_limit(limit);
        s.init().await.unwrap();
        s
    }

    struct FailingService;

    #[async_trait]
    impl SmoothScrollService for FailingService {
        async fn init(&mut self) -> Result<()> {
            Err(Error::SmoothScroll("no document".into()))
        }
        fn scroll_to(&mut self, _: ScrollTarget, _: ScrollOptions, _: Duration) -> Result<()> {
            Ok(())
        }
        fn on_wheel(&mut self, _: f64, _: Duration) {}
        fn on_touch(&mut self, _: f64, _: Duration) {}
        fn set_limit(&mut self, _: f64) {}
        fn subscribe(&self) -> broadcast::Receiver<ScrollEvent> {
            broadcast::channel(1).1
        }
        fn tick(&mut self, _: Duration) {}
        fn position(&self) -> f64 {
            0.0
        }
        fn is_animating(&self) -> bool {
            false
        }
        fn destroy(&mut self) {}
    }

    #[tokio::test]
    async fn test_requires_init() {
        let mut s = DampedScroller::new(SmoothScrollConfig::default()).unwrap();
        s.set_limit(1000.0);
        assert!(s.scroll_to(ScrollTarget::Offset(100.0), ScrollOptions::default(), ms(0)).is_err());
        s.init().await.unwrap();
        assert!(s.scroll_to(ScrollTarget::Offset(100.0), ScrollOptions::default(), ms(0)).is_ok());
    }

    #[tokio::test]
    async fn test_scroll_to_reaches_target_after_duration() {
        let mut s = ready(1000.0).await;
        let mut rx = s.subscribe();
        s.scroll_to(ScrollTarget::Offset(400.0), ScrollOptions::default(), ms(0)).unwrap();
        s.tick(ms(600));
        assert!(s.position() > 300.0 && s.position() < 400.0);
        s.tick(ms(1200));
        assert_eq!(s.position(), 400.0);
        assert!(!s.is_animating());

        let first = rx.recv().await.unwrap();
        assert_eq!(first.direction, 1);
        let last = rx.recv().await.unwrap();
        assert_eq!(last.position, 400.0);
        assert!((last.progress - 0.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_targets_are_clamped() {
        let mut s = ready(500.0).await;
        s.scroll_to(ScrollTarget::Element { top: 450.0 }, ScrollOptions { offset: 200.0, immediate: true, ..Default::default() }, ms(0))
            .unwrap();
        assert_eq!(s.position(), 500.0);
        s.scroll_to(ScrollTarget::Top, ScrollOptions::immediate(), ms(0)).unwrap();
        assert_eq!(s.position(), 0.0);
    }

    #[tokio::test]
    async fn test_wheel_accumulates_destination() {
        let mut s = ready(1000.0).await;
        s.on_wheel(100.0, ms(0));
        s.on_wheel(100.0, ms(10));
        assert!((s.destination() - 240.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let mut s = ready(1000.0).await;
        s.scroll_to(ScrollTarget::Offset(300.0), ScrollOptions::default(), ms(0)).unwrap();
        s.destroy();
        s.destroy();
        assert!(!s.is_animating());
        s.tick(ms(2000));
        assert_eq!(s.position(), 0.0);
        assert!(matches!(
            s.scroll_to(ScrollTarget::Top, ScrollOptions::default(), ms(0)),
            Err(Error::Unmounted)
        ));
    }

    #[tokio::test]
    async fn test_failed_init_degrades_to_jumps() {
        let mut scroll = SmoothScroll::with_service(Box::new(FailingService), SmoothScrollConfig::default(), 800.0).await;
        assert!(scroll.is_degraded());
        let mut rx = scroll.subscribe();
        scroll.scroll_to(ScrollTarget::Offset(300.0), ScrollOptions::default(), ms(0));
        assert_eq!(scroll.position(), 300.0);
        assert_eq!(rx.recv().await.unwrap().position, 300.0);
        scroll.scroll_to_top(ms(10));
        assert_eq!(scroll.position(), 0.0);
    }

    #[tokio::test]
    async fn test_invalid_config_degrades() {
        let config = SmoothScrollConfig {
            duration_ms: 0,
            ..SmoothScrollConfig::default()
        };
        let scroll = SmoothScroll::start(&config, 100.0).await;
        assert!(scroll.is_degraded());
    }

    #[tokio::test]
    async fn test_ticks_settle_on_destination() {
        let mut scroll = SmoothScroll::start(&SmoothScrollConfig::default(), 2000.0).await;
        assert!(!scroll.is_degraded());
        scroll.scroll_to_element(900.0, -100.0, ms(0));
        let mut now = ms(0);
        while scroll.is_animating() && now < ms(5000) {
            now += ms(16);
            scroll.tick(now);
        }
        assert_eq!(scroll.position(), 800.0);
        assert!(now >= ms(1200));

        scroll.destroy();
        assert!(scroll.is_degraded());
        assert_eq!(scroll.position(), 800.0);
    }
}
