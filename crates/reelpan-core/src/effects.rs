//! Gallery item effects delegated to the tween scheduler
//!
//! Hover, leave, page entrance and scroll reveal are fixed presets. The
//! animator only remembers which tween drives which item so it can apply
//! [`TweenEvent`]s and kill conflicting tweens.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

use crate::easing::EasingType;
use crate::tween::{TweenEvent, TweenHandle, TweenScheduler, TweenSpec};

const HOVER_DURATION: Duration = Duration::from_millis(300);
const CONTAINER_ENTER_DURATION: Duration = Duration::from_millis(600);
const ITEM_ENTER_DURATION: Duration = Duration::from_millis(400);
/// Items start this long before the container finishes
const ITEM_ENTER_OVERLAP: Duration = Duration::from_millis(400);
const ITEM_ENTER_STAGGER_TOTAL: Duration = Duration::from_millis(800);
const REVEAL_DURATION: Duration = Duration::from_millis(600);
const REVEAL_STAGGER: Duration = Duration::from_millis(50);

/// Animated presentation properties of one item
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemStyle {
    pub scale: f64,
    /// Degrees
    pub rotation_y: f64,
    pub z: f64,
    pub shadow: f64,
    pub content_scale: f64,
    pub opacity: f64,
    pub offset_y: f64,
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_y: 0.0,
            z: 0.0,
            shadow: 0.0,
            content_scale: 1.0,
            opacity: 1.0,
            offset_y: 0.0,
        }
    }
}

impl ItemStyle {
    fn hover_props(&self) -> [f64; 5] {
        [self.scale, self.rotation_y, self.z, self.shadow, self.content_scale]
    }

    fn set_hover_props(&mut self, v: &[f64]) {
        if let [scale, rotation_y, z, shadow, content_scale] = *v {
            self.scale = scale;
            self.rotation_y = rotation_y;
            self.z = z;
            self.shadow = shadow;
            self.content_scale = content_scale;
        }
    }

    fn reveal_props(&self) -> [f64; 4] {
        [self.opacity, self.scale, self.rotation_y, self.offset_y]
    }

    fn set_reveal_props(&mut self, v: &[f64]) {
        if let [opacity, scale, rotation_y, offset_y] = *v {
            self.opacity = opacity;
            self.scale = scale;
            self.rotation_y = rotation_y;
            self.offset_y = offset_y;
        }
    }

    /// Is the item raised by a hover effect
    pub fn is_lifted(&self) -> bool {
        self.scale > 1.0 + 1e-3 || self.z > 1e-3
    }
}

/// Opacity and vertical offset of the gallery container
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContainerStyle {
    pub opacity: f64,
    pub offset_y: f64,
}

impl Default for ContainerStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            offset_y: 0.0,
        }
    }
}

const HOVER_TO: [f64; 5] = [1.05, 5.0, 50.0, 0.5, 1.1];
const REST: [f64; 5] = [1.0, 0.0, 0.0, 0.0, 1.0];
const REVEAL_HIDDEN: [f64; 4] = [0.0, 0.8, -15.0, 50.0];
const REVEAL_SHOWN: [f64; 4] = [1.0, 1.0, 0.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Driven {
    Container,
    /// Hover or leave on an item
    Lift(usize),
    Enter(usize),
    Reveal(usize),
}

#[derive(Debug, Clone, Default)]
pub struct ItemAnimator {
    items: Vec<ItemStyle>,
    container: ContainerStyle,
    driving: HashMap<TweenHandle, Driven>,
    lift: HashMap<usize, TweenHandle>,
    reveal: HashMap<usize, TweenHandle>,
    revealed: HashMap<usize, bool>,
}

impl ItemAnimator {
    pub fn new(count: usize) -> Self {
        Self {
            items: vec![ItemStyle::default(); count],
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resize the item list; new items start at rest
    pub fn set_count(&mut self, count: usize) {
        self.items.resize(count, ItemStyle::default());
    }

    pub fn style(&self, index: usize) -> ItemStyle {
        self.items.get(index).copied().unwrap_or_default()
    }

    pub fn container(&self) -> ContainerStyle {
        self.container
    }

    pub fn owns(&self, handle: TweenHandle) -> bool {
        self.driving.contains_key(&handle)
    }

    pub fn is_running(&self) -> bool {
        !self.driving.is_empty()
    }

    pub fn hover<T: TweenScheduler>(&mut self, tweens: &mut T, index: usize, now: Duration) -> bool {
        self.lift_to(tweens, index, HOVER_TO, now)
    }

    pub fn leave<T: TweenScheduler>(&mut self, tweens: &mut T, index: usize, now: Duration) -> bool {
        self.lift_to(tweens, index, REST, now)
    }

    fn lift_to<T: TweenScheduler>(
        &mut self,
        tweens: &mut T,
        index: usize,
        to: [f64; 5],
        now: Duration,
    ) -> bool {
        let Some(style) = self.items.get(index) else {
            return false;
        };
        if let Some(old) = self.lift.remove(&index) {
            tweens.kill(old);
            self.driving.remove(&old);
        }
        let spec = TweenSpec::new(style.hover_props(), to, HOVER_DURATION)
            .with_ease(EasingType::Power2Out);
        let handle = tweens.animate(spec, now);
        self.lift.insert(index, handle);
        self.driving.insert(handle, Driven::Lift(index));
        true
    }

    /// Fade the container in, then the items with a staggered start
    pub fn page_enter<T: TweenScheduler>(&mut self, tweens: &mut T, now: Duration) {
        self.container = ContainerStyle {
            opacity: 0.0,
            offset_y: -100.0,
        };
        let handle = tweens.animate(
            TweenSpec::new([0.0, -100.0], [1.0, 0.0], CONTAINER_ENTER_DURATION)
                .with_ease(EasingType::Power2Out),
            now,
        );
        self.driving.insert(handle, Driven::Container);

        let items_start = CONTAINER_ENTER_DURATION.saturating_sub(ITEM_ENTER_OVERLAP);
        let count = self.items.len();
        let each = if count > 1 {
            ITEM_ENTER_STAGGER_TOTAL / (count as u32 - 1)
        } else {
            Duration::ZERO
        };

        for index in 0..count {
            self.items[index].opacity = 0.0;
            self.items[index].offset_y = -30.0;
            let spec = TweenSpec::new([0.0, -30.0], [1.0, 0.0], ITEM_ENTER_DURATION)
                .with_ease(EasingType::Power2Out)
                .with_delay(items_start + each * index as u32);
            let handle = tweens.animate(spec, now);
            self.driving.insert(handle, Driven::Enter(index));
        }
    }

    /// Play the reveal when an item enters the viewport, reverse it when it leaves
    pub fn reveal<T: TweenScheduler>(
        &mut self,
        tweens: &mut T,
        index: usize,
        visible: bool,
        now: Duration,
    ) -> bool {
        let Some(style) = self.items.get(index) else {
            return false;
        };
        if self.revealed.get(&index).copied() == Some(visible) {
            return false;
        }
        let from = if self.revealed.contains_key(&index) {
            style.reveal_props()
        } else if visible {
            REVEAL_HIDDEN
        } else {
            REVEAL_SHOWN
        };
        self.revealed.insert(index, visible);

        if let Some(old) = self.reveal.remove(&index) {
            tweens.kill(old);
            self.driving.remove(&old);
        }
        let (to, delay) = if visible {
            (REVEAL_SHOWN, REVEAL_STAGGER * index as u32)
        } else {
            (REVEAL_HIDDEN, Duration::ZERO)
        };
        self.items[index].set_reveal_props(&from);
        let spec = TweenSpec::new(from, to, REVEAL_DURATION)
            .with_ease(EasingType::Power2Out)
            .with_delay(delay);
        let handle = tweens.animate(spec, now);
        self.reveal.insert(index, handle);
        self.driving.insert(handle, Driven::Reveal(index));
        true
    }

    /// Apply an event produced by the scheduler. Returns `false` for foreign handles.
    pub fn apply(&mut self, event: &TweenEvent) -> bool {
        let handle = event.handle();
        let Some(&driven) = self.driving.get(&handle) else {
            return false;
        };
        let values = event.values();

        match driven {
            Driven::Container => {
                if let [opacity, offset_y] = *values {
                    self.container = ContainerStyle { opacity, offset_y };
                }
            }
            Driven::Lift(i) => {
                if let Some(style) = self.items.get_mut(i) {
                    style.set_hover_props(values);
                }
            }
            Driven::Enter(i) => {
                if let (Some(style), [opacity, offset_y]) = (self.items.get_mut(i), values) {
                    style.opacity = *opacity;
                    style.offset_y = *offset_y;
                }
            }
            Driven::Reveal(i) => {
                if let Some(style) = self.items.get_mut(i) {
                    style.set_reveal_props(values);
                }
            }
        }

        if let TweenEvent::Complete { .. } = event {
            self.driving.remove(&handle);
            match driven {
                Driven::Lift(i) => {
                    self.lift.remove(&i);
                }
                Driven::Reveal(i) => {
                    self.reveal.remove(&i);
                }
                Driven::Container | Driven::Enter(_) => {}
            }
        }
        true
    }

    /// Kill every effect tween
    pub fn clear<T: TweenScheduler>(&mut self, tweens: &mut T) {
        for handle in self.driving.keys() {
            tweens.kill(*handle);
        }
        self.driving.clear();
        self.lift.clear();
        self.reveal.clear();
    }
}
