//! Raw device input and its normalization into scroll gestures

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Vector2;
use crate::keyboard::NavKey;

/// Wheel deltas below this on both axes are classified as trackpad input
pub const TRACKPAD_DELTA_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Input as delivered by the host, timestamps on the host's monotonic clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawInput {
    Wheel {
        delta_x: f64,
        delta_y: f64,
        /// Horizontal modifier (Shift) held
        #[serde(default)]
        shift: bool,
        timestamp: Duration,
    },
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        timestamp: Duration,
    },
    PointerMove {
        x: f64,
        y: f64,
        timestamp: Duration,
    },
    PointerUp {
        button: PointerButton,
        timestamp: Duration,
    },
    /// Pointer left the gallery surface
    PointerLeave {
        timestamp: Duration,
    },
    TouchStart {
        /// Number of active touch points
        touches: u32,
        x: f64,
        y: f64,
        timestamp: Duration,
    },
    TouchMove {
        touches: u32,
        x: f64,
        y: f64,
        timestamp: Duration,
    },
    TouchEnd {
        /// Touch points still on the surface
        remaining: u32,
        timestamp: Duration,
    },
    Key {
        key: NavKey,
        timestamp: Duration,
    },
}

impl RawInput {
    pub fn timestamp(&self) -> Duration {
        match *self {
            RawInput::Wheel { timestamp, .. }
            | RawInput::PointerDown { timestamp, .. }
            | RawInput::PointerMove { timestamp, .. }
            | RawInput::PointerUp { timestamp, .. }
            | RawInput::PointerLeave { timestamp }
            | RawInput::TouchStart { timestamp, .. }
            | RawInput::TouchMove { timestamp, .. }
            | RawInput::TouchEnd { timestamp, .. }
            | RawInput::Key { timestamp, .. } => timestamp,
        }
    }
}

/// Parse a recorded input script: one `RawInput` JSON object per line.
/// Blank lines and `#` comments are skipped; the result is ordered by timestamp.
pub fn parse_script(content: &str) -> Result<Vec<RawInput>> {
    let mut script = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let input = serde_json::from_str(line).map_err(|source| Error::InvalidInput {
            line: index + 1,
            source,
        })?;
        script.push(input);
    }
    script.sort_by_key(RawInput::timestamp);
    Ok(script)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Wheel,
    Trackpad,
    Touch,
    Drag,
    Key,
}

impl SourceKind {
    pub fn is_wheel_like(self) -> bool {
        matches!(self, SourceKind::Wheel | SourceKind::Trackpad)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Wheel => "wheel",
            SourceKind::Trackpad => "trackpad",
            SourceKind::Touch => "touch",
            SourceKind::Drag => "drag",
            SourceKind::Key => "key",
        };
        f.write_str(name)
    }
}

/// One normalized movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    /// Pixels of intended scroll. Wheel samples are already sensitivity-scaled.
    pub delta: Vector2,
    pub timestamp: Duration,
    pub source: SourceKind,
}

/// What a raw input means to the controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Drag or single-touch pan started
    Begin { source: SourceKind, timestamp: Duration },
    Move(InputSample),
    /// Drag or touch pan released
    End { source: SourceKind, timestamp: Duration },
    Navigate { key: NavKey, timestamp: Duration },
    Ignored,
}

/// Tracks pointer and touch state between raw events
#[derive(Debug, Clone, Default)]
pub struct InputNormalizer {
    pointer: Option<Vector2>,
    touch: Option<Vector2>,
    touch_active: bool,
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn is_touching(&self) -> bool {
        self.touch_active
    }

    /// Forget any gesture in progress
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Translate one raw input. `wheel_sensitivity` comes from the active profile.
    pub fn normalize(&mut self, input: RawInput, wheel_sensitivity: f64) -> Gesture {
        match input {
            RawInput::Wheel {
                delta_x,
                delta_y,
                shift,
                timestamp,
            } => {
                if !delta_x.is_finite() || !delta_y.is_finite() {
                    return Gesture::Ignored;
                }
                let source = if delta_x.abs() < TRACKPAD_DELTA_THRESHOLD
                    && delta_y.abs() < TRACKPAD_DELTA_THRESHOLD
                {
                    SourceKind::Trackpad
                } else {
                    SourceKind::Wheel
                };
                let mut delta = Vector2::new(delta_x, delta_y) * wheel_sensitivity;
                if shift {
                    delta.x += delta.y;
                    delta.y = 0.0;
                }
                Gesture::Move(InputSample {
                    delta,
                    timestamp,
                    source,
                })
            }
            RawInput::PointerDown {
                x,
                y,
                button,
                timestamp,
            } => {
                let pos = Vector2::new(x, y);
                if button != PointerButton::Primary || !pos.is_finite() {
                    return Gesture::Ignored;
                }
                self.pointer = Some(pos);
                Gesture::Begin {
                    source: SourceKind::Drag,
                    timestamp,
                }
            }
            RawInput::PointerMove { x, y, timestamp } => {
                let pos = Vector2::new(x, y);
                match self.pointer {
                    Some(last) if pos.is_finite() => {
                        self.pointer = Some(pos);
                        Gesture::Move(InputSample {
                            delta: pos - last,
                            timestamp,
                            source: SourceKind::Drag,
                        })
                    }
                    _ => Gesture::Ignored,
                }
            }
            RawInput::PointerUp { button, timestamp } => {
                if button != PointerButton::Primary {
                    return Gesture::Ignored;
                }
                self.end_drag(timestamp)
            }
            RawInput::PointerLeave { timestamp } => self.end_drag(timestamp),
            RawInput::TouchStart {
                touches,
                x,
                y,
                timestamp,
            } => {
                let pos = Vector2::new(x, y);
                if touches != 1 || !pos.is_finite() {
                    self.touch = None;
                    return Gesture::Ignored;
                }
                self.touch = Some(pos);
                self.touch_active = true;
                Gesture::Begin {
                    source: SourceKind::Touch,
                    timestamp,
                }
            }
            RawInput::TouchMove {
                touches,
                x,
                y,
                timestamp,
            } => {
                let pos = Vector2::new(x, y);
                if touches != 1 || !pos.is_finite() {
                    self.touch = None;
                    return Gesture::Ignored;
                }
                match self.touch.replace(pos) {
                    Some(last) if self.touch_active => Gesture::Move(InputSample {
                        delta: pos - last,
                        timestamp,
                        source: SourceKind::Touch,
                    }),
                    _ => Gesture::Ignored,
                }
            }
            RawInput::TouchEnd {
                remaining,
                timestamp,
            } => {
                if remaining > 0 || !self.touch_active {
                    self.touch = None;
                    return Gesture::Ignored;
                }
                self.touch = None;
                self.touch_active = false;
                Gesture::End {
                    source: SourceKind::Touch,
                    timestamp,
                }
            }
            RawInput::Key { key, timestamp } => Gesture::Navigate { key, timestamp },
        }
    }

    fn end_drag(&mut self, timestamp: Duration) -> Gesture {
        if self.pointer.take().is_some() {
            Gesture::End {
                source: SourceKind::Drag,
                timestamp,
            }
        } else {
            Gesture::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn wheel(dx: f64, dy: f64, shift: bool) -> RawInput {
        RawInput::Wheel {
            delta_x: dx,
            delta_y: dy,
            shift,
            timestamp: ms(0),
        }
    }

    #[test]
    fn test_parse_script_orders_and_skips_comments() {
        let content = r#"
# wheel burst
{"type":"wheel","delta_x":0.0,"delta_y":40.0,"timestamp":{"secs":0,"nanos":32000000}}
{"type":"key","key":"up","timestamp":{"secs":0,"nanos":16000000}}
"#;
        let script = parse_script(content).unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script[0].timestamp(), ms(16));
        assert!(matches!(script[1], RawInput::Wheel { shift: false, .. }));
    }

    #[test]
    fn test_parse_script_reports_line() {
        let content = "{\"type\":\"pointer_leave\",\"timestamp\":{\"secs\":0,\"nanos\":0}}\n\n{\"type\":\"wobble\"}\n";
        match parse_script(content) {
            Err(Error::InvalidInput { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_wheel_classification() {
        let mut n = InputNormalizer::new();
        match n.normalize(wheel(10.0, 49.0, false), 1.0) {
            Gesture::Move(s) => assert_eq!(s.source, SourceKind::Trackpad),
            other => panic!("unexpected {:?}", other),
        }
        match n.normalize(wheel(0.0, 120.0, false), 1.0) {
            Gesture::Move(s) => assert_eq!(s.source, SourceKind::Wheel),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_wheel_sensitivity_and_shift() {
        let mut n = InputNormalizer::new();
        match n.normalize(wheel(10.0, 0.0, false), 1.2) {
            Gesture::Move(s) => assert!((s.delta.x - 12.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
        match n.normalize(wheel(5.0, 20.0, true), 1.0) {
            Gesture::Move(s) => assert_eq!(s.delta, Vector2::new(25.0, 0.0)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_wheel_rejected() {
        let mut n = InputNormalizer::new();
        assert_eq!(n.normalize(wheel(f64::NAN, 0.0, false), 1.0), Gesture::Ignored);
        assert_eq!(n.normalize(wheel(0.0, f64::INFINITY, false), 1.0), Gesture::Ignored);
    }

    #[test]
    fn test_drag_sequence() {
        let mut n = InputNormalizer::new();
        let down = RawInput::PointerDown {
            x: 10.0,
            y: 10.0,
            button: PointerButton::Primary,
            timestamp: ms(0),
        };
        assert!(matches!(n.normalize(down, 1.0), Gesture::Begin { source: SourceKind::Drag, .. }));
        assert!(n.is_dragging());

        let mv = RawInput::PointerMove {
            x: 15.0,
            y: 7.0,
            timestamp: ms(16),
        };
        match n.normalize(mv, 1.0) {
            Gesture::Move(s) => assert_eq!(s.delta, Vector2::new(5.0, -3.0)),
            other => panic!("unexpected {:?}", other),
        }

        let up = RawInput::PointerUp {
            button: PointerButton::Primary,
            timestamp: ms(32),
        };
        assert!(matches!(n.normalize(up, 1.0), Gesture::End { .. }));
        assert!(!n.is_dragging());
        assert_eq!(n.normalize(up, 1.0), Gesture::Ignored);
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut n = InputNormalizer::new();
        let down = RawInput::PointerDown {
            x: 0.0,
            y: 0.0,
            button: PointerButton::Secondary,
            timestamp: ms(0),
        };
        assert_eq!(n.normalize(down, 1.0), Gesture::Ignored);
        let mv = RawInput::PointerMove {
            x: 5.0,
            y: 5.0,
            timestamp: ms(5),
        };
        assert_eq!(n.normalize(mv, 1.0), Gesture::Ignored);
    }

    #[test]
    fn test_multi_touch_resets_tracked_point() {
        let mut n = InputNormalizer::new();
        let start = RawInput::TouchStart {
            touches: 1,
            x: 0.0,
            y: 0.0,
            timestamp: ms(0),
        };
        assert!(matches!(n.normalize(start, 1.0), Gesture::Begin { .. }));

        let pinch = RawInput::TouchMove {
            touches: 2,
            x: 50.0,
            y: 50.0,
            timestamp: ms(10),
        };
        assert_eq!(n.normalize(pinch, 1.0), Gesture::Ignored);

        // First single-touch move after the pinch only re-primes the point.
        let resume = RawInput::TouchMove {
            touches: 1,
            x: 100.0,
            y: 100.0,
            timestamp: ms(20),
        };
        assert_eq!(n.normalize(resume, 1.0), Gesture::Ignored);

        let next = RawInput::TouchMove {
            touches: 1,
            x: 90.0,
            y: 104.0,
            timestamp: ms(30),
        };
        match n.normalize(next, 1.0) {
            Gesture::Move(s) => assert_eq!(s.delta, Vector2::new(-10.0, 4.0)),
            other => panic!("unexpected {:?}", other),
        }

        let end = RawInput::TouchEnd {
            remaining: 0,
            timestamp: ms(40),
        };
        assert!(matches!(n.normalize(end, 1.0), Gesture::End { source: SourceKind::Touch, .. }));
    }
}
