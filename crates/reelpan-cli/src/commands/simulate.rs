use std::collections::VecDeque;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use tracing::info;

use reelpan_core::{
    parse_script, AppConfig, BoundaryPolicy, DeviceClass, FrameQueue, GalleryController, Phase,
    PointerButton, RawInput, ScrollState, Timeline, Viewport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputKind {
    Wheel,
    Drag,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Elastic,
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfileArg {
    Desktop,
    Mobile,
}

impl From<ProfileArg> for DeviceClass {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Desktop => DeviceClass::Desktop,
            ProfileArg::Mobile => DeviceClass::Mobile,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub input: InputKind,
    pub events: u32,
    pub interval_ms: u64,
    pub dx: f64,
    pub dy: f64,
    pub policy: Option<PolicyArg>,
    pub profile: Option<ProfileArg>,
    pub frame_ms: u64,
    pub max_frames: u32,
    pub script: Option<PathBuf>,
}

/// One line of the frame trace
#[derive(Debug, Serialize)]
struct FrameTrace {
    frame: u32,
    t_ms: f64,
    phase: Phase,
    #[serde(flatten)]
    state: ScrollState,
}

pub fn run(config: &AppConfig, options: &SimulateOptions) -> Result<()> {
    let script = match &options.script {
        Some(path) => load_script(path)?,
        None => generate_script(options),
    };

    let mut settings = config.controller_settings();
    match options.policy {
        Some(PolicyArg::Clamp) => settings.policy = BoundaryPolicy::HardClamp,
        Some(PolicyArg::Elastic) if !matches!(settings.policy, BoundaryPolicy::Elastic { .. }) => {
            settings.policy = BoundaryPolicy::default();
        }
        _ => {}
    }

    let mut controller = GalleryController::mount(
        settings,
        Viewport::default(),
        FrameQueue::new(),
        Timeline::new(),
    )?;
    if let Some(profile) = options.profile {
        controller.override_device(Some(profile.into()));
    }

    info!(
        events = script.len(),
        device = %controller.device_class(),
        policy = controller.settings().policy.label(),
        "Simulation started"
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let frames = simulate(&mut controller, script, options, |trace| {
        serde_json::to_writer(&mut out, trace)?;
        out.write_all(b"\n")?;
        Ok(())
    })?;
    out.flush()?;

    let state = controller.state();
    info!(
        frames,
        x = state.displayed.x,
        y = state.displayed.y,
        settled = !controller.is_animating(),
        "Simulation finished"
    );
    controller.unmount();
    Ok(())
}

/// Step the controller on a fixed frame clock, feeding scripted input as its time comes.
/// Returns the number of frames emitted.
fn simulate<F>(
    controller: &mut GalleryController,
    script: Vec<RawInput>,
    options: &SimulateOptions,
    mut emit: F,
) -> Result<u32>
where
    F: FnMut(&FrameTrace) -> Result<()>,
{
    let mut pending: VecDeque<RawInput> = script.into();
    let frame = Duration::from_millis(options.frame_ms.max(1));
    let mut now = Duration::ZERO;
    let mut emitted = 0;

    while emitted < options.max_frames {
        now += frame;
        while pending.front().is_some_and(|input| input.timestamp() <= now) {
            if let Some(input) = pending.pop_front() {
                controller.handle_input(input);
            }
        }

        if controller.pump(now) {
            emitted += 1;
            emit(&FrameTrace {
                frame: emitted,
                t_ms: now.as_secs_f64() * 1000.0,
                phase: controller.phase(),
                state: *controller.state(),
            })?;
        }

        let settled = !controller.is_animating() && controller.next_deadline().is_none();
        if pending.is_empty() && settled {
            break;
        }
    }
    Ok(emitted)
}

fn generate_script(options: &SimulateOptions) -> Vec<RawInput> {
    let at = |i: u64| Duration::from_millis(i * options.interval_ms);
    let n = options.events as u64;
    let mut script = Vec::with_capacity(options.events as usize + 2);

    match options.input {
        InputKind::Wheel => {
            for i in 0..n {
                script.push(RawInput::Wheel {
                    delta_x: options.dx,
                    delta_y: options.dy,
                    shift: false,
                    timestamp: at(i),
                });
            }
        }
        InputKind::Drag => {
            script.push(RawInput::PointerDown {
                x: 0.0,
                y: 0.0,
                button: PointerButton::Primary,
                timestamp: at(0),
            });
            for i in 1..=n {
                script.push(RawInput::PointerMove {
                    x: options.dx * i as f64,
                    y: options.dy * i as f64,
                    timestamp: at(i),
                });
            }
            script.push(RawInput::PointerUp {
                button: PointerButton::Primary,
                timestamp: at(n),
            });
        }
        InputKind::Touch => {
            script.push(RawInput::TouchStart {
                touches: 1,
                x: 0.0,
                y: 0.0,
                timestamp: at(0),
            });
            for i in 1..=n {
                script.push(RawInput::TouchMove {
                    touches: 1,
                    x: options.dx * i as f64,
                    y: options.dy * i as f64,
                    timestamp: at(i),
                });
            }
            script.push(RawInput::TouchEnd {
                remaining: 0,
                timestamp: at(n),
            });
        }
    }
    script
}

fn load_script(path: &Path) -> Result<Vec<RawInput>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let script = parse_script(&content).with_context(|| format!("Invalid script {}", path.display()))?;
    Ok(script)
}
