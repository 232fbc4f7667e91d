use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reelpan_core::AppConfig;

mod commands;

use commands::simulate::{InputKind, PolicyArg, ProfileArg, SimulateOptions};

#[derive(Parser)]
#[command(name = "reelpan")]
#[command(author, version, about = "Inertial gallery viewer for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read configuration from this file instead of ~/.config/reelpan/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gallery TUI
    Run,
    /// Drive the controller headlessly and print one JSON object per frame
    Simulate {
        /// Kind of scripted input
        #[arg(long, value_enum, default_value_t = InputKind::Wheel)]
        input: InputKind,
        /// Number of input events
        #[arg(short = 'n', long, default_value_t = 30)]
        events: u32,
        /// Milliseconds between input events
        #[arg(long, default_value_t = 16)]
        interval_ms: u64,
        /// Horizontal delta per event
        #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
        dx: f64,
        /// Vertical delta per event
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        dy: f64,
        /// Boundary policy override
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,
        /// Tuning profile override
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,
        /// Display refresh interval in milliseconds
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
        /// Stop after this many frames even if still animating
        #[arg(long, default_value_t = 5000)]
        max_frames: u32,
        /// JSON-lines file of raw input events, replaces the generated script
        #[arg(long)]
        script: Option<PathBuf>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("Failed to load config")?,
    };

    let tui = matches!(cli.command, Some(Commands::Run) | None);
    init_logging(&config, tui)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Simulate {
            input,
            events,
            interval_ms,
            dx,
            dy,
            policy,
            profile,
            frame_ms,
            max_frames,
            script,
        }) => {
            let options = SimulateOptions {
                input,
                events,
                interval_ms,
                dx,
                dy,
                policy,
                profile,
                frame_ms,
                max_frames,
                script,
            };
            commands::simulate::run(&config, &options)
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => commands::config::init(force),
            ConfigAction::Path => commands::config::path(),
        },
    }
}

/// Logs go to stderr, or to a file while the TUI owns the terminal
fn init_logging(config: &AppConfig, tui: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if tui {
        let path = log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reelpan")
        .join("reelpan.log")
}
