//! Command-line interface for talkify
//!
//! Provides argument parsing using clap derive macros.

use crate::landmark::BodyPart;
use crate::stabilizer::EmissionPolicy;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Gesture-to-text for fingerspelling and lip reading
#[derive(Parser, Debug)]
#[command(
    name = "talkify",
    version,
    about = "Gesture-to-text for fingerspelling and lip reading"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress per-frame output, print only the transcript
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: emissions, -vv: every stabilizer decision)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Which recognizer to run.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Fingerspelling from hand landmarks
    #[default]
    Sign,
    /// Lip-word reading from face landmarks
    Lip,
}

impl Mode {
    pub fn body_part(self) -> BodyPart {
        match self {
            Mode::Sign => BodyPart::Hand,
            Mode::Lip => BodyPart::Face,
        }
    }
}

/// Parse a cooldown into a duration.
///
/// Bare numbers are milliseconds; anything else goes through `humantime`
/// (`500ms`, `1s`, `1s 200ms`).
fn parse_cooldown(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

fn parse_policy(s: &str) -> Result<EmissionPolicy, String> {
    match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "clear_on_emit" | "clear" => Ok(EmissionPolicy::ClearOnEmit),
        "hold_refresh" | "hold" => Ok(EmissionPolicy::HoldRefresh),
        other => Err(format!(
            "unknown policy '{other}' (expected clear-on-emit or hold-refresh)"
        )),
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded landmark trace and print what would be typed
    Replay {
        /// JSON-lines trace file, or - for stdin
        trace: PathBuf,

        /// Recognizer to run
        #[arg(long, value_enum, default_value_t = Mode::Sign)]
        mode: Mode,

        /// Cooldown before a different symbol may be emitted (e.g. 500ms, 1s)
        #[arg(long, value_name = "DURATION", value_parser = parse_cooldown)]
        cooldown: Option<Duration>,

        /// Vote window capacity
        #[arg(long, value_name = "N")]
        window: Option<usize>,

        /// Votes the leading label needs to be emitted
        #[arg(long, value_name = "N")]
        consensus: Option<usize>,

        /// Minimum confidence for a prediction to vote
        #[arg(long, value_name = "CONFIDENCE")]
        threshold: Option<f32>,

        /// Emission policy (clear-on-emit, hold-refresh)
        #[arg(long, value_name = "POLICY", value_parser = parse_policy)]
        policy: Option<EmissionPolicy>,

        /// Print one JSON object per frame
        #[arg(long)]
        json: bool,

        /// Use the wall clock instead of trace timestamps for cooldowns
        #[arg(long)]
        realtime: bool,
    },

    /// List the labels a recognizer can emit
    Labels {
        #[arg(long, value_enum, default_value_t = Mode::Sign)]
        mode: Mode,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}
