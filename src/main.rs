use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::path::Path;
use talkify::app::{ReplayOptions, StabilizerOverrides, run_replay};
use talkify::classify::LabelSet;
use talkify::cli::{Cli, Commands, ConfigAction, Mode};
use talkify::config::Config;
use talkify::output::render_transcript;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so per-frame output on stdout stays pipeable.
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
    tracing::debug!(version = %talkify::version_string(), "talkify starting");

    match cli.command {
        Commands::Replay {
            trace,
            mode,
            cooldown,
            window,
            consensus,
            threshold,
            policy,
            json,
            realtime,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let options = ReplayOptions {
                trace,
                part: mode.body_part(),
                overrides: StabilizerOverrides {
                    cooldown,
                    window,
                    consensus,
                    threshold,
                    policy,
                },
                json,
                quiet: cli.quiet,
                realtime,
            };
            let transcript = run_replay(config, &options)
                .with_context(|| format!("replay of {} failed", options.trace.display()))?;
            if !json {
                println!("{}", render_transcript(transcript.as_deref()));
            }
        }
        Commands::Labels { mode } => {
            print_labels(mode);
        }
        Commands::Config { action } => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "talkify", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/talkify/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&Config::default_path())?,
    };
    Ok(config.with_env_overrides())
}

fn print_labels(mode: Mode) {
    let labels = match mode {
        Mode::Sign => LabelSet::sign(),
        Mode::Lip => LabelSet::lip(),
    };
    println!("{} labels ({}):", format!("{mode:?}").bold(), labels.len());
    for (index, symbol) in labels.iter() {
        if labels.is_space(index) {
            println!("  {index:>2}  {symbol}  {}", "(space)".dimmed());
        } else {
            println!("  {index:>2}  {symbol}");
        }
    }
}

/// Handle configuration commands.
fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            if let Err(e) = config.validate() {
                eprintln!("{} {e}", "warning:".yellow());
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(Path::to_path_buf)
                .unwrap_or_else(Config::default_path);
            let marker = if path.exists() {
                "exists".green().to_string()
            } else {
                "not created, using defaults".dimmed().to_string()
            };
            println!("{} ({marker})", path.display());
        }
    }
    Ok(())
}
