use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use sandbox::config::{ConfigError, InputConfig, Settings};
use sandbox::templates;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

mod script;

use script::{Script, ScriptError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid script: {0}")]
    InvalidScript(serde_json::Error),
    #[error("invalid JSON output: {0}")]
    Render(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
}

#[derive(Parser, Debug)]
#[command(name = "sandbox-cli", about = "Headless physics sandbox driver")]
struct Cli {
    /// JSON settings file; defaults to $SANDBOX_SETTINGS, then built-in defaults.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scripted input session and print the resulting world.
    Replay {
        script: PathBuf,
        /// Print only the summary, not every entity.
        #[arg(long)]
        summary: bool,
    },
    /// List the template catalog.
    Templates,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Replay { script, summary } => {
            let settings = match &cli.settings {
                Some(path) => Settings::from_path(path)?,
                None => Settings::from_env()?,
            };
            run_replay(&script, settings, summary)
        }
        Command::Templates => run_templates(),
    }
}

fn run_replay(path: &Path, settings: Settings, summary: bool) -> Result<(), CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    let script: Script = serde_json::from_str(&raw).map_err(CliError::InvalidScript)?;
    tracing::info!(path = %path.display(), events = script.events.len(), "replaying");

    let report = script::replay(&script, settings, InputConfig::from_env())?;
    let mut value = serde_json::to_value(&report)?;
    if summary {
        if let Value::Object(map) = &mut value {
            map.remove("entities");
        }
    }
    print_json(&value)
}

fn run_templates() -> Result<(), CliError> {
    let list: Vec<Value> = templates::catalog()
        .iter()
        .enumerate()
        .map(|(id, t)| json!({ "id": id, "name": t.name, "tool": t.is_tool() }))
        .collect();
    print_json(&Value::Array(list))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
