use clap::Parser;
use locate_image::io::load_rgba_image;
use locate_image::{CancelToken, LocateConfig, LocateError, Locator, Match, Selection};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Locate a sample image inside a canvas (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SelectionConfig {
    #[default]
    All,
    First,
    Best,
    Only,
}

impl SelectionConfig {
    /// `None` means every match is reported.
    fn selection(self) -> Option<Selection> {
        match self {
            SelectionConfig::All => None,
            SelectionConfig::First => Some(Selection::FirstEncountered),
            SelectionConfig::Best => Some(Selection::BestOverall),
            SelectionConfig::Only => Some(Selection::BestOverallUnique),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    canvas_path: String,
    sample_path: String,
    output_path: Option<String>,
    tolerance: f64,
    selection: SelectionConfig,
    parallel: bool,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    similarity: f64,
}

impl From<Match> for MatchRecord {
    fn from(value: Match) -> Self {
        Self {
            x: value.rect.x,
            y: value.rect.y,
            width: value.rect.width,
            height: value.rect.height,
            similarity: value.similarity,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    best: Option<MatchRecord>,
    matches: Vec<MatchRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Output {
    fn found(matches: Vec<Match>) -> Self {
        Self {
            best: matches.first().copied().map(MatchRecord::from),
            matches: matches.into_iter().map(MatchRecord::from).collect(),
            error: None,
        }
    }

    /// Keeps whatever result travels with a search error; other errors abort.
    fn from_error(err: LocateError) -> Result<Self, LocateError> {
        match err {
            LocateError::NotFound
            | LocateError::MultipleFound { .. }
            | LocateError::Cancelled { .. } => {
                let mut output = Self::found(err.partial_matches().to_vec());
                output.error = Some(err.to_string());
                Ok(output)
            }
            other => Err(other),
        }
    }
}

/// Fires `cancel` after `timeout` on a detached timer thread.
fn arm_timeout(cancel: &CancelToken, timeout: Duration) {
    let cancel = cancel.clone();
    thread::spawn(move || {
        thread::sleep(timeout);
        tracing::info!(timeout_ms = timeout.as_millis() as u64, "search timed out");
        cancel.cancel();
    });
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive("locate_image=info".parse()?)
                    .add_directive("locate_image_cli=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(ExitCode::SUCCESS);
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(ExitCode::SUCCESS);
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.canvas_path.is_empty() || config.sample_path.is_empty() {
        return Err("canvas_path and sample_path must be set in the config".into());
    }
    let locate_cfg = LocateConfig {
        tolerance: config.tolerance,
        parallel: config.parallel,
    };
    locate_cfg.validate()?;

    let canvas = load_rgba_image(&config.canvas_path)?;
    let sample = load_rgba_image(&config.sample_path)?;
    tracing::info!(
        canvas_width = canvas.width(),
        canvas_height = canvas.height(),
        sample_width = sample.width(),
        sample_height = sample.height(),
        "images loaded"
    );

    let cancel = CancelToken::new();
    if let Some(ms) = config.timeout_ms {
        arm_timeout(&cancel, Duration::from_millis(ms));
    }

    let locator = Locator::new(sample.view()).with_config(locate_cfg);
    let result = match config.selection.selection() {
        None => locator.find_all(canvas.view(), &cancel),
        Some(selection) => locator
            .find_one(canvas.view(), selection, &cancel)
            .map(|m| vec![m]),
    };
    let output = match result {
        Ok(matches) => Output::found(matches),
        Err(err) => Output::from_error(err)?,
    };
    let status = if output.error.is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(status)
}
