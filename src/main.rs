//! `foley-pitch`: estimate the musical note of short foley clips.

mod hint;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use foley_pitch_core::{Analysis, AnalysisConfig, AudioSource, PitchEstimator};
use tracing_subscriber::filter::LevelFilter;

use crate::hint::GenerationHint;

#[derive(Parser, Debug)]
#[command(name = "foley-pitch", version, about = "Estimate the pitch of short foley clips")]
struct Cli {
    /// Audio files or http(s) URLs
    #[arg(required = true)]
    locators: Vec<String>,

    /// JSON file overriding analysis settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// One JSON object per clip instead of text
    #[arg(long)]
    json: bool,

    /// Keep the folded octave instead of preferring the lower one
    #[arg(long)]
    no_low_bias: bool,

    /// Also emit the generation hint for this mood
    #[arg(long, value_name = "MOOD")]
    mood: Option<String>,

    /// Seconds of music the generation hint asks for (1-30)
    #[arg(long, value_name = "SECS", default_value_t = hint::DEFAULT_CLIP_SECS, requires = "mood")]
    duration: u32,

    /// List per-frame estimates
    #[arg(long)]
    frames: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn generation_hint(&self, locator: &str, analysis: &Analysis) -> Option<GenerationHint> {
        self.mood
            .as_deref()
            .map(|mood| GenerationHint::new(mood, &analysis.note, locator).with_duration(self.duration))
    }

    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::WARN;
        }
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

fn load_config(path: Option<&Path>, no_low_bias: bool) -> anyhow::Result<AnalysisConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    if no_low_bias {
        config.prefer_lower_octave = false;
    }
    Ok(config)
}

async fn run_one(
    estimator: Arc<PitchEstimator>,
    client: reqwest::Client,
    locator: String,
) -> foley_pitch_core::Result<Analysis> {
    let source = AudioSource::parse(&locator);
    let bytes = source.load(&client).await?;
    match tokio::task::spawn_blocking(move || estimator.analyze_bytes(&bytes)).await {
        Ok(result) => result,
        Err(e) => Err(foley_pitch_core::Error::Decode(format!("analysis task failed: {e}"))),
    }
}

fn print_analysis(cli: &Cli, locator: &str, analysis: &Analysis) -> anyhow::Result<()> {
    let hint = cli.generation_hint(locator, analysis);
    if cli.json {
        println!("{}", report::json_line(locator, &analysis.note, hint)?);
        return Ok(());
    }
    println!("{}", report::describe(locator, &analysis.note));
    if cli.frames {
        for line in report::describe_frames(analysis) {
            println!("{}", line);
        }
    }
    if let Some(hint) = hint {
        println!("{}", serde_json::to_string_pretty(&hint)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref(), cli.no_low_bias)?;
    let estimator = Arc::new(PitchEstimator::new(config)?);
    let client = reqwest::Client::new();

    let tasks: Vec<_> = cli
        .locators
        .iter()
        .map(|locator| {
            let locator = locator.clone();
            tokio::spawn(run_one(estimator.clone(), client.clone(), locator))
        })
        .collect();

    let mut failed = 0usize;
    for (locator, task) in cli.locators.iter().zip(tasks) {
        let result = task
            .await
            .with_context(|| format!("task for {} panicked", locator))?;
        match result {
            Ok(analysis) => print_analysis(&cli, locator, &analysis)?,
            Err(e) => {
                failed += 1;
                log::error!("{}: {}", locator, e);
                if cli.json {
                    println!("{}", report::json_error_line(locator, &e.to_string()));
                } else {
                    println!("{}: could not load audio, try again", locator);
                }
            }
        }
    }

    if failed > 0 {
        log::warn!("{} of {} clips failed", failed, cli.locators.len());
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
