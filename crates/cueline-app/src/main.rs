//! Cueline - subtitle track tool
//!
//! Loads a subtitle file into a subtitle track, optionally shifts and cuts
//! it, and writes the track back as SRT or ASS depending on the output
//! suffix.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cueline_core::SubtitleSettings;
use cueline_timeline::{SubtitleModel, UndoStack};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "cueline")]
#[command(version)]
#[command(about = "Shift, cut and convert SRT/ASS subtitle tracks")]
struct Cli {
    /// Subtitle file to read (.srt, .ass or .ssa)
    #[arg(value_name = "INPUT_PATH")]
    input: PathBuf,

    /// File to write; `.ass`/`.ssa` writes ASS, anything else SRT
    #[arg(value_name = "OUTPUT_PATH")]
    output: PathBuf,

    /// Shift every cue by this many frames (may be negative)
    #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
    offset: i64,

    /// Split the cue covering each of these frames
    #[arg(short, long, value_delimiter = ',')]
    cut: Vec<i64>,

    /// Settings file (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Print the structured JSON form instead of writing the output file
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => SubtitleSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => SubtitleSettings::default(),
    };

    let mut model = SubtitleModel::new(&settings);
    let mut history = UndoStack::new(settings.undo_depth);

    let imported = model
        .import_file(&cli.input, cli.offset)
        .with_context(|| format!("importing {}", cli.input.display()))?;
    info!(imported, offset = cli.offset, "Loaded subtitles");

    for position in &cli.cut {
        match model.request_cut(*position, &mut history) {
            Ok(id) => info!(position, %id, "Cut subtitle"),
            Err(e) => warn!(position, error = %e, "Cut skipped"),
        }
    }

    let json = model.to_json()?;
    if cli.json {
        println!("{}", json);
        return Ok(());
    }

    let written = model
        .write_document(&json, Some(&cli.output))
        .with_context(|| format!("writing {}", cli.output.display()))?;
    info!(written, path = %cli.output.display(), "Subtitle track saved");
    Ok(())
}
