use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use bsv_core::SampleId;
use bsv_dash::{CacheStats, Renderer, Scene, SceneRenderer, SessionStats};
use bsv_table::{SelectedRows, load_chains, load_paramnames};

mod error;
mod session;
mod waveform;

use error::{AppError, AppResult};

#[derive(Parser)]
#[command(name = "bsv-cli")]
#[command(about = "bsavi CLI - selection-driven views over sampling chains", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the columns, row count and labels of a set of chains
    Inspect {
        /// Path to the .paramnames file
        #[arg(long)]
        paramnames: PathBuf,
        /// Chain files or glob patterns, stacked in the given order
        #[arg(required = true)]
        chains: Vec<PathBuf>,
        /// Drop the weight and -LogLkl columns
        #[arg(long)]
        params_only: bool,
        /// Print min/max/mean of every column
        #[arg(long)]
        with_stats: bool,
    },
    /// Build a dashboard from a session file and replay its selections
    Replay {
        /// Path to the session YAML file
        session_path: PathBuf,
        /// Output JSON file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that a session file builds a dashboard
    Validate {
        /// Path to the session YAML file
        session_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            paramnames,
            chains,
            params_only,
            with_stats,
        } => cmd_inspect(&paramnames, &chains, params_only, with_stats),
        Commands::Replay {
            session_path,
            output,
        } => cmd_replay(&session_path, output.as_deref()),
        Commands::Validate { session_path } => cmd_validate(&session_path),
    }
}

fn cmd_inspect(
    paramnames: &Path,
    chains: &[PathBuf],
    params_only: bool,
    with_stats: bool,
) -> AppResult<()> {
    let params = load_paramnames(paramnames)?;
    let table = load_chains(chains, &params.names, params_only)?;

    println!("Columns ({}):", table.columns().len());
    for column in table.columns() {
        println!("  {}", column);
    }
    println!("Rows: {}", table.len());

    println!("Labels:");
    for name in &params.names {
        println!("  {} -> {}", name, params.labels.resolve(name));
    }

    if with_stats {
        println!("\nColumn statistics:");
        for summary in table.summarize() {
            println!(
                "  {:<16} min={:<12.6} max={:<12.6} mean={:.6}",
                summary.name, summary.min, summary.max, summary.mean
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ReplayEvent {
    selection: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scene: Option<Scene>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_points: Option<SelectedRows>,
}

#[derive(Serialize)]
struct ReplayReport {
    events: Vec<ReplayEvent>,
    cache: CacheStats,
    session: SessionStats,
}

fn cmd_replay(session_path: &Path, output: Option<&Path>) -> AppResult<()> {
    let session::Session {
        table,
        mut assembler,
        selections,
    } = session::load_session(session_path)?;

    let mut renderer = SceneRenderer::default();
    let mut events = Vec::with_capacity(selections.len());
    for selection in &selections {
        let indices: Vec<usize> = selection.iter().map(SampleId::as_usize).collect();
        let (scene, error) = match assembler.on_selection(selection) {
            Ok(layout) => (Some(renderer.render(&layout)), None),
            Err(err) => {
                tracing::warn!(error = %err, "selection event failed");
                (None, Some(err.to_string()))
            }
        };
        let selected_points = match &table {
            Some(table) if !selection.is_empty() && error.is_none() => {
                Some(table.select(selection, &[])?)
            }
            _ => None,
        };
        events.push(ReplayEvent {
            selection: indices,
            scene,
            error,
            selected_points,
        });
    }

    let report = ReplayReport {
        events,
        cache: assembler.cache().stats(),
        session: assembler.stats(),
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = output {
        std::fs::write(path, json).map_err(|source| AppError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        println!(
            "✓ Replayed {} selections to {}",
            report.events.len(),
            path.display()
        );
        println!(
            "  Cached samples: {} ({} series entries)",
            report.cache.samples, report.cache.entries
        );
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn cmd_validate(session_path: &Path) -> AppResult<()> {
    println!("Validating session: {}", session_path.display());
    let session = session::load_session(session_path)?;

    for observable in session.assembler.observables() {
        println!("  {}", observable.describe().replace('\n', "\n  "));
    }
    println!("  Samples: {}", session.assembler.sample_count());
    println!("  Selections: {}", session.selections.len());
    println!("✓ Session is valid");
    Ok(())
}
