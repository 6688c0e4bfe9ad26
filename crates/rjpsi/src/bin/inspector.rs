//! Inspect generator-level particle listings and write the flat R(J/psi) table.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rjpsi::{
    data::{read_parquet_events, select_job_files, EventReadOptions},
    output::DEFAULT_TREE_NAME,
    FloatPrecision, Inspector, InspectorConfig, OutputFormat, RowWriter, RowWriterOptions,
};
use tracing::info;

const DEFAULT_OUTPUT_NAME: &str = "RJpsi_HbToJPsiMuMu_3MuFilter_br.parquet";

#[derive(Parser)]
#[command(name = "rjpsi-inspect")]
#[command(about = "Build the flat R(J/psi) table from generator-level particle listings")]
#[command(version)]
struct Cli {
    /// Input Parquet particle listings
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Maximum number of events to process (negative for all)
    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    maxevents: i64,

    /// Print the genealogy of every candidate
    #[arg(short, long)]
    verbose: bool,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Output directory
    #[arg(long, default_value = ".")]
    destination: PathBuf,

    /// Output file name; the extension selects the format
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    output_name: String,

    /// Output format (parquet or root), overriding the extension
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Name of the tree holding the table in ROOT output
    #[arg(long, default_value = DEFAULT_TREE_NAME)]
    tree: String,

    /// Precision of the output columns (f32 or f64)
    #[arg(long, default_value = "f64")]
    precision: FloatPrecision,

    /// Number of input files handled by each job (defaults to all of them)
    #[arg(long)]
    files_per_job: Option<usize>,

    /// Index of the job to run
    #[arg(long, default_value = "0")]
    jobid: usize,

    /// Identity code of the candidate
    #[arg(long, default_value = "443")]
    candidate_pdgid: i32,

    /// Identity code of the leptons
    #[arg(long, default_value = "13")]
    lepton_pdgid: i32,

    /// Mass in GeV of the constrained three-lepton system
    #[arg(long, default_value = "6.275")]
    constrained_mass: f64,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn build_progress_bar(max_events: Option<usize>, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    match max_events {
        Some(total) => {
            let bar = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} events ({per_sec}, ETA {eta})",
            ) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        }
        None => {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template(
                "[{elapsed_precise}] {spinner} {pos} events processed ({per_sec})",
            ) {
                spinner.set_style(style.tick_chars("/|\\- "));
            }
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        cli.log_level.max(tracing::Level::DEBUG)
    } else {
        cli.log_level
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let files_per_job = cli.files_per_job.unwrap_or(cli.inputs.len());
    let files = select_job_files(&cli.inputs, files_per_job, cli.jobid)
        .context("Failed to select the input files of this job")?;
    info!(
        job = cli.jobid,
        files_per_job,
        "processing {} of {} input files",
        files.len(),
        cli.inputs.len()
    );
    for file in &files {
        info!("input: {file}");
    }

    std::fs::create_dir_all(&cli.destination).with_context(|| {
        format!(
            "Failed to create output directory '{}'",
            cli.destination.display()
        )
    })?;
    let output_path = cli.destination.join(&cli.output_name);
    let output_path = output_path.to_string_lossy();

    let max_events = usize::try_from(cli.maxevents).ok();
    let config = InspectorConfig {
        candidate_pdg_id: cli.candidate_pdgid,
        lepton_pdg_id: cli.lepton_pdgid,
        constrained_mass: cli.constrained_mass,
        max_events,
        ..Default::default()
    };
    let inspector = Inspector::new(config);

    let events = read_parquet_events(&files, &EventReadOptions::new())
        .context("Failed to open the input files")?;
    let mut options = RowWriterOptions::new()
        .precision(cli.precision)
        .tree(cli.tree.as_str());
    if let Some(format) = cli.format {
        options = options.format(format);
    }
    let mut writer = RowWriter::create(&output_path, &options)
        .with_context(|| format!("Failed to create output table '{output_path}'"))?;

    let progress = build_progress_bar(max_events, cli.no_progress);
    let summary = inspector
        .run_with_progress(events, &mut writer, |n| progress.inc(n as u64))
        .context("Inspection failed")?;
    progress.finish_with_message(format!("processed {} events", summary.events));

    let n_rows = writer
        .close()
        .with_context(|| format!("Failed to write output table '{output_path}'"))?;
    info!("{summary}");
    info!("wrote {n_rows} rows to {output_path}");
    Ok(())
}
