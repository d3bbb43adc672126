//! PSII threshold segmentation: bins every `.tif` frame of each input
//! directory into five fixed intensity bands and writes one
//! `{IDENTIFIER}_segmentation.csv` table per directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use psii_core::batch::{process_all, write_table, DirectoryReport};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "psii_segmentation", about = "PS2 image segmentation")]
struct Args {
    /// Directories containing TIF images
    #[arg(required = true, value_name = "DIRS")]
    dirs: Vec<PathBuf>,

    /// Output directory (created if absent)
    #[arg(short, long, default_value = "psii_segmentation_out")]
    outdir: PathBuf,

    /// Keep processing remaining directories after one fails
    #[arg(long)]
    keep_going: bool,

    /// Worker threads for per-image classification (default: all cores)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Also write a JSON run manifest to this path
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ── Run manifest ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Manifest {
    outdir: PathBuf,
    directories: Vec<ManifestEntry>,
    elapsed_ms: u128,
}

#[derive(Serialize)]
struct ManifestEntry {
    input: PathBuf,
    output: Option<PathBuf>,
    error: Option<String>,
    images: usize,
    rows: usize,
    elapsed_ms: u128,
}

impl ManifestEntry {
    fn completed(report: &DirectoryReport) -> Self {
        Self {
            input: report.input.clone(),
            output: Some(report.output.clone()),
            error: None,
            images: report.images,
            rows: report.rows,
            elapsed_ms: report.elapsed.as_millis(),
        }
    }

    fn failed(input: &Path, err: &psii_core::SegmentationError) -> Self {
        Self {
            input: input.to_path_buf(),
            output: None,
            error: Some(err.to_string()),
            images: 0,
            rows: 0,
            elapsed_ms: 0,
        }
    }
}

fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(path, json).with_context(|| format!("Cannot write manifest {}", path.display()))
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let start = Instant::now();

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Cannot configure worker pool")?;
    }

    fs::create_dir_all(&args.outdir)
        .with_context(|| format!("Cannot create output directory {}", args.outdir.display()))?;

    let mut entries = Vec::with_capacity(args.dirs.len());
    let mut failed = 0usize;
    let mut fatal = None;

    // process_all is lazy: each directory is processed when pulled, so the
    // timer restarted at the end of an iteration covers the next directory.
    let mut dir_start = Instant::now();
    for (dir, table) in process_all(&args.dirs) {
        let outcome = table.and_then(|t| write_table(&dir, &t, &args.outdir, dir_start));
        match outcome {
            Ok(report) => {
                info!("Created {}", report.output.display());
                info!("Processing time: {:?}", report.elapsed);
                entries.push(ManifestEntry::completed(&report));
            }
            Err(e) => {
                entries.push(ManifestEntry::failed(&dir, &e));
                failed += 1;
                if !args.keep_going {
                    fatal = Some(
                        anyhow::Error::new(e)
                            .context(format!("Segmentation failed for {}", dir.display())),
                    );
                    break;
                }
                error!("{}: {e}", dir.display());
            }
        }
        dir_start = Instant::now();
    }

    if let Some(path) = &args.manifest {
        let manifest = Manifest {
            outdir: args.outdir.clone(),
            directories: entries,
            elapsed_ms: start.elapsed().as_millis(),
        };
        write_manifest(path, &manifest)?;
    }

    if let Some(err) = fatal {
        return Err(err);
    }
    if failed > 0 {
        bail!("{failed} of {} directories failed", args.dirs.len());
    }

    info!("Done. Entire processing time: {:?}", start.elapsed());
    Ok(())
}
