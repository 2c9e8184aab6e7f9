//! # Squash - command-line front end
//!
//! Turns each input file into a conversion task, enqueues all of them as one
//! batch, routes unit messages until every task has finished, then writes the
//! completed results and reports failures.
//!
//! ```bash
//! squash photos/*.png --to webp --preset 50 --intensity 8 --out converted
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use squash_core::resize::ResizePreset;
use squash_core::{
    format_file_size, CodecRegistry, FormatTag, QueueManager, SquashConfig, TaskId, TaskSpec,
    TaskStatus, WorkerPool,
};

/// How long to wait for unit messages before checking state again.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Parser)]
#[command(name = "squash")]
#[command(about = "Convert images between formats on a pool of worker threads")]
struct Args {
    /// Images to convert
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Target format (avif, jpeg, jxl, png, webp)
    #[arg(short, long, default_value = "webp")]
    to: FormatTag,

    /// Quality (1-100); defaults to the configured quality for the target
    #[arg(short, long)]
    quality: Option<u8>,

    /// Resize to this width
    #[arg(long)]
    width: Option<u32>,

    /// Resize to this height
    #[arg(long)]
    height: Option<u32>,

    /// Resize preset: 100, 50, 33, 20 or 10 (percent of 6960x4640)
    #[arg(long)]
    preset: Option<String>,

    /// Do not keep the original aspect ratio when resizing
    #[arg(long)]
    no_aspect: bool,

    /// Processing intensity (1-12); 3 and above uses several workers
    #[arg(short, long)]
    intensity: Option<u8>,

    /// Hardware concurrency hint; detected when omitted
    #[arg(long)]
    workers: Option<usize>,

    /// Output directory
    #[arg(short, long, default_value = "squashed")]
    out: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(&args)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {}", args.out.display()))?;

    let mut pool = WorkerPool::new(config.pool, Arc::new(CodecRegistry::new()));
    let report = pool.configure(config.intensity, args.workers);
    for failure in &report.failures {
        warn!("{}", failure);
    }
    if report.spawned < report.requested {
        warn!(
            "Running with {} of {} workers",
            report.spawned, report.requested
        );
    }

    let mut queue = QueueManager::new(pool);
    let quality = args
        .quality
        .unwrap_or_else(|| config.quality.for_format(args.to));
    if quality_ignored(&args) {
        warn!("--quality has no effect on lossless {} output", args.to);
    }

    let mut ids = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let spec = task_spec(path, args.to, quality, &config)?;
        ids.push(queue.add_task(spec));
    }

    info!(
        "Converting {} file(s) to {} on {} worker(s)",
        ids.len(),
        args.to,
        queue.pool().size()
    );
    queue.enqueue_batch(ids.iter().copied());

    while !queue.is_settled() {
        queue.wait_for_messages(POLL_INTERVAL);
        debug!(
            processing = queue.board().processing(),
            complete = queue.board().count(TaskStatus::Complete),
            "waiting"
        );
    }

    let failed = write_results(&mut queue, &ids, &args.out)?;
    if failed > 0 {
        bail!("{} of {} conversion(s) failed", failed, ids.len());
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<SquashConfig> {
    let mut config = match &args.config {
        Some(path) => SquashConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SquashConfig::default(),
    };

    if let Some(intensity) = args.intensity {
        config.intensity = intensity;
    }

    let resize = &mut config.resize;
    if let Some(label) = &args.preset {
        let preset = ResizePreset::from_percent(label)
            .with_context(|| format!("Unknown resize preset: {}", label))?;
        *resize = resize.with_preset(preset);
        resize.enabled = true;
    }
    if let Some(width) = args.width {
        resize.width = width;
        resize.enabled = true;
    }
    if let Some(height) = args.height {
        resize.height = height;
        resize.enabled = true;
    }
    // A single explicit side leaves the other one to the aspect ratio
    if args.width.is_some() != args.height.is_some() && args.preset.is_none() {
        if args.width.is_none() {
            resize.width = 0;
        } else {
            resize.height = 0;
        }
    }
    if args.no_aspect {
        resize.maintain_aspect_ratio = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Whether an explicit `--quality` is meaningless for the target format.
fn quality_ignored(args: &Args) -> bool {
    args.quality.is_some() && args.to.is_lossless()
}

fn task_spec(path: &Path, to: FormatTag, quality: u8, config: &SquashConfig) -> Result<TaskSpec> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    // Unknown formats still become tasks; the pipeline fails them
    let source_format = FormatTag::from_file_name(&name)
        .map(|tag| tag.as_str().to_string())
        .or_else(|| {
            path.extension()
                .map(|ext| ext.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    let source =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(TaskSpec {
        name,
        source,
        source_format,
        target_format: to.as_str().to_string(),
        quality,
        resize: config.resize,
    })
}

/// Write completed results to `out`. Returns the number of failed tasks.
fn write_results(queue: &mut QueueManager, ids: &[TaskId], out: &Path) -> Result<usize> {
    let mut failed = 0;

    for &id in ids {
        let Some(task) = queue.task_mut(id) else {
            continue;
        };

        match task.status {
            TaskStatus::Complete => {
                let ratio = task.compression_ratio().unwrap_or(1.0);
                let format = task.result_format.unwrap_or(FormatTag::Webp);
                let bytes = task.take_result()?.into_inner();

                let stem = Path::new(&task.name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| id.to_string());
                let target = out.join(format!("{}.{}", stem, format.extension()));
                std::fs::write(&target, &bytes)
                    .with_context(|| format!("Failed to write {}", target.display()))?;

                println!(
                    "{}: {} -> {} ({:.0}%) in {}s",
                    task.name,
                    format_file_size(task.original_size as u64),
                    format_file_size(bytes.len() as u64),
                    ratio * 100.0,
                    task.elapsed_secs()
                );
            }
            TaskStatus::Failed => {
                failed += 1;
                eprintln!(
                    "{}: failed: {}",
                    task.name,
                    task.error.as_deref().unwrap_or("unknown error")
                );
            }
            TaskStatus::Pending | TaskStatus::Processing => {
                failed += 1;
                eprintln!("{}: did not finish", task.name);
            }
        }
    }

    Ok(failed)
}
