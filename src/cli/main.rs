//! segdemo CLI
//!
//! Runs the cutout and benchmark flows with the built-in mock segmenter.

use super::config::CliConfigBuilder;
use crate::{
    config::QualityPreset,
    device::DeviceInfo,
    services::{BenchmarkProgress, DirectorySink, ImageIOService, ImageSink, SaveKind},
    session::SegmentationSession,
    tracing_config::init_cli_tracing,
    types::{BenchmarkResult, BenchmarkSample, Image},
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Person segmentation demo: white-background cutouts and latency benchmarks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "segdemo")]
pub struct Cli {
    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a mask and a white-background cutout and save both
    Cutout(CutoutArgs),
    /// Measure per-frame segmentation latency
    Bench(BenchArgs),
    /// Print device information
    Device,
}

#[derive(Args, Debug)]
pub struct CutoutArgs {
    /// Input image (PNG, JPEG or TIFF)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Segmentation quality preset (fast, balanced, accurate)
    #[arg(short, long, default_value = "balanced")]
    pub quality: QualityPreset,

    /// Directory receiving the saved mask and cutout
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Filter used when the mask has to be resampled
    #[arg(long, value_enum, default_value_t = CliFilter::Bilinear)]
    pub filter: CliFilter,

    /// Blend pathway
    #[arg(long, value_enum, default_value_t = CliBlendPathway::Vectorized)]
    pub pathway: CliBlendPathway,

    /// Artificial latency of the mock segmenter in milliseconds
    #[arg(long, default_value_t = 0)]
    pub mock_latency_ms: u64,

    /// Only save the cutout
    #[arg(long)]
    pub no_save_mask: bool,
}

#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Input image (PNG, JPEG or TIFF)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Segmentation quality preset (fast, balanced, accurate)
    #[arg(short, long, default_value = "balanced", conflicts_with = "all_qualities")]
    pub quality: QualityPreset,

    /// Benchmark every quality preset in turn
    #[arg(long)]
    pub all_qualities: bool,

    /// Discarded warm-up calls [default: 3]
    #[arg(long)]
    pub warmup: Option<usize>,

    /// Timed calls [default: 10]
    #[arg(long)]
    pub samples: Option<usize>,

    /// Artificial latency of the mock segmenter in milliseconds
    #[arg(long, default_value_t = 30)]
    pub mock_latency_ms: u64,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// JSON file with `warmup_count`/`sample_count`; flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliFilter {
    Nearest,
    Bilinear,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliBlendPathway {
    Vectorized,
    Scanline,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose).context("Failed to initialize tracing")?;

    match cli.command {
        Command::Cutout(args) => run_cutout(&args).await,
        Command::Bench(args) => run_bench(&args).await,
        Command::Device => {
            println!("{}", DeviceInfo::current());
            Ok(())
        },
    }
}

async fn run_cutout(args: &CutoutArgs) -> Result<()> {
    let image = ImageIOService::load_image(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let segmenter = Arc::new(CliConfigBuilder::mock_segmenter(args.mock_latency_ms));
    let session = SegmentationSession::new(segmenter)
        .with_composite_config(CliConfigBuilder::composite_config(args));

    info!(
        input = %args.input.display(),
        quality = %args.quality,
        "Generating cutout"
    );
    let result = session
        .cutout(image, args.quality)
        .await
        .context("Cutout generation failed")?;

    let stats = result.mask.statistics();
    debug!(
        mask_width = result.mask.width(),
        mask_height = result.mask.height(),
        foreground_ratio = stats.foreground_ratio,
        "Mask statistics"
    );

    let sink = DirectorySink::new(&args.output_dir);
    if !args.no_save_mask {
        let mask_image = result.mask.to_display_image()?;
        save(&sink, &mask_image, SaveKind::Mask)?;
    }
    save(&sink, &result.cutout, SaveKind::Cutout)?;

    Ok(())
}

fn save(sink: &dyn ImageSink, image: &Image, kind: SaveKind) -> Result<()> {
    let path = sink.save(image, kind).context(kind.failure_message())?;
    println!("{}: {}", kind.success_message(), path.display());
    Ok(())
}

async fn run_bench(args: &BenchArgs) -> Result<()> {
    let config = CliConfigBuilder::benchmark_config(args)?;
    let image = ImageIOService::load_image(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let segmenter = Arc::new(CliConfigBuilder::mock_segmenter(args.mock_latency_ms));
    let mut session = SegmentationSession::new(segmenter).with_benchmark_config(config);
    if !args.json {
        session = session.with_progress(Arc::new(BarProgress::new()));
    }

    let device = DeviceInfo::current();
    let mut results = Vec::new();
    for quality in CliConfigBuilder::qualities(args) {
        let result = session
            .benchmark(image.clone(), quality)
            .await
            .with_context(|| format!("Benchmark failed at quality {}", quality))?;
        results.push(result);
    }

    if args.json {
        let documents = results
            .iter()
            .map(BenchmarkResult::to_json_value)
            .collect::<crate::Result<Vec<_>>>()?;
        let output = serde_json::json!({
            "device": device,
            "results": documents,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Device: {}", device);
        for result in &results {
            println!("{}\n", result.summary());
        }
    }

    Ok(())
}

/// Progress bar over the warm-up and timed calls of one run
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }
}

impl BenchmarkProgress for BarProgress {
    fn on_start(&self, warmup_count: usize, sample_count: usize) {
        self.bar.reset();
        self.bar.set_length((warmup_count + sample_count) as u64);
        self.bar.set_message("warming up");
    }

    fn on_warmup(&self, _index: usize) {
        self.bar.inc(1);
    }

    fn on_sample(&self, sample: &BenchmarkSample) {
        self.bar
            .set_message(format!("sample {}: {:.1} ms", sample.index, sample.latency_ms));
        self.bar.inc(1);
    }

    fn on_complete(&self, result: &BenchmarkResult) {
        self.bar.finish_with_message(format!(
            "{}: {:.2} ms mean",
            result.quality, result.mean_latency_ms
        ));
    }
}
