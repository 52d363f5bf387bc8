use std::{error::Error, path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lightscan::{
    BatchEntry, BatchOrchestrator, BatchResult, CsvSink, DiscoveryOptions, FfmpegLogLevel,
    FrameSeries, OperationType, Percentile, PixelFormat, PlotSink, ProgressCallback,
    ProgressInfo, ScanOptions, SeriesSink,
};
use serde_json::{Value, json};

const CLI_AFTER_HELP: &str = "Examples:\n  lightscan scan recordings\n  lightscan scan recordings --percentile 99 --out results --progress\n  lightscan scan recordings --ext mp4 --ext mov --pixel-format gray8 --json\n  lightscan completions zsh > _lightscan";

#[derive(Debug, Parser)]
#[command(
    name = "lightscan",
    version,
    about = "Plot a per-frame brightness percentile for every video in a directory",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar over the discovered files.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Worker thread count for --parallel.
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute a percentile series for every video in a directory.
    #[command(
        about = "Scan a directory of videos",
        after_help = "Writes {file}_{percentile}.csv and {file}_{percentile}.png for each video.\n\nExamples:\n  lightscan scan recordings --percentile 95\n  lightscan scan recordings --out results --no-plot"
    )]
    Scan(ScanArgs),

    /// Generate shell completions.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, clap::Args)]
struct ScanArgs {
    /// Directory containing the videos.
    directory: PathBuf,

    /// Percentile of pixel intensities to compute per frame (0-100).
    #[arg(long, short, default_value_t = 95)]
    percentile: i64,

    /// Video file extension to match; repeat for several (default: mp4).
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Match extensions case-sensitively.
    #[arg(long)]
    case_sensitive: bool,

    /// Output directory for CSV files and plots (default: the scanned directory).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Pixel format frames are reduced in (rgb8, gray8).
    #[arg(long, default_value = "rgb8")]
    pixel_format: String,

    /// Do not write PNG plots.
    #[arg(long)]
    no_plot: bool,

    /// Do not write CSV files.
    #[arg(long)]
    no_csv: bool,

    /// Process several files at once (requires the `rayon` feature).
    #[arg(long)]
    parallel: bool,

    /// Print a machine-readable JSON summary on stdout.
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn Error>> {
    if let Some(level) = &global.log_level {
        let parsed =
            FfmpegLogLevel::parse(level).ok_or_else(|| format!("unsupported --log-level: {level}"))?;
        lightscan::set_ffmpeg_log_level(parsed);
    }

    if let Some(threads) = global.threads {
        #[cfg(feature = "rayon")]
        if threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()?;
        }

        #[cfg(not(feature = "rayon"))]
        {
            let _ = threads;
            warn("--threads requires building with the `rayon` feature");
        }
    }

    Ok(())
}

fn warn(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

fn scan_options(args: &ScanArgs) -> Result<ScanOptions, Box<dyn Error>> {
    let percentile = Percentile::new(args.percentile)?;
    let pixel_format = PixelFormat::parse(&args.pixel_format)
        .ok_or_else(|| format!("unsupported --pixel-format: {}", args.pixel_format))?;

    let mut discovery = DiscoveryOptions::new().case_sensitive(args.case_sensitive);
    if !args.extensions.is_empty() {
        discovery = discovery.with_extensions(&args.extensions);
    }

    Ok(ScanOptions::new()
        .with_percentile(percentile)
        .with_discovery(discovery)
        .with_pixel_format(pixel_format))
}

/// Drives an `indicatif` bar from batch progress events.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.operation {
            OperationType::BatchScan => {
                if let Some(total) = info.total {
                    self.bar.set_length(total);
                }
                self.bar.set_position(info.current);
            }
            OperationType::FrameReduction => {
                if let Some(label) = &info.label {
                    self.bar.set_message(format!("{label} frame {}", info.current));
                }
            }
            _ => {}
        }
    }
}

fn run_batch(
    orchestrator: &BatchOrchestrator,
    args: &ScanArgs,
) -> Result<BatchResult, Box<dyn Error>> {
    if args.parallel {
        #[cfg(feature = "rayon")]
        return Ok(orchestrator.run_parallel(&args.directory)?);

        #[cfg(not(feature = "rayon"))]
        warn("--parallel requires building with the `rayon` feature; scanning sequentially");
    }
    Ok(orchestrator.run(&args.directory)?)
}

fn entry_json(entry: &BatchEntry) -> Value {
    let source = entry.source();
    match entry {
        BatchEntry::Completed(series) => {
            let range = series.value_range();
            json!({
                "file": source.label(),
                "path": source.path().display().to_string(),
                "status": "completed",
                "frames": series.len(),
                "min": range.map(|(low, _)| low),
                "max": range.map(|(_, high)| high),
            })
        }
        BatchEntry::Failed(failure) => json!({
            "file": source.label(),
            "path": source.path().display().to_string(),
            "status": "failed",
            "error_kind": failure.error().kind().as_str(),
            "frame_index": failure.error().frame_index(),
            "error": failure.error().to_string(),
        }),
        BatchEntry::Skipped(_) => json!({
            "file": source.label(),
            "path": source.path().display().to_string(),
            "status": "skipped",
        }),
    }
}

fn summary_json(result: &BatchResult, percentile: Percentile) -> Value {
    json!({
        "percentile": percentile.value(),
        "files": result.len(),
        "completed": result.completed_count(),
        "failed": result.failed_count(),
        "results": result.entries().iter().map(entry_json).collect::<Vec<_>>(),
    })
}

/// Hand every series to every sink. A failed write is reported and the
/// remaining outputs are still written. Returns the number of failed writes.
fn write_outputs<'a>(
    series: impl IntoIterator<Item = &'a FrameSeries>,
    sinks: &[Box<dyn SeriesSink>],
    verbose: bool,
) -> usize {
    let mut failed = 0;
    for series in series {
        for sink in sinks {
            match sink.write(series) {
                Ok(path) => {
                    if verbose {
                        eprintln!("{} {}", "wrote".green().bold(), path.display());
                    }
                }
                Err(error) => {
                    failed += 1;
                    warn(&format!(
                        "could not write output for {}: {error}",
                        series.source().label()
                    ));
                }
            }
        }
    }
    failed
}

fn scan(global: &GlobalOptions, args: ScanArgs) -> Result<(), Box<dyn Error>> {
    let mut options = scan_options(&args)?;
    let percentile = options.percentile();

    // Keep stdout clean for the JSON summary.
    let marker = |text: &str| {
        if args.json {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    };
    marker("");
    marker("Running...");

    let progress = if global.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        options = options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    let orchestrator = BatchOrchestrator::new(options);
    let result = run_batch(&orchestrator, &args);
    if let Some(progress) = &progress {
        progress.bar.finish_and_clear();
    }
    let result = result?;

    if result.is_empty() {
        warn(&format!(
            "no video files found in {}",
            args.directory.display()
        ));
    }

    let out = args.out.clone().unwrap_or_else(|| args.directory.clone());
    let mut sinks: Vec<Box<dyn SeriesSink>> = Vec::new();
    if !args.no_csv {
        sinks.push(Box::new(CsvSink::new(&out)));
    }
    if !args.no_plot {
        sinks.push(Box::new(PlotSink::new(&out)));
    }

    let failed_writes = write_outputs(result.series(), &sinks, global.verbose);

    for entry in result.entries() {
        match entry {
            BatchEntry::Completed(_) => {}
            BatchEntry::Failed(failure) => {
                let error = failure.error();
                let at_frame = error
                    .frame_index()
                    .map(|index| format!(" at frame {index}"))
                    .unwrap_or_default();
                warn(&format!(
                    "{} failed ({}{at_frame}): {error}",
                    failure.source().label(),
                    error.kind(),
                ));
            }
            BatchEntry::Skipped(video) => {
                warn(&format!("{} skipped", video.label()));
            }
        }
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary_json(&result, percentile))?
        );
    } else {
        println!(
            "{} of {} file(s) processed at the {}th percentile",
            result.completed_count(),
            result.len(),
            percentile
        );
    }

    marker("");
    marker("Finished!");

    if failed_writes > 0 {
        return Err(format!("{failed_writes} output file(s) could not be written").into());
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Scan(args) => scan(&cli.global, args)?,
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "lightscan", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
