//! CLI binary for invoice-shots.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `BatchConfig`, runs the batches, and prints one line per file.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use invoice_shots::{
    capture_screenshots, organize_screenshots, BatchConfig, BatchConfigBuilder,
    BatchProgressCallback, BatchReport, BatchSummary, CropRegion, DocumentInfo, FileOutcome,
    FileReport, LayoutMode, OrganizeReport, PdfiumRasterizer, ProgressCallback, SortOrder, Stage,
};
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

/// `report.log_line()`, with the tag coloured when writing to a terminal.
fn render_line(report: &FileReport, color: bool) -> String {
    let line = report.log_line();
    if !color {
        return line;
    }
    let tag = report.outcome.tag();
    let painted = match report.outcome {
        FileOutcome::Failed { .. } => red(tag),
        FileOutcome::Skipped { .. } => dim(tag),
        _ => green(tag),
    };
    line.replacen(tag, &painted, 1)
}

fn render_summary(summary: &BatchSummary, color: bool) -> String {
    let line = summary.log_line();
    if !color {
        line
    } else if summary.failed > 0 {
        yellow(&line)
    } else {
        bold(&line)
    }
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar on stderr with the per-file
/// `[OK]`/`[SKIP]`/`[ERROR]` lines printed to stdout above it.
///
/// A fresh bar is created for each batch, so `run` shows one per stage.
struct CliProgressCallback {
    bar: Mutex<ProgressBar>,
    color: bool,
}

impl CliProgressCallback {
    fn new(color: bool) -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(ProgressBar::hidden()),
            color,
        })
    }

    fn bar(&self) -> ProgressBar {
        self.bar.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn activate_bar(&self, stage: Stage, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(total as u64);
        bar.set_style(style);
        bar.set_prefix(match stage {
            Stage::Capture => "Capturing",
            Stage::Organize => "Organizing",
        });
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.bar.lock().unwrap_or_else(|e| e.into_inner()) = bar;
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, stage: Stage, total_files: usize) {
        self.activate_bar(stage, total_files);
    }

    fn on_file_start(&self, file_name: &str, _index: usize, _total: usize) {
        self.bar().set_message(file_name.to_string());
    }

    fn on_file_complete(&self, report: &FileReport, _index: usize, _total: usize) {
        let bar = self.bar();
        let line = render_line(report, self.color);
        bar.suspend(|| println!("{line}"));
        bar.inc(1);
    }

    fn on_batch_complete(&self, _stage: Stage, summary: &BatchSummary) {
        self.bar().finish_and_clear();
        println!("{}", render_summary(summary, self.color));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Screenshot every invoice in ./invoices, then build the workbook
  invoice-shots run

  # Full-page screenshots at 200 DPI, no zoom
  invoice-shots capture --full-page --dpi 200 --zoom 1

  # Custom crop rectangle (pixels of the rendered page)
  invoice-shots capture --crop 80,250,1200,900

  # One sheet per screenshot, statement order (-1, -2, … -10)
  invoice-shots organize --layout sheets --sort numeric-suffix

  # Check page size and whether the crop fits
  invoice-shots inspect invoices/statement-1.pdf

  # Machine-readable report; exit non-zero if any file failed
  invoice-shots run --json --strict > report.json

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH          Path to libpdfium (file or directory)
  INVOICE_SHOTS_DPI        Rendering DPI
  INVOICE_SHOTS_INPUT_DIR  Input directory of PDFs
  RUST_LOG                 Override log filter (e.g. invoice_shots=debug)

SETUP:
  The PDF engine is pdfium. Download a build for your platform from
  https://github.com/bblanchon/pdfium-binaries/releases and either place
  libpdfium next to where you run the tool, install it system-wide, or set
  PDFIUM_LIB_PATH.
"#;

/// Render invoice PDFs to cropped PNG screenshots and organise them in Excel.
#[derive(Parser, Debug)]
#[command(
    name = "invoice-shots",
    version,
    about = "Render invoice PDFs to PNG screenshots and organise them in an XLSX workbook",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the report as JSON instead of per-file lines.
    #[arg(long, global = true, env = "INVOICE_SHOTS_JSON")]
    json: bool,

    /// Exit non-zero when any file failed.
    #[arg(long, global = true, env = "INVOICE_SHOTS_STRICT")]
    strict: bool,

    /// Disable the progress bar.
    #[arg(long, global = true, env = "INVOICE_SHOTS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "INVOICE_SHOTS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "INVOICE_SHOTS_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render page 1 of every PDF to a PNG (existing PNGs are skipped).
    Capture {
        #[command(flatten)]
        capture: CaptureArgs,
        #[command(flatten)]
        shots: ScreenshotDirArg,
    },
    /// Lay out every PNG in an XLSX workbook.
    Organize {
        #[command(flatten)]
        shots: ScreenshotDirArg,
        #[command(flatten)]
        organize: OrganizeArgs,
    },
    /// Capture, then organize.
    Run {
        #[command(flatten)]
        capture: CaptureArgs,
        #[command(flatten)]
        shots: ScreenshotDirArg,
        #[command(flatten)]
        organize: OrganizeArgs,
    },
    /// Show page count and page-1 size of a PDF, and whether the crop fits.
    Inspect {
        /// PDF file to inspect.
        pdf: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Rendering DPI (72–600).
    #[arg(long, env = "INVOICE_SHOTS_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Keep the whole page instead of cropping.
    #[arg(long, env = "INVOICE_SHOTS_FULL_PAGE", conflicts_with = "crop")]
    full_page: bool,

    /// Crop rectangle in pixels of the rendered page: x1,y1,x2,y2.
    #[arg(long, env = "INVOICE_SHOTS_CROP", value_parser = parse_crop)]
    crop: Option<CropRegion>,

    /// Zoom factor applied after cropping (1 disables).
    #[arg(long, env = "INVOICE_SHOTS_ZOOM", default_value_t = 2.0)]
    zoom: f64,

    /// PDF user password for encrypted invoices.
    #[arg(long, env = "INVOICE_SHOTS_PASSWORD")]
    password: Option<String>,

    /// pdfium library file, or the directory containing it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,
}

impl RenderArgs {
    fn apply(&self, mut builder: BatchConfigBuilder) -> BatchConfigBuilder {
        builder = builder.dpi(self.dpi).zoom(self.zoom);
        if self.full_page {
            builder = builder.full_page();
        } else if let Some(region) = self.crop {
            builder = builder.crop(region);
        }
        if let Some(ref pwd) = self.password {
            builder = builder.password(pwd.clone());
        }
        builder
    }
}

#[derive(Args, Debug)]
struct CaptureArgs {
    /// Directory of PDFs to screenshot.
    #[arg(long, env = "INVOICE_SHOTS_INPUT_DIR", default_value = "invoices")]
    input_dir: PathBuf,

    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args, Debug)]
struct ScreenshotDirArg {
    /// Directory the PNG screenshots are written to and read from.
    #[arg(long, env = "INVOICE_SHOTS_SCREENSHOT_DIR", default_value = "output/screenshot")]
    screenshot_dir: PathBuf,
}

#[derive(Args, Debug)]
struct OrganizeArgs {
    /// Workbook to write.
    #[arg(
        long,
        env = "INVOICE_SHOTS_WORKBOOK",
        default_value = "output/invoice_screenshots_organized.xlsx"
    )]
    workbook: PathBuf,

    /// grid: two per row on one sheet. sheets: one sheet per screenshot.
    #[arg(long, env = "INVOICE_SHOTS_LAYOUT", value_enum, default_value = "grid")]
    layout: LayoutArg,

    /// Image width in the workbook, in pixels (default 300 grid / 800 sheets).
    #[arg(long, env = "INVOICE_SHOTS_DISPLAY_WIDTH")]
    display_width: Option<u32>,

    /// Screenshot ordering.
    #[arg(long, env = "INVOICE_SHOTS_SORT", value_enum, default_value = "lexicographic")]
    sort: SortArg,

    /// Omit the hyperlinked Index sheet in `sheets` layout.
    #[arg(long, env = "INVOICE_SHOTS_NO_INDEX")]
    no_index: bool,
}

impl OrganizeArgs {
    fn apply(&self, mut builder: BatchConfigBuilder) -> BatchConfigBuilder {
        builder = builder
            .workbook_path(&self.workbook)
            .layout(self.layout.clone().into())
            .sort(self.sort.clone().into())
            .index_sheet(!self.no_index);
        if let Some(px) = self.display_width {
            builder = builder.display_width(px);
        }
        builder
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum LayoutArg {
    Grid,
    Sheets,
}

impl From<LayoutArg> for LayoutMode {
    fn from(v: LayoutArg) -> Self {
        match v {
            LayoutArg::Grid => LayoutMode::Grid,
            LayoutArg::Sheets => LayoutMode::OnePerSheet,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum SortArg {
    Lexicographic,
    NumericSuffix,
}

impl From<SortArg> for SortOrder {
    fn from(v: SortArg) -> Self {
        match v {
            SortArg::Lexicographic => SortOrder::Lexicographic,
            SortArg::NumericSuffix => SortOrder::NumericSuffix,
        }
    }
}

fn parse_crop(s: &str) -> Result<CropRegion, String> {
    s.parse::<CropRegion>().map_err(|e| e.to_string())
}

/// JSON shape of `run --json`.
#[derive(Serialize)]
struct RunOutput<'a> {
    capture: &'a BatchReport,
    organize: &'a OrganizeReport,
}

/// JSON shape of `inspect --json`.
#[derive(Serialize)]
struct InspectOutput<'a> {
    file: &'a Path,
    #[serde(flatten)]
    info: &'a DocumentInfo,
    crop: Option<CropRegion>,
    crop_fits: Option<bool>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Per-file lines are the normal feedback, so library logs start at WARN.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let color = io::stdout().is_terminal();
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && io::stderr().is_terminal();
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(color) as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    match &cli.command {
        Command::Capture { capture, shots } => {
            let config = build_config(Some(capture), shots, None, progress_cb)?;
            let rasterizer = bind(&capture.render)?;
            let report = capture_screenshots(&config, &rasterizer).context("Capture failed")?;
            print_batch(&cli, &report, show_progress, color);
            if cli.json {
                print_json(&report)?;
            }
            finish(&cli, &[&report])
        }
        Command::Organize { shots, organize } => {
            let config = build_config(None, shots, Some(organize), progress_cb)?;
            let report = organize_screenshots(&config).context("Organize failed")?;
            print_batch(&cli, &report.batch, show_progress, color);
            print_workbook(&cli, &report, color);
            if cli.json {
                print_json(&report)?;
            }
            finish(&cli, &[&report.batch])
        }
        Command::Run {
            capture,
            shots,
            organize,
        } => {
            let config = build_config(Some(capture), shots, Some(organize), progress_cb)?;
            let rasterizer = bind(&capture.render)?;

            let captured = capture_screenshots(&config, &rasterizer).context("Capture failed")?;
            print_batch(&cli, &captured, show_progress, color);

            let organized = organize_screenshots(&config).context("Organize failed")?;
            print_batch(&cli, &organized.batch, show_progress, color);
            print_workbook(&cli, &organized, color);

            if cli.json {
                print_json(&RunOutput {
                    capture: &captured,
                    organize: &organized,
                })?;
            }
            finish(&cli, &[&captured, &organized.batch])
        }
        Command::Inspect { pdf, render } => {
            let config = render
                .apply(BatchConfig::builder())
                .build()
                .context("Invalid configuration")?;
            let rasterizer = bind(render)?;
            let info = rasterizer
                .inspect(pdf, config.dpi, config.password.as_deref())
                .with_context(|| format!("Failed to inspect {}", pdf.display()))?;
            let crop_fits = config
                .crop
                .map(|c| c.fits_within(info.width_px, info.height_px));

            if cli.json {
                print_json(&InspectOutput {
                    file: pdf,
                    info: &info,
                    crop: config.crop,
                    crop_fits,
                })?;
            } else {
                println!("File:         {}", pdf.display());
                println!("Pages:        {}", info.page_count);
                println!("Page 1:       {:.1} × {:.1} pt", info.width_pt, info.height_pt);
                println!(
                    "Rendered:     {} × {} px at {} DPI",
                    info.width_px, info.height_px, info.dpi
                );
                match (config.crop, crop_fits) {
                    (Some(region), Some(true)) => println!("Crop:         {region} (fits)"),
                    (Some(region), _) => println!(
                        "Crop:         {region} {}",
                        if color {
                            yellow("(overhangs page; padded with white)")
                        } else {
                            "(overhangs page; padded with white)".to_string()
                        }
                    ),
                    (None, _) => println!("Crop:         none (full page)"),
                }
            }
            Ok(())
        }
    }
}

/// Map CLI args to `BatchConfig`.
fn build_config(
    capture: Option<&CaptureArgs>,
    shots: &ScreenshotDirArg,
    organize: Option<&OrganizeArgs>,
    progress: Option<ProgressCallback>,
) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder().screenshot_dir(&shots.screenshot_dir);
    if let Some(args) = capture {
        builder = args.render.apply(builder.input_dir(&args.input_dir));
    }
    if let Some(args) = organize {
        builder = args.apply(builder);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

/// Bind pdfium before any file is touched.
fn bind(render: &RenderArgs) -> Result<PdfiumRasterizer> {
    PdfiumRasterizer::new(render.pdfium_lib.as_deref()).context("PDF engine unavailable")
}

/// Per-file lines and summary, unless the progress callback already printed
/// them or JSON was requested.
fn print_batch(cli: &Cli, report: &BatchReport, show_progress: bool, color: bool) {
    if show_progress || cli.json {
        return;
    }
    for file in &report.files {
        if cli.quiet {
            if file.outcome.is_failed() {
                eprintln!("{}", file.log_line());
            }
        } else {
            println!("{}", render_line(file, color));
        }
    }
    if !cli.quiet {
        println!("{}", render_summary(&report.summary, color));
    }
}

fn print_workbook(cli: &Cli, report: &OrganizeReport, color: bool) {
    if cli.quiet || cli.json {
        return;
    }
    let path = report.workbook.display().to_string();
    println!(
        "Workbook: {}  ({} sheets)",
        if color { bold(&path) } else { path },
        report.sheet_count
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise report")?;
    println!("{json}");
    Ok(())
}

/// Apply `--strict` to the finished batches.
fn finish(cli: &Cli, reports: &[&BatchReport]) -> Result<()> {
    if !cli.strict {
        return Ok(());
    }
    for report in reports {
        (*report)
            .clone()
            .into_result()
            .context("Strict mode: some files failed")?;
    }
    Ok(())
}
