//! CLI binary for picshift.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ConversionRequest` and writes the result to disk.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use picshift::{
    convert, ConversionRequest, Geometry, SizeUnit, SourceDocument, SourceKind, TargetFormat,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetArg {
    Jpg,
    Png,
    Pdf,
    Word,
    Excel,
}

impl From<TargetArg> for TargetFormat {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Jpg => TargetFormat::Jpg,
            TargetArg::Png => TargetFormat::Png,
            TargetArg::Pdf => TargetFormat::Pdf,
            TargetArg::Word => TargetFormat::Word,
            TargetArg::Excel => TargetFormat::Excel,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitArg {
    Cm,
    Inch,
}

impl From<UnitArg> for SizeUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Cm => SizeUnit::Cm,
            UnitArg::Inch => SizeUnit::Inch,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "picshift",
    version,
    about = "Convert images, PDFs, Word and Excel files locally",
    long_about = "Convert files without a server round-trip: image → JPG/PNG/PDF (with optional \
physical sizing in cm or inches at 300 DPI), PDF → JPG/PNG/Word/Excel, and Word/Excel → PDF. \
The PDF legs need a pdfium dynamic library at runtime (PDFIUM_DYNAMIC_LIB_PATH).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto
)]
struct Cli {
    /// Input file path.
    input: PathBuf,

    /// Target format.
    #[arg(short, long, value_enum)]
    to: TargetArg,

    /// Write the result here instead of the suggested PicShift_* filename.
    #[arg(short, long, env = "PICSHIFT_OUTPUT")]
    output: Option<PathBuf>,

    /// Custom output width (image sources only; requires --height).
    #[arg(long, requires = "height")]
    width: Option<String>,

    /// Custom output height (image sources only; requires --width).
    #[arg(long, requires = "width")]
    height: Option<String>,

    /// Unit for --width/--height.
    #[arg(long, value_enum, default_value = "cm")]
    unit: UnitArg,

    /// Verbose (debug-level) logging.
    #[arg(short, long, env = "PICSHIFT_VERBOSE")]
    verbose: bool,

    /// Suppress everything except errors.
    #[arg(short, long, env = "PICSHIFT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let filename = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(kind) = SourceKind::detect(&bytes, &filename) else {
        bail!(
            "{} is not a recognised input (expected an image, .pdf, .docx or .xlsx)",
            cli.input.display()
        );
    };

    let target: TargetFormat = cli.to.into();

    // Raster targets take only the first page of a PDF; say so up front.
    if kind == SourceKind::Pdf
        && matches!(target, TargetFormat::Jpg | TargetFormat::Png)
        && !cli.quiet
    {
        if let Ok(pages) = picshift::pipeline::pdf::page_count(bytes.clone()).await {
            if pages > 1 {
                eprintln!(
                    "{}",
                    dim(&format!("note: converting page 1 of {pages} only"))
                );
            }
        }
    }

    let mut request = ConversionRequest::new(SourceDocument::new(bytes, kind), target);
    if let (Some(width), Some(height)) = (cli.width, cli.height) {
        request = request.with_geometry(Geometry {
            width,
            height,
            unit: cli.unit.into(),
        });
    }

    let spinner = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Converting {} → {}", filename, request.target));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    };

    let result = convert(request).await;
    spinner.finish_and_clear();

    match result {
        Ok(output) => {
            let path = cli.output.unwrap_or_else(|| PathBuf::from(&output.filename));
            std::fs::write(&path, &output.bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if !cli.quiet {
                eprintln!(
                    "{} {} {}",
                    green("✓"),
                    path.display(),
                    dim(&format!("({} bytes)", output.bytes.len()))
                );
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {e}", red("✗"));
            std::process::exit(1);
        }
    }
}
