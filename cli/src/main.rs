//! pdfquick CLI - local PDF conversion tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfquick::detect::format_file_size;
use pdfquick::package::{save_artifacts, write_artifacts};
use pdfquick::{Artifact, OutputFormat, PdfQuick, Progress};

#[derive(Parser)]
#[command(name = "pdfquick")]
#[command(version)]
#[command(about = "Convert PDF files to images, text, and Word documents", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output format when no subcommand is given
    #[arg(short, long, value_enum, default_value = "png")]
    format: FormatArg,

    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct CommonArgs {
    /// Output directory
    #[arg(short, long, value_name = "DIR", global = true)]
    output: Option<PathBuf>,

    /// Bundle several output files into one zip archive
    #[arg(long, global = true)]
    zip: bool,

    /// Render scale (images default to 4, word pictures to 2.5)
    #[arg(long, global = true)]
    scale: Option<f32>,

    /// Device pixel ratio of the rendered bitmaps
    #[arg(long, global = true, default_value = "1.0")]
    dpr: f32,

    /// Document password
    #[arg(long, global = true, env = "PDFQUICK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Skip the extension and size checks
    #[arg(long, global = true)]
    no_validate: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every page to a PNG image
    Png {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Convert every page to a JPG image
    #[command(alias = "jpeg")]
    Jpg {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// JPEG quality (1-100)
        #[arg(short, long, default_value = "98")]
        quality: u8,
    },

    /// Extract layout-preserving plain text
    #[command(alias = "txt")]
    Text {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Build visual and editable Word documents
    #[command(alias = "docx")]
    Word {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// One PNG per page
    Png,
    /// One JPG per page
    Jpg,
    /// Plain text
    Txt,
    /// Visual and editable Word documents
    Docx,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Jpg => OutputFormat::Jpg,
            FormatArg::Txt => OutputFormat::Txt,
            FormatArg::Docx => OutputFormat::Docx,
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let common = cli.common;

    let result = match cli.command {
        Some(Commands::Png { input }) => cmd_convert(&input, OutputFormat::Png, &common, None),
        Some(Commands::Jpg { input, quality }) => {
            cmd_convert(&input, OutputFormat::Jpg, &common, Some(quality))
        }
        Some(Commands::Text { input }) => cmd_convert(&input, OutputFormat::Txt, &common, None),
        Some(Commands::Word { input }) => cmd_convert(&input, OutputFormat::Docx, &common, None),
        Some(Commands::Info { input, json }) => cmd_info(&input, &common, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.format.into(), &common, None)
            } else {
                println!("{}", "Usage: pdfquick <FILE> [--format png|jpg|txt|docx]".yellow());
                println!("       pdfquick --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_converter(format: OutputFormat, common: &CommonArgs, quality: Option<u8>) -> PdfQuick {
    let mut converter = PdfQuick::new().with_device_pixel_ratio(common.dpr);

    if let Some(scale) = common.scale {
        converter = match format {
            OutputFormat::Docx => converter.with_word_scale(scale),
            _ => converter.with_image_scale(scale),
        };
    }
    if let Some(quality) = quality {
        converter = converter.with_jpeg_quality(quality);
    }
    if let Some(ref password) = common.password {
        converter = converter.with_password(password.clone());
    }
    if common.no_validate {
        converter = converter.without_validation();
    }
    converter
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

fn report(pb: &ProgressBar, progress: Progress) {
    pb.set_position(progress.percent as u64);
    pb.set_message(format!(
        "page {}/{}",
        progress.current_page, progress.total_pages
    ));
}

fn cmd_convert(
    input: &Path,
    format: OutputFormat,
    common: &CommonArgs,
    quality: Option<u8>,
) -> CliResult<()> {
    let converter = build_converter(format, common, quality);
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or("input is not a file")?;

    let data = fs::read(input)?;

    let pb = progress_bar();
    pb.set_message(format!("Converting to {}...", format.label()));

    let artifacts = converter.convert_bytes(&data, &file_name, format, |p| report(&pb, p));
    let artifacts = match artifacts {
        Ok(artifacts) => artifacts,
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };
    pb.finish_with_message(format!("Done! {}", artifact_summary(&artifacts)));

    let output_dir = common
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    log::debug!("Writing output to {}", output_dir.display());

    let written = if common.zip {
        vec![save_artifacts(artifacts, &file_name, &output_dir)?]
    } else {
        write_artifacts(&artifacts, &output_dir)?
    };

    print_outputs(&written);
    Ok(())
}

fn print_outputs(paths: &[PathBuf]) {
    println!("\n{}", "Output files:".green().bold());
    for (i, path) in paths.iter().enumerate() {
        let branch = if i + 1 == paths.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), path.display());
    }
}

fn cmd_info(input: &Path, common: &CommonArgs, json: bool) -> CliResult<()> {
    let converter = build_converter(OutputFormat::Png, common, None);
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or("input is not a file")?;
    let data = fs::read(input)?;
    let info = converter.inspect_bytes(&data, &file_name)?;

    if json {
        println!("{}", info.to_json()?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), info.version);
    println!("{}: {}", "Size".bold(), format_file_size(info.file_size));
    println!("{}: {}", "Pages".bold(), info.page_count);

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for page in &info.pages {
        println!(
            "{:>4}: {:.0} x {:.0} pt{}",
            page.number,
            page.width,
            page.height,
            if page.landscape { " (landscape)" } else { "" }
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfquick".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Local PDF conversion tool");
    println!();
    println!("Formats:");
    for format in OutputFormat::ALL {
        println!("  {:<5} {}", format.label(), format.description().dimmed());
    }
    println!("License: MIT");
}

fn artifact_summary(artifacts: &[Artifact]) -> String {
    let total: usize = artifacts.iter().map(Artifact::len).sum();
    format!("{} files, {}", artifacts.len(), format_file_size(total as u64))
}
