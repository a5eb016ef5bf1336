mod logger;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use pdf_nup::{PaperMode, Rotation, Settings};
use pdf_nup_runtime::{
    BatchCoordinator, CompositionService, DocumentStatus, format_file_size, output_file_name,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pdfnup", about = "Place several PDF pages on each sheet", version)]
struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose each input PDF into an n-up PDF
    Compose {
        /// Input PDF file(s)
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Directory for the composed files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Settings file (JSON); command line flags take precedence
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Source pages per output sheet (1, 2, 4, 6 or 8)
        #[arg(short, long)]
        pages_per_sheet: Option<u32>,

        /// Rotation applied to every page, in degrees (0, 90, 180 or 270)
        #[arg(short, long, value_parser = parse_rotation)]
        rotation: Option<Rotation>,

        /// Cell border width in points, 0 for none
        #[arg(short, long)]
        border_width: Option<f32>,

        /// Output paper size
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// Only compose the first N sheets of each document
        #[arg(long)]
        max_sheets: Option<usize>,

        /// Show statistics only, don't generate PDFs
        #[arg(long)]
        stats_only: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    Auto,
    Letter,
    Legal,
    A4,
    A3,
    Tabloid,
}

impl From<PaperArg> for PaperMode {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::Auto => Self::Auto,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::A4 => Self::A4,
            PaperArg::A3 => Self::A3,
            PaperArg::Tabloid => Self::Tabloid,
        }
    }
}

fn parse_rotation(value: &str) -> Result<Rotation, String> {
    let degrees: i32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of degrees", value))?;
    Rotation::from_degrees(degrees)
        .ok_or_else(|| format!("unsupported rotation {}; use 0, 90, 180 or 270", degrees))
}

struct SettingsOverrides {
    pages_per_sheet: Option<u32>,
    rotation: Option<Rotation>,
    border_width: Option<f32>,
    paper: Option<PaperArg>,
}

impl SettingsOverrides {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(pages_per_sheet) = self.pages_per_sheet {
            settings.pages_per_sheet = pages_per_sheet;
        }
        if let Some(rotation) = self.rotation {
            settings.rotation = rotation;
        }
        if let Some(border_width) = self.border_width {
            settings.border_width = border_width;
        }
        if let Some(paper) = self.paper {
            settings.paper_size = paper.into();
        }
        settings
    }
}

struct Input {
    name: String,
    bytes: Vec<u8>,
}

async fn read_inputs(paths: &[PathBuf]) -> Result<Vec<Input>> {
    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        inputs.push(Input { name, bytes });
    }
    Ok(inputs)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logger::ConsoleLogger::new(logger::ConsoleLogger::level_for_verbosity(cli.verbose))
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Compose {
            input,
            output_dir,
            config,
            pages_per_sheet,
            rotation,
            border_width,
            paper,
            max_sheets,
            stats_only,
        } => {
            let base = match &config {
                Some(path) => Settings::load(path)
                    .await
                    .with_context(|| format!("Failed to load settings from {}", path.display()))?,
                None => Settings::default(),
            };
            let settings = SettingsOverrides {
                pages_per_sheet,
                rotation,
                border_width,
                paper,
            }
            .apply(base);
            settings.validate()?;
            log::debug!("Using settings {:?}", settings);

            let inputs = read_inputs(&input).await?;

            if stats_only {
                return print_statistics(inputs, &settings).await;
            }

            compose_batch(inputs, settings, &output_dir, max_sheets).await
        }
    }
}

async fn print_statistics(inputs: Vec<Input>, settings: &Settings) -> Result<ExitCode> {
    let mut failed = false;

    for input in inputs {
        println!("{} ({}):", input.name, format_file_size(input.bytes.len()));
        let stats = match pdf_nup::load_source(input.bytes).await {
            Ok(doc) => pdf_nup::calculate_statistics(&doc, settings),
            Err(e) => Err(e),
        };
        match stats {
            Ok(stats) => {
                println!("  Source pages: {}", stats.source_pages);
                println!("  Pages per sheet: {}", stats.tiles_per_sheet);
                println!("  Output sheets: {}", stats.output_sheets);
                println!("  Blank cells: {}", stats.blank_cells);
            }
            Err(e) => {
                println!("  Error: {}", e);
                failed = true;
            }
        }
    }

    Ok(exit_code(failed))
}

async fn compose_batch(
    inputs: Vec<Input>,
    settings: Settings,
    output_dir: &Path,
    max_sheets: Option<usize>,
) -> Result<ExitCode> {
    let (service, responses) = match max_sheets {
        Some(limit) => CompositionService::spawn_preview(limit),
        None => CompositionService::spawn(),
    };
    let mut batch = BatchCoordinator::headless(service.sender(), responses);
    batch.update_settings(settings);

    for input in inputs {
        batch.register(input.name, input.bytes);
    }

    let status = batch.wait_until_settled().await;
    log::debug!("Batch finished with status {:?}", status);

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut failed = false;
    for record in batch.records() {
        println!("{} ({}):", record.name(), format_file_size(record.byte_size()));

        match (record.status(), record.result_bytes()) {
            (DocumentStatus::Ready, Some(bytes)) => {
                let path = output_dir.join(output_file_name(record.name()));
                tokio::fs::write(&path, bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "  Composed → {} ({})",
                    path.display(),
                    format_file_size(bytes.len())
                );
            }
            _ => {
                println!(
                    "  Error: {}",
                    record.error_message().unwrap_or("composition did not finish")
                );
                failed = true;
            }
        }
    }

    drop(batch);
    service.shutdown().await?;

    Ok(exit_code(failed))
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
