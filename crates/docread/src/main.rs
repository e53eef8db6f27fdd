//! # docread CLI
//!
//! Command-line interface for docread: extract readable text from PDFs,
//! images, Word documents, presentations and spreadsheets.
//!
//! Direct extraction runs locally. Scanned PDF pages and images are sent to
//! an OCR service when an API key is available (`MISTRAL_API_KEY` by
//! default, also read from `.env`).
//!
//! ## Commands
//!
//! - `docread read <FILE>...` - Print the text of each file
//! - `docread formats` - List supported extensions
//! - `docread config show|init|path` - Inspect configuration
//!
//! ## Examples
//!
//! ```bash
//! # Extract text from a scanned PDF
//! docread read invoice.pdf
//!
//! # Get the labeled segments as JSON
//! docread read deck.pptx budget.xlsx --format json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docread_core::{DocumentFormat, OcrEngine, ReadOutcome};
use docread_extract::DocumentReader;
use docread_ocr::{HttpOcrConfig, HttpOcrEngine, NoopOcrEngine};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

mod config;

use config::{Config, OcrConfig};

#[derive(Parser)]
#[command(name = "docread")]
#[command(about = "Extract text from documents, with OCR for scanned content")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/docread/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from one or more files
    Read {
        /// Files to read
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List supported file extensions
    Formats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print sample configuration file
    Init,
    /// Show config file path
    Path,
}

/// Output structure for one read file.
#[derive(Serialize)]
struct ReadOutput {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<ReadOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Output structure for the format listing.
#[derive(Serialize)]
struct FormatOutput {
    format: DocumentFormat,
    extensions: Vec<String>,
}

/// Pick the OCR engine for this run.
fn create_ocr_engine(config: &OcrConfig) -> Result<Arc<dyn OcrEngine>> {
    if !config.enabled {
        info!("OCR disabled in configuration");
        return Ok(Arc::new(NoopOcrEngine::new()));
    }

    let Some(api_key) = config.api_key() else {
        warn!(
            "{} is not set; images and scanned pages will produce no text",
            config.api_key_env
        );
        return Ok(Arc::new(NoopOcrEngine::new()));
    };

    let engine = HttpOcrEngine::new(
        HttpOcrConfig::new(api_key)
            .with_endpoint(config.endpoint.clone())
            .with_timeout(config.timeout()),
    )
    .context("Failed to create OCR client")?;

    Ok(Arc::new(engine))
}

/// Read every file, reporting failures without stopping.
async fn read_files(reader: &DocumentReader, files: &[PathBuf], format: OutputFormat) -> Result<()> {
    let mut outputs = Vec::with_capacity(files.len());
    let mut failed = 0usize;

    for (i, file) in files.iter().enumerate() {
        let result = reader.read(file).await;

        match format {
            OutputFormat::Text => {
                if files.len() > 1 {
                    if i > 0 {
                        println!();
                    }
                    println!("==> {} <==", file.display());
                }
                match &result {
                    Ok(outcome) => println!("{}", outcome.render()),
                    Err(e) => eprintln!("Error reading {}: {}", file.display(), e),
                }
            }
            OutputFormat::Json => {
                let output = match &result {
                    Ok(outcome) => ReadOutput {
                        file: file.display().to_string(),
                        text: Some(outcome.render()),
                        outcome: Some(outcome.clone()),
                        error: None,
                    },
                    Err(e) => ReadOutput {
                        file: file.display().to_string(),
                        outcome: None,
                        text: None,
                        error: Some(e.to_string()),
                    },
                };
                outputs.push(output);
            }
        }

        if result.is_err() {
            failed += 1;
        }
    }

    if matches!(format, OutputFormat::Json) {
        println!(
            "{}",
            serde_json::to_string_pretty(&outputs).context("Failed to serialize results")?
        );
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} file(s) could not be read", files.len());
    }
    Ok(())
}

fn print_formats(format: OutputFormat) -> Result<()> {
    let formats: Vec<FormatOutput> = DocumentFormat::ALL
        .into_iter()
        .map(|f| FormatOutput {
            format: f,
            extensions: f.extensions().iter().map(|e| format!(".{e}")).collect(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&formats).context("Failed to serialize formats")?
            );
        }
        OutputFormat::Text => {
            for f in &formats {
                println!("{:<14} {}", f.format.name(), f.extensions.join(" "));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(Some(path.clone()))
            .context(format!("Failed to load config from {}", path.display()))?
    } else {
        Config::load().context("Failed to load config")?
    };

    // Setup logging
    let configured_level = config.logging.level.parse::<Level>().ok();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        configured_level.unwrap_or(Level::INFO)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    if configured_level.is_none() {
        warn!("Unknown log level '{}', using info", config.logging.level);
    }

    match cli.command {
        Commands::Read { files } => {
            let ocr = create_ocr_engine(&config.ocr)?;
            info!("Using OCR engine: {}", ocr.name());
            let reader = DocumentReader::with_ocr(ocr);
            read_files(&reader, &files, cli.format).await?;
        }

        Commands::Formats => print_formats(cli.format)?,

        Commands::Config { action } => match action {
            ConfigAction::Show => match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&config)
                            .context("Failed to serialize config")?
                    );
                }
                OutputFormat::Text => {
                    println!(
                        "{}",
                        toml::to_string_pretty(&config).context("Failed to serialize config")?
                    );
                }
            },
            ConfigAction::Init => {
                println!("{}", Config::sample_toml());
            }
            ConfigAction::Path => {
                if let Some(path) = Config::config_path() {
                    println!("{}", path.display());
                } else {
                    println!("Could not determine config directory");
                }
            }
        },
    }

    Ok(())
}
