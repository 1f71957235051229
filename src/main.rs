// wellstim CLI - ingest well stimulation PDFs into SQLite
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wellstim::fields::{extract_fields, ExtractedRecord, FieldSchema};
use wellstim::pdf_extraction::{LopdfLoader, ParallelExtractor, SystemPdfRenderer, TesseractOcr};
use wellstim::storage::SqliteSink;
use wellstim::{IngestConfig, IngestDriver};

#[derive(Parser)]
#[command(name = "wellstim", version, about = "Extract well stimulation records from PDFs")]
struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Concurrent page batches
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Maximum pages per batch
    #[arg(long, global = true)]
    batch_size: Option<usize>,

    /// SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest every PDF in a directory into the database
    Ingest { dir: PathBuf },
    /// Extract text and fields from one PDF without storing them
    Extract {
        pdf: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the extracted text of one PDF
    Text { pdf: PathBuf },
    /// Run field extraction over a plain text file
    Fields {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli)?;
    let schema = Arc::new(
        FieldSchema::well_stimulation_with_labels(&config.labels).context("invalid label overrides")?,
    );

    match &cli.command {
        Command::Ingest { dir } => {
            let sink = SqliteSink::new(Some(&config.database))
                .with_context(|| format!("cannot open database {}", config.database.display()))?;
            let mut driver = IngestDriver::new(build_extractor(&config), schema, sink)?;
            let report = driver.ingest_dir(dir).await?;
            println!("{}", report);
        }
        Command::Extract { pdf, json } => {
            let document = build_extractor(&config)
                .extract_document_text(pdf)
                .await
                .with_context(|| format!("cannot extract {}", pdf.display()))?;
            if document.is_degraded() {
                warn!(pages = ?document.degraded_pages, "some pages could not be read");
            }
            print_record(&extract_fields(&document.text, &schema), *json)?;
        }
        Command::Text { pdf } => {
            let document = build_extractor(&config)
                .extract_document_text(pdf)
                .await
                .with_context(|| format!("cannot extract {}", pdf.display()))?;
            print!("{}", document.text);
        }
        Command::Fields { file, json } => {
            let text = read_text(file)?;
            print_record(&extract_fields(&text, &schema), *json)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "wellstim=debug" } else { "wellstim=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_config(cli: &Cli) -> Result<IngestConfig> {
    let mut config = IngestConfig::load(cli.config.as_deref())?;
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    if let Some(batch_size) = cli.batch_size {
        config.max_batch_size = batch_size;
    }
    if let Some(db) = &cli.db {
        config.database = db.clone();
    }
    config.validate()?;
    Ok(config)
}

fn build_extractor(config: &IngestConfig) -> ParallelExtractor<LopdfLoader, TesseractOcr> {
    let renderer = SystemPdfRenderer::new(&config.ocr.pdftoppm, config.ocr.dpi);
    let ocr = TesseractOcr::new(&config.ocr.tesseract, &config.ocr.language);

    if !renderer.is_available() || !ocr.is_available() {
        warn!("pdftoppm/tesseract unavailable, pages without a text layer will come out empty");
    }

    ParallelExtractor::new(LopdfLoader::new(renderer), ocr, config.extraction_options())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn print_record(record: &ExtractedRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }
    for field in record.fields() {
        println!("{}: {}", field.name, field.value.as_deref().unwrap_or("-"));
    }
    Ok(())
}
