//! docrelay CLI: run the add-in workflows against local files.
//!
//! Set DOCRELAY_API_URL (or pass --api-url) to point at the relay.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use docrelay_cli::{init_tracing, FileHost};
use docrelay_client::{addin::content_type_for, AddinWorkflow, ApiClient, BinaryDocument};
use docrelay_core::{Operation, OperationOptions, OperationRequest, UploadedFile, WatermarkOptions};
use serde::Serialize;

const DEFAULT_API_URL: &str = "http://localhost:3001";

#[derive(Parser)]
#[command(name = "docrelay", about = "Command-line client for the docrelay API")]
struct Cli {
    /// Relay base URL (defaults to DOCRELAY_API_URL, then a local relay)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 120)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from a document and write it to a file (or stdout)
    Extract {
        /// Document to extract from
        file: PathBuf,
        /// Where to write the text
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Skip table extraction
        #[arg(long)]
        no_tables: bool,
        /// Extract key-value pairs
        #[arg(long)]
        key_value_pairs: bool,
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Convert an Office document to PDF and print the viewer links
    Convert {
        file: PathBuf,
    },
    /// Add a text watermark to a PDF
    Watermark {
        file: PathBuf,
        #[arg(long, default_value = "CONFIDENTIAL")]
        text: String,
        #[arg(long, default_value = "center")]
        position: String,
        #[arg(long, default_value_t = 0.5)]
        opacity: f32,
        #[arg(long, default_value_t = 45)]
        rotation: i32,
        #[arg(long, default_value = "#FF0000")]
        color: String,
        #[arg(long, short, default_value = "watermarked_document.pdf")]
        output: PathBuf,
    },
    /// Run OCR over a PDF
    Ocr {
        file: PathBuf,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long, short, default_value = "ocr_processed_document.pdf")]
        output: PathBuf,
    },
    /// Run one operation over several files and print the batch report
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// extract, convert, watermark or ocr
        #[arg(long, default_value = "extract")]
        operation: String,
        #[arg(long)]
        tables: bool,
        #[arg(long)]
        key_value_pairs: bool,
        #[arg(long, default_value = "en")]
        language: String,
        #[arg(long)]
        watermark_text: Option<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

async fn read_file(path: &Path) -> anyhow::Result<UploadedFile> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    let content_type = content_type_for(&name);
    Ok(UploadedFile::new(name, content_type, Bytes::from(data)))
}

async fn save(document: &BinaryDocument, output: &Path) -> anyhow::Result<()> {
    tokio::fs::write(output, &document.data)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(
        path = %output.display(),
        bytes = document.data.len(),
        content_type = %document.content_type,
        "Saved result"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let api_url = cli
        .api_url
        .or_else(|| std::env::var("DOCRELAY_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let client = ApiClient::with_timeout(api_url, Duration::from_secs(cli.timeout))
        .context("Failed to create API client")?;

    match cli.command {
        Commands::Extract {
            file,
            output,
            no_tables,
            key_value_pairs,
            language,
        } => {
            let options = OperationOptions {
                extract_tables: !no_tables,
                extract_key_value_pairs: key_value_pairs,
                language,
                ..Default::default()
            };
            let workflow = AddinWorkflow::new(client, FileHost::new(file, output))
                .with_extract_options(options);
            workflow.extract_and_insert().await?;
        }
        Commands::Convert { file } => {
            let workflow = AddinWorkflow::new(client, FileHost::new(file, None));
            let report = workflow.convert_to_pdf().await?;
            print_json(&report.outcome)?;
            let failed = report.failed_files().count();
            if failed > 0 {
                anyhow::bail!("{} file(s) failed", failed);
            }
        }
        Commands::Watermark {
            file,
            text,
            position,
            opacity,
            rotation,
            color,
            output,
        } => {
            let pdf = read_file(&file).await?;
            let options = WatermarkOptions {
                text,
                position,
                opacity,
                rotation,
                font_color: color,
            };
            let workflow = AddinWorkflow::new(client, FileHost::new(file, None));
            let document = workflow.watermark_pdf(pdf.data, &options).await?;
            save(&document, &output).await?;
        }
        Commands::Ocr {
            file,
            language,
            output,
        } => {
            let pdf = read_file(&file).await?;
            let workflow = AddinWorkflow::new(client, FileHost::new(file, None));
            let document = workflow.ocr_pdf(pdf.data, &language).await?;
            save(&document, &output).await?;
        }
        Commands::Upload {
            files,
            operation,
            tables,
            key_value_pairs,
            language,
            watermark_text,
        } => {
            let mut request = OperationRequest::new(operation.parse::<Operation>()?);
            request.options.extract_tables = tables;
            request.options.extract_key_value_pairs = key_value_pairs;
            request.options.language = language;
            if let Some(text) = watermark_text {
                request.options.watermark.text = text;
            }

            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(read_file(path).await?);
            }

            let report = client.upload(&uploads, &request).await?;
            print_json(&report.outcome)?;
            let failed = report.failed_files().count();
            if failed > 0 {
                anyhow::bail!("{} of {} file(s) failed", failed, report.files().len());
            }
        }
    }

    Ok(())
}
