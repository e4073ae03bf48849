//! crmkit CLI: media uploads and CSV bulk imports against the CRM API.
//!
//! Configuration comes from the environment (and `.env`): CRMKIT_API_URL for
//! the internal API, CLOUDINARY_* for hosted media uploads.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crmkit_api_client::ApiClient;
use crmkit_cli::{format_hint, init_tracing, render_table, StderrNotifier};
use crmkit_core::validation::content_type_for_path;
use crmkit_core::{Credential, MediaKind, PipelineConfig, PipelineError, UploadRequest};
use crmkit_import::{write_template, BulkSubmitter, ImportProfile, ImportSession, PREVIEW_ROWS};
use crmkit_upload::{Destination, UploadPipeline};
use serde::Serialize;

const TOKEN_VAR: &str = "CRMKIT_TOKEN";
const PREVIEW_COLUMN_WIDTH: usize = 22;

#[derive(Parser)]
#[command(name = "crmkit", about = "CRM media upload and CSV import CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image or video to the hosted media service
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Media class: image or video
        #[arg(long, default_value = "image")]
        kind: MediaKind,
        /// Override the detected MIME type
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Upload a file to object storage through a presigned URL
    UploadObject {
        /// Path to the file to upload
        file: PathBuf,
        /// Override the detected MIME type
        #[arg(long)]
        content_type: Option<String>,
        /// Bearer token (defaults to CRMKIT_TOKEN)
        #[arg(long)]
        token: Option<String>,
    },
    /// Validate a CSV, show a preview and submit it in bulk
    Import {
        /// Import profile: customers, leads, user-leads
        profile: ImportProfile,
        /// CSV file
        file: PathBuf,
        /// Bearer token (defaults to CRMKIT_TOKEN)
        #[arg(long)]
        token: Option<String>,
        /// Validate and preview only
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a sample CSV for an import profile
    Template {
        /// Import profile: customers, leads, user-leads
        profile: ImportProfile,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn resolve_token(flag: Option<String>) -> Option<Credential> {
    flag.or_else(|| std::env::var(TOKEN_VAR).ok())
        .filter(|t| !t.trim().is_empty())
        .map(Credential::bearer)
}

async fn read_upload(path: &Path, content_type: Option<String>) -> anyhow::Result<UploadRequest> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file: {}", path.display()))?;
    let content_type = content_type.unwrap_or_else(|| content_type_for_path(path).to_string());

    Ok(UploadRequest::new(file_name, content_type, data))
}

/// Print the error's suggested action, if it has one, and pass the error on.
fn with_hint(err: PipelineError) -> PipelineError {
    if let Some(hint) = format_hint(&err) {
        eprintln!("{}", hint);
    }
    err
}

async fn run_upload(
    pipeline: &UploadPipeline,
    destination: Destination,
    request: UploadRequest,
    credential: Option<&Credential>,
) -> anyhow::Result<()> {
    let task = pipeline
        .start(destination, request, credential)
        .map_err(with_hint)
        .context("Upload failed")?;
    let upload_id = task.id();
    let started_at = task.started_at();

    let result = task
        .finish(|progress| {
            eprint!("\rUploading... {:>3}%", progress.percent_complete);
        })
        .await;
    eprintln!();

    let result = result.map_err(with_hint).context("Upload failed")?;
    print_json(&serde_json::json!({
        "upload_id": upload_id.to_string(),
        "started_at": started_at.to_rfc3339(),
        "public_url": result.public_url,
        "stored_format": result.stored_format,
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env();
    let client = ApiClient::from_config(&config).context("Failed to create HTTP client")?;
    let notifier = Arc::new(StderrNotifier);

    match cli.command {
        Commands::Upload {
            file,
            kind,
            content_type,
        } => {
            let request = read_upload(&file, content_type).await?;
            let pipeline = UploadPipeline::new(client, config).with_notifier(notifier);
            run_upload(&pipeline, Destination::Hosted(kind), request, None).await?;
        }
        Commands::UploadObject {
            file,
            content_type,
            token,
        } => {
            let request = read_upload(&file, content_type).await?;
            let credential = resolve_token(token);
            let pipeline = UploadPipeline::new(client, config).with_notifier(notifier);
            run_upload(
                &pipeline,
                Destination::ObjectStorage,
                request,
                credential.as_ref(),
            )
            .await?;
        }
        Commands::Import {
            profile,
            file,
            token,
            dry_run,
        } => {
            let mut session = ImportSession::new(profile);
            let csv = std::fs::File::open(&file)
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let batch = session
                .load(csv)
                .map_err(with_hint)
                .context("Invalid CSV")?;

            println!(
                "{} row(s) parsed for {} (showing first {}):\n",
                batch.len(),
                profile,
                PREVIEW_ROWS.min(batch.len())
            );
            print!(
                "{}",
                render_table(batch.headers(), batch.preview(), PREVIEW_COLUMN_WIDTH)
            );

            if dry_run {
                println!("\nDry run: nothing submitted.");
                return Ok(());
            }

            let credential = resolve_token(token).with_context(|| {
                format!("A bearer token is required: pass --token or set {}", TOKEN_VAR)
            })?;
            let submitter = BulkSubmitter::from_config(client, &config)
                .context("Import is not configured")?
                .with_notifier(notifier);
            let summary = session
                .submit(&submitter, &credential)
                .await
                .map_err(with_hint)
                .context("Import failed")?;

            print_json(&serde_json::json!({
                "profile": summary.profile,
                "submitted": summary.submitted,
            }))?;
        }
        Commands::Template { profile, output } => match output {
            Some(path) => {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                write_template(&profile, file)?;
                eprintln!("Wrote {} template to {}", profile, path.display());
            }
            None => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                write_template(&profile, &mut handle)?;
                handle.flush()?;
            }
        },
    }

    Ok(())
}
