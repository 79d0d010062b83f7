//! Verity CLI — submit a media file to the analysis service and show the verdict.
//!
//! Set VERITY_API_URL (or API_URL) and optionally VERITY_PREDICT_PATH; `--url` and
//! `--path` override them.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use verity_api_client::{ClientConfig, ReqwestTransport};
use verity_cli::{
    failure_hint, init_tracing, print_json, progress_line, AcceptFilter, DEFAULT_ACCEPT,
};
use verity_core::{SelectedFile, SubmitOutcome, UploadController, UploadState};

#[derive(Parser)]
#[command(name = "verity", about = "Verity media analysis CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image or video for analysis
    Analyze {
        /// Path to the file to upload
        file: PathBuf,
        /// Base URL of the analysis service
        #[arg(long)]
        url: Option<String>,
        /// Endpoint path of the prediction route
        #[arg(long)]
        path: Option<String>,
        /// Accepted types: media ranges or extensions, comma separated
        #[arg(long, default_value = DEFAULT_ACCEPT)]
        accept: String,
        /// Print the final upload snapshot as JSON instead of only the result
        #[arg(long)]
        json: bool,
    },
    /// Print the effective client configuration
    Config {
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        path: Option<String>,
    },
}

fn client_config(url: Option<&str>, path: Option<&str>) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context(
        "Failed to load client configuration. Check VERITY_API_URL and VERITY_* settings",
    )?;
    if let Some(url) = url {
        config = config.with_base_url(url);
    }
    if let Some(path) = path {
        config = config.with_predict_path(path);
    }
    config.validate()?;
    Ok(config)
}

async fn analyze(
    file: PathBuf,
    config: ClientConfig,
    accept: &AcceptFilter,
    json: bool,
) -> anyhow::Result<()> {
    let transport = ReqwestTransport::new(config)?;
    tracing::debug!(
        endpoint = %transport.config().endpoint_url(),
        timeout_secs = transport.config().timeout_secs,
        chunk_size_bytes = transport.config().chunk_size_bytes,
        "HTTP transport ready"
    );
    let selected = SelectedFile::from_path(&file)
        .await
        .with_context(|| format!("Failed to load {}", file.display()))?;

    if !accept.allows(&selected) {
        anyhow::bail!(
            "{} ({}) is not an accepted file type. Accepted: {}",
            selected.name(),
            selected.content_type(),
            accept.describe()
        );
    }

    let mut controller = UploadController::new(Arc::new(transport));
    eprintln!("Selected: {}", selected.name());
    controller.select_file(selected);

    if let SubmitOutcome::Started { attempt } = controller.submit() {
        tracing::debug!(attempt, "Upload started");
    }

    let mut shown = None;
    while let Some(percent) = controller.state().percent() {
        if shown != Some(percent) {
            eprint!("\r{}", progress_line(percent));
            shown = Some(percent);
        }

        tokio::select! {
            _ = controller.next_event() => {}
            _ = tokio::signal::ctrl_c() => {
                controller.cancel();
            }
        }
    }

    if let Some(result) = controller.state().result() {
        eprintln!("\r{}", progress_line(controller.display_percent()));
        if json {
            print_json(&controller.snapshot())?;
        } else {
            print_json(result)?;
        }
        return Ok(());
    }

    match controller.state() {
        UploadState::Failed { error } => {
            eprintln!();
            if json {
                print_json(&controller.snapshot())?;
            }
            eprintln!("Hint: {}", failure_hint(error));
            Err(anyhow::anyhow!(
                "{} ({})",
                error.message,
                error.kind.error_code()
            ))
        }
        UploadState::Ready => {
            eprintln!();
            Err(anyhow::anyhow!("Upload cancelled"))
        }
        other => Err(anyhow::anyhow!("Upload ended in unexpected state {:?}", other)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            url,
            path,
            accept,
            json,
        } => {
            let config = client_config(url.as_deref(), path.as_deref())?;
            let accept = AcceptFilter::parse(&accept);
            analyze(file, config, &accept, json).await?;
        }
        Commands::Config { url, path } => {
            let config = client_config(url.as_deref(), path.as_deref())?;
            print_json(&serde_json::json!({
                "endpoint": config.endpoint_url(),
                "config": config,
            }))?;
        }
    }

    Ok(())
}
