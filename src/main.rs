use anyhow::{Context, Result};
use clap::Parser;
use gallery_store::config::{AppConfig, Cli, Command, TokenAction};
use gallery_store::errors::GalleryError;
use gallery_store::gateway::Gateway;
use gallery_store::models::upload::Cid;
use gallery_store::services::reconciler::ListingReconciler;
use gallery_store::services::storage_client::{HttpStorageClient, StoreProgress};
use gallery_store::services::uploader::Uploader;
use gallery_store::token_store::TokenStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Reports upload progress through the log stream: the locally computed
/// identifier as soon as hashing finishes, then each chunk as it is sent.
struct CliProgress;

impl StoreProgress for CliProgress {
    fn local_id_ready(&self, cid: &Cid) {
        tracing::info!(%cid, "content identifier computed locally");
    }

    fn chunk_sent(&self, bytes: usize) {
        tracing::debug!(bytes, "chunk sent");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Upload { file, caption } => {
            let cfg = AppConfig::resolve(&cli.opts)?;
            upload(cfg, file, caption).await
        }
        Command::List => {
            let cfg = AppConfig::resolve(&cli.opts)?;
            list(cfg).await
        }
        Command::Token { action } => token(action),
    }
}

async fn upload(cfg: AppConfig, file: Option<PathBuf>, caption: String) -> Result<()> {
    let Some(path) = file else {
        tracing::warn!("no file selected; nothing to upload");
        return Ok(());
    };

    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no usable file name", path.display()))?;

    let backend = Arc::new(HttpStorageClient::new(&cfg.api_url, cfg.token.clone()));
    let uploader = Uploader::new(backend, Gateway::subdomain(&cfg.gateway_host));

    match uploader
        .store_image(&file_name, bytes.into(), &caption, Arc::new(CliProgress))
        .await
    {
        Ok(stored) => {
            println!("cid:          {}", stored.cid);
            println!("image url:    {}", stored.image_url);
            println!("image uri:    {}", stored.image_uri);
            println!("metadata url: {}", stored.metadata_url);
            println!("metadata uri: {}", stored.metadata_uri);
            Ok(())
        }
        Err(GalleryError::MissingToken) => {
            eprintln!("No API token configured. Run `gallery-store token set <token>` first.");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn list(cfg: AppConfig) -> Result<()> {
    let backend = Arc::new(HttpStorageClient::new(&cfg.api_url, cfg.token.clone()));
    let reconciler = ListingReconciler::new(backend, Gateway::subdomain(&cfg.gateway_host));

    let report = reconciler.list_gallery().await?;
    if report.items.is_empty() && report.failures.is_empty() {
        println!("gallery is empty");
        return Ok(());
    }

    for item in &report.items {
        println!("{}  \"{}\"  {}", item.cid, item.caption, item.gateway_url);
    }
    for failure in &report.failures {
        eprintln!(
            "skipped {} ({}): {}",
            failure.cid, failure.name, failure.reason
        );
    }
    Ok(())
}

fn token(action: TokenAction) -> Result<()> {
    let store = TokenStore::default_location()?;
    match action {
        TokenAction::Set { token } => {
            store.save(&token)?;
            println!("token saved");
        }
        TokenAction::Show => match store.load()? {
            Some(token) => println!("{token}"),
            None => println!("no token stored"),
        },
        TokenAction::Forget => {
            if store.forget()? {
                println!("token deleted");
            } else {
                println!("no token stored");
            }
        }
    }
    Ok(())
}
