use crate::errors::GalleryError;
use crate::token_store::TokenStore;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::env;
use std::path::PathBuf;

const DEFAULT_API_URL: &str = "https://api.web3.storage";
const DEFAULT_GATEWAY_HOST: &str = "ipfs.w3s.link";

/// Centralized application configuration.
/// Combines environment variables, CLI arguments, and the token store.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub gateway_host: String,
    pub token: Option<String>,
}

/// Command-line interface for the gallery client.
#[derive(Parser, Debug)]
#[command(author, version, about = "Content-addressed image gallery client")]
pub struct Cli {
    #[command(flatten)]
    pub opts: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Storage API base URL (overrides GALLERY_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Gateway host used to build fetch URLs (overrides GALLERY_GATEWAY_HOST)
    #[arg(long)]
    pub gateway_host: Option<String>,

    /// API token (overrides GALLERY_TOKEN and the stored token)
    #[arg(long)]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload an image with an optional caption
    Upload {
        /// Image file to upload; nothing happens when omitted
        file: Option<PathBuf>,

        /// Caption stored in the metadata sidecar
        #[arg(long, default_value = "")]
        caption: String,
    },

    /// List previously uploaded gallery images
    List,

    /// Manage the stored API token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Persist an API token for later runs
    Set { token: String },
    /// Show whether a token is stored
    Show,
    /// Delete the stored token
    Forget,
}

impl AppConfig {
    /// Merge CLI flags, environment variables, and the token store into one
    /// config. Token precedence: `--token` flag, then `GALLERY_TOKEN`, then
    /// the persisted token file.
    pub fn resolve(opts: &GlobalOpts) -> Result<Self> {
        let env_api = env::var("GALLERY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let env_gateway =
            env::var("GALLERY_GATEWAY_HOST").unwrap_or_else(|_| DEFAULT_GATEWAY_HOST.into());

        let token = match opts.token.clone().or_else(|| env::var("GALLERY_TOKEN").ok()) {
            Some(token) => Some(token),
            None => match TokenStore::default_location() {
                Ok(store) => store.load()?,
                Err(GalleryError::NoConfigDir) => None,
                Err(err) => return Err(err.into()),
            },
        };

        Ok(Self {
            api_url: opts.api_url.clone().unwrap_or(env_api),
            gateway_host: opts.gateway_host.clone().unwrap_or(env_gateway),
            token,
        })
    }
}
