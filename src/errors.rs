//! Error taxonomy for the gallery client.
//!
//! `MissingToken` is detected before any network call and is meant to be
//! shown to the user as a plain message. Transport and API errors carry the
//! endpoint they came from; sidecar decode errors are caught per item by the
//! listing reconciler and never abort a whole listing pass.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("no API token configured")]
    MissingToken,

    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("storage API {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("gateway returned {status} for {url}")]
    Gateway { url: String, status: u16 },

    #[error("malformed metadata sidecar: {0}")]
    SidecarDecode(#[from] serde_json::Error),

    #[error("could not determine a configuration directory for the token store")]
    NoConfigDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type GalleryResult<T> = Result<T, GalleryError>;
