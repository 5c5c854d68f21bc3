//! The metadata sidecar stored next to each image under the same content
//! identifier.

use crate::errors::GalleryResult;
use serde::{Deserialize, Serialize};

/// Name of the sidecar file inside every bundle.
pub const SIDECAR_FILE: &str = "metadata.json";

/// Caption metadata uploaded alongside an image.
///
/// `path` must equal the co-uploaded image filename, or gateway URLs built
/// from it at listing time will point at nothing. Nothing enforces this
/// beyond the upload orchestrator always writing both from the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub path: String,
    pub caption: String,
}

impl ImageMetadata {
    pub fn new(path: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            caption: caption.into(),
        }
    }

    /// Serialize to the JSON bytes stored on the network.
    pub fn encode(&self) -> GalleryResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a sidecar fetched back from the gateway. Malformed input is an
    /// error; the listing reconciler turns it into a per-item skip.
    pub fn decode(bytes: &[u8]) -> GalleryResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
