//! Upload-side data: the content identifier, the two-file bundle sent to the
//! backend, and the naming convention that marks an upload as belonging to
//! this gallery.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Display-name prefix that tags uploads owned by this application. The same
/// credential may carry unrelated uploads; the listing reconciler only admits
/// names starting with this string.
pub const UPLOAD_NAME_PREFIX: &str = "ImageGallery";

const NAME_SEPARATOR: char = '|';

/// Compose the backend display name for an upload: `ImageGallery|<caption>`.
pub fn upload_name(caption: &str) -> String {
    format!("{UPLOAD_NAME_PREFIX}{NAME_SEPARATOR}{caption}")
}

/// Whether a declared upload name belongs to this gallery.
pub fn is_gallery_upload(name: &str) -> bool {
    name.starts_with(UPLOAD_NAME_PREFIX)
}

/// Opaque content identifier addressing one immutable bundle.
///
/// Produced by the backend once the bundle is hashed; also computed locally
/// before upload so the caller can show early feedback. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a content identifier from the bundle alone, with no network
    /// round trip: SHA-256 over each file's name and bytes, hex-encoded.
    pub fn for_bundle(bundle: &UploadBundle) -> Self {
        let mut hasher = Sha256::new();
        for file in &bundle.files {
            hasher.update(file.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(&file.bytes);
        }
        Self(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One file inside an upload bundle.
#[derive(Debug, Clone)]
pub struct BundleFile {
    pub name: String,
    pub bytes: Bytes,
}

impl BundleFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// The set of files stored under a single content identifier. For this
/// application that is always one image plus its `metadata.json` sidecar.
#[derive(Debug, Clone)]
pub struct UploadBundle {
    pub files: Vec<BundleFile>,
}

impl UploadBundle {
    pub fn new(files: Vec<BundleFile>) -> Self {
        Self { files }
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.bytes.len()).sum()
    }
}

/// One row of the backend's upload listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEntry {
    pub cid: Cid,
    pub name: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

/// Everything a caller needs after a successful upload: the identifier plus
/// a gateway URL and an `ipfs://` URI for both the image and its sidecar.
#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub cid: Cid,
    pub image_url: String,
    pub image_uri: String,
    pub metadata_url: String,
    pub metadata_uri: String,
}
