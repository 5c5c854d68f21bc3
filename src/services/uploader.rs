//! Upload orchestration: one captioned image in, one stored bundle out.

use crate::errors::GalleryResult;
use crate::gateway::{Gateway, ipfs_uri};
use crate::models::sidecar::{ImageMetadata, SIDECAR_FILE};
use crate::models::upload::{BundleFile, StoredImage, UploadBundle, upload_name};
use crate::services::storage_client::{StorageBackend, StoreProgress};
use bytes::Bytes;
use std::sync::Arc;

/// Builds the metadata sidecar for a selected image, stores both files as a
/// single content-addressed bundle, and derives the shareable links from the
/// resulting identifier. Exactly one `store` call per invocation, no retry;
/// errors propagate to the caller.
pub struct Uploader {
    backend: Arc<dyn StorageBackend>,
    gateway: Gateway,
}

impl Uploader {
    pub fn new(backend: Arc<dyn StorageBackend>, gateway: Gateway) -> Self {
        Self { backend, gateway }
    }

    /// Store `file_name`/`image` with `caption` (which may be empty) and
    /// return the CID plus a gateway URL and `ipfs://` URI for both the
    /// image and its sidecar.
    pub async fn store_image(
        &self,
        file_name: &str,
        image: Bytes,
        caption: &str,
        progress: Arc<dyn StoreProgress>,
    ) -> GalleryResult<StoredImage> {
        let sidecar = ImageMetadata::new(file_name, caption).encode()?;
        let bundle = UploadBundle::new(vec![
            BundleFile::new(file_name, image),
            BundleFile::new(SIDECAR_FILE, sidecar),
        ]);

        let name = upload_name(caption);
        let cid = self.backend.store(&bundle, &name, progress).await?;

        Ok(StoredImage {
            image_url: self.gateway.file_url(&cid, file_name),
            image_uri: ipfs_uri(&cid, file_name),
            metadata_url: self.gateway.file_url(&cid, SIDECAR_FILE),
            metadata_uri: ipfs_uri(&cid, SIDECAR_FILE),
            cid,
        })
    }
}
