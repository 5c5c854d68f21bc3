//! Listing reconciliation: rebuild the gallery from the backend on every
//! pass.
//!
//! Uploads are walked sequentially, one sidecar fetch at a time, so backend
//! load stays bounded at the cost of listing latency growing linearly with
//! upload count. One unresolvable item never aborts the pass; it is recorded
//! in the report's failure list and skipped.

use crate::errors::{GalleryError, GalleryResult};
use crate::gateway::{Gateway, ipfs_uri};
use crate::models::gallery::{GalleryItem, ListingFailure, ListingReport};
use crate::models::sidecar::{ImageMetadata, SIDECAR_FILE};
use crate::models::upload::{Cid, is_gallery_upload};
use crate::services::storage_client::StorageBackend;
use futures::StreamExt;
use std::sync::Arc;

pub struct ListingReconciler {
    backend: Arc<dyn StorageBackend>,
    gateway: Gateway,
    http: reqwest::Client,
}

impl ListingReconciler {
    pub fn new(backend: Arc<dyn StorageBackend>, gateway: Gateway) -> Self {
        Self {
            backend,
            gateway,
            http: reqwest::Client::new(),
        }
    }

    /// Enumerate the credential's uploads, keep those carrying the gallery
    /// name prefix, and resolve each one's sidecar into a display-ready
    /// item. Successes keep backend enumeration order. An absent credential
    /// yields an empty report rather than an error.
    pub async fn list_gallery(&self) -> GalleryResult<ListingReport> {
        let mut report = ListingReport::default();
        let mut uploads = self.backend.list();

        while let Some(entry) = uploads.next().await {
            let entry = match entry {
                Ok(entry) => entry,
                Err(GalleryError::MissingToken) => {
                    tracing::warn!("no API token configured; gallery is empty");
                    break;
                }
                Err(err) => return Err(err),
            };

            if !is_gallery_upload(&entry.name) {
                tracing::debug!(cid = %entry.cid, name = %entry.name, "skipping foreign upload");
                continue;
            }

            match self.fetch_sidecar(&entry.cid).await {
                Ok(meta) => report.items.push(GalleryItem {
                    gateway_url: self.gateway.file_url(&entry.cid, &meta.path),
                    uri: ipfs_uri(&entry.cid, &meta.path),
                    cid: entry.cid,
                    path: meta.path,
                    caption: meta.caption,
                }),
                Err(err) => {
                    tracing::warn!(cid = %entry.cid, error = %err, "skipping unresolvable upload");
                    report.failures.push(ListingFailure {
                        cid: entry.cid,
                        name: entry.name,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn fetch_sidecar(&self, cid: &Cid) -> GalleryResult<ImageMetadata> {
        let url = self.gateway.file_url(cid, SIDECAR_FILE);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| GalleryError::Http {
                endpoint: url.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GalleryError::Gateway {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|source| GalleryError::Http {
                endpoint: url,
                source,
            })?;
        ImageMetadata::decode(&bytes)
    }
}
