//! src/services/storage_client.rs
//!
//! Storage client adapter — hides the backend's chunked-upload and
//! pagination protocol behind two operations: `store` one bundle under a
//! single content identifier, and `list` every upload owned by the
//! credential. The credential is an explicit constructor input; nothing here
//! reads ambient state. No timeouts and no retries: a failed call surfaces
//! once and the caller decides.

use crate::errors::{GalleryError, GalleryResult};
use crate::models::upload::{Cid, UploadBundle, UploadEntry};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, TryStreamExt};
use reqwest::multipart;
use std::sync::Arc;

/// Bytes per network write. `chunk_sent` fires once per chunk as the
/// connection pulls it off the body stream.
const CHUNK_SIZE: usize = 1024 * 1024;

/// Listing page size requested from the backend.
const LIST_PAGE_SIZE: usize = 25;

/// Observer for upload progress.
///
/// `local_id_ready` fires synchronously with the locally computed content
/// identifier before any network transfer begins; `chunk_sent` fires after
/// each network write with the byte count sent. Both default to no-ops.
pub trait StoreProgress: Send + Sync {
    fn local_id_ready(&self, _cid: &Cid) {}
    fn chunk_sent(&self, _bytes: usize) {}
}

/// Progress observer that ignores everything.
pub struct NoProgress;

impl StoreProgress for NoProgress {}

/// The two operations the rest of the crate needs from a storage backend.
///
/// Object-safe so tests can substitute an in-memory implementation.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store one bundle under a single content identifier, reporting
    /// progress along the way. Fails with `MissingToken` before any network
    /// call when no credential is configured.
    async fn store(
        &self,
        bundle: &UploadBundle,
        name: &str,
        progress: Arc<dyn StoreProgress>,
    ) -> GalleryResult<Cid>;

    /// Lazy, restartable sequence of every upload owned by the credential,
    /// in backend enumeration order. Each call re-enumerates; nothing is
    /// cached.
    fn list(&self) -> BoxStream<'static, GalleryResult<UploadEntry>>;
}

/// HTTP implementation of [`StorageBackend`].
///
/// Wire protocol: `POST {api}/upload` with a multipart body and the display
/// name in a percent-encoded `X-Name` header, returning `{"cid": "..."}`;
/// `GET {api}/user/uploads?page=N&size=M` returning a JSON array per page.
#[derive(Debug, Clone)]
pub struct HttpStorageClient {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

#[derive(serde::Deserialize)]
struct UploadResponse {
    cid: Cid,
}

impl HttpStorageClient {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }
}

#[async_trait]
impl StorageBackend for HttpStorageClient {
    async fn store(
        &self,
        bundle: &UploadBundle,
        name: &str,
        progress: Arc<dyn StoreProgress>,
    ) -> GalleryResult<Cid> {
        let token = self.token.as_deref().ok_or(GalleryError::MissingToken)?;

        // Hash the whole bundle up front so the caller gets an identifier
        // before the first byte leaves the machine.
        let local = Cid::for_bundle(bundle);
        progress.local_id_ready(&local);
        tracing::debug!(
            cid = %local,
            files = bundle.files.len(),
            bytes = bundle.total_bytes(),
            "bundle hashed locally"
        );

        let mut form = multipart::Form::new();
        for file in &bundle.files {
            form = form.part(
                "file",
                chunked_part(&file.name, &file.bytes, Arc::clone(&progress)),
            );
        }

        let endpoint = format!("{}/upload", self.api_url);
        let resp = self
            .client
            .post(&endpoint)
            .bearer_auth(token)
            .header("X-Name", urlencoding::encode(name).into_owned())
            .multipart(form)
            .send()
            .await
            .map_err(|source| GalleryError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GalleryError::Api {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadResponse =
            resp.json()
                .await
                .map_err(|source| GalleryError::Http { endpoint, source })?;
        tracing::info!(cid = %uploaded.cid, name, "bundle stored");
        Ok(uploaded.cid)
    }

    fn list(&self) -> BoxStream<'static, GalleryResult<UploadEntry>> {
        let client = self.client.clone();
        let endpoint = format!("{}/user/uploads", self.api_url);
        let token = self.token.clone();

        // One page per unfold step; a short or empty page ends the walk.
        let pages = stream::try_unfold(Some(0u32), move |state| {
            let client = client.clone();
            let endpoint = endpoint.clone();
            let token = token.clone();
            async move {
                let Some(page) = state else {
                    return Ok(None);
                };
                let token = token.ok_or(GalleryError::MissingToken)?;
                let resp = client
                    .get(&endpoint)
                    .query(&[
                        ("page", page.to_string()),
                        ("size", LIST_PAGE_SIZE.to_string()),
                    ])
                    .bearer_auth(&token)
                    .send()
                    .await
                    .map_err(|source| GalleryError::Http {
                        endpoint: endpoint.clone(),
                        source,
                    })?;

                let status = resp.status();
                if !status.is_success() {
                    let body = resp.text().await.unwrap_or_default();
                    return Err(GalleryError::Api {
                        endpoint: endpoint.clone(),
                        status: status.as_u16(),
                        body,
                    });
                }

                let entries: Vec<UploadEntry> =
                    resp.json().await.map_err(|source| GalleryError::Http {
                        endpoint: endpoint.clone(),
                        source,
                    })?;
                tracing::debug!(page, count = entries.len(), "fetched upload listing page");

                let next = (entries.len() >= LIST_PAGE_SIZE).then(|| page + 1);
                Ok(Some((
                    stream::iter(entries.into_iter().map(Ok::<_, GalleryError>)),
                    next,
                )))
            }
        })
        .try_flatten();

        Box::pin(pages)
    }
}

/// Build one multipart part whose body is streamed in `CHUNK_SIZE` slices,
/// firing the progress observer as each slice is pulled onto the wire.
fn chunked_part(name: &str, bytes: &Bytes, progress: Arc<dyn StoreProgress>) -> multipart::Part {
    let length = bytes.len() as u64;
    let chunks = chunk_bytes(bytes, CHUNK_SIZE);
    let body = reqwest::Body::wrap_stream(stream::iter(chunks.into_iter().map(move |chunk| {
        progress.chunk_sent(chunk.len());
        Ok::<Bytes, std::io::Error>(chunk)
    })));
    multipart::Part::stream_with_length(body, length).file_name(name.to_string())
}

/// Split into zero-copy slices of at most `size` bytes.
fn chunk_bytes(bytes: &Bytes, size: usize) -> Vec<Bytes> {
    let mut chunks = Vec::with_capacity(bytes.len().div_ceil(size.max(1)));
    let mut offset = 0;
    while offset < bytes.len() {
        let end = (offset + size).min(bytes.len());
        chunks.push(bytes.slice(offset..end));
        offset = end;
    }
    chunks
}
