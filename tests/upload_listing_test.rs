//! End-to-end tests for the upload and listing workflows against mock HTTP
//! servers: the storage API for store/list and a path-style gateway for
//! sidecar fetches.

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use futures::stream::{self, BoxStream};
use gallery_store::errors::{GalleryError, GalleryResult};
use gallery_store::gateway::Gateway;
use gallery_store::models::sidecar::ImageMetadata;
use gallery_store::models::upload::{
    BundleFile, Cid, UploadBundle, UploadEntry, upload_name,
};
use gallery_store::services::reconciler::ListingReconciler;
use gallery_store::services::storage_client::{
    HttpStorageClient, NoProgress, StorageBackend, StoreProgress,
};
use gallery_store::services::uploader::Uploader;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct RecordingProgress {
    local: Mutex<Option<Cid>>,
    bytes_sent: AtomicUsize,
}

impl StoreProgress for RecordingProgress {
    fn local_id_ready(&self, cid: &Cid) {
        *self.local.lock().unwrap() = Some(cid.clone());
    }

    fn chunk_sent(&self, bytes: usize) {
        self.bytes_sent.fetch_add(bytes, Ordering::SeqCst);
    }
}

/// In-memory backend for reconciler tests.
struct FakeBackend {
    entries: Vec<UploadEntry>,
    missing_token: bool,
}

impl FakeBackend {
    fn with_entries(entries: Vec<UploadEntry>) -> Self {
        Self {
            entries,
            missing_token: false,
        }
    }

    fn without_token() -> Self {
        Self {
            entries: Vec::new(),
            missing_token: true,
        }
    }
}

#[async_trait]
impl StorageBackend for FakeBackend {
    async fn store(
        &self,
        _bundle: &UploadBundle,
        _name: &str,
        _progress: Arc<dyn StoreProgress>,
    ) -> GalleryResult<Cid> {
        panic!("store is not exercised by listing tests");
    }

    fn list(&self) -> BoxStream<'static, GalleryResult<UploadEntry>> {
        if self.missing_token {
            return Box::pin(stream::once(async {
                Err::<UploadEntry, _>(GalleryError::MissingToken)
            }));
        }
        Box::pin(stream::iter(
            self.entries.clone().into_iter().map(Ok::<_, GalleryError>),
        ))
    }
}

fn entry(cid: &str, name: &str) -> UploadEntry {
    UploadEntry {
        cid: Cid::new(cid),
        name: name.to_string(),
        created: None,
    }
}

// ── Upload orchestration ─────────────────────────────────────────────────

#[tokio::test]
async fn store_image_uploads_once_and_derives_four_links() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("Authorization", "Bearer secret-token"))
        .and(header("X-Name", "ImageGallery%7Chi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"cid": "bafyuploadcid"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = Arc::new(HttpStorageClient::new(
        server.uri(),
        Some("secret-token".to_string()),
    ));
    let uploader = Uploader::new(backend, Gateway::subdomain("ipfs.w3s.link"));

    let stored = uploader
        .store_image(
            "cat.png",
            Bytes::from_static(b"pretend png bytes"),
            "hi",
            Arc::new(NoProgress),
        )
        .await
        .expect("upload");

    assert_eq!(stored.cid, Cid::new("bafyuploadcid"));
    assert_eq!(
        stored.image_url,
        "https://bafyuploadcid.ipfs.w3s.link/cat.png"
    );
    assert_eq!(stored.image_uri, "ipfs://bafyuploadcid/cat.png");
    assert_eq!(
        stored.metadata_url,
        "https://bafyuploadcid.ipfs.w3s.link/metadata.json"
    );
    assert_eq!(stored.metadata_uri, "ipfs://bafyuploadcid/metadata.json");
}

#[tokio::test]
async fn store_image_reports_local_id_and_chunk_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"cid": "bafyprogress"})),
        )
        .mount(&server)
        .await;

    let image = Bytes::from_static(b"pixels pixels pixels");
    let sidecar = ImageMetadata::new("cat.png", "hi").encode().unwrap();
    let expected_local = Cid::for_bundle(&UploadBundle::new(vec![
        BundleFile::new("cat.png", image.clone()),
        BundleFile::new("metadata.json", sidecar.clone()),
    ]));
    let expected_bytes = image.len() + sidecar.len();

    let backend = Arc::new(HttpStorageClient::new(
        server.uri(),
        Some("secret-token".to_string()),
    ));
    let uploader = Uploader::new(backend, Gateway::subdomain("ipfs.w3s.link"));

    let progress = Arc::new(RecordingProgress::default());
    uploader
        .store_image("cat.png", image, "hi", progress.clone())
        .await
        .expect("upload");

    assert_eq!(progress.local.lock().unwrap().clone(), Some(expected_local));
    assert_eq!(progress.bytes_sent.load(Ordering::SeqCst), expected_bytes);
}

#[tokio::test]
async fn store_without_token_fails_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = Arc::new(HttpStorageClient::new(server.uri(), None));
    let uploader = Uploader::new(backend, Gateway::subdomain("ipfs.w3s.link"));

    let err = uploader
        .store_image(
            "cat.png",
            Bytes::from_static(b"pixels"),
            "hi",
            Arc::new(NoProgress),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GalleryError::MissingToken));
}

#[tokio::test]
async fn store_surfaces_api_errors_without_retrying() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let backend = Arc::new(HttpStorageClient::new(
        server.uri(),
        Some("secret-token".to_string()),
    ));
    let uploader = Uploader::new(backend, Gateway::subdomain("ipfs.w3s.link"));

    let err = uploader
        .store_image(
            "cat.png",
            Bytes::from_static(b"pixels"),
            "hi",
            Arc::new(NoProgress),
        )
        .await
        .unwrap_err();
    match err {
        GalleryError::Api { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ── Listing via the HTTP adapter ─────────────────────────────────────────

#[tokio::test]
async fn list_walks_pages_until_a_short_page() {
    let server = MockServer::start().await;

    let full_page: Vec<serde_json::Value> = (0..25)
        .map(|i| serde_json::json!({"cid": format!("cid-{i:02}"), "name": "ImageGallery|x"}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/user/uploads"))
        .and(query_param("page", "0"))
        .and(header("Authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(full_page))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/uploads"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"cid": "cid-25", "name": "ImageGallery|last", "created": "2026-08-01T12:00:00Z"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let backend = HttpStorageClient::new(server.uri(), Some("secret-token".to_string()));
    let entries: Vec<UploadEntry> = backend.list().try_collect().await.expect("listing");

    assert_eq!(entries.len(), 26);
    assert_eq!(entries[0].cid, Cid::new("cid-00"));
    assert_eq!(entries[25].cid, Cid::new("cid-25"));
    assert!(entries[25].created.is_some());
}

#[tokio::test]
async fn list_is_restartable_and_reenumerates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/uploads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"cid": "cid-a", "name": "ImageGallery|one"}
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let backend = HttpStorageClient::new(server.uri(), Some("secret-token".to_string()));
    let first: Vec<UploadEntry> = backend.list().try_collect().await.expect("first pass");
    let second: Vec<UploadEntry> = backend.list().try_collect().await.expect("second pass");
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
}

// ── Listing reconciliation ───────────────────────────────────────────────

#[tokio::test]
async fn one_bad_sidecar_never_aborts_the_listing() {
    let gateway_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ipfs/cid-good/metadata.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"path": "cat.png", "caption": "hi"})),
        )
        .expect(1)
        .mount(&gateway_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ipfs/cid-mangled/metadata.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .expect(1)
        .mount(&gateway_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ipfs/cid-gone/metadata.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&gateway_server)
        .await;
    // Uploads without the gallery prefix are never fetched.
    Mock::given(method("GET"))
        .and(path("/ipfs/cid-foreign/metadata.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&gateway_server)
        .await;

    let backend = Arc::new(FakeBackend::with_entries(vec![
        entry("cid-good", &upload_name("hi")),
        entry("cid-foreign", "backup-2024.tar"),
        entry("cid-mangled", &upload_name("bad json")),
        entry("cid-gone", &upload_name("vanished")),
    ]));
    let reconciler = ListingReconciler::new(backend, Gateway::path_style(gateway_server.uri()));

    let report = reconciler.list_gallery().await.expect("listing");

    assert_eq!(report.items.len(), 1);
    let item = &report.items[0];
    assert_eq!(item.cid, Cid::new("cid-good"));
    assert_eq!(item.path, "cat.png");
    assert_eq!(item.caption, "hi");
    assert_eq!(
        item.gateway_url,
        format!("{}/ipfs/cid-good/cat.png", gateway_server.uri())
    );
    assert_eq!(item.uri, "ipfs://cid-good/cat.png");

    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].cid, Cid::new("cid-mangled"));
    assert_eq!(report.failures[0].name, upload_name("bad json"));
    assert_eq!(report.failures[1].cid, Cid::new("cid-gone"));
    assert!(report.failures[1].reason.contains("404"));
}

#[tokio::test]
async fn listing_keeps_backend_enumeration_order() {
    let gateway_server = MockServer::start().await;

    for (cid, caption) in [("cid-1", "zebra"), ("cid-2", "apple"), ("cid-3", "mango")] {
        Mock::given(method("GET"))
            .and(path(format!("/ipfs/{cid}/metadata.json")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"path": "p.png", "caption": caption})),
            )
            .mount(&gateway_server)
            .await;
    }

    let backend = Arc::new(FakeBackend::with_entries(vec![
        entry("cid-1", &upload_name("zebra")),
        entry("cid-2", &upload_name("apple")),
        entry("cid-3", &upload_name("mango")),
    ]));
    let reconciler = ListingReconciler::new(backend, Gateway::path_style(gateway_server.uri()));

    let report = reconciler.list_gallery().await.expect("listing");
    let captions: Vec<&str> = report.items.iter().map(|i| i.caption.as_str()).collect();
    assert_eq!(captions, vec!["zebra", "apple", "mango"]);
}

#[tokio::test]
async fn listing_without_token_is_an_empty_report() {
    let backend = Arc::new(FakeBackend::without_token());
    let reconciler = ListingReconciler::new(backend, Gateway::path_style("http://127.0.0.1:1"));

    let report = reconciler.list_gallery().await.expect("listing");
    assert!(report.items.is_empty());
    assert!(report.failures.is_empty());
}
