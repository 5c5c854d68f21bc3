//! Display-ready records assembled at listing time. Nothing here is
//! persisted; the gallery is recomputed from the backend on every pass.

use crate::models::upload::Cid;
use serde::Serialize;

/// One resolvable gallery entry.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryItem {
    pub cid: Cid,
    pub path: String,
    pub caption: String,
    pub gateway_url: String,
    pub uri: String,
}

/// An upload that matched the gallery prefix but whose sidecar could not be
/// resolved. Carried explicitly so callers can report it instead of relying
/// on logs.
#[derive(Debug, Clone, Serialize)]
pub struct ListingFailure {
    pub cid: Cid,
    pub name: String,
    pub reason: String,
}

/// Outcome of one listing pass: successes in backend enumeration order plus
/// the items that were skipped. An empty report is not an error.
#[derive(Debug, Default, Serialize)]
pub struct ListingReport {
    pub items: Vec<GalleryItem>,
    pub failures: Vec<ListingFailure>,
}
