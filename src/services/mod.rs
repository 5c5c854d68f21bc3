//! Service layer: the storage client adapter plus the two workflows built
//! on top of it — upload orchestration and listing reconciliation.

pub mod reconciler;
pub mod storage_client;
pub mod uploader;
