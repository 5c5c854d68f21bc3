//! Core data models for the content-addressed image gallery.
//!
//! Upload-side types describe what is sent to the storage backend; the
//! gallery types are derived transiently at listing time. Everything
//! serializes naturally as JSON via `serde`.

pub mod gallery;
pub mod sidecar;
pub mod upload;
