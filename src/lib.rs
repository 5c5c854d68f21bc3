//! Client library for a content-addressed image gallery.
//!
//! An image and its caption are stored as a two-file bundle (the image plus
//! a `metadata.json` sidecar) under one content identifier on a remote
//! storage network; the gallery is later rebuilt by enumerating uploads that
//! carry the application's name prefix and fetching each sidecar back
//! through an HTTP gateway.

pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod services;
pub mod token_store;
