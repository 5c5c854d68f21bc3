//! HTTP gateway URL construction.
//!
//! A gateway translates `(cid, path)` into the underlying file bytes. The
//! default subdomain style serves `https://{cid}.{host}/{path}`; public
//! gateways also expose the equivalent path style
//! `{base}/ipfs/{cid}/{path}`, which is what the test suite points at a
//! local mock server. Path components are percent-encoded per segment.

use crate::models::upload::Cid;

#[derive(Debug, Clone)]
enum Style {
    Subdomain { host: String },
    Path { base: String },
}

/// Stateless builder for gateway fetch URLs.
#[derive(Debug, Clone)]
pub struct Gateway {
    style: Style,
}

impl Gateway {
    /// Subdomain-style gateway, e.g. `ipfs.w3s.link`.
    pub fn subdomain(host: impl Into<String>) -> Self {
        Self {
            style: Style::Subdomain { host: host.into() },
        }
    }

    /// Path-style gateway rooted at `base`, e.g. `https://dweb.link`.
    pub fn path_style(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            style: Style::Path { base },
        }
    }

    /// Build the fetch URL for one file inside the bundle rooted at `cid`.
    pub fn file_url(&self, cid: &Cid, path: &str) -> String {
        let encoded = encode_path(path);
        match &self.style {
            Style::Subdomain { host } => format!("https://{cid}.{host}/{encoded}"),
            Style::Path { base } => format!("{base}/ipfs/{cid}/{encoded}"),
        }
    }
}

/// Shareable `ipfs://{cid}/{path}` URI. Emitted as an identifier only; this
/// application never resolves it.
pub fn ipfs_uri(cid: &Cid, path: &str) -> String {
    format!("ipfs://{cid}/{path}")
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
