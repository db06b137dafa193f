use std::fs;

use glow_core::catalog::Catalog;
use tracing::{info, warn};
use url::Url;

/// Load the catalog document, once at startup. The source may be a local
/// file path or an http(s) URL.
///
/// Failure is recoverable: the caller shows the error inline and continues
/// with an empty catalog.
pub async fn load_catalog(source: &str) -> anyhow::Result<Catalog> {
    let raw = if is_http_url(source) {
        info!(target: "providers::source", "fetching catalog from {}", source);
        let resp = reqwest::get(source).await?;
        if !resp.status().is_success() {
            anyhow::bail!("catalog fetch failed with status {}", resp.status());
        }
        resp.text().await?
    } else {
        info!(target: "providers::source", "reading catalog file {}", source);
        fs::read_to_string(source)
            .map_err(|e| anyhow::anyhow!("read catalog {}: {}", source, e))?
    };
    let catalog = Catalog::from_json(&raw)?;
    if catalog.is_empty() {
        warn!(target: "providers::source", "catalog loaded but contains no products");
    }
    Ok(catalog)
}

fn is_http_url(s: &str) -> bool {
    Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}
