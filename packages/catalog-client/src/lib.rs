//! Pure REST client for the BeatMods v1 mod catalog.
//!
//! Fetches the full mod listing for a game version and downloads the archives
//! it references. The client does no interpretation of the entries beyond
//! deserializing them.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_client::CatalogClient;
//!
//! let client = CatalogClient::new("https://beatmods.com".into());
//!
//! let mods = client.fetch_mods("1.39.0").await?;
//! for entry in &mods {
//!     println!("{} v{}", entry.name, entry.version);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{CatalogError, Result};
pub use types::{CatalogDownload, CatalogMod, DependencyRef, FileHash};

pub const DEFAULT_BASE_URL: &str = "https://beatmods.com";

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch every catalog entry published for `game_version`.
    ///
    /// Any non-success status or a body that is not a JSON array fails the
    /// whole call.
    pub async fn fetch_mods(&self, game_version: &str) -> Result<Vec<CatalogMod>> {
        let url = format!("{}/api/v1/mod?version={}", self.base_url, game_version);
        tracing::info!(url = %url, "Fetching catalog listing");

        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_listing(body)
    }

    /// Download an archive. `path` is the catalog-relative url found on a
    /// [`CatalogDownload`].
    pub async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        };
        tracing::debug!(url = %url, "Downloading catalog archive");

        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

fn parse_listing(body: serde_json::Value) -> Result<Vec<CatalogMod>> {
    if !body.is_array() {
        return Err(CatalogError::Malformed(
            "expected a JSON array of mods".to_string(),
        ));
    }

    serde_json::from_value(body).map_err(|e| CatalogError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_array_body_is_malformed() {
        let result = parse_listing(json!({ "message": "down for maintenance" }));
        assert!(matches!(result, Err(CatalogError::Malformed(_))));
    }

    #[test]
    fn test_array_body_parses() {
        let mods = parse_listing(json!([
            { "name": "BSIPA", "version": "4.3.5", "status": "approved" }
        ]))
        .unwrap();
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].name, "BSIPA");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = CatalogClient::new("https://beatmods.com/".to_string());
        assert_eq!(client.base_url, "https://beatmods.com");
    }
}
