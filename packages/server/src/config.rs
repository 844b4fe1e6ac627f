use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::import::{ImportOptions, DEFAULT_GAME_NAME, DEFAULT_GAME_VERSION};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub catalog_base_url: String,
    pub catalog_game_version: String,
    pub game_name: String,
    pub enable_downloads: bool,
    pub uploads_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "mod-registry".to_string()),
            catalog_base_url: env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| catalog_client::DEFAULT_BASE_URL.to_string()),
            catalog_game_version: env::var("CATALOG_GAME_VERSION")
                .unwrap_or_else(|_| DEFAULT_GAME_VERSION.to_string()),
            game_name: env::var("GAME_NAME").unwrap_or_else(|_| DEFAULT_GAME_NAME.to_string()),
            enable_downloads: parse_flag(env::var("ENABLE_DOWNLOADS").ok().as_deref())
                .context("ENABLE_DOWNLOADS must be true or false")?,
            uploads_dir: env::var("UPLOADS_DIR")
                .unwrap_or_else(|_| "./storage/uploads".to_string()),
        })
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            game_name: self.game_name.clone(),
            game_version: self.catalog_game_version.clone(),
            download_artifacts: self.enable_downloads,
        }
    }
}

fn parse_flag(raw: Option<&str>) -> Result<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => anyhow::bail!("unexpected value {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag(None).unwrap());
        assert!(!parse_flag(Some("false")).unwrap());
        assert!(parse_flag(Some("TRUE")).unwrap());
        assert!(parse_flag(Some("1")).unwrap());
        assert!(parse_flag(Some("yes please")).is_err());
    }
}
