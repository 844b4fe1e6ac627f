use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed catalog response: {0}")]
    Malformed(String),
}
