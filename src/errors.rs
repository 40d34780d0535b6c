//! Error types for loading forms and configuration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Failed to parse form layout {path}: {source}")]
    LayoutParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse field values: {0}")]
    ValuesParse(#[source] serde_json::Error),

    #[error("Unknown built-in layout '{0}'. Available layouts: windows")]
    UnknownLayout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
