use std::io;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{context}: {source}")]
    ResourceUnavailable {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Fetcher failed: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HarvestError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        HarvestError::InvalidArgument(message.into())
    }

    /// Wrap an I/O failure on `path` with a short description of what was attempted.
    pub fn unavailable(action: &str, path: &Path, source: io::Error) -> Self {
        HarvestError::ResourceUnavailable {
            context: format!("Failed to {} '{}'", action, path.display()),
            source,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, HarvestError::InvalidArgument(_))
    }

    pub fn is_resource_unavailable(&self) -> bool {
        matches!(self, HarvestError::ResourceUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
