use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
/// Failures while resolving a target token to an editor instance port.
pub enum ResolutionError {
    #[error("instance registry not found at {}", path.display())]
    RegistryMissing { path: PathBuf },
    #[error("failed to read instance registry {}: {source}", path.display())]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse instance registry {}: {source}", path.display())]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not find Unity instance matching '{target}' in registry")]
    NoMatch { target: String },
}

#[derive(Debug, Error)]
/// Failures while fetching the skill catalog. Always fatal for a run.
pub enum CatalogError {
    #[error("skill catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("skill catalog returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("failed to decode skill catalog: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Transport-level failures of a single skill invocation.
pub enum InvokeError {
    #[error("request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Error)]
/// Failures while constructing a [`crate::SkillsClient`].
pub enum ClientBuildError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}
