//! Error taxonomy for the upload pipeline.
//!
//! Each pipeline stage has its own error type so the operator-facing
//! message distinguishes the failure class (archive vs. URL vs.
//! credentials vs. network) before the process exits non-zero.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while packaging the source directory into a ZIP archive.
/// Fatal; a partially written archive is never treated as valid input
/// to the upload step.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("source directory {} does not exist or is not a directory", .0.display())]
    SourceMissing(PathBuf),

    #[error("failed to write archive {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("zip encoding failed")]
    Zip(#[from] zip::result::ZipError),
}

/// A storage URL candidate failed the liveness check.
///
/// The classification is advisory: it selects the guidance shown to the
/// operator, but the resolver reacts identically in every case (discard
/// the candidate and re-prompt, or abort when non-interactive).
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{url} rejected the liveness check (HTTP {status}): check your API key and access rights")]
    Forbidden { url: String, status: u16 },

    #[error("no ping endpoint found at {url} (HTTP 404): check the storage URL")]
    NotFound { url: String },

    #[error("unexpected status HTTP {status} from {url}: check the storage URL")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("could not reach {url}: {reason}")]
    Unreachable { url: String, reason: String },
}

/// Mandatory configuration could not be resolved.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "missing {field}: pass {flag} or set {env_key} in {store} (non-interactive run, cannot prompt)"
    )]
    Missing {
        field: &'static str,
        flag: &'static str,
        env_key: &'static str,
        store: &'static str,
    },

    /// Liveness check failed and no prompt is available to recover.
    #[error("storage URL rejected")]
    Validation(#[from] ValidationError),

    #[error("failed to read operator input")]
    Prompt(#[from] io::Error),
}

/// Failures reading or writing the persisted stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures during the upload transfer. Single attempt, never retried.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not open archive {}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("upload request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("upload to {url} rejected with HTTP {status}: {body}")]
    Rejected {
        url: String,
        status: u16,
        body: String,
    },
}
