use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the entire bundler backend.
/// Every module returns `Result<T, BundlerError>`.
#[derive(Debug, Error)]
pub enum BundlerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Bundle resources ────────────────────────────────
    #[error("Bundled resource {name} not found")]
    ResourceNotFound { name: String },

    #[error("Malformed library entry: {line}")]
    MalformedManifestLine { line: String },

    // ── Version resolution ──────────────────────────────
    #[error("No download source for version {id} in the version table")]
    VersionNotFound { id: String },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Dependency download failed for {url}: HTTP {status}")]
    DependencyDownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-256 mismatch for {path:?}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Patch application ───────────────────────────────
    #[error("Corrupt binary patch: {detail}")]
    PatchCorrupt { detail: String },

    #[error("Patched output missing or empty at {path:?}")]
    PatchOutputMissing { path: PathBuf },

    // ── Library extraction ──────────────────────────────
    #[error("Declared library {path} not found in the bundle")]
    DeclaredLibraryMissing { path: String },

    // ── Dependency coordinates ──────────────────────────
    #[error("Invalid dependency coordinate: {0}")]
    InvalidCoordinate(String),

    // ── Launch hand-off ─────────────────────────────────
    #[error("No entry point registered for symbol {0}")]
    EntryPointUnavailable(String),

    #[error("Entry point invocation failed: {0}")]
    LaunchFailed(String),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Runtime ─────────────────────────────────────────
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for BundlerError {
    fn from(e: tokio::task::JoinError) -> Self {
        BundlerError::Task(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type BundlerResult<T> = Result<T, BundlerError>;

impl From<std::io::Error> for BundlerError {
    fn from(source: std::io::Error) -> Self {
        BundlerError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
