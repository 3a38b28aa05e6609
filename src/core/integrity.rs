// ─── Integrity Verifier ───
// Streaming SHA-256 digests. Every trust decision in the pipeline goes
// through here.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tracing::warn;

use crate::core::error::{BundlerError, BundlerResult};

const DIGEST_BUF_SIZE: usize = 64 * 1024;

/// Compute the lowercase hex SHA-256 of a file.
///
/// The file is streamed in fixed-size chunks; artifacts can be hundreds of
/// megabytes and must never be held in memory whole.
pub async fn sha256_file(path: &Path) -> BundlerResult<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|source| BundlerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; DIGEST_BUF_SIZE];
    loop {
        let read = file
            .read(&mut buf)
            .await
            .map_err(|source| BundlerError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Check a file against an expected hex digest, case-insensitively.
///
/// Returns `false` (with a diagnostic) on mismatch rather than an error:
/// callers treat a failed check as "stale copy, redo the work", not as a
/// fatal condition.
pub async fn verify_file(path: &Path, expected: &str) -> BundlerResult<bool> {
    let actual = sha256_file(path).await?;
    if actual.eq_ignore_ascii_case(expected) {
        return Ok(true);
    }

    warn!(
        "Expected file {:?} to have hash {}, but got {}",
        path, expected, actual
    );
    Ok(false)
}
