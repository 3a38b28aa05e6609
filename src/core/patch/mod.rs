// ─── Patch Engine ───
// Derives the target artifact from the cached base via a bsdiff40 delta.

pub mod bspatch;

use std::path::Path;

use tracing::info;

use crate::core::error::{BundlerError, BundlerResult};

/// Apply the delta at `diff_path` to `base_path`, writing the result to
/// `out_path`.
///
/// The decode runs on the blocking pool; the write is atomic (temp file,
/// then rename), so `out_path` never holds a half-written artifact. After
/// the rename the output must exist and be non-empty, else
/// [`BundlerError::PatchOutputMissing`].
pub async fn apply_to_file(
    base_path: &Path,
    diff_path: &Path,
    out_path: &Path,
) -> BundlerResult<()> {
    let base = tokio::fs::read(base_path)
        .await
        .map_err(|source| BundlerError::Io {
            path: base_path.to_path_buf(),
            source,
        })?;
    let diff = tokio::fs::read(diff_path)
        .await
        .map_err(|source| BundlerError::Io {
            path: diff_path.to_path_buf(),
            source,
        })?;

    let output = tokio::task::spawn_blocking(move || bspatch::apply(&base, &diff)).await??;

    if let Some(parent) = out_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| BundlerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let tmp_path = out_path.with_extension("tmp");
    tokio::fs::write(&tmp_path, &output)
        .await
        .map_err(|source| BundlerError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp_path, out_path)
        .await
        .map_err(|source| BundlerError::Io {
            path: out_path.to_path_buf(),
            source,
        })?;

    let size = match tokio::fs::metadata(out_path).await {
        Ok(metadata) => metadata.len(),
        Err(_) => {
            return Err(BundlerError::PatchOutputMissing {
                path: out_path.to_path_buf(),
            })
        }
    };
    if size == 0 {
        return Err(BundlerError::PatchOutputMissing {
            path: out_path.to_path_buf(),
        });
    }

    info!("Patched artifact written to {:?} ({} bytes)", out_path, size);
    Ok(())
}
