// ─── Bundle Archive ───
// Virtual resource namespace over a jar/zip archive. The bundle addresses
// its embedded resources by entry name (`META-INF/...`, `data/...`), and the
// downloaded bundler jar is read through the same interface.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::core::error::{BundlerError, BundlerResult};

// Entry sizes come from archive headers and are untrusted; preallocation is
// capped and the buffer grows to the real decompressed size as it reads.
const READ_PREALLOC_CAP: usize = 1 << 20;

/// Read-only view of a zip archive, addressed by entry name.
///
/// Holds only the path; every operation opens the archive fresh, so a
/// `BundleArchive` is cheap to clone into `spawn_blocking` closures and
/// nothing keeps a file handle alive between stages.
#[derive(Debug, Clone)]
pub struct BundleArchive {
    path: PathBuf,
}

impl BundleArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> BundlerResult<ZipArchive<File>> {
        let file = File::open(&self.path).map_err(|source| BundlerError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(ZipArchive::new(file)?)
    }

    /// Read a whole entry into memory. Intended for the small metadata
    /// resources (version table, manifests); payload entries go through
    /// [`extract_entry`](Self::extract_entry) instead.
    pub fn read_entry(&self, name: &str) -> BundlerResult<Vec<u8>> {
        let mut archive = self.open()?;
        let mut entry = match archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(BundlerError::ResourceNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let mut bytes = Vec::with_capacity((entry.size() as usize).min(READ_PREALLOC_CAP));
        entry.read_to_end(&mut bytes).map_err(|source| BundlerError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(bytes)
    }

    /// Read an entry under the `META-INF/` prefix as UTF-8 text.
    pub fn read_meta_inf_text(&self, name: &str) -> BundlerResult<String> {
        let bytes = self.read_entry(&format!("META-INF/{name}"))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Stream-copy an entry to `dest`, creating parent directories and
    /// overwriting any existing file.
    ///
    /// The entry is located before anything is written, so a missing entry
    /// never leaves a partial file behind.
    pub fn extract_entry(&self, name: &str, dest: &Path) -> BundlerResult<()> {
        let mut archive = self.open()?;
        let mut entry = match archive.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(BundlerError::ResourceNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| BundlerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out = File::create(dest).map_err(|source| BundlerError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|source| BundlerError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
