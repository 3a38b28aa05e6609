// ─── Artifact Cache ───
// Fetches remote artifacts into the local cache, skipping the network
// whenever a cached copy already satisfies its declared identity.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::error::{BundlerError, BundlerResult};
use crate::core::integrity;

/// A locally cached artifact and the identity it was checked against.
///
/// With a declared hash, identity is path + digest; without one the artifact
/// is trusted on presence alone.
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    pub local_path: PathBuf,
    pub expected_sha256: Option<String>,
}

/// Cache-aware HTTP downloader over the shared client.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Ensure `dest` holds the artifact at `url`.
    ///
    /// A present file with no declared hash, or one whose digest verifies,
    /// is returned without any network activity. A present file that fails
    /// verification is re-downloaded once; if the fresh payload still does
    /// not match, the mismatch is fatal. There are no retries beyond that
    /// single re-download: a failed transfer surfaces to the caller.
    ///
    /// With a declared hash the cached-path probe is a single open-for-digest;
    /// a not-found from the digest means "absent, download", any other I/O
    /// failure is surfaced.
    pub async fn ensure(
        &self,
        url: &str,
        dest: &Path,
        expected_sha256: Option<&str>,
    ) -> BundlerResult<CachedArtifact> {
        match expected_sha256 {
            Some(expected) => match integrity::verify_file(dest, expected).await {
                Ok(true) => {
                    debug!("Cached artifact at {:?} verified", dest);
                    return Ok(CachedArtifact {
                        local_path: dest.to_path_buf(),
                        expected_sha256: Some(expected.to_string()),
                    });
                }
                Ok(false) => {
                    warn!("Cached artifact at {:?} failed verification, re-downloading", dest);
                }
                Err(BundlerError::Io { ref source, .. })
                    if source.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            },
            None if dest.exists() => {
                debug!("Using cached artifact at {:?}", dest);
                return Ok(CachedArtifact {
                    local_path: dest.to_path_buf(),
                    expected_sha256: None,
                });
            }
            None => {}
        }

        self.download_file(url, dest).await?;

        if let Some(expected) = expected_sha256 {
            let actual = integrity::sha256_file(dest).await?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(BundlerError::IntegrityMismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        Ok(CachedArtifact {
            local_path: dest.to_path_buf(),
            expected_sha256: expected_sha256.map(str::to_string),
        })
    }

    /// Download `url` to `dest`, streaming the body straight to disk.
    ///
    /// Creates parent directories and overwrites any existing file. A
    /// non-success status is [`BundlerError::DownloadFailed`]; no retry is
    /// performed.
    pub async fn download_file(&self, url: &str, dest: &Path) -> BundlerResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| BundlerError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BundlerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Stream chunk by chunk; artifacts can be large and must not be
        // buffered whole. The handle is scoped so it is dropped before we
        // return — verification reopens the file.
        {
            let mut file =
                tokio::fs::File::create(dest)
                    .await
                    .map_err(|source| BundlerError::Io {
                        path: dest.to_path_buf(),
                        source,
                    })?;
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk)
                    .await
                    .map_err(|source| BundlerError::Io {
                        path: dest.to_path_buf(),
                        source,
                    })?;
            }
            file.flush().await.map_err(|source| BundlerError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        }

        info!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    // Minimal loopback HTTP server answering every request with one canned
    // response. Returns the base URL.
    pub(crate) async fn spawn_canned_server(
        status_line: &'static str,
        body: &'static [u8],
    ) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status_line,
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(body).await;
            }
        });
        format!("http://{}", addr)
    }
}
