use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::artifact::MavenCoordinate;
use crate::core::downloader::Downloader;
use crate::core::error::{BundlerError, BundlerResult};

/// Resolves plugin-declared dependencies against their repository.
///
/// Deliberately non-transitive: each dependency is one fully qualified
/// coordinate fetched from exactly one repository URL, no version-range
/// solving and no fallback mirrors.
pub struct DependencyResolver<'a> {
    downloader: &'a Downloader,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(downloader: &'a Downloader) -> Self {
        Self { downloader }
    }

    /// Resolve one coordinate into `dest_dir`, returning the local jar path.
    ///
    /// Destination filenames are flat (`artifactId-version.jar`); a file
    /// already present is returned with zero network activity. Plugin
    /// metadata declares no hashes, so presence is the only identity check
    /// available here.
    pub async fn resolve(
        &self,
        repository: &str,
        coord: &MavenCoordinate,
        dest_dir: &Path,
    ) -> BundlerResult<PathBuf> {
        let dest = dest_dir.join(coord.filename());
        if dest.exists() {
            debug!("Dependency {} already cached at {:?}", coord, dest);
            return Ok(dest);
        }

        let url = coord.url(repository);
        info!("Resolving dependency {} from {}", coord, url);
        self.downloader
            .download_file(&url, &dest)
            .await
            .map_err(|e| match e {
                BundlerError::DownloadFailed { url, status } => {
                    BundlerError::DependencyDownloadFailed { url, status }
                }
                other => other,
            })?;

        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_downloader() -> Downloader {
        let client = crate::core::http::build_http_client(std::time::Duration::from_secs(1))
            .expect("client");
        Downloader::new(client)
    }

    #[tokio::test]
    async fn cached_dependency_is_returned_without_fetching() {
        let dest_dir = std::env::temp_dir().join(format!(
            "dependency-resolver-cached-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dest_dir);
        std::fs::create_dir_all(&dest_dir).unwrap();
        std::fs::write(dest_dir.join("bar-1.0.jar"), b"cached").unwrap();

        let coord = MavenCoordinate::parse("com.foo:bar:1.0").unwrap();
        let downloader = test_downloader();
        let resolver = DependencyResolver::new(&downloader);

        // Unroutable repository: success proves no fetch happened.
        let path = resolver
            .resolve("http://127.0.0.1:1/maven", &coord, &dest_dir)
            .await
            .unwrap();
        assert_eq!(path, dest_dir.join("bar-1.0.jar"));

        let _ = std::fs::remove_dir_all(&dest_dir);
    }

    #[tokio::test]
    async fn absent_dependency_is_fetched_from_repository_url() {
        let dest_dir = std::env::temp_dir().join(format!(
            "dependency-resolver-fetch-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dest_dir);

        let coord = MavenCoordinate::parse("com.foo:bar:1.0").unwrap();
        let downloader = test_downloader();
        let resolver = DependencyResolver::new(&downloader);

        let err = resolver
            .resolve("http://127.0.0.1:1/maven", &coord, &dest_dir)
            .await
            .unwrap_err();
        assert!(matches!(err, BundlerError::Http(_)));

        let _ = std::fs::remove_dir_all(&dest_dir);
    }

    #[tokio::test]
    async fn non_success_status_is_dependency_download_failed() {
        let dest_dir = std::env::temp_dir().join(format!(
            "dependency-resolver-404-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dest_dir);

        let base = crate::core::downloader::client::test_support::spawn_canned_server(
            "404 Not Found",
            b"missing",
        )
        .await;

        let coord = MavenCoordinate::parse("com.foo:bar:1.0").unwrap();
        let downloader = test_downloader();
        let resolver = DependencyResolver::new(&downloader);

        let err = resolver
            .resolve(&format!("{}/maven", base), &coord, &dest_dir)
            .await
            .unwrap_err();
        match err {
            BundlerError::DependencyDownloadFailed { url, status } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/maven/com/foo/bar/1.0/bar-1.0.jar"));
            }
            other => panic!("expected DependencyDownloadFailed, got {:?}", other),
        }
        assert!(!dest_dir.join("bar-1.0.jar").exists());

        let _ = std::fs::remove_dir_all(&dest_dir);
    }
}
