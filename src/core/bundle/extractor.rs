// ─── Library Extractor ───
// Materializes the bundle's declared libraries on disk, verifying hashes
// so that a correct copy is never re-extracted.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::bundle::archive::BundleArchive;
use crate::core::bundle::manifest::{LibraryManifest, LibraryManifestEntry};
use crate::core::error::{BundlerError, BundlerResult};
use crate::core::integrity;

/// Extract every library declared in the bundle's `META-INF/<subdir>.list`
/// into `dest_root/<subdir>/`, returning the target paths in manifest order.
///
/// Entries whose on-disk copy already matches its declared hash are skipped
/// without touching the archive, so a fully populated destination costs one
/// manifest read and a digest pass per file, nothing more. Stale or missing
/// copies are overwritten from the bundle.
pub async fn extract_all(
    bundle: &BundleArchive,
    subdir: &str,
    dest_root: &Path,
) -> BundlerResult<Vec<PathBuf>> {
    let manifest = read_manifest(bundle, subdir).await?;
    let subdir_root = dest_root.join(subdir);

    let mut targets = Vec::with_capacity(manifest.entries.len());
    for entry in &manifest.entries {
        let target = subdir_root.join(&entry.relative_path);
        if target.exists() && integrity::verify_file(&target, &entry.hash).await? {
            debug!("Library {} already present and verified", entry.relative_path);
        } else {
            extract_entry(bundle, subdir, entry, &target).await?;
        }
        targets.push(target);
    }

    Ok(targets)
}

async fn read_manifest(bundle: &BundleArchive, subdir: &str) -> BundlerResult<LibraryManifest> {
    let bundle = bundle.clone();
    let resource = format!("{subdir}.list");
    let text =
        tokio::task::spawn_blocking(move || bundle.read_meta_inf_text(&resource)).await??;
    LibraryManifest::parse(&text)
}

async fn extract_entry(
    bundle: &BundleArchive,
    subdir: &str,
    entry: &LibraryManifestEntry,
    target: &Path,
) -> BundlerResult<()> {
    info!(
        "Unpacking {} ({}:{}) to {:?}",
        entry.relative_path, subdir, entry.id, target
    );

    let bundle = bundle.clone();
    let entry_name = format!("META-INF/{}/{}", subdir, entry.relative_path);
    let relative_path = entry.relative_path.clone();
    let target = target.to_path_buf();
    tokio::task::spawn_blocking(move || {
        bundle
            .extract_entry(&entry_name, &target)
            .map_err(|e| match e {
                BundlerError::ResourceNotFound { .. } => BundlerError::DeclaredLibraryMissing {
                    path: relative_path,
                },
                other => other,
            })
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};
    use std::io::Write;

    fn sha256_hex(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }

    fn fixture_bundle(name: &str, entries: &[(String, Vec<u8>)]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.jar", name, std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (entry_name, bytes) in entries {
            writer
                .start_file(entry_name.as_str(), zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    fn library_bundle(name: &str, libs: &[(&str, &str, &[u8])]) -> PathBuf {
        let mut entries = Vec::new();
        let mut manifest = String::new();
        for (id, rel_path, bytes) in libs {
            manifest.push_str(&format!("{}\t{}\t{}\n", sha256_hex(bytes), id, rel_path));
            entries.push((format!("META-INF/libraries/{rel_path}"), bytes.to_vec()));
        }
        entries.push(("META-INF/libraries.list".to_string(), manifest.into_bytes()));
        fixture_bundle(name, &entries)
    }

    #[tokio::test]
    async fn extracts_declared_libraries_in_manifest_order() {
        let bundle_path = library_bundle(
            "extractor-order",
            &[("b", "dir/b.jar", b"bytes-b"), ("a", "a.jar", b"bytes-a")],
        );
        let dest =
            std::env::temp_dir().join(format!("extractor-order-dest-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dest);

        let bundle = BundleArchive::new(&bundle_path);
        let targets = extract_all(&bundle, "libraries", &dest).await.unwrap();

        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0], dest.join("libraries/dir/b.jar"));
        assert_eq!(targets[1], dest.join("libraries/a.jar"));
        assert_eq!(std::fs::read(&targets[0]).unwrap(), b"bytes-b");
        assert_eq!(std::fs::read(&targets[1]).unwrap(), b"bytes-a");

        let _ = std::fs::remove_dir_all(&dest);
        let _ = std::fs::remove_file(&bundle_path);
    }

    #[tokio::test]
    async fn second_run_reads_nothing_from_the_archive() {
        let bundle_path = library_bundle("extractor-idempotent", &[("x", "x.jar", b"payload-x")]);
        let dest =
            std::env::temp_dir().join(format!("extractor-idempotent-dest-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dest);

        let bundle = BundleArchive::new(&bundle_path);
        let first = extract_all(&bundle, "libraries", &dest).await.unwrap();

        // Swap the archive for one carrying only the manifest. If the second
        // run tried to extract anything it would fail; verified copies must
        // satisfy it outright.
        let manifest_only = fixture_bundle(
            "extractor-idempotent-manifest-only",
            &[(
                "META-INF/libraries.list".to_string(),
                format!("{}\tx\tx.jar\n", sha256_hex(b"payload-x")).into_bytes(),
            )],
        );
        let second = extract_all(&BundleArchive::new(&manifest_only), "libraries", &dest)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second[0]).unwrap(), b"payload-x");

        let _ = std::fs::remove_dir_all(&dest);
        let _ = std::fs::remove_file(&bundle_path);
        let _ = std::fs::remove_file(&manifest_only);
    }

    #[tokio::test]
    async fn stale_copy_is_re_extracted() {
        let bundle_path = library_bundle("extractor-stale", &[("x", "x.jar", b"fresh")]);
        let dest = std::env::temp_dir().join(format!("extractor-stale-dest-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dest);

        let target = dest.join("libraries/x.jar");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, b"corrupted").unwrap();

        let bundle = BundleArchive::new(&bundle_path);
        extract_all(&bundle, "libraries", &dest).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"fresh");

        let _ = std::fs::remove_dir_all(&dest);
        let _ = std::fs::remove_file(&bundle_path);
    }

    #[tokio::test]
    async fn missing_declared_library_fails_without_partial_file() {
        let bundle_path = fixture_bundle(
            "extractor-missing-lib",
            &[(
                "META-INF/libraries.list".to_string(),
                format!("{}\tx\tx.jar\n", sha256_hex(b"never-present")).into_bytes(),
            )],
        );
        let dest = std::env::temp_dir().join(format!(
            "extractor-missing-lib-dest-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dest);

        let bundle = BundleArchive::new(&bundle_path);
        let err = extract_all(&bundle, "libraries", &dest).await.unwrap_err();

        assert!(matches!(err, BundlerError::DeclaredLibraryMissing { path } if path == "x.jar"));
        assert!(!dest.join("libraries/x.jar").exists());

        let _ = std::fs::remove_dir_all(&dest);
        let _ = std::fs::remove_file(&bundle_path);
    }

    #[tokio::test]
    async fn malformed_manifest_line_is_fatal() {
        let bundle_path = fixture_bundle(
            "extractor-bad-manifest",
            &[(
                "META-INF/libraries.list".to_string(),
                b"not-three-fields\n".to_vec(),
            )],
        );
        let dest = std::env::temp_dir().join(format!(
            "extractor-bad-manifest-dest-{}",
            std::process::id()
        ));

        let bundle = BundleArchive::new(&bundle_path);
        let err = extract_all(&bundle, "libraries", &dest).await.unwrap_err();
        assert!(matches!(err, BundlerError::MalformedManifestLine { .. }));

        let _ = std::fs::remove_file(&bundle_path);
    }
}
