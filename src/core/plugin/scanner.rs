// ─── Plugin Scanner ───
// Discovers plugin jars under mods/ and reads their declared dependencies.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::error::{BundlerError, BundlerResult};
use crate::core::plugin::metadata::PluginManifest;

/// A plugin jar with a parsed `plugin.json`.
#[derive(Debug, Clone)]
pub struct DiscoveredPlugin {
    pub jar_path: PathBuf,
    pub manifest: PluginManifest,
}

/// Scan `mods_dir` recursively for `*.jar` files carrying a `plugin.json`
/// entry.
///
/// Jars are visited in sorted path order so dependency discovery order is
/// deterministic. An unreadable jar is logged and skipped; a jar without
/// `plugin.json` is silently skipped; a present but malformed `plugin.json`
/// is fatal. A missing `mods_dir` yields an empty set.
///
/// Blocking; call from `spawn_blocking` on async paths.
pub fn scan_plugins(mods_dir: &Path) -> BundlerResult<Vec<DiscoveredPlugin>> {
    if !mods_dir.exists() {
        return Ok(Vec::new());
    }

    let mut jar_paths = Vec::new();
    let mut stack = vec![mods_dir.to_path_buf()];
    while let Some(current_dir) = stack.pop() {
        let read_dir = match std::fs::read_dir(&current_dir) {
            Ok(read_dir) => read_dir,
            Err(_) => continue,
        };

        for entry in read_dir.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
            {
                jar_paths.push(path);
            }
        }
    }
    jar_paths.sort();

    let mut plugins = Vec::new();
    for jar_path in jar_paths {
        match read_plugin_manifest(&jar_path)? {
            Some(manifest) => plugins.push(DiscoveredPlugin { jar_path, manifest }),
            None => continue,
        }
    }

    Ok(plugins)
}

fn read_plugin_manifest(jar_path: &Path) -> BundlerResult<Option<PluginManifest>> {
    let file = match std::fs::File::open(jar_path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Cannot open plugin jar {:?}: {}", jar_path, e);
            return Ok(None);
        }
    };

    let mut archive = match zip::ZipArchive::new(file) {
        Ok(archive) => archive,
        Err(e) => {
            warn!("Cannot read plugin jar {:?}: {}", jar_path, e);
            return Ok(None);
        }
    };

    let mut entry = match archive.by_name("plugin.json") {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            warn!("Cannot read plugin jar {:?}: {}", jar_path, e);
            return Ok(None);
        }
    };

    // The declared entry size is untrusted; cap the preallocation.
    let mut bytes = Vec::with_capacity((entry.size() as usize).min(1 << 20));
    entry
        .read_to_end(&mut bytes)
        .map_err(|source| BundlerError::Io {
            path: jar_path.to_path_buf(),
            source,
        })?;

    // A declared but unparseable manifest is a plugin author error, not a
    // recoverable condition.
    let manifest: PluginManifest = serde_json::from_slice(&bytes)?;
    Ok(Some(manifest))
}
