use std::path::PathBuf;
use std::time::Duration;

/// Bundle archive filename probed when `--bundle` is not given.
pub const DEFAULT_BUNDLE_FILE: &str = "charcoal-bundle.jar";

/// Default connect timeout for all HTTP requests. The pipeline performs no
/// retries, so a hung connect would otherwise stall the whole run.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for one pipeline run.
///
/// Two settings are overridable from the command line: the target repo
/// directory and the entry-point symbol. The symbol default comes from the
/// bundle's `META-INF/main-class` resource; the repo dir defaults to the
/// working directory.
///
/// All provisioned state lives under `repo_dir`:
/// - `cache/`           — downloaded artifacts and patch inputs
/// - `versions/<id>/`   — the patched server jar
/// - `libraries/`       — libraries extracted from the bundle
/// - `libraries/mods/`  — dependencies resolved for plugins
/// - `mods/`            — user-supplied plugin jars (scanned, never written)
#[derive(Debug, Clone)]
pub struct BundlerConfig {
    /// Root directory for the provisioned assembly.
    pub repo_dir: PathBuf,
    /// Path to the bundle archive carrying manifests, the version table,
    /// the delta patch and the embedded libraries.
    pub bundle_path: PathBuf,
    /// Entry-point symbol override. `None` falls back to the bundled
    /// default; an explicitly empty value means "assemble but do not launch".
    pub main_class: Option<String>,
    /// HTTP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            repo_dir: PathBuf::from("."),
            bundle_path: PathBuf::from(DEFAULT_BUNDLE_FILE),
            main_class: None,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl BundlerConfig {
    /// `cache/` — downloaded bundler jars and intermediate patch inputs.
    pub fn cache_dir(&self) -> PathBuf {
        self.repo_dir.join("cache")
    }

    /// `versions/<id>/` — home of the patched server jar for one version.
    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.repo_dir.join("versions").join(id)
    }

    /// `libraries/` — destination root for bundle-extracted libraries.
    pub fn libraries_dir(&self) -> PathBuf {
        self.repo_dir.join("libraries")
    }

    /// `libraries/mods/` — destination for plugin-resolved dependencies.
    pub fn mod_libraries_dir(&self) -> PathBuf {
        self.libraries_dir().join("mods")
    }

    /// `mods/` — plugin jars supplied by the operator.
    pub fn mods_dir(&self) -> PathBuf {
        self.repo_dir.join("mods")
    }

    /// Cached download of the upstream bundler jar for `id`.
    pub fn bundler_jar_path(&self, id: &str) -> PathBuf {
        self.cache_dir().join(format!("vanilla-bundler-{id}.jar"))
    }

    /// The unpacked base server jar the patch applies to.
    pub fn base_jar_path(&self, id: &str) -> PathBuf {
        self.cache_dir().join(format!("vanilla-{id}.jar"))
    }

    /// Staging location of the delta patch pulled out of the bundle.
    pub fn patch_path(&self) -> PathBuf {
        self.cache_dir().join("patch.patch")
    }

    /// Final patched jar registered first on the classpath.
    pub fn patched_jar_path(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("charcoal-{id}.jar"))
    }
}
