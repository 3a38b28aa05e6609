// ─── Provisioning Pipeline ───
// Sequential orchestration of the acquisition stages: version resolution,
// cached download, base unpack, delta patch, library extraction, plugin
// dependency resolution, classpath assembly.

use tracing::{debug, info};

use crate::core::bundle::{extractor, BundleArchive};
use crate::core::config::BundlerConfig;
use crate::core::downloader::Downloader;
use crate::core::error::BundlerResult;
use crate::core::http::build_http_client;
use crate::core::launch::{ClasspathSet, LaunchSet};
use crate::core::maven::{DependencyResolver, MavenCoordinate};
use crate::core::plugin::scanner::scan_plugins;
use crate::core::version::{VersionMetadata, VersionTable};
use crate::core::{patch, plugin};

/// The provisioning pipeline over one bundle archive and one repo directory.
pub struct Bundler {
    config: BundlerConfig,
    bundle: BundleArchive,
    downloader: Downloader,
}

impl Bundler {
    pub fn new(config: BundlerConfig) -> BundlerResult<Self> {
        let client = build_http_client(config.connect_timeout)?;
        Ok(Self {
            bundle: BundleArchive::new(&config.bundle_path),
            downloader: Downloader::new(client),
            config,
        })
    }

    pub fn config(&self) -> &BundlerConfig {
        &self.config
    }

    /// Run the whole pipeline and produce the launch set.
    ///
    /// Stages run strictly in sequence; any fatal error aborts the run with
    /// nothing launched. On-disk state under the repo dir doubles as the
    /// idempotence mechanism, so re-running against a populated repo dir
    /// performs no network activity and no archive reads beyond
    /// verification. There is no file locking: running two pipelines
    /// against the same repo dir concurrently is undefined and is the
    /// caller's responsibility to prevent.
    pub async fn provision(&self, args: Vec<String>) -> BundlerResult<LaunchSet> {
        // 1. Bundle metadata: version id, default entry point, version table.
        let (version_bytes, main_class_text, table_text) = {
            let bundle = self.bundle.clone();
            tokio::task::spawn_blocking(move || -> BundlerResult<(Vec<u8>, String, String)> {
                let version = bundle.read_entry("version.json")?;
                let main_class = bundle.read_meta_inf_text("main-class")?;
                let table = bundle.read_entry("data/versions.ver")?;
                Ok((
                    version,
                    main_class,
                    String::from_utf8_lossy(&table).into_owned(),
                ))
            })
            .await??
        };

        let version = VersionMetadata::parse(&version_bytes)?;
        let id = version.id;
        info!("Provisioning version {}", id);

        let default_main = main_class_text.lines().next().unwrap_or("").trim().to_string();
        let main_class = self.config.main_class.clone().unwrap_or(default_main);

        // 2. Resolve the upstream source and ensure the bundler jar is cached.
        let descriptor = VersionTable::parse(&table_text).resolve(&id)?;
        debug!("Version {} resolves to {}", id, descriptor.source_url);
        let bundler_jar = self.config.bundler_jar_path(&id);
        self.downloader
            .ensure(&descriptor.source_url, &bundler_jar, None)
            .await?;

        // 3. Unpack the embedded base jar. Runs every time; idempotence
        //    lives at the download layer, not here.
        let base_jar = self.config.base_jar_path(&id);
        {
            let archive = BundleArchive::new(&bundler_jar);
            let entry = format!("META-INF/versions/{id}/server-{id}.jar");
            let base_jar = base_jar.clone();
            tokio::task::spawn_blocking(move || archive.extract_entry(&entry, &base_jar))
                .await??;
        }

        // 4. Stage the delta patch out of the bundle.
        let patch_path = self.config.patch_path();
        {
            let bundle = self.bundle.clone();
            let patch_path = patch_path.clone();
            tokio::task::spawn_blocking(move || {
                bundle.extract_entry("versions/patch.patch", &patch_path)
            })
            .await??;
        }

        // 5. Derive the patched server jar.
        let patched_jar = self.config.patched_jar_path(&id);
        patch::apply_to_file(&base_jar, &patch_path, &patched_jar).await?;

        // 6. Extract the declared libraries.
        let libraries =
            extractor::extract_all(&self.bundle, "libraries", &self.config.repo_dir).await?;

        // 7. Discover plugins and resolve their declared dependencies.
        let plugins = {
            let mods_dir = self.config.mods_dir();
            tokio::task::spawn_blocking(move || scan_plugins(&mods_dir)).await??
        };
        let dependency_paths = self.resolve_plugin_dependencies(&plugins).await?;

        // 8. Link the classpath: patched jar, then libraries in manifest
        //    order, then plugin dependencies in discovery order.
        let mut classpath = ClasspathSet::new();
        classpath.push(&patched_jar);
        for library in &libraries {
            classpath.push(library);
        }
        for dependency in &dependency_paths {
            classpath.push(dependency);
        }
        info!("Linked {} classpath entries", classpath.len());

        Ok(LaunchSet {
            classpath,
            main_class,
            args,
        })
    }

    async fn resolve_plugin_dependencies(
        &self,
        plugins: &[plugin::DiscoveredPlugin],
    ) -> BundlerResult<Vec<std::path::PathBuf>> {
        let resolver = DependencyResolver::new(&self.downloader);
        let dest_dir = self.config.mod_libraries_dir();

        let mut paths = Vec::new();
        for plugin in plugins {
            for library in &plugin.manifest.libraries {
                let coord = MavenCoordinate::parse(&library.dependency)?;
                paths.push(
                    resolver
                        .resolve(&library.repository, &coord, &dest_dir)
                        .await?,
                );
            }
        }
        Ok(paths)
    }
}
