// ─── Charcoal Bundler Core ───
// The artifact acquisition, verification, and patch-application pipeline.
//
// Architecture:
//   core/
//     version/    — version table lookup + version.json metadata
//     downloader/ — cache-aware HTTP fetch with SHA-256 idempotence
//     patch/      — bsdiff40 delta decoding + atomic output write
//     bundle/     — bundle archive namespace, manifest, library extractor
//     maven/      — plugin dependency coordinates + single-repo resolver
//     plugin/     — plugin jar discovery and plugin.json parsing
//     launch/     — classpath linking + entry-point hand-off
//     pipeline    — sequential stage orchestration

pub mod bundle;
pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod integrity;
pub mod launch;
pub mod maven;
pub mod patch;
pub mod pipeline;
pub mod plugin;
pub mod version;
