pub mod metadata;
pub mod scanner;

pub use metadata::{PluginLibrary, PluginManifest};
pub use scanner::{scan_plugins, DiscoveredPlugin};
