use serde::Deserialize;

/// A plugin's `plugin.json` descriptor, reduced to the fields the pipeline
/// consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    pub name: Option<String>,
    #[serde(default)]
    pub libraries: Vec<PluginLibrary>,
}

/// One remote dependency declared by a plugin: a repository base URL and a
/// `groupId:artifactId:version` coordinate string.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginLibrary {
    pub repository: String,
    pub dependency: String,
}
