use std::fmt;

use crate::core::error::{BundlerError, BundlerResult};

/// A fully qualified Maven coordinate declared by a plugin.
///
/// Only the plain `groupId:artifactId:version` form is supported; plugin
/// metadata carries no classifiers or packaging overrides, and the artifact
/// is always a jar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MavenCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl MavenCoordinate {
    /// Parse a coordinate string.
    ///
    /// Anything other than exactly 3 colon-separated segments is
    /// [`BundlerError::InvalidCoordinate`], raised before any I/O happens.
    pub fn parse(coord: &str) -> BundlerResult<Self> {
        let parts: Vec<&str> = coord.split(':').collect();
        if parts.len() != 3 {
            return Err(BundlerError::InvalidCoordinate(coord.to_string()));
        }

        Ok(Self {
            group_id: parts[0].to_string(),
            artifact_id: parts[1].to_string(),
            version: parts[2].to_string(),
        })
    }

    /// Group path portion (`com.foo` -> `com/foo`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// The artifact filename, always `artifactId-version.jar`.
    pub fn filename(&self) -> String {
        format!("{}-{}.jar", self.artifact_id, self.version)
    }

    /// Full download URL under the given repository base.
    ///
    /// Template: `<repo>/<group_path>/<artifact_id>/<version>/<filename>`
    pub fn url(&self, repo_base: &str) -> String {
        let base = repo_base.trim_end_matches('/');
        format!(
            "{}/{}/{}/{}/{}",
            base,
            self.group_path(),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }
}

impl fmt::Display for MavenCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}
