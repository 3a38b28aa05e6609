use serde::Deserialize;

use crate::core::error::BundlerResult;

/// The bundle's `version.json` resource. Only the id is consumed.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionMetadata {
    pub id: String,
}

impl VersionMetadata {
    pub fn parse(bytes: &[u8]) -> BundlerResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
