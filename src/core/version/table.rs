use crate::core::error::{BundlerError, BundlerResult};

/// A resolved version table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    pub id: String,
    pub source_url: String,
}

/// The bundled `data/versions.ver` lookup table.
///
/// Each line is `<matchText>||<url>`. Resolution scans top to bottom and the
/// first line whose raw text *contains* the requested id wins. The matching
/// is deliberately permissive: `"1.2"` will match a `"1.20.1"` row if it
/// appears first. Callers should pass the full version id to avoid the
/// ambiguity; the table format gives no way to tighten this without
/// breaking existing bundles.
#[derive(Debug, Clone)]
pub struct VersionTable {
    lines: Vec<String>,
}

impl VersionTable {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Resolve a version id to its download URL.
    ///
    /// A containing line that does not split into exactly two `||` parts is
    /// skipped and scanning continues. Exhausting the table yields
    /// [`BundlerError::VersionNotFound`].
    pub fn resolve(&self, id: &str) -> BundlerResult<VersionDescriptor> {
        for line in &self.lines {
            if !line.contains(id) {
                continue;
            }
            let parts: Vec<&str> = line.split("||").collect();
            if parts.len() == 2 {
                return Ok(VersionDescriptor {
                    id: id.to_string(),
                    source_url: parts[1].trim().to_string(),
                });
            }
        }

        Err(BundlerError::VersionNotFound { id: id.to_string() })
    }
}
