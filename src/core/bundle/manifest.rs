use crate::core::error::{BundlerError, BundlerResult};

/// One required library declared by the bundle.
///
/// `id` is an opaque logical name used only in diagnostics; dedup and
/// addressing go by `relative_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryManifestEntry {
    pub hash: String,
    pub id: String,
    pub relative_path: String,
}

impl LibraryManifestEntry {
    /// Parse one `hash\tid\tpath` manifest line.
    ///
    /// Anything other than exactly 3 tab-separated fields is a fatal
    /// manifest error, never a silent skip.
    pub fn parse_line(line: &str) -> BundlerResult<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(BundlerError::MalformedManifestLine {
                line: line.to_string(),
            });
        }

        Ok(Self {
            hash: fields[0].to_string(),
            id: fields[1].to_string(),
            relative_path: fields[2].to_string(),
        })
    }
}

/// The parsed `<subdir>.list` resource, entries in file order.
#[derive(Debug, Clone)]
pub struct LibraryManifest {
    pub entries: Vec<LibraryManifestEntry>,
}

impl LibraryManifest {
    pub fn parse(text: &str) -> BundlerResult<Self> {
        let entries = text
            .lines()
            .map(LibraryManifestEntry::parse_line)
            .collect::<BundlerResult<Vec<_>>>()?;
        Ok(Self { entries })
    }
}
