pub mod archive;
pub mod extractor;
pub mod manifest;

pub use archive::BundleArchive;
pub use extractor::extract_all;
pub use manifest::{LibraryManifest, LibraryManifestEntry};
