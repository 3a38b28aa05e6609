pub mod metadata;
pub mod table;

pub use metadata::VersionMetadata;
pub use table::{VersionDescriptor, VersionTable};
