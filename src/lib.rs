pub mod core;

pub use crate::core::config::BundlerConfig;
pub use crate::core::error::{BundlerError, BundlerResult};
pub use crate::core::launch::{EntryPointInvoker, InvokerRegistry, LaunchSet};
pub use crate::core::pipeline::Bundler;
