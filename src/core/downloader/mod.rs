pub mod client;

pub use client::{CachedArtifact, Downloader};
