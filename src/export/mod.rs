//! Model artifact and results export module
//!
//! - Binary model artifacts (bincode envelope with SHA-256 checksum)
//! - JSON export of evaluation runs

pub mod artifact;
pub mod results;

pub use artifact::{ArtifactMetadata, ModelArtifact};
pub use results::ResultsFile;
