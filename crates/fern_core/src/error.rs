use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that terminate a build before any page work begins.
/// Each maps to a distinct process exit code; everything per-page or
/// per-line is recovered and reported as a diagnostic instead.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("required stylesheet '{}' did not exist: {source}", path.display())]
    Stylesheet { path: PathBuf, source: io::Error },
    #[error("required page template '{}' did not exist: {source}", path.display())]
    PageTemplate { path: PathBuf, source: io::Error },
    #[error("required feed template '{}' did not exist: {source}", path.display())]
    FeedTemplate { path: PathBuf, source: io::Error },
    #[error("unable to open source directory '{}': {source}", path.display())]
    SourceDir { path: PathBuf, source: io::Error },
    #[error("unable to create output directory '{}': {source}", path.display())]
    OutputDir { path: PathBuf, source: io::Error },
}

impl BuildError {
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildError::Stylesheet { .. } => 1,
            BuildError::PageTemplate { .. } => 2,
            BuildError::FeedTemplate { .. } => 3,
            BuildError::SourceDir { .. } => 4,
            BuildError::OutputDir { .. } => 5,
        }
    }
}
