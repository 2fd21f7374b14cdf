//! Error conversion helpers for manifest loading
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&path)
    ///     .with_path_context("read manifest", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait attaching the manifest path to parse errors.
pub trait ManifestResultExt<T> {
    fn in_manifest(self, path: &Path) -> ApplicationResult<T>;
}

impl<T> ManifestResultExt<T> for Result<T, toml::de::Error> {
    fn in_manifest(self, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
