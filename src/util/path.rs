use std::path::{Path, PathBuf};

pub trait PathExt {
    /// Expand `~`, `$VAR` and `${VAR}`; the path is returned unchanged if expansion fails.
    fn expand_vars(&self) -> PathBuf;
    /// Expand variables, then join onto `base` unless the result is absolute.
    fn resolve_against(&self, base: &Path) -> PathBuf;
    /// Directory containing this file, `.` for bare file names.
    fn base_dir(&self) -> &Path;
}

impl PathExt for Path {
    fn expand_vars(&self) -> PathBuf {
        PathBuf::from(expand_env_vars(&self.to_string_lossy()))
    }

    fn resolve_against(&self, base: &Path) -> PathBuf {
        let expanded = self.expand_vars();
        if expanded.is_absolute() {
            expanded
        } else {
            base.join(expanded)
        }
    }

    fn base_dir(&self) -> &Path {
        match self.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Expand environment variables in a path string.
///
/// Uses shellexpand crate for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
