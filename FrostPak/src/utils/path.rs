//! Path utilities

use std::path::{Path, PathBuf};

/// Normalize path separators to forward slashes (for FBRB entry names)
pub fn normalize_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Get relative path and normalize separators
pub fn relative_path<P: AsRef<Path>>(path: P, base: P) -> Option<String> {
    path.as_ref()
        .strip_prefix(base.as_ref())
        .ok()
        .map(normalize_path)
}

/// Prefix absolute Windows paths with `\\?\` so deep archive trees stay
/// below the `MAX_PATH` limit. Other platforms get the path back unchanged.
#[cfg(windows)]
pub fn long_path<P: AsRef<Path>>(path: P) -> PathBuf {
    const PREFIX: &str = r"\\?\";

    let path = path.as_ref();
    let text = path.to_string_lossy();
    if text.is_empty() || text.starts_with(PREFIX) || !path.is_absolute() {
        return path.to_path_buf();
    }
    // Verbatim paths skip normalization, so separators must be backslashes
    PathBuf::from(format!("{PREFIX}{}", text.replace('/', "\\")))
}

/// Prefix absolute Windows paths with `\\?\` so deep archive trees stay
/// below the `MAX_PATH` limit. Other platforms get the path back unchanged.
#[cfg(not(windows))]
pub fn long_path<P: AsRef<Path>>(path: P) -> PathBuf {
    path.as_ref().to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("levels\\mp_001\\terrain.res"), "levels/mp_001/terrain.res");
    }

    #[test]
    fn test_relative_path() {
        let rel = relative_path(Path::new("/data/a FbRB/b/c.dbx"), Path::new("/data/a FbRB"));
        assert_eq!(rel.as_deref(), Some("b/c.dbx"));
        assert_eq!(relative_path(Path::new("/x/y"), Path::new("/z")), None);
    }

    #[cfg(not(windows))]
    #[test]
    fn test_long_path_is_identity() {
        assert_eq!(long_path("/tmp/a"), PathBuf::from("/tmp/a"));
    }
}
