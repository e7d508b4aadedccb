use std::path::{Path, PathBuf};

/// Resolve `value` against `base_dir` when it starts with `.`; other
/// values are taken as given.
pub fn resolve_relative(base_dir: &Path, value: &str) -> PathBuf {
    if value.starts_with('.') {
        base_dir.join(value)
    } else {
        PathBuf::from(value)
    }
}

/// File name without its last extension, used to name reports
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
