//! Common utility functions shared across the codebase.

use std::path::{Component, Path};

/// Path of `file` relative to `root`, with `/` separators.
///
/// Falls back to the full path when `file` is not under `root`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use glotpot::utils::relative_path;
///
/// assert_eq!(
///     relative_path(Path::new("/work/app"), Path::new("/work/app/src/Main.java")),
///     "src/Main.java"
/// );
/// assert_eq!(relative_path(Path::new("."), Path::new("./src/A.java")), "src/A.java");
/// ```
pub fn relative_path(root: &Path, file: &Path) -> String {
    let Ok(relative) = file.strip_prefix(root) else {
        return file.to_string_lossy().replace('\\', "/");
    };
    let parts: Vec<String> = relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

/// Plural suffix for counts in user-facing messages.
pub fn plural(count: usize, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 { singular } else { plural }
}
