//! Path resolution helpers for config values and client-supplied source paths.

use std::path::{Component, Path, PathBuf};

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Reason a client-supplied relative path was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativePathViolation {
    ParentTraversal,
    PlatformPrefix,
}

/// Join a client-supplied path under `root` by concatenation.
///
/// Leading separators are stripped so `/libavfilter` and `libavfilter` resolve the same way.
/// `..` components and platform prefixes are refused.
pub fn join_under_root(root: &Path, relative: &str) -> Result<PathBuf, RelativePathViolation> {
    let trimmed = relative.trim_start_matches(['/', '\\']);
    let mut resolved = root.to_path_buf();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir | Component::RootDir => {}
            Component::ParentDir => return Err(RelativePathViolation::ParentTraversal),
            Component::Prefix(_) => return Err(RelativePathViolation::PlatformPrefix),
        }
    }
    Ok(resolved)
}
