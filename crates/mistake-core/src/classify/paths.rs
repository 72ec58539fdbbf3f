//! Lexical path normalization
//!
//! Symlinks are deliberately left alone: a frame path and a configured
//! directory are compared in the form the user wrote them.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `cwd` and fold `.` and `..` components.
pub fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    normalize(&joined)
}

/// Fold `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Current directory, or `/` when it cannot be determined
pub fn current_dir_or_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_dots() {
        assert_eq!(
            normalize(Path::new("/home/alice/./project/../app.rs")),
            PathBuf::from("/home/alice/app.rs")
        );
        assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("a/../..")), PathBuf::from(".."));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn test_absolutize_relative() {
        assert_eq!(
            absolutize(Path::new("src/main.rs"), Path::new("/work/demo")),
            PathBuf::from("/work/demo/src/main.rs")
        );
        assert_eq!(
            absolutize(Path::new("/abs/../x.rs"), Path::new("/ignored")),
            PathBuf::from("/x.rs")
        );
    }
}
