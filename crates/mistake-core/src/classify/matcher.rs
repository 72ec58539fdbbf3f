//! Directory and path-segment matchers for allow/deny lists

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One entry of an allow or deny list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PathMatcher {
    /// Absolute, normalized directory; matches when it is an ancestor
    Directory(PathBuf),
    /// Bare component name; matches any ancestor with this name, wherever it lives
    Segment(String),
}

impl PathMatcher {
    /// Create a directory matcher
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory(path.into())
    }

    /// Create a segment matcher
    pub fn segment(name: impl Into<String>) -> Self {
        Self::Segment(name.into())
    }

    /// Check `path` (absolute, normalized, pointing at a file) against this matcher.
    ///
    /// Ancestors are walked from the file's parent up to the root.
    pub fn matches(&self, path: &Path) -> bool {
        path.ancestors().skip(1).any(|ancestor| match self {
            Self::Directory(dir) => ancestor == dir,
            Self::Segment(name) => ancestor
                .file_name()
                .is_some_and(|component| component == name.as_str()),
        })
    }
}

impl fmt::Display for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directory(dir) => write!(f, "{}", dir.display()),
            Self::Segment(name) => write!(f, "{}", name),
        }
    }
}

/// Ordered list of matchers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatcherList {
    entries: Vec<PathMatcher>,
}

impl MatcherList {
    pub fn new(entries: Vec<PathMatcher>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PathMatcher] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, matcher: PathMatcher) {
        if !self.entries.contains(&matcher) {
            self.entries.push(matcher);
        }
    }

    /// First matcher that matches `path`
    pub fn find_match(&self, path: &Path) -> Option<&PathMatcher> {
        self.entries.iter().find(|matcher| matcher.matches(path))
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.find_match(path).is_some()
    }
}

impl FromIterator<PathMatcher> for MatcherList {
    fn from_iter<T: IntoIterator<Item = PathMatcher>>(iter: T) -> Self {
        let mut list = Self::default();
        for matcher in iter {
            list.push(matcher);
        }
        list
    }
}

impl fmt::Display for MatcherList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.entries.iter().map(|m| m.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_matches_ancestors_only() {
        let matcher = PathMatcher::directory("/home/alice");
        assert!(matcher.matches(Path::new("/home/alice/app.rs")));
        assert!(matcher.matches(Path::new("/home/alice/project/src/main.rs")));
        assert!(!matcher.matches(Path::new("/home/alicex/app.rs")));
        assert!(!matcher.matches(Path::new("/home/bob/app.rs")));
        // The file itself is not an ancestor
        let file = PathMatcher::directory("/home/alice/app.rs");
        assert!(!file.matches(Path::new("/home/alice/app.rs")));
    }

    #[test]
    fn test_segment_matches_any_component() {
        let matcher = PathMatcher::segment("site-packages");
        assert!(matcher.matches(Path::new("/usr/lib/python3/site-packages/pandas/core.py")));
        assert!(matcher.matches(Path::new("/opt/site-packages/x.py")));
        assert!(!matcher.matches(Path::new("/opt/site-packages-extra/x.py")));
        // File name is not a directory segment
        assert!(!PathMatcher::segment("x.py").matches(Path::new("/opt/x.py")));
    }

    #[test]
    fn test_segment_matches_hidden_cargo_dir() {
        let matcher = PathMatcher::segment(".cargo");
        let registry = "/home/alice/.cargo/registry/src/index.crates.io-6f17d22bba15001f";
        assert!(matcher.matches(&Path::new(registry).join("serde-1.0.200/src/de.rs")));
    }

    #[test]
    fn test_list_deduplicates_and_finds_first() {
        let list: MatcherList = vec![
            PathMatcher::segment("vendor"),
            PathMatcher::directory("/srv"),
            PathMatcher::segment("vendor"),
        ]
        .into_iter()
        .collect();

        assert_eq!(list.entries().len(), 2);
        assert_eq!(
            list.find_match(Path::new("/srv/vendor/lib.rs")),
            Some(&PathMatcher::segment("vendor"))
        );
        assert!(!list.matches(Path::new("/tmp/lib.rs")));
        assert_eq!(list.to_string(), "[vendor, /srv]");
    }
}
