//! Colon-separated directory lists from the environment
//!
//! Each entry is either a bare name (no `~`, no path separator), matched
//! against any component of a frame's path, or a path that is tilde-expanded
//! and made absolute.

use std::path::{MAIN_SEPARATOR, Path};

use super::ConfigWarning;
use crate::classify::{MatcherList, PathMatcher, paths};

/// Result of parsing one list variable
#[derive(Debug, Clone, Default)]
pub struct ParsedDirList {
    pub list: MatcherList,
    pub warnings: Vec<ConfigWarning>,
}

fn is_bare_name(entry: &str) -> bool {
    !entry.contains('~') && !entry.contains('/') && !entry.contains(MAIN_SEPARATOR)
}

/// Parse `raw` (the value of `var`) into a matcher list.
///
/// `home` is used for `~` expansion, `cwd` for relative entries. Entries that
/// look like paths but are not existing directories are kept and reported.
pub fn parse_dir_list(var: &str, raw: &str, home: Option<&Path>, cwd: &Path) -> ParsedDirList {
    let mut parsed = ParsedDirList::default();

    for entry in raw.split(':') {
        if entry.is_empty() {
            continue;
        }

        if is_bare_name(entry) {
            parsed.list.push(PathMatcher::segment(entry));
            continue;
        }

        let expanded = shellexpand::tilde_with_context(entry, || {
            home.map(|h| h.to_string_lossy().into_owned())
        });
        let dir = paths::absolutize(Path::new(expanded.as_ref()), cwd);
        if !dir.is_dir() {
            let warning = ConfigWarning::NotADirectory {
                var: var.to_string(),
                entry: entry.to_string(),
            };
            tracing::warn!("{}", warning);
            parsed.warnings.push(warning);
        }
        parsed.list.push(PathMatcher::directory(dir));
    }

    parsed
}
