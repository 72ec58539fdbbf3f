//! Provenance classification of source files
//!
//! Decides whether a frame's file is being developed locally or belongs to
//! third-party code:
//!
//! 1. Files that do not exist are never local (std frames point at
//!    `/rustc/<hash>/...`, which is not on disk).
//! 2. The deny-list is checked first, then the allow-list.
//! 3. Anything left over is looked up in package metadata; path packages are
//!    local, registry packages are not, unknown files are not.

mod matcher;
mod packages;
pub mod paths;

pub use matcher::{MatcherList, PathMatcher};
pub use packages::{
    CargoMetadataIndex, MetadataError, NoPackageIndex, PackageIndex, PackageRecord,
    package_files, parse_cargo_metadata,
};

#[cfg(test)]
pub use packages::MockPackageIndex;

use once_cell::sync::OnceCell;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{
    ConfigWarning, DEV_DIRS_VAR, EnvSource, MistakeSettings, NON_DEV_DIRS_VAR, ProcessEnv,
    parse_dir_list,
};

const TRACE_TARGET: &str = "mistake::classify";

/// Deny-list segments used when `MISTAKE_NON_DEV_DIRS` is unset
pub const DEFAULT_NON_DEV_SEGMENTS: &[&str] = &[".cargo", ".rustup"];

/// Filesystem capability used by the classifier
pub trait FileSystem: Send {
    fn is_file(&self, path: &Path) -> bool;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Inputs needed to resolve the allow/deny lists
#[derive(Debug, Clone, Default)]
pub struct ClassifierConfig {
    /// Raw `MISTAKE_DEV_DIRS`, `None` for the default
    pub dev_dirs: Option<String>,
    /// Raw `MISTAKE_NON_DEV_DIRS`, `None` for the default
    pub non_dev_dirs: Option<String>,
    pub home: Option<PathBuf>,
    pub cargo_home: Option<PathBuf>,
    pub rustup_home: Option<PathBuf>,
    pub cwd: PathBuf,
}

impl ClassifierConfig {
    /// Build from settings plus the process environment
    pub fn from_settings(settings: &MistakeSettings) -> Self {
        Self::from_settings_and_env(settings, &ProcessEnv)
    }

    pub fn from_settings_and_env(settings: &MistakeSettings, env: &dyn EnvSource) -> Self {
        Self {
            dev_dirs: settings.dev_dirs.clone(),
            non_dev_dirs: settings.non_dev_dirs.clone(),
            home: dirs::home_dir(),
            cargo_home: env.var("CARGO_HOME").map(PathBuf::from),
            rustup_home: env.var("RUSTUP_HOME").map(PathBuf::from),
            cwd: paths::current_dir_or_root(),
        }
    }

    /// Explicit lists, no environment lookups
    pub fn with_lists(dev_dirs: &str, non_dev_dirs: &str) -> Self {
        Self {
            dev_dirs: Some(dev_dirs.to_string()),
            non_dev_dirs: Some(non_dev_dirs.to_string()),
            cwd: paths::current_dir_or_root(),
            ..Default::default()
        }
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Resolve both lists. Called once per classifier.
    pub fn resolve(&self) -> ResolvedLists {
        let mut warnings = Vec::new();
        let home = self.home.as_deref();

        let deny = match &self.non_dev_dirs {
            Some(raw) => {
                let parsed = parse_dir_list(NON_DEV_DIRS_VAR, raw, home, &self.cwd);
                warnings.extend(parsed.warnings);
                parsed.list
            }
            None => {
                let mut list: MatcherList = DEFAULT_NON_DEV_SEGMENTS
                    .iter()
                    .map(|name| PathMatcher::segment(*name))
                    .collect();
                for dir in [&self.cargo_home, &self.rustup_home].into_iter().flatten() {
                    list.push(PathMatcher::directory(paths::absolutize(dir, &self.cwd)));
                }
                list
            }
        };

        let allow = match &self.dev_dirs {
            Some(raw) => {
                let parsed = parse_dir_list(DEV_DIRS_VAR, raw, home, &self.cwd);
                warnings.extend(parsed.warnings);
                parsed.list
            }
            None => home
                .map(|h| PathMatcher::directory(paths::absolutize(h, &self.cwd)))
                .into_iter()
                .collect(),
        };

        tracing::debug!(target: TRACE_TARGET, "allow-list: {}", allow);
        tracing::debug!(target: TRACE_TARGET, "deny-list: {}", deny);

        ResolvedLists {
            allow,
            deny,
            warnings,
        }
    }
}

/// Allow and deny lists after resolution
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLists {
    pub allow: MatcherList,
    pub deny: MatcherList,
    pub warnings: Vec<ConfigWarning>,
}

/// Why a path was or was not classified as local
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Verdict {
    /// Not an existing regular file
    MissingFile,
    /// Matched a deny-list entry
    DenyListed { matcher: PathMatcher },
    /// Matched an allow-list entry
    AllowListed { matcher: PathMatcher },
    /// Declared by an installed package
    Package { name: String, editable: bool },
    /// Nothing decided; defaults to not local
    Unknown,
}

impl Verdict {
    pub fn is_local(&self) -> bool {
        match self {
            Self::AllowListed { .. } => true,
            Self::Package { editable, .. } => *editable,
            Self::MissingFile | Self::DenyListed { .. } | Self::Unknown => false,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile => write!(f, "not an existing file"),
            Self::DenyListed { matcher } => write!(f, "on deny-list ({})", matcher),
            Self::AllowListed { matcher } => write!(f, "on allow-list ({})", matcher),
            Self::Package { name, editable } => {
                if *editable {
                    write!(f, "declared by path package {}", name)
                } else {
                    write!(f, "declared by installed package {}", name)
                }
            }
            Self::Unknown => write!(f, "not matched by any rule"),
        }
    }
}

/// Provenance classifier
///
/// Lists and package records are resolved lazily and then held for the
/// lifetime of the classifier.
pub struct Classifier {
    config: ClassifierConfig,
    fs: Box<dyn FileSystem>,
    index: Box<dyn PackageIndex>,
    lists: OnceCell<ResolvedLists>,
    packages: OnceCell<Vec<PackageRecord>>,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("config", &self.config)
            .field("lists", &self.lists.get())
            .field("packages", &self.packages.get().map(Vec::len))
            .finish()
    }
}

impl Classifier {
    /// Classifier over the real filesystem and `cargo metadata`
    pub fn new(config: ClassifierConfig) -> Self {
        let index = CargoMetadataIndex::new(config.cwd.clone());
        Self {
            config,
            fs: Box::new(RealFileSystem),
            index: Box::new(index),
            lists: OnceCell::new(),
            packages: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &MistakeSettings) -> Self {
        Self::new(ClassifierConfig::from_settings(settings))
    }

    pub fn with_file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn with_package_index(mut self, index: impl PackageIndex + 'static) -> Self {
        self.index = Box::new(index);
        self.packages = OnceCell::new();
        self
    }

    /// Resolved allow/deny lists, resolving them on first call
    pub fn lists(&self) -> &ResolvedLists {
        self.lists.get_or_init(|| self.config.resolve())
    }

    fn packages(&self) -> &[PackageRecord] {
        self.packages.get_or_init(|| match self.index.packages() {
            Ok(records) => records,
            Err(e) => {
                tracing::debug!(target: TRACE_TARGET, "package metadata unavailable: {}", e);
                Vec::new()
            }
        })
    }

    /// Classify `path` and report which rule decided
    pub fn explain(&self, path: &Path) -> Verdict {
        tracing::debug!(target: TRACE_TARGET, "classifying {}", path.display());

        if !self.fs.is_file(path) {
            tracing::debug!(target: TRACE_TARGET, "{}: not an existing file", path.display());
            return Verdict::MissingFile;
        }

        let path = paths::absolutize(path, &self.config.cwd);
        let lists = self.lists();

        if let Some(matcher) = lists.deny.find_match(&path) {
            tracing::debug!(target: TRACE_TARGET, "{}: on deny-list ({})", path.display(), matcher);
            return Verdict::DenyListed {
                matcher: matcher.clone(),
            };
        }

        if let Some(matcher) = lists.allow.find_match(&path) {
            tracing::debug!(
                target: TRACE_TARGET,
                "{}: on allow-list ({})",
                path.display(),
                matcher
            );
            return Verdict::AllowListed {
                matcher: matcher.clone(),
            };
        }

        if let Some(record) = self.packages().iter().find(|record| record.declares(&path)) {
            tracing::debug!(
                target: TRACE_TARGET,
                "{}: package {} (editable: {})",
                path.display(),
                record.name,
                record.editable
            );
            return Verdict::Package {
                name: record.name.clone(),
                editable: record.editable,
            };
        }

        tracing::debug!(target: TRACE_TARGET, "{}: not caught by any rule", path.display());
        Verdict::Unknown
    }

    /// Whether `path` seems to be developed locally
    pub fn is_local_source(&self, path: &Path) -> bool {
        self.explain(path).is_local()
    }
}
