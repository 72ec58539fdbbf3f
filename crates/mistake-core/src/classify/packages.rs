//! Installed package metadata
//!
//! Used only when neither list decides a path. A path that belongs to a
//! path/workspace package (cargo's equivalent of an editable install) counts as
//! local; one that belongs to a registry or git package does not.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use walkdir::WalkDir;

use super::paths;

/// Errors from the metadata service. All of them degrade to "not local".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// The metadata tool is not installed
    #[error("metadata tool unavailable: {0}")]
    Unavailable(String),

    /// The tool ran but reported failure
    #[error("metadata query failed: {0}")]
    QueryFailed(String),

    /// The tool's output could not be parsed
    #[error("malformed metadata: {0}")]
    Malformed(String),
}

/// One discovered package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub name: String,
    pub root: PathBuf,
    pub editable: bool,
    pub declared_files: BTreeSet<PathBuf>,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, editable: bool) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            editable,
            declared_files: BTreeSet::new(),
        }
    }

    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.declared_files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn declares(&self, path: &Path) -> bool {
        self.declared_files.contains(path)
    }
}

/// Package metadata query service
#[cfg_attr(test, mockall::automock)]
pub trait PackageIndex: Send {
    /// List installed packages with their declared files
    fn packages(&self) -> Result<Vec<PackageRecord>, MetadataError>;
}

/// Package index that never knows anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPackageIndex;

impl PackageIndex for NoPackageIndex {
    fn packages(&self) -> Result<Vec<PackageRecord>, MetadataError> {
        Err(MetadataError::Unavailable("no package index configured".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct CargoMetadata {
    packages: Vec<CargoPackage>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    name: String,
    manifest_path: PathBuf,
    #[serde(default)]
    source: Option<String>,
}

/// Package index backed by `cargo metadata`
#[derive(Debug, Clone)]
pub struct CargoMetadataIndex {
    cargo: PathBuf,
    manifest_dir: PathBuf,
}

impl CargoMetadataIndex {
    /// Query the workspace containing `manifest_dir`
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        let cargo = std::env::var_os("CARGO")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("cargo"));
        Self {
            cargo,
            manifest_dir: manifest_dir.into(),
        }
    }

    /// Query the workspace containing the current directory
    pub fn for_current_dir() -> Self {
        Self::new(paths::current_dir_or_root())
    }

    pub fn with_cargo(mut self, cargo: impl Into<PathBuf>) -> Self {
        self.cargo = cargo.into();
        self
    }

    fn run(&self) -> Result<Vec<u8>, MetadataError> {
        let output = Command::new(&self.cargo)
            .args(["metadata", "--format-version", "1", "--offline"])
            .current_dir(&self.manifest_dir)
            .output()
            .map_err(|e| MetadataError::Unavailable(format!("{}: {}", self.cargo.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MetadataError::QueryFailed(
                stderr.lines().next().unwrap_or("cargo metadata failed").to_string(),
            ));
        }
        Ok(output.stdout)
    }
}

impl PackageIndex for CargoMetadataIndex {
    fn packages(&self) -> Result<Vec<PackageRecord>, MetadataError> {
        let stdout = self.run()?;
        let records = parse_cargo_metadata(&stdout)?;
        tracing::debug!(
            target: "mistake::classify",
            "discovered {} packages from cargo metadata",
            records.len()
        );
        Ok(records)
    }
}

/// Turn `cargo metadata --format-version 1` output into package records.
pub fn parse_cargo_metadata(json: &[u8]) -> Result<Vec<PackageRecord>, MetadataError> {
    let metadata: CargoMetadata =
        serde_json::from_slice(json).map_err(|e| MetadataError::Malformed(e.to_string()))?;

    let mut records = Vec::with_capacity(metadata.packages.len());
    for package in metadata.packages {
        let Some(root) = package.manifest_path.parent() else {
            continue;
        };
        let root = paths::normalize(root);
        let files = package_files(&root);
        records.push(
            PackageRecord::new(package.name, root, package.source.is_none()).with_files(files),
        );
    }
    Ok(records)
}

/// Source files a package declares: every `.rs` file under its root, skipping
/// `target` and nested packages.
pub fn package_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name();
            name != "target" && name != ".git" && !entry.path().join("Cargo.toml").is_file()
        })
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|entry| paths::normalize(entry.path()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_package_files_skips_target_and_nested_packages() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(&root.join("Cargo.toml"), "[package]\nname = \"outer\"\n");
        write(&root.join("src/lib.rs"), "");
        write(&root.join("src/util/mod.rs"), "");
        write(&root.join("README.md"), "");
        write(&root.join("target/debug/build/out.rs"), "");
        write(&root.join("inner/Cargo.toml"), "[package]\nname = \"inner\"\n");
        write(&root.join("inner/src/lib.rs"), "");

        let mut files = package_files(root);
        files.sort();
        assert_eq!(
            files,
            vec![
                paths::normalize(&root.join("src/lib.rs")),
                paths::normalize(&root.join("src/util/mod.rs")),
            ]
        );
    }

    #[test]
    fn test_parse_cargo_metadata_marks_path_packages_editable() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("app");
        let registry = dir.path().join("registry/serde-1.0.0");
        write(&local.join("src/main.rs"), "");
        write(&registry.join("src/lib.rs"), "");

        let json = serde_json::json!({
            "packages": [
                {
                    "name": "app",
                    "manifest_path": local.join("Cargo.toml"),
                    "source": null
                },
                {
                    "name": "serde",
                    "manifest_path": registry.join("Cargo.toml"),
                    "source": "registry+https://github.com/rust-lang/crates.io-index"
                }
            ],
            "workspace_members": []
        });

        let records = parse_cargo_metadata(json.to_string().as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "app");
        assert!(records[0].editable);
        assert!(records[0].declares(&paths::normalize(&local.join("src/main.rs"))));
        assert_eq!(records[1].name, "serde");
        assert!(!records[1].editable);
        assert!(records[1].declares(&paths::normalize(&registry.join("src/lib.rs"))));
    }

    #[test]
    fn test_parse_cargo_metadata_rejects_garbage() {
        let err = parse_cargo_metadata(b"not json").unwrap_err();
        assert!(matches!(err, MetadataError::Malformed(_)));
    }

    #[test]
    fn test_missing_cargo_is_unavailable() {
        let index = CargoMetadataIndex::new("/").with_cargo("/nonexistent/cargo-binary");
        assert!(matches!(
            index.packages(),
            Err(MetadataError::Unavailable(_))
        ));
    }

    #[test]
    fn test_no_package_index() {
        assert!(NoPackageIndex.packages().is_err());
    }
}
