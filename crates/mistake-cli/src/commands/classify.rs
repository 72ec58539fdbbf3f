//! `mistake classify`

use colored::*;
use mistake_core::{Classifier, MistakeSettings, Verdict};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct ClassifiedPath {
    pub path: PathBuf,
    pub local: bool,
    pub verdict: Verdict,
}

/// Classify every path with one classifier
pub fn classify_paths(classifier: &Classifier, paths: &[PathBuf]) -> Vec<ClassifiedPath> {
    paths
        .iter()
        .map(|path| {
            let verdict = classifier.explain(path);
            ClassifiedPath {
                path: path.clone(),
                local: verdict.is_local(),
                verdict,
            }
        })
        .collect()
}

fn print_entry(entry: &ClassifiedPath) {
    let label = if entry.local {
        "local".green().bold()
    } else {
        "not local".dimmed()
    };
    println!("{}: {} ({})", display(&entry.path), label, entry.verdict);
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// Explain how each path is classified under the current environment
pub fn classify(paths: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let settings = MistakeSettings::from_env();
    let classifier = Classifier::from_settings(&settings);
    let results = classify_paths(&classifier, paths);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let lists = classifier.lists();
    println!("{} {}", "allow-list:".bold(), lists.allow);
    println!("{} {}", "deny-list:".bold(), lists.deny);
    for warning in &lists.warnings {
        println!("{} {}", "⚠".yellow().bold(), warning);
    }
    println!();

    for entry in &results {
        print_entry(entry);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mistake_core::ClassifierConfig;
    use mistake_core::classify::NoPackageIndex;
    use tempfile::TempDir;

    #[test]
    fn test_classify_paths() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("work/src");
        std::fs::create_dir_all(&src).unwrap();
        let file = src.join("lib.rs");
        std::fs::write(&file, "pub fn f() {}\n").unwrap();

        let work = dir.path().join("work").display().to_string();
        let config = ClassifierConfig::with_lists(&work, "");
        let classifier = Classifier::new(config).with_package_index(NoPackageIndex);

        let results = classify_paths(&classifier, &[file.clone(), dir.path().join("gone.rs")]);
        assert!(results[0].local);
        assert!(matches!(results[0].verdict, Verdict::AllowListed { .. }));
        assert!(!results[1].local);
        assert_eq!(results[1].verdict, Verdict::MissingFile);

        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json[1]["verdict"]["reason"], "missing_file");
    }
}
