//! Staging of extension resources into a clean build directory.

use crate::bail;
use crate::packager::error::Result;
use crate::packager::settings::Settings;
use crate::packager::utils::fs::{self, DeleteGuard};
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recreates the build directory and copies every matched resource into it.
///
/// Returns the staged files relative to the build directory. A pattern that
/// matches nothing is not an error.
pub async fn stage_resources(settings: &Settings) -> Result<Vec<PathBuf>> {
    let build_dir = &settings.paths().build_dir;
    let cwd = settings.cwd();

    if !cwd.is_dir() {
        bail!("resource directory {} does not exist", cwd.display());
    }

    log::info!("Staging resources into {}", build_dir.display());
    fs::recreate_dir(build_dir, DeleteGuard::new(settings.base_dir(), settings.force())).await?;

    let files = collect_resources(cwd, settings.resources(), build_dir)?;
    for relative in &files {
        fs::copy_file(&cwd.join(relative), &build_dir.join(relative)).await?;
    }

    log::info!("Staged {} file(s)", files.len());
    Ok(files.into_iter().collect())
}

/// Expands resource patterns relative to `cwd` into a sorted file set.
///
/// Patterns apply in order. A pattern prefixed with `!` removes earlier
/// matches. `*` does not cross directory separators, `**` does, and neither
/// matches a leading dot. A matched directory contributes every file below
/// it. Anything under `skip` (the build directory itself) is ignored.
pub fn collect_resources(
    cwd: &Path,
    patterns: &[String],
    skip: &Path,
) -> Result<BTreeSet<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };
    let candidates = walk_tree(cwd, skip)?;
    let mut files = BTreeSet::new();

    for pattern in patterns {
        if let Some(excluded) = pattern.strip_prefix('!') {
            let exclusion = Pattern::new(excluded)?;
            files.retain(|path: &PathBuf| !exclusion.matches_path_with(path, options));
            continue;
        }

        let inclusion = Pattern::new(pattern)?;
        let before = files.len();
        for (relative, is_dir) in &candidates {
            if !inclusion.matches_path_with(relative, options) {
                continue;
            }
            if *is_dir {
                files.extend(
                    candidates
                        .iter()
                        .filter(|(path, dir)| !dir && path.starts_with(relative))
                        .map(|(path, _)| path.clone()),
                );
            } else {
                files.insert(relative.clone());
            }
        }

        if files.len() == before {
            log::debug!("Pattern {pattern} matched no new files");
        }
    }

    Ok(files)
}

/// Lists every directory and file below `root`, relative to it, skipping `skip`.
fn walk_tree(root: &Path, skip: &Path) -> Result<Vec<(PathBuf, bool)>> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !entry.path().starts_with(skip));

    for entry in walker {
        let entry = entry?;
        let is_dir = entry.file_type().is_dir();
        if !is_dir && !entry.path().is_file() {
            continue;
        }
        entries.push((entry.path().strip_prefix(root)?.to_path_buf(), is_dir));
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, relative).unwrap();
    }

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    fn source_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "js/background.js");
        write(root, "js/lib/util.js");
        write(root, "images/icon.png");
        write(root, "popup.html");
        write(root, "notes.md");
        temp
    }

    #[test]
    fn test_default_patterns_collect_scripts_images_and_html() {
        let temp = source_tree();
        let skip = temp.path().join("build");

        let files = collect_resources(
            temp.path(),
            &patterns(&["js/**", "images/**", "*.html"]),
            &skip,
        )
        .unwrap();

        let expected: BTreeSet<PathBuf> = [
            "images/icon.png",
            "js/background.js",
            "js/lib/util.js",
            "popup.html",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        assert_eq!(files, expected);
    }

    #[test]
    fn test_negated_pattern_excludes() {
        let temp = source_tree();
        let files = collect_resources(
            temp.path(),
            &patterns(&["js/**", "!js/lib/**"]),
            &temp.path().join("build"),
        )
        .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files.contains(Path::new("js/background.js")));
    }

    #[test]
    fn test_unmatched_pattern_is_empty() {
        let temp = source_tree();
        let files = collect_resources(
            temp.path(),
            &patterns(&["css/**"]),
            &temp.path().join("build"),
        )
        .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_single_star_stays_in_directory() {
        let temp = source_tree();
        write(temp.path(), "pages/options.html");
        let files = collect_resources(
            temp.path(),
            &patterns(&["*.html"]),
            &temp.path().join("build"),
        )
        .unwrap();

        assert_eq!(files.len(), 1);
        assert!(files.contains(Path::new("popup.html")));
    }

    #[test]
    fn test_named_directory_contributes_its_files() {
        let temp = source_tree();
        let files = collect_resources(
            temp.path(),
            &patterns(&["images"]),
            &temp.path().join("build"),
        )
        .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.contains(Path::new("images/icon.png")));
    }

    #[tokio::test]
    async fn test_stage_fails_for_missing_cwd() {
        use crate::packager::{RawOptions, SettingsBuilder};

        let temp = TempDir::new().unwrap();
        let settings = SettingsBuilder::new()
            .options(RawOptions {
                name: Some("ext".into()),
                chrome: Some("chrome".into()),
                cert_path: Some("ext.pem".into()),
                crx_path: Some("ext.crx".into()),
                build_dir: Some("missing/build".into()),
                zip_path: Some("ext.zip".into()),
                cwd: Some("missing".into()),
                ..Default::default()
            })
            .base_dir(temp.path())
            .build()
            .unwrap();

        assert!(stage_resources(&settings).await.is_err());
        assert!(!temp.path().join("missing").exists());
    }

    #[test]
    fn test_build_dir_is_never_collected() {
        let temp = source_tree();
        let build = temp.path().join("build");
        write(temp.path(), "build/leftover.js");

        let files = collect_resources(temp.path(), &patterns(&["**/*"]), &build).unwrap();
        assert!(files.iter().all(|f| !f.starts_with("build")));
        assert!(files.contains(Path::new("notes.md")));
    }
}
