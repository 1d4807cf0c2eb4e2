use super::ModifierError;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A `.proto` file found under one of the source directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to its source directory, `/`-separated
    pub relative: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    pub max_depth: usize,
    pub follow_links: bool,
}

/// Collects `.proto` files from every source directory, sorted by relative path
///
/// When two directories contain the same relative path the later directory
/// wins. Unreadable entries are skipped with a warning.
pub fn discover(
    source_dirs: &[PathBuf],
    options: WalkOptions,
) -> Result<Vec<SourceFile>, ModifierError> {
    let mut found: BTreeMap<String, SourceFile> = BTreeMap::new();

    for source_dir in source_dirs {
        if !source_dir.exists() {
            return Err(ModifierError::SourceNotFound(source_dir.clone()));
        }
        if !source_dir.is_dir() {
            return Err(ModifierError::NotADirectory(source_dir.clone()));
        }

        for file in walk_dir(source_dir, options) {
            if let Some(previous) = found.get(&file.relative) {
                warn!(
                    relative = %file.relative,
                    replaced = %previous.path.display(),
                    by = %file.path.display(),
                    "Same relative path in several source directories, using the last one"
                );
            }
            found.insert(file.relative.clone(), file);
        }
    }

    Ok(found.into_values().collect())
}

fn walk_dir(source_dir: &Path, options: WalkOptions) -> Vec<SourceFile> {
    let mut files = Vec::new();

    for result in WalkBuilder::new(source_dir)
        .standard_filters(false)
        .follow_links(options.follow_links)
        .max_depth(Some(options.max_depth))
        .build()
    {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("proto") {
            continue;
        }

        let Some(relative) = relative_path(source_dir, path) else {
            continue;
        };
        debug!(path = %path.display(), %relative, "Discovered proto file");
        files.push(SourceFile {
            relative,
            path: path.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    files
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
