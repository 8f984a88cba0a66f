use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::ExclusionRules;

/// Copy `source` into `dest`, skipping every entry whose name is excluded.
///
/// Excluded directories are not descended into. `dest` itself is never
/// copied, even when it lives inside `source`. Symlinks to files are copied
/// by content; symlinked directories are skipped.
///
/// Returns the number of files copied.
pub fn snapshot_directory(source: &Path, dest: &Path, rules: &ExclusionRules) -> Result<usize> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create {}", dest.display()))?;

    let walker = WalkDir::new(source)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || (entry.path() != dest
                    && !rules.is_excluded(&entry.file_name().to_string_lossy()))
        });

    let mut copied = 0;
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "Skipping unreadable path during snapshot");
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source)
            .context("Failed to relativize path")?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else if file_type.is_file() {
            copy_file(entry.path(), &target)?;
            copied += 1;
        } else if file_type.is_symlink() {
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => {
                    copy_file(entry.path(), &target)?;
                    copied += 1;
                }
                _ => debug!(path = %entry.path().display(), "Skipping symlink"),
            }
        }
    }

    debug!(files = copied, dest = %dest.display(), "Snapshot complete");
    Ok(copied)
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
    Ok(())
}
