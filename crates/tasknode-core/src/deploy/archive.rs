use std::fs::File;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Compress `source_dir` into a zip at `archive_path`.
///
/// Entries are stored under `prefix/`, with `/` separators on every
/// platform. Returns the size of the finished archive in bytes.
pub fn write_zip_archive(source_dir: &Path, prefix: &str, archive_path: &Path) -> Result<u64> {
    let file = File::create(archive_path)
        .with_context(|| format!("Failed to create {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.add_directory(format!("{}/", prefix), options)?;

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.context("Failed to walk staging directory")?;
        if entry.depth() == 0 {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .context("Failed to relativize path")?;
        let name = format!("{}/{}", prefix, entry_name(relative));

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{}/", name), options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut source = File::open(entry.path())
                .with_context(|| format!("Failed to open {}", entry.path().display()))?;
            io::copy(&mut source, &mut zip)
                .with_context(|| format!("Failed to compress {}", entry.path().display()))?;
        }
    }

    let file = zip.finish().context("Failed to finish archive")?;
    let size = file.metadata()?.len();
    debug!(bytes = size, archive = %archive_path.display(), "Archive written");
    Ok(size)
}

fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
