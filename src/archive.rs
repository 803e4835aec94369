use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use walkdir::WalkDir;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::constants::ARCHIVE_COMPRESSION_LEVEL;
use crate::error::ArchiveError;

/// Compress a built map directory into a single ZIP archive.
///
/// The directory structure is preserved relative to `source_dir`; the root
/// directory name itself is not included in entry names. Everything is
/// deflated at maximum compression. The file at `out_path` is created or
/// overwritten; on error it must be considered invalid and never uploaded.
///
/// # Arguments
///
/// * `source_dir` - Directory containing the built map
/// * `out_path` - Destination of the ZIP archive
///
/// # Returns
///
/// * `Ok(u64)` - Total uncompressed bytes written into the archive
/// * `Err(ArchiveError)` - Source missing, or I/O failure while writing
pub fn archive_directory(source_dir: &Path, out_path: &Path) -> Result<u64, ArchiveError> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::SourceMissing(source_dir.to_path_buf()));
    }

    let start = Instant::now();
    let file = fs::File::create(out_path).map_err(|e| ArchiveError::Io {
        path: out_path.to_path_buf(),
        source: e,
    })?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ARCHIVE_COMPRESSION_LEVEL))
        .unix_permissions(0o644);

    let mut total_bytes = 0u64;
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::Io {
            path: source_dir.to_path_buf(),
            source: e.into(),
        })?;

        let rel_path = entry
            .path()
            .strip_prefix(source_dir)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{rel_path}/"), options)?;
        } else {
            zip.start_file(rel_path.clone(), options)?;
            let source = fs::File::open(entry.path()).map_err(|e| ArchiveError::Io {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            let mut reader = BufReader::new(source);
            let copied = io::copy(&mut reader, &mut zip).map_err(|e| ArchiveError::Io {
                path: out_path.to_path_buf(),
                source: e,
            })?;
            total_bytes += copied;
            debug!("Compressed {} ({} bytes)", rel_path, copied);
        }
    }

    let mut inner = zip.finish()?;
    inner.flush().map_err(|e| ArchiveError::Io {
        path: out_path.to_path_buf(),
        source: e,
    })?;

    info!(
        "Compressed {} into {} in {:?}",
        source_dir.display(),
        out_path.display(),
        start.elapsed()
    );
    Ok(total_bytes)
}
