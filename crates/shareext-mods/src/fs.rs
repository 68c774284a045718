//! Filesystem helpers for materializing the extension directory
//!
//! Every failure carries the path that failed.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Create a directory and its parents; an existing directory is fine
pub fn ensure_dir(path: &Utf8Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::filesystem(path, e))
}

/// Copy a file, byte for byte
///
/// When `target` is an existing directory the file keeps its name inside it.
pub fn copy_file(source: &Utf8Path, target: &Utf8Path) -> Result<Utf8PathBuf> {
    let destination = match source.file_name() {
        Some(name) if target.is_dir() => target.join(name),
        _ => target.to_owned(),
    };

    let bytes = fs::read(source).map_err(|e| Error::filesystem(source, e))?;
    fs::write(&destination, bytes).map_err(|e| Error::filesystem(&destination, e))?;

    debug!("Copied {} -> {}", source, destination);
    Ok(destination)
}

/// Copy `source` into `target_dir/<basename of source>`, recursing into
/// subdirectories of any depth
pub fn copy_dir_recursive(source: &Utf8Path, target_dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        Error::filesystem(
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name"),
        )
    })?;
    if !source.is_dir() {
        return Err(Error::filesystem(
            source,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source directory does not exist"),
        ));
    }
    let destination = target_dir.join(name);
    ensure_dir(&destination)?;

    let mut copied = 0usize;
    for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| source.to_string());
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            Error::filesystem(path, source)
        })?;

        let path = Utf8Path::from_path(entry.path()).ok_or_else(|| Error::NonUtf8Path {
            path: entry.path().display().to_string(),
        })?;
        let relative = path
            .strip_prefix(source)
            .map_err(|_| Error::NonUtf8Path {
                path: path.to_string(),
            })?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            copy_file(path, &target)?;
            copied += 1;
        }
    }

    debug!("Copied {} files from {} -> {}", copied, source, destination);
    Ok(destination)
}

/// Relative form of `path` under `base`, or the path itself when outside it
pub fn relative_to(path: &Utf8Path, base: &Utf8Path) -> String {
    path.strip_prefix(base)
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|_| path.as_str().to_string())
}
