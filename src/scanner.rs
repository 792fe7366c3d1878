//! Directory scanning for a widget's data files.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{Span, debug, error, warn};
use walkdir::WalkDir;

use crate::error::Error;

/// Return `true` if `file_name` ends with one of the `allowed` suffixes.
///
/// Matching is a plain, case-sensitive string suffix test.
#[must_use]
pub fn is_allowed(file_name: &str, allowed: &[String]) -> bool {
    allowed
        .iter()
        .any(|ext| !ext.is_empty() && file_name.ends_with(ext.as_str()))
}

/// Recursively collect files under `dirs` whose names match `allowed`,
/// skipping every path already present in `known`.
///
/// Unreadable directories are logged and contribute nothing; the remaining
/// directories are still scanned. Order follows directory traversal.
pub fn scan_directories(dirs: &[String], allowed: &[String], known: &[PathBuf]) -> Vec<PathBuf> {
    let known: HashSet<&Path> = known.iter().map(PathBuf::as_path).collect();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut out = Vec::new();

    for dir in dirs {
        if dir.trim().is_empty() {
            continue;
        }
        let root = Path::new(dir);
        let before = out.len();
        if let Err(err) = walk_root(root, allowed, &known, &mut seen, &mut out) {
            error!(path = %root.display(), "{err}");
            continue;
        }
        debug!(
            path = %root.display(),
            added = out.len() - before,
            "directory scanned"
        );
    }

    out
}

/// Run [`scan_directories`] on the blocking pool, keeping the caller's span.
pub async fn scan(dirs: Vec<String>, allowed: Vec<String>, known: Vec<PathBuf>) -> Vec<PathBuf> {
    let span = Span::current();
    let res = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        scan_directories(&dirs, &allowed, &known)
    })
    .await;
    match res {
        Ok(files) => files,
        Err(err) => {
            error!("scan task failed: {err}");
            Vec::new()
        }
    }
}

fn walk_root(
    root: &Path,
    allowed: &[String],
    known: &HashSet<&Path>,
    seen: &mut HashSet<PathBuf>,
    out: &mut Vec<PathBuf>,
) -> Result<(), Error> {
    let mut walker = WalkDir::new(root).follow_links(true).into_iter();

    // The root itself must be a readable directory.
    match walker.next() {
        Some(Ok(entry)) if entry.file_type().is_dir() => {}
        Some(Ok(_)) => {
            return Err(Error::ScanDirectory {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }
        Some(Err(err)) => {
            return Err(Error::ScanDirectory {
                path: root.to_path_buf(),
                source: err.into(),
            });
        }
        None => return Ok(()),
    }

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // A nested entry we cannot read; keep what the rest of the tree offers.
                warn!(path = %root.display(), "skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if !is_allowed(&entry.file_name().to_string_lossy(), allowed) {
            continue;
        }
        let path = entry.into_path();
        if known.contains(path.as_path()) || seen.contains(&path) {
            continue;
        }
        seen.insert(path.clone());
        out.push(path);
    }
    Ok(())
}
