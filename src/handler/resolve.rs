//! Path resolution module
//!
//! Maps a request path onto the document root and classifies what is there.
//! Resolution happens once per request; responding is an exhaustive match on
//! [`Target`].

use crate::http::path::{self, PathError, RequestPath};
use crate::logger;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Canonical directory every served path must stay inside
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    path: PathBuf,
}

impl DocumentRoot {
    /// Canonicalize `path`; it must exist and be a directory
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = std::fs::canonicalize(path.as_ref())?;
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("document root is not a directory: {}", path.display()),
            ));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `candidate`, with symlinks resolved, lies inside the root
    pub async fn contains(&self, candidate: &Path) -> io::Result<bool> {
        let canonical = fs::canonicalize(candidate).await?;
        Ok(canonical.starts_with(&self.path))
    }
}

/// A regular file inside the root
#[derive(Debug)]
pub struct FileTarget {
    pub path: PathBuf,
    pub metadata: Metadata,
}

/// A directory inside the root
#[derive(Debug)]
pub struct DirectoryTarget {
    pub path: PathBuf,
    pub request_path: RequestPath,
}

/// Outcome of resolving one request path
#[derive(Debug)]
pub enum Target {
    File(FileTarget),
    Directory(DirectoryTarget),
    NotFound,
    Forbidden,
}

/// Resolve a raw URL path against the document root.
///
/// Only [`PathError::Malformed`] is returned as an error; traversal attempts
/// resolve to [`Target::Forbidden`].
pub async fn resolve(root: &DocumentRoot, raw_path: &str) -> Result<Target, PathError> {
    let request_path = match path::normalize(raw_path) {
        Ok(p) => p,
        Err(PathError::Traversal) => {
            logger::log_warning(&format!("Path traversal attempt blocked: {raw_path}"));
            return Ok(Target::Forbidden);
        }
        Err(e) => return Err(e),
    };

    let candidate = root.path().join(request_path.to_relative_path());

    let metadata = match fs::metadata(&candidate).await {
        Ok(m) => m,
        Err(e) => return Ok(classify_io_error(&candidate, &e)),
    };

    match root.contains(&candidate).await {
        Ok(true) => {}
        Ok(false) => {
            logger::log_warning(&format!(
                "Symlink outside document root blocked: {raw_path} -> {}",
                candidate.display()
            ));
            return Ok(Target::Forbidden);
        }
        Err(e) => return Ok(classify_io_error(&candidate, &e)),
    }

    if metadata.is_dir() {
        return Ok(Target::Directory(DirectoryTarget {
            path: candidate,
            request_path,
        }));
    }

    if metadata.is_file() {
        // A file addressed as if it were a directory does not exist
        if request_path.has_trailing_slash() {
            return Ok(Target::NotFound);
        }
        return Ok(Target::File(FileTarget {
            path: candidate,
            metadata,
        }));
    }

    // Sockets, FIFOs and devices are never served
    Ok(Target::Forbidden)
}

/// First index file that exists as a regular file inside `dir`
pub async fn find_index(
    root: &DocumentRoot,
    dir: &DirectoryTarget,
    index_files: &[String],
) -> Option<FileTarget> {
    for name in index_files {
        let candidate = dir.path.join(name);
        let Ok(metadata) = fs::metadata(&candidate).await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        if matches!(root.contains(&candidate).await, Ok(true)) {
            return Some(FileTarget {
                path: candidate,
                metadata,
            });
        }
        logger::log_warning(&format!(
            "Index file outside document root ignored: {}",
            candidate.display()
        ));
    }
    None
}

fn classify_io_error(candidate: &Path, err: &io::Error) -> Target {
    match err.kind() {
        io::ErrorKind::PermissionDenied => Target::Forbidden,
        io::ErrorKind::NotFound => Target::NotFound,
        _ => {
            logger::log_debug(&format!(
                "Treating '{}' as missing: {err}",
                candidate.display()
            ));
            Target::NotFound
        }
    }
}
