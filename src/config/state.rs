// Application state module
// Read-only state shared by every connection task

use std::io;

use super::types::Config;
use crate::handler::resolve::DocumentRoot;
use crate::http::mime::MimeTable;

/// Application state, built once at startup and never mutated
pub struct AppState {
    pub config: Config,
    pub root: DocumentRoot,
    pub mime: MimeTable,
}

impl AppState {
    /// Resolve the document root and seed the MIME table.
    ///
    /// Fails when `files.root` does not exist or is not a directory.
    pub fn new(config: Config) -> io::Result<Self> {
        let root = DocumentRoot::new(&config.files.root)?;
        let mime = MimeTable::new(&config.mime.overrides, &config.mime.default_type);

        Ok(Self { config, root, mime })
    }
}
