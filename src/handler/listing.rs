//! Directory listing module
//!
//! Synthesizes a minimal HTML index for directories without an index file.

use crate::handler::resolve::DirectoryTarget;
use crate::http::path::encode_segment;
use crate::logger;
use std::io;
use tokio::fs;

/// One immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

/// Read the immediate entries of a directory, sorted case-insensitively
pub async fn read_entries(dir: &DirectoryTarget) -> io::Result<Vec<ListingEntry>> {
    let mut reader = fs::read_dir(&dir.path).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        // Names that are not UTF-8 cannot be linked to
        let Ok(name) = entry.file_name().into_string() else {
            logger::log_debug(&format!(
                "Skipping non UTF-8 entry in {}: {:?}",
                dir.path.display(),
                entry.file_name()
            ));
            continue;
        };
        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|t| t.is_symlink());
        // Follow symlinks so links to directories get a trailing slash
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|m| m.is_dir());

        entries.push(ListingEntry {
            name,
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by_cached_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// Render the listing page for `dir`
pub fn render_listing(dir: &DirectoryTarget, entries: &[ListingEntry]) -> String {
    let title = format!(
        "Directory listing for {}",
        escape_html(&dir.request_path.directory_display())
    );
    let base = dir.request_path.directory_href();

    let mut html = String::with_capacity(256 + entries.len() * 64);
    html.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    html.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));

    for entry in entries {
        let mut display = entry.name.clone();
        let mut href = format!("{base}{}", encode_segment(&entry.name));
        if entry.is_dir {
            display.push('/');
            href.push('/');
        }
        if entry.is_symlink {
            display = format!("{}@", entry.name);
        }
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(&href),
            escape_html(&display)
        ));
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

/// Escape text for HTML element content and attribute values
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
