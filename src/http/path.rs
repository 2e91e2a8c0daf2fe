//! Request path normalization module
//!
//! Turns the raw URL path into a list of safe, decoded segments relative to
//! the document root.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt;
use std::path::PathBuf;

/// Characters escaped when a name is placed back into a URL path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Why a request path could not be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// Not valid UTF-8 after decoding, or contains a NUL byte
    Malformed,
    /// A `..` segment would climb above the document root
    Traversal,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => f.write_str("malformed request path"),
            Self::Traversal => f.write_str("path escapes the document root"),
        }
    }
}

impl std::error::Error for PathError {}

/// Decoded request path, guaranteed not to escape the root lexically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    segments: Vec<String>,
    trailing_slash: bool,
}

impl RequestPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub const fn has_trailing_slash(&self) -> bool {
        self.trailing_slash
    }

    /// Filesystem path relative to the document root
    pub fn to_relative_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    /// Decoded URL path of a directory, always ending in `/`
    pub fn directory_display(&self) -> String {
        let mut out = String::from("/");
        for segment in &self.segments {
            out.push_str(segment);
            out.push('/');
        }
        out
    }

    /// Percent-encoded URL path of a directory, always ending in `/`
    pub fn directory_href(&self) -> String {
        let mut out = String::from("/");
        for segment in &self.segments {
            out.push_str(&encode_segment(segment));
            out.push('/');
        }
        out
    }
}

/// Normalize a raw URL path (query already stripped).
///
/// Percent-escapes are decoded before splitting, so `%2e%2e` is treated as
/// `..` and `%2F` as a separator.
pub fn normalize(raw: &str) -> Result<RequestPath, PathError> {
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| PathError::Malformed)?;

    if decoded.contains('\0') {
        return Err(PathError::Malformed);
    }

    let mut segments: Vec<String> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(PathError::Traversal);
                }
            }
            s if cfg!(windows) && (s.contains('\\') || s.contains(':')) => {
                return Err(PathError::Traversal);
            }
            s => segments.push(s.to_string()),
        }
    }

    Ok(RequestPath {
        segments,
        trailing_slash: decoded.ends_with('/'),
    })
}

/// Percent-encode a single path segment for use in an href
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}
