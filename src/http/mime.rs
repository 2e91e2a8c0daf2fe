//! MIME type detection module
//!
//! Maps file extensions to Content-Type values. The built-in table plays the
//! role of the system defaults; the `.js` override and any configured
//! overrides are layered on top.

use std::collections::HashMap;
use std::path::Path;

/// Overrides applied on top of the built-in table before configuration
const BUILTIN_OVERRIDES: &[(&str, &str)] = &[(".js", "application/javascript")];

/// Extension to content-type lookup, read-only after startup
#[derive(Debug, Clone)]
pub struct MimeTable {
    /// Keys are lowercase and carry a leading dot
    overrides: HashMap<String, String>,
    default_type: String,
}

impl MimeTable {
    /// Build a table from configured overrides.
    ///
    /// Keys may be given with or without the leading dot and in any case.
    pub fn new(overrides: &HashMap<String, String>, default_type: &str) -> Self {
        let mut table: HashMap<String, String> = BUILTIN_OVERRIDES
            .iter()
            .map(|(ext, ty)| ((*ext).to_string(), (*ty).to_string()))
            .collect();

        for (ext, ty) in overrides {
            table.insert(normalize_extension(ext), ty.clone());
        }

        Self {
            overrides: table,
            default_type: default_type.to_string(),
        }
    }

    /// Content type for a file path, falling back to the default type
    pub fn lookup(&self, path: &Path) -> &str {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return &self.default_type;
        };
        let key = normalize_extension(ext);

        if let Some(ty) = self.overrides.get(&key) {
            return ty;
        }
        builtin_content_type(&key[1..]).unwrap_or(self.default_type.as_str())
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::new(&HashMap::new(), "application/octet-stream")
    }
}

/// Lowercase and ensure a single leading dot
fn normalize_extension(ext: &str) -> String {
    format!(".{}", ext.trim_start_matches('.').to_ascii_lowercase())
}

/// Built-in table keyed by lowercase extension without the dot
fn builtin_content_type(extension: &str) -> Option<&'static str> {
    let ty = match extension {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "text/javascript",
        "json" | "map" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "bmp" => "image/bmp",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" | "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",

        // 3D assets
        "obj" => "model/obj",
        "gltf" => "model/gltf+json",
        "glb" => "model/gltf-binary",

        _ => return None,
    };
    Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        let table = MimeTable::default();
        assert_eq!(table.lookup(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(table.lookup(Path::new("a.css")), "text/css");
        assert_eq!(table.lookup(Path::new("a.json")), "application/json");
        assert_eq!(table.lookup(Path::new("a.png")), "image/png");
        assert_eq!(table.lookup(Path::new("a.mp4")), "video/mp4");
    }

    #[test]
    fn test_js_override() {
        let table = MimeTable::default();
        assert_eq!(table.lookup(Path::new("app.js")), "application/javascript");
        assert_eq!(table.lookup(Path::new("dir/APP.JS")), "application/javascript");
        // Only .js is overridden
        assert_eq!(table.lookup(Path::new("mod.mjs")), "text/javascript");
    }

    #[test]
    fn test_configured_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert("obj".to_string(), "text/plain".to_string());
        overrides.insert(".JS".to_string(), "text/javascript".to_string());
        let table = MimeTable::new(&overrides, "application/octet-stream");

        assert_eq!(table.lookup(Path::new("cube.obj")), "text/plain");
        assert_eq!(table.lookup(Path::new("app.js")), "text/javascript");
    }

    #[test]
    fn test_unknown_extension() {
        let table = MimeTable::default();
        assert_eq!(table.lookup(Path::new("a.xyz")), "application/octet-stream");
        assert_eq!(table.lookup(Path::new("Makefile")), "application/octet-stream");

        let custom = MimeTable::new(&HashMap::new(), "text/plain");
        assert_eq!(custom.lookup(Path::new("a.xyz")), "text/plain");
    }
}
