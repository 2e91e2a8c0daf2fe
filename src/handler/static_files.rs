//! Static file serving module
//!
//! Turns a resolved [`Target`] into a response: file bytes with validators and
//! range support, index files, directory listings, or an error status.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::resolve::{find_index, DirectoryTarget, FileTarget, Target};
use crate::handler::router::RequestContext;
use crate::http::{self, cache::Validators, range::RangeParseResult, response};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::time::UNIX_EPOCH;
use tokio::fs;

/// Build the response for a resolved target
pub async fn respond(
    ctx: &RequestContext<'_>,
    state: &AppState,
    target: Target,
) -> Response<Full<Bytes>> {
    match target {
        Target::File(file) => serve_file(ctx, state, &file).await,
        Target::Directory(dir) => serve_directory(ctx, state, &dir).await,
        Target::NotFound => http::build_404_response(),
        Target::Forbidden => http::build_403_response(),
    }
}

/// Serve a regular file, honouring conditional and range headers
async fn serve_file(
    ctx: &RequestContext<'_>,
    state: &AppState,
    file: &FileTarget,
) -> Response<Full<Bytes>> {
    let modified = file.metadata.modified().unwrap_or(UNIX_EPOCH);
    let validators = Validators::new(file.metadata.len(), modified);
    let cache_control = state.config.http.cache_control.as_str();

    if validators.is_not_modified(
        ctx.if_none_match.as_deref(),
        ctx.if_modified_since.as_deref(),
    ) {
        return http::build_304_response(&validators, cache_control);
    }

    let data = match fs::read(&file.path).await {
        Ok(d) => Bytes::from(d),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return http::build_403_response();
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                file.path.display()
            ));
            return http::build_500_response();
        }
    };

    let content_type = state.mime.lookup(&file.path);

    match http::parse_range_header(ctx.range_header.as_deref(), data.len()) {
        RangeParseResult::Valid(range) => response::build_partial_response(
            &data,
            range,
            content_type,
            &validators,
            cache_control,
            ctx.is_head,
        ),
        RangeParseResult::NotSatisfiable => http::build_416_response(data.len()),
        RangeParseResult::None => response::build_file_response(
            data,
            content_type,
            &validators,
            cache_control,
            ctx.is_head,
        ),
    }
}

/// Serve a directory: its index file if present, otherwise a listing
async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &AppState,
    dir: &DirectoryTarget,
) -> Response<Full<Bytes>> {
    if let Some(index) = find_index(&state.root, dir, &state.config.files.index_files).await {
        return serve_file(ctx, state, &index).await;
    }

    if !state.config.files.directory_listing {
        return http::build_403_response();
    }

    match listing::read_entries(dir).await {
        Ok(entries) => {
            let html = listing::render_listing(dir, &entries);
            response::build_html_response(html, ctx.is_head)
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => http::build_403_response(),
        Err(e) => {
            logger::log_error(&format!(
                "Failed to list directory '{}': {e}",
                dir.path.display()
            ));
            http::build_500_response()
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::resolve::resolve;
    use crate::test_util::TempDir;
    use hyper::StatusCode;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn state_for(dir: &TempDir) -> AppState {
        let mut config = Config::load_from("does-not-exist/servedir-test-config").unwrap();
        config.files.root = dir.path().to_string_lossy().into_owned();
        AppState::new(config).unwrap()
    }

    fn set_mode(path: &Path, mode: u32) {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    async fn status_of(state: &AppState, path: &str) -> StatusCode {
        let ctx = RequestContext {
            path,
            is_head: false,
            if_none_match: None,
            if_modified_since: None,
            range_header: None,
        };
        let target = resolve(&state.root, path).await.unwrap();
        respond(&ctx, state, target).await.status()
    }

    #[tokio::test]
    async fn test_unreadable_file_is_forbidden() {
        let dir = TempDir::new("static-unreadable-file");
        dir.write("locked.txt", "secret");
        let file = dir.path().join("locked.txt");
        set_mode(&file, 0o000);

        // Permission bits do not apply to root
        if std::fs::read(&file).is_ok() {
            return;
        }

        let state = state_for(&dir);
        assert_eq!(status_of(&state, "/locked.txt").await, StatusCode::FORBIDDEN);
        set_mode(&file, 0o644);
    }

    #[tokio::test]
    async fn test_unreadable_directory_is_forbidden() {
        let dir = TempDir::new("static-unreadable-dir");
        dir.mkdir("locked");
        let locked = dir.path().join("locked");
        set_mode(&locked, 0o000);

        if std::fs::read_dir(&locked).is_ok() {
            set_mode(&locked, 0o755);
            return;
        }

        let state = state_for(&dir);
        let status = status_of(&state, "/locked/").await;
        set_mode(&locked, 0o755);
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
