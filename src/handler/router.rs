//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, path
//! resolution, response generation and access logging.

use crate::config::AppState;
use crate::handler::{resolve, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{
    HeaderName, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE, REFERER, SERVER, USER_AGENT,
};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

impl<'a> RequestContext<'a> {
    fn from_parts(parts: &'a Parts) -> Self {
        let headers = &parts.headers;
        Self {
            path: parts.uri.path(),
            is_head: parts.method == Method::HEAD,
            if_none_match: header_string(headers, IF_NONE_MATCH),
            if_modified_since: header_string(headers, IF_MODIFIED_SINCE),
            range_header: header_string(headers, RANGE),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let logging = &state.config.logging;
    // Request bodies are never read
    let parts = req.into_parts().0;

    logger::log_headers_count(parts.headers.len(), logging.show_headers);

    let mut response = match check_http_method(&parts.method) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext::from_parts(&parts);
            match resolve::resolve(&state.root, ctx.path).await {
                Ok(target) => static_files::respond(&ctx, &state, target).await,
                Err(e) => {
                    logger::log_warning(&format!("Bad request path '{}': {e}", ctx.path));
                    http::build_400_response()
                }
            }
        }
    };

    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, value);
    }

    if logging.access_log {
        let entry = access_log_entry(&parts, &response, remote_addr, started);
        logger::log_access(&entry, &logging.access_log_format);
    }

    Ok(response)
}

/// Return a response for anything other than GET/HEAD.
///
/// Standard methods get 405, unrecognised extension methods 501.
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::POST
        | Method::PUT
        | Method::DELETE
        | Method::PATCH
        | Method::OPTIONS
        | Method::TRACE
        | Method::CONNECT => {
            logger::log_debug(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
        _ => {
            logger::log_warning(&format!("Method not implemented: {method}"));
            Some(http::build_501_response())
        }
    }
}

fn access_log_entry(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_string(&req.headers, REFERER);
    entry.user_agent = header_string(&req.headers, USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_util::TempDir;
    use http_body_util::BodyExt;
    use hyper::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
    use hyper::StatusCode;

    fn state_for(dir: &TempDir) -> Arc<AppState> {
        let mut config = Config::load_from("does-not-exist/servedir-test-config").unwrap();
        config.files.root = dir.path().to_string_lossy().into_owned();
        config.logging.access_log = false;
        Arc::new(AppState::new(config).unwrap())
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        let resp = handle_request(req, Arc::clone(state), "127.0.0.1:4000".parse().unwrap())
            .await
            .unwrap();
        let (parts, body) = resp.into_parts();
        (parts.status, parts.headers, body.collect().await.unwrap().to_bytes())
    }

    #[tokio::test]
    async fn test_get_and_head_file() {
        let dir = TempDir::new("router-file");
        dir.write("a.txt", "hello");
        let state = state_for(&dir);

        let (status, headers, body) = send(&state, Method::GET, "/a.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_LENGTH], "5");
        assert_eq!(body, "hello");
        assert!(headers[SERVER].to_str().unwrap().starts_with("servedir/"));

        let (head_status, head_headers, head_body) = send(&state, Method::HEAD, "/a.txt").await;
        assert_eq!(head_status, StatusCode::OK);
        assert!(head_body.is_empty());
        assert_eq!(head_headers, headers);
    }

    #[tokio::test]
    async fn test_methods() {
        let dir = TempDir::new("router-methods");
        dir.write("a.txt", "hello");
        let state = state_for(&dir);

        let (status, headers, _) = send(&state, Method::POST, "/a.txt").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers[ALLOW], "GET, HEAD");

        let brew = Method::from_bytes(b"BREW").unwrap();
        let (status, _, _) = send(&state, brew, "/a.txt").await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let dir = TempDir::new("router-errors");
        let state = state_for(&dir);

        let (status, _, body) = send(&state, Method::GET, "/missing.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.is_empty());

        let (status, _, _) = send(&state, Method::GET, "/../secret").await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(&state, Method::GET, "/%FF").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_js_content_type() {
        let dir = TempDir::new("router-js");
        dir.write("app.js", "console.log(1);");
        let state = state_for(&dir);

        let (_, headers, _) = send(&state, Method::GET, "/app.js").await;
        assert_eq!(headers[CONTENT_TYPE], "application/javascript");
    }

    #[tokio::test]
    async fn test_conditional_get() {
        let dir = TempDir::new("router-etag");
        dir.write("a.txt", "hello");
        let state = state_for(&dir);

        let (_, headers, _) = send(&state, Method::GET, "/a.txt").await;
        let etag = headers[hyper::header::ETAG].to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/a.txt")
            .header(IF_NONE_MATCH, etag)
            .body(())
            .unwrap();
        let resp = handle_request(req, Arc::clone(&state), "127.0.0.1:4000".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_listing_can_be_disabled() {
        let dir = TempDir::new("router-nolisting");
        dir.mkdir("sub");
        let mut config = Config::load_from("does-not-exist/servedir-test-config").unwrap();
        config.files.root = dir.path().to_string_lossy().into_owned();
        config.files.directory_listing = false;
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(config).unwrap());

        let (status, _, _) = send(&state, Method::GET, "/sub/").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
