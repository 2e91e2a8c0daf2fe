//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from
//! file resolution.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CACHE_CONTROL, CONNECTION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
    ETAG, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};

use super::cache::Validators;
use super::range::ByteRange;

/// Methods a static file server answers
pub const ALLOWED_METHODS: &str = "GET, HEAD";

/// Build a plain-text status response such as `404 Not Found`
fn build_text_response(status: StatusCode) -> Response<Full<Bytes>> {
    let body = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 400 Bad Request response; the connection is closed afterwards
pub fn build_400_response() -> Response<Full<Bytes>> {
    let mut resp = build_text_response(StatusCode::BAD_REQUEST);
    resp.headers_mut()
        .insert(CONNECTION, hyper::header::HeaderValue::from_static("close"));
    resp
}

/// Build 403 Forbidden response
pub fn build_403_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::FORBIDDEN)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut resp = build_text_response(StatusCode::METHOD_NOT_ALLOWED);
    resp.headers_mut().insert(
        ALLOW,
        hyper::header::HeaderValue::from_static(ALLOWED_METHODS),
    );
    resp
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build 501 Not Implemented response
pub fn build_501_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_IMPLEMENTED)
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators, cache_control: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, &validators.etag)
        .header(LAST_MODIFIED, &validators.last_modified)
        .header(CACHE_CONTROL, cache_control)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> Response<Full<Bytes>> {
    let mut resp = build_text_response(StatusCode::RANGE_NOT_SATISFIABLE);
    if let Ok(value) = format!("bytes */{file_size}").parse() {
        resp.headers_mut().insert(CONTENT_RANGE, value);
    }
    resp
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 200 file response with validators
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    validators: &Validators,
    cache_control: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, &validators.etag)
        .header(LAST_MODIFIED, &validators.last_modified)
        .header(CACHE_CONTROL, cache_control)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 Partial Content response; `data` is the full file
pub fn build_partial_response(
    data: &Bytes,
    range: ByteRange,
    content_type: &str,
    validators: &Validators,
    cache_control: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let body = if is_head {
        Bytes::new()
    } else {
        data.slice(range.start..=range.end)
    };

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, range.len())
        .header(CONTENT_RANGE, range.content_range(data.len()))
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, &validators.etag)
        .header(LAST_MODIFIED, &validators.last_modified)
        .header(CACHE_CONTROL, cache_control)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::time::{Duration, UNIX_EPOCH};

    async fn body_of(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_error_bodies_are_readable() {
        let resp = build_404_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(resp).await, "404 Not Found");

        let resp = build_405_response();
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD");

        let resp = build_400_response();
        assert_eq!(resp.headers()[CONNECTION], "close");

        let resp = build_416_response(5);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes */5");
    }

    #[tokio::test]
    async fn test_head_keeps_length() {
        let v = Validators::new(5, UNIX_EPOCH + Duration::from_secs(10));
        let resp = build_file_response(Bytes::from("hello"), "text/plain", &v, "no-cache", true);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "5");
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_slice() {
        let v = Validators::new(5, UNIX_EPOCH);
        let data = Bytes::from("hello");
        let resp = build_partial_response(
            &data,
            ByteRange { start: 1, end: 3 },
            "text/plain",
            &v,
            "no-cache",
            false,
        );
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 1-3/5");
        assert_eq!(body_of(resp).await, "ell");
    }
}
