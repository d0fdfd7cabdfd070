//! Turning lookups into HTTP responses

use bytes::Bytes;
use http::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED, LOCATION,
};
use http::{HeaderValue, Response, StatusCode};
use http_body_util::Full;
use webserve_static::Served;

pub type Body = Full<Bytes>;

/// Build the response for a lookup outcome
pub fn from_served(served: Served) -> Response<Body> {
    match served {
        Served::File(file) => {
            let status = StatusCode::from_u16(file.status).unwrap_or(StatusCode::OK);
            let mut builder = Response::builder()
                .status(status)
                .header(CONTENT_TYPE, file.mime_type)
                .header(CONTENT_LENGTH, file.content.len())
                .header(ACCEPT_RANGES, "bytes")
                .header(ETAG, file.etag);
            if let Some(last_modified) = file.last_modified {
                builder = builder.header(LAST_MODIFIED, last_modified);
            }
            if let Some(range) = file.content_range {
                builder = builder.header(CONTENT_RANGE, range);
            }
            finish(builder, Bytes::from(file.content))
        }
        Served::Listing(html) => finish(
            Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, "text/html; charset=utf-8")
                .header(CONTENT_LENGTH, html.len()),
            Bytes::from(html),
        ),
        Served::Redirect(location) => finish(
            Response::builder()
                .status(StatusCode::MOVED_PERMANENTLY)
                .header(LOCATION, location)
                .header(CONTENT_LENGTH, 0),
            Bytes::new(),
        ),
        Served::NotModified { last_modified, etag } => {
            let mut builder = Response::builder()
                .status(StatusCode::NOT_MODIFIED)
                .header(ETAG, etag);
            if let Some(last_modified) = last_modified {
                builder = builder.header(LAST_MODIFIED, last_modified);
            }
            finish(builder, Bytes::new())
        }
        Served::RangeNotSatisfiable { size } => {
            let mut response = error_page(StatusCode::RANGE_NOT_SATISFIABLE);
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", size)) {
                response.headers_mut().insert(CONTENT_RANGE, value);
            }
            response
        }
        Served::NotFound => error_page(StatusCode::NOT_FOUND),
    }
}

/// 501 for anything other than GET and HEAD
pub fn not_implemented() -> Response<Body> {
    let mut response = error_page(StatusCode::NOT_IMPLEMENTED);
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
    response
}

/// Small HTML page for error statuses
pub fn error_page(status: StatusCode) -> Response<Body> {
    let body = format!(
        "<!DOCTYPE html>\n<html><head><title>{status}</title></head><body><h1>{status}</h1></body></html>\n"
    );
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

fn finish(builder: http::response::Builder, body: Bytes) -> Response<Body> {
    builder
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            tracing::error!("❌ Failed to build response: {}", e);
            error_page(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use webserve_static::ServedFile;

    #[test]
    fn test_partial_file_headers() {
        let response = from_served(Served::File(ServedFile {
            content: b"2345".to_vec(),
            mime_type: "text/javascript",
            status: 206,
            content_range: Some("bytes 2-5/10".to_string()),
            last_modified: Some("Thu, 01 Jan 1970 00:00:00 GMT".to_string()),
            etag: "W/\"a-0\"".to_string(),
        }));

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "text/javascript");
        assert_eq!(headers[CONTENT_LENGTH], "4");
        assert_eq!(headers[CONTENT_RANGE], "bytes 2-5/10");
        assert_eq!(headers[ETAG], "W/\"a-0\"");
        assert_eq!(headers[ACCEPT_RANGES], "bytes");
    }

    #[test]
    fn test_redirect() {
        let response = from_served(Served::Redirect("/assets/".to_string()));
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/assets/");
    }

    #[test]
    fn test_range_not_satisfiable() {
        let response = from_served(Served::RangeNotSatisfiable { size: 10 });
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[CONTENT_RANGE], "bytes */10");
    }

    #[test]
    fn test_not_implemented_allows_get_and_head() {
        let response = not_implemented();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD");
    }
}
