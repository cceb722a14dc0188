//! The transport side of rendering.
//!
//! [`ResponseSink`] is the small set of operations the renderer needs from a
//! transport: headers, a status line committed at most once, and body bytes.
//! Default methods provide the usual server behaviors on top (plain text
//! errors, redirects, file serving) so transports only implement the basics.
//!
//! [`BufferedResponse`] collects everything in memory and converts into an
//! [`http::Response`].

use crate::cookie::Cookie;
use crate::http::HttpRequest;
use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, IF_MODIFIED_SINCE, LAST_MODIFIED, LOCATION, SET_COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::Path;
use url::{ParseError, Position, Url};
use webs_log::{debug, warn};

/// Placeholder origin for joining relative redirect targets.
const RELATIVE_BASE: &str = "http://localhost/";

/// A transport response being written.
///
/// Headers only take effect until the status is committed, either by
/// [`write_status`](ResponseSink::write_status) or by the first
/// [`write`](ResponseSink::write), which commits `200 OK`.
pub trait ResponseSink {
    /// Current value of header `name`.
    fn header(&self, name: &str) -> Option<String>;

    /// Append a header value, keeping earlier values for the same name.
    fn add_header(&mut self, name: &str, value: &str);

    /// Replace all values of header `name`.
    fn set_header(&mut self, name: &str, value: &str);

    fn remove_header(&mut self, name: &str);

    /// Commit the status line. Later calls are ignored.
    fn write_status(&mut self, status: StatusCode);

    /// Append body bytes, committing `200 OK` first if needed.
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    fn is_committed(&self) -> bool;

    /// Emit a `Set-Cookie` header. Cookies with invalid names are dropped.
    fn set_cookie(&mut self, cookie: &Cookie) {
        match cookie.header_value() {
            Some(value) => self.add_header(SET_COOKIE.as_str(), &value),
            None => warn!(target: "webs::render", "dropping cookie with invalid name {:?}", cookie.name),
        }
    }

    /// Reply with a plain text error.
    fn error(&mut self, message: &str, status: StatusCode) {
        self.remove_header(CONTENT_LENGTH.as_str());
        self.set_header(CONTENT_TYPE.as_str(), "text/plain; charset=utf-8");
        self.set_header("X-Content-Type-Options", "nosniff");
        self.write_status(status);
        let _ = self.write(format!("{}\n", message).as_bytes());
    }

    /// Reply with `404 page not found`.
    fn not_found(&mut self) {
        self.error("404 page not found", StatusCode::NOT_FOUND);
    }

    /// Redirect to `location`, resolved against the request path when relative.
    fn redirect(&mut self, request: &HttpRequest, location: &str, status: StatusCode) {
        let location = resolve_location(&request.path, location);
        self.set_header(LOCATION.as_str(), &location);

        let is_get = request.method == Method::GET;
        if (is_get || request.method == Method::HEAD) && self.header(CONTENT_TYPE.as_str()).is_none() {
            self.set_header(CONTENT_TYPE.as_str(), "text/html; charset=utf-8");
        }
        self.write_status(status);

        if is_get {
            let reason = status.canonical_reason().unwrap_or("Redirect");
            let body = format!("<a href=\"{}\">{}</a>.\n", html_escape(&location), reason);
            let _ = self.write(body.as_bytes());
        }
    }

    /// Stream the file at `path`.
    ///
    /// Missing files and directories answer 404, unreadable files 403 or 500.
    /// The content type is guessed from the extension unless already set.
    fn serve_file(&mut self, request: &HttpRequest, path: &Path) {
        if request.path.split('/').any(|segment| segment == "..") {
            self.error("invalid URL path", StatusCode::BAD_REQUEST);
            return;
        }

        let opened = File::open(path).and_then(|file| {
            let metadata = file.metadata()?;
            Ok((file, metadata))
        });
        let (mut file, metadata) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                debug!(target: "webs::render", "cannot open {:?}: {}", path, e);
                match e.kind() {
                    ErrorKind::NotFound => self.not_found(),
                    ErrorKind::PermissionDenied => self.error("403 Forbidden", StatusCode::FORBIDDEN),
                    _ => self.error("500 Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR),
                }
                return;
            }
        };
        if metadata.is_dir() {
            self.not_found();
            return;
        }

        let conditional = request.method == Method::GET || request.method == Method::HEAD;
        if let Ok(modified) = metadata.modified() {
            let not_modified = conditional
                && request
                    .header(IF_MODIFIED_SINCE.as_str())
                    .and_then(|since| httpdate::parse_http_date(since).ok())
                    .is_some_and(|since| {
                        httpdate::HttpDate::from(modified) <= httpdate::HttpDate::from(since)
                    });
            if not_modified {
                self.remove_header(CONTENT_TYPE.as_str());
                self.write_status(StatusCode::NOT_MODIFIED);
                return;
            }
            self.set_header(LAST_MODIFIED.as_str(), &httpdate::fmt_http_date(modified));
        }

        if self.header(CONTENT_TYPE.as_str()).is_none() {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            self.set_header(CONTENT_TYPE.as_str(), mime.as_ref());
        }
        self.set_header(CONTENT_LENGTH.as_str(), &metadata.len().to_string());
        self.write_status(StatusCode::OK);

        if request.method != Method::HEAD {
            if let Err(e) = io::copy(&mut file, &mut SinkWriter(self)) {
                warn!(target: "webs::render", "error while sending {:?}: {}", path, e);
            }
        }
    }
}

/// [`io::Write`] over a sink's body.
pub struct SinkWriter<'a, S: ResponseSink + ?Sized>(pub &'a mut S);

impl<S: ResponseSink + ?Sized> io::Write for SinkWriter<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Resolve a redirect target the way browsers expect a server to.
///
/// Targets with a scheme (`https:`, `mailto:`) or a host (`//cdn/x`) pass
/// through unchanged. Anything else is joined to `request_path`, with `.`
/// and `..` segments removed and the query kept.
pub fn resolve_location(request_path: &str, location: &str) -> String {
    if location.starts_with("//") {
        return location.to_string();
    }
    match Url::parse(location) {
        Err(ParseError::RelativeUrlWithoutBase) => {}
        _ => return location.to_string(),
    }

    let resolved = Url::parse(RELATIVE_BASE)
        .and_then(|base| base.join(request_path))
        .and_then(|base| base.join(location));
    match resolved {
        Ok(url) => url[Position::BeforePath..].to_string(),
        Err(e) => {
            debug!(target: "webs::render", "cannot resolve {:?} against {:?}: {}", location, request_path, e);
            location.to_string()
        }
    }
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// A response collected in memory.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed status, `200 OK` if nothing was written.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// All `Set-Cookie` values in the order they were added.
    pub fn set_cookies(&self) -> Vec<&str> {
        self.headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn into_http(self) -> http::Response<Bytes> {
        let status = self.status();
        let mut response = http::Response::new(self.body.freeze());
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }

    fn parse(name: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => Some((name, value)),
            _ => {
                warn!(target: "webs::render", "ignoring invalid header {:?}", name);
                None
            }
        }
    }

    fn accepts_headers(&self, name: &str) -> bool {
        if self.status.is_some() {
            debug!(target: "webs::render", "header {:?} set after commit, ignored", name);
            return false;
        }
        true
    }
}

impl ResponseSink for BufferedResponse {
    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    fn add_header(&mut self, name: &str, value: &str) {
        if !self.accepts_headers(name) {
            return;
        }
        if let Some((name, value)) = Self::parse(name, value) {
            self.headers.append(name, value);
        }
    }

    fn set_header(&mut self, name: &str, value: &str) {
        if !self.accepts_headers(name) {
            return;
        }
        if let Some((name, value)) = Self::parse(name, value) {
            self.headers.insert(name, value);
        }
    }

    fn remove_header(&mut self, name: &str) {
        if self.accepts_headers(name) {
            self.headers.remove(name);
        }
    }

    fn write_status(&mut self, status: StatusCode) {
        if let Some(committed) = self.status {
            debug!(target: "webs::render", "superfluous status {} after {}", status, committed);
            return;
        }
        self.status = Some(status);
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        if self.status.is_none() {
            self.write_status(StatusCode::OK);
        }
        self.body.extend_from_slice(data);
        Ok(())
    }

    fn is_committed(&self) -> bool {
        self.status.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::MaxAge;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_write_commits_ok() {
        let mut sink = BufferedResponse::new();
        assert!(!sink.is_committed());
        sink.write(b"hi").unwrap();
        assert!(sink.is_committed());
        assert_eq!(sink.status(), StatusCode::OK);
        assert_eq!(sink.body(), b"hi");
    }

    #[test]
    fn test_first_status_wins() {
        let mut sink = BufferedResponse::new();
        sink.write_status(StatusCode::NOT_FOUND);
        sink.write_status(StatusCode::OK);
        assert_eq!(sink.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_headers_ignored_after_commit() {
        let mut sink = BufferedResponse::new();
        sink.add_header("X-Before", "1");
        sink.write_status(StatusCode::OK);
        sink.add_header("X-After", "1");
        sink.set_header("X-Before", "2");

        assert_eq!(sink.header("X-Before").as_deref(), Some("1"));
        assert!(sink.header("X-After").is_none());
    }

    #[test]
    fn test_add_and_set_header() {
        let mut sink = BufferedResponse::new();
        sink.add_header("X-A", "1");
        sink.add_header("X-A", "2");
        assert_eq!(sink.headers().get_all("X-A").iter().count(), 2);

        sink.set_header("X-A", "3");
        assert_eq!(sink.headers().get_all("X-A").iter().count(), 1);
        assert_eq!(sink.header("x-a").as_deref(), Some("3"));
    }

    #[test]
    fn test_invalid_header_ignored() {
        let mut sink = BufferedResponse::new();
        sink.add_header("Bad Name", "v");
        sink.add_header("X-Ok", "line\nbreak");
        assert!(sink.headers().is_empty());
    }

    #[test]
    fn test_set_cookie() {
        let mut sink = BufferedResponse::new();
        sink.set_cookie(&Cookie::new("a", "1", MaxAge::Unset));
        sink.set_cookie(&Cookie::new("b", "2", MaxAge::Expire));
        sink.set_cookie(&Cookie::new("bad name", "3", MaxAge::Unset));
        assert_eq!(sink.set_cookies(), vec!["a=1", "b=2; Max-Age=0"]);
    }

    #[test]
    fn test_error() {
        let mut sink = BufferedResponse::new();
        sink.error("boom", StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sink.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sink.body_text(), "boom\n");
        assert_eq!(
            sink.header("Content-Type").as_deref(),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(sink.header("X-Content-Type-Options").as_deref(), Some("nosniff"));
    }

    #[test]
    fn test_redirect_get() {
        let mut sink = BufferedResponse::new();
        let req = HttpRequest::new(Method::GET, "/a/b");
        sink.redirect(&req, "/", StatusCode::SEE_OTHER);

        assert_eq!(sink.status(), StatusCode::SEE_OTHER);
        assert_eq!(sink.header("Location").as_deref(), Some("/"));
        assert_eq!(sink.body_text(), "<a href=\"/\">See Other</a>.\n");
    }

    #[test]
    fn test_redirect_post_has_no_body() {
        let mut sink = BufferedResponse::new();
        let req = HttpRequest::new(Method::POST, "/");
        sink.redirect(&req, "/done", StatusCode::SEE_OTHER);

        assert_eq!(sink.header("Location").as_deref(), Some("/done"));
        assert!(sink.header("Content-Type").is_none());
        assert!(sink.body().is_empty());
    }

    #[test]
    fn test_resolve_location() {
        assert_eq!(resolve_location("/a/b", "c"), "/a/c");
        assert_eq!(resolve_location("/a/b/", "c"), "/a/b/c");
        assert_eq!(resolve_location("/a/b", "../c?x=1"), "/c?x=1");
        assert_eq!(resolve_location("/a/b", "./"), "/a/");
        assert_eq!(resolve_location("/a", "/x/../y"), "/y");
        assert_eq!(resolve_location("/a", "https://example.com/z"), "https://example.com/z");
        assert_eq!(resolve_location("/a", "//cdn.example.com/z"), "//cdn.example.com/z");
        assert_eq!(resolve_location("/a/b", "d/"), "/a/d/");
        assert_eq!(resolve_location("/a/b", "login?next=http://x/y"), "/a/login?next=http://x/y");
        assert_eq!(resolve_location("/a/b", "mailto:ann@example.com"), "mailto:ann@example.com");
    }

    #[test]
    fn test_serve_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"hello file")
            .unwrap();

        let mut sink = BufferedResponse::new();
        sink.serve_file(&HttpRequest::new(Method::GET, "/static/hello.txt"), &path);

        assert_eq!(sink.status(), StatusCode::OK);
        assert_eq!(sink.body(), b"hello file");
        assert_eq!(sink.header("Content-Type").as_deref(), Some("text/plain"));
        assert_eq!(sink.header("Content-Length").as_deref(), Some("10"));
        assert!(sink.header("Last-Modified").is_some());
    }

    #[test]
    fn test_serve_file_keeps_content_type() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"\x00\x01").unwrap();

        let mut sink = BufferedResponse::new();
        sink.set_header("Content-Type", "application/x-custom");
        sink.serve_file(&HttpRequest::new(Method::GET, "/data.bin"), &path);

        assert_eq!(sink.header("Content-Type").as_deref(), Some("application/x-custom"));
    }

    #[test]
    fn test_serve_file_head_has_no_body() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"abc").unwrap();

        let mut sink = BufferedResponse::new();
        sink.serve_file(&HttpRequest::new(Method::HEAD, "/a.txt"), &path);
        assert_eq!(sink.status(), StatusCode::OK);
        assert!(sink.body().is_empty());
    }

    #[test]
    fn test_serve_file_not_modified() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"abc").unwrap();

        let mut first = BufferedResponse::new();
        first.serve_file(&HttpRequest::new(Method::GET, "/a.txt"), &path);
        let last_modified = first.header("Last-Modified").unwrap();

        let mut sink = BufferedResponse::new();
        sink.set_header("Content-Type", "text/plain");
        let req = HttpRequest::new(Method::GET, "/a.txt").with_header("If-Modified-Since", &last_modified);
        sink.serve_file(&req, &path);

        assert_eq!(sink.status(), StatusCode::NOT_MODIFIED);
        assert!(sink.body().is_empty());
        assert!(sink.header("Content-Type").is_none());
    }

    #[test]
    fn test_serve_file_ignores_if_modified_since_on_post() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"abc").unwrap();

        let mut first = BufferedResponse::new();
        first.serve_file(&HttpRequest::new(Method::GET, "/a.txt"), &path);
        let last_modified = first.header("Last-Modified").unwrap();

        let mut sink = BufferedResponse::new();
        let req = HttpRequest::new(Method::POST, "/a.txt").with_header("If-Modified-Since", &last_modified);
        sink.serve_file(&req, &path);

        assert_eq!(sink.status(), StatusCode::OK);
        assert_eq!(sink.body(), b"abc");
    }

    #[test]
    fn test_serve_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut sink = BufferedResponse::new();
        sink.serve_file(&HttpRequest::new(Method::GET, "/x"), &dir.path().join("missing"));

        assert_eq!(sink.status(), StatusCode::NOT_FOUND);
        assert_eq!(sink.body_text(), "404 page not found\n");
    }

    #[test]
    fn test_serve_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut sink = BufferedResponse::new();
        sink.serve_file(&HttpRequest::new(Method::GET, "/"), dir.path());
        assert_eq!(sink.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_serve_file_rejects_dotdot_request() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"abc").unwrap();

        let mut sink = BufferedResponse::new();
        sink.serve_file(&HttpRequest::new(Method::GET, "/static/../a.txt"), &path);
        assert_eq!(sink.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_into_http() {
        let mut sink = BufferedResponse::new();
        sink.add_header("X-A", "1");
        sink.write_status(StatusCode::CREATED);
        sink.write(b"done").unwrap();

        let response = sink.into_http();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["X-A"], "1");
        assert_eq!(response.body().as_ref(), b"done");
    }
}
