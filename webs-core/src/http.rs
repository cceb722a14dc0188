// HTTP request adapter

use crate::error::{Error, Result};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::collections::HashMap;
use std::io::{Cursor, Read};

/// Read-only view of an incoming request, as handlers see it.
///
/// Lookups return empty or default values when something is absent, except
/// [`Request::form_file`] which fails with [`Error::NotFound`].
pub trait Request {
    /// Whether this is a POST request.
    fn is_post(&self) -> bool;

    /// First query parameter named `name`, or an empty string.
    fn query(&self, name: &str) -> String;

    /// First url-encoded form field named `name`, or an empty string.
    fn post_form(&self, name: &str) -> String;

    /// The uploaded file for form key `name`.
    fn form_file(&self, name: &str) -> Result<FormFile>;

    /// Value of cookie `name`, or `default`.
    fn cookie_value(&self, name: &str, default: &str) -> String;
}

/// A file attached to a request by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }
}

/// An uploaded file handed to a handler.
///
/// The filename is chosen by the client and must not be trusted.
#[derive(Debug)]
pub struct FormFile {
    filename: String,
    reader: Cursor<Bytes>,
}

impl FormFile {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.reader.get_ref().len() as u64
    }

    /// The remaining unread bytes.
    pub fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for FormFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

/// HTTP request wrapper
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub query_params: HashMap<String, String>,
    pub body: Bytes,
    pub files: HashMap<String, UploadedFile>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    /// Build a request from a method and a target such as `/say?message=hi`.
    pub fn from_target(method: Method, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self::new(method, path).with_query(query)
    }

    /// Parse a raw query string, keeping the first value of each name.
    pub fn with_query(mut self, query: &str) -> Self {
        for (name, value) in decode_pairs(query.as_bytes()) {
            self.query_params.entry(name).or_insert(value);
        }
        self
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Set an url-encoded form body and its content type.
    pub fn with_form(self, fields: &[(&str, &str)]) -> Self {
        let body = serde_urlencoded::to_string(fields).unwrap_or_default();
        self.with_header(CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")
            .with_body(body)
    }

    pub fn with_file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(name.into(), file);
        self
    }

    /// Get a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn has_form_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
            && self
                .header(CONTENT_TYPE.as_str())
                .and_then(|ct| ct.split(';').next())
                .is_some_and(|ct| ct.trim().eq_ignore_ascii_case("application/x-www-form-urlencoded"))
    }

    /// All cookies in the `Cookie` headers, in order.
    pub fn cookies(&self) -> Vec<(&str, &str)> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .map(|(name, value)| {
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                (name.trim(), value)
            })
            .collect()
    }
}

fn decode_pairs(input: &[u8]) -> Vec<(String, String)> {
    serde_urlencoded::from_bytes(input).unwrap_or_default()
}

impl Request for HttpRequest {
    fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    fn query(&self, name: &str) -> String {
        self.query_params.get(name).cloned().unwrap_or_default()
    }

    fn post_form(&self, name: &str) -> String {
        if !self.has_form_body() {
            return String::new();
        }
        decode_pairs(&self.body)
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .unwrap_or_default()
    }

    fn form_file(&self, name: &str) -> Result<FormFile> {
        let file = self
            .files
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("no such file: {}", name)))?;
        Ok(FormFile {
            filename: file.filename.clone(),
            reader: Cursor::new(file.data.clone()),
        })
    }

    fn cookie_value(&self, name: &str, default: &str) -> String {
        self.cookies()
            .into_iter()
            .find(|(cookie, _)| *cookie == name)
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| default.to_string())
    }
}
