//! Response values produced by handlers.
//!
//! A [`Response`] describes what an exchange should produce without
//! touching the transport. The [`ResponseRenderer`](crate::ResponseRenderer)
//! turns it into side effects later.

use crate::cookie::{Cookie, MaxAge};
use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Named data bound into a template.
pub type TemplateData = serde_json::Map<String, serde_json::Value>;

/// A JSON body, encoded when the response is built.
///
/// Encoding failures are kept and reported by the renderer as a 500.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody {
    encoded: Result<Bytes, String>,
}

impl JsonBody {
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Self {
        Self {
            encoded: serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(|e| e.to_string()),
        }
    }

    /// The encoded bytes, or the encoder's error message.
    pub fn encoded(&self) -> Result<&Bytes, &str> {
        self.encoded.as_ref().map_err(String::as_str)
    }

    /// Decode the body back into a JSON value.
    pub fn value(&self) -> Option<serde_json::Value> {
        self.encoded
            .as_ref()
            .ok()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

/// What a response produces.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseKind {
    /// Execute a named template with data
    Template { name: String, data: TemplateData },
    /// Serialized JSON
    Json(JsonBody),
    /// Stream a file from disk
    File {
        path: PathBuf,
        content_type: Option<String>,
        disposition: Option<String>,
    },
    /// Raw bytes
    Content {
        data: Bytes,
        content_type: Option<String>,
        disposition: Option<String>,
    },
    /// `303 See Other` to a location
    Redirect { location: String },
    /// A status code with a plain text body
    Status { code: u16, text: String },
}

/// A handler's description of an HTTP response.
///
/// `Response::default()` has no kind and renders as 404.
///
/// # Examples
///
/// ```
/// use webs_core::{MaxAge, Response};
///
/// let response = Response::redirect("/")
///     .with_cookie("SID", "abc", chrono::Duration::hours(24))
///     .with_header("Cache-Control", "no-store");
///
/// assert_eq!(response.cookies()[0].max_age, MaxAge::Seconds(86_400));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    kind: Option<ResponseKind>,
    cookies: Vec<Cookie>,
    headers: HashMap<String, String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl Response {
    fn of(kind: ResponseKind) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    /// Render template `name` with `data`.
    pub fn template(name: impl Into<String>, data: TemplateData) -> Self {
        Self::of(ResponseKind::Template {
            name: name.into(),
            data,
        })
    }

    /// Write `value` as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::of(ResponseKind::Json(JsonBody::new(value)))
    }

    /// Serve the file at `path`, optionally overriding content type and disposition.
    pub fn file(
        path: impl Into<PathBuf>,
        content_type: Option<&str>,
        disposition: Option<&str>,
    ) -> Self {
        Self::of(ResponseKind::File {
            path: path.into(),
            content_type: non_empty(content_type),
            disposition: non_empty(disposition),
        })
    }

    /// Write `data` verbatim.
    pub fn content(
        data: impl Into<Bytes>,
        content_type: Option<&str>,
        disposition: Option<&str>,
    ) -> Self {
        Self::of(ResponseKind::Content {
            data: data.into(),
            content_type: non_empty(content_type),
            disposition: non_empty(disposition),
        })
    }

    /// Redirect with `303 See Other`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::of(ResponseKind::Redirect {
            location: location.into(),
        })
    }

    /// Respond with `code` and `text` as the body.
    pub fn status(code: u16, text: impl Into<String>) -> Self {
        Self::of(ResponseKind::Status {
            code,
            text: text.into(),
        })
    }

    /// `404` with `text` as the body.
    pub fn not_found(text: impl Into<String>) -> Self {
        Self::status(404, text)
    }

    /// `500` with `text` as the body.
    pub fn internal_server_error(text: impl Into<String>) -> Self {
        Self::status(500, text)
    }

    /// Add a cookie.
    ///
    /// - zero `max_age`: no `Max-Age` attribute
    /// - negative `max_age`: delete the cookie now
    /// - positive `max_age`: `Max-Age` in whole seconds
    pub fn with_cookie(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        max_age: chrono::Duration,
    ) -> Self {
        self.cookies
            .push(Cookie::new(name, value, MaxAge::from_duration(max_age)));
        self
    }

    /// Same as `with_cookie(name, "", -1s)`.
    pub fn with_delete_cookie(self, name: impl Into<String>) -> Self {
        self.with_cookie(name, "", chrono::Duration::seconds(-1))
    }

    /// Add a header, replacing an earlier value for the same key.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// The response kind, `None` for the default (not found) response.
    pub fn kind(&self) -> Option<&ResponseKind> {
        self.kind.as_ref()
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Option<ResponseKind>, Vec<Cookie>, HashMap<String, String>) {
        (self.kind, self.cookies, self.headers)
    }

    /// Template name and data, if this is a template response.
    pub fn template_parts(&self) -> Option<(&str, &TemplateData)> {
        match &self.kind {
            Some(ResponseKind::Template { name, data }) => Some((name, data)),
            _ => None,
        }
    }
}
