//! Turns a [`Response`] into side effects on a [`ResponseSink`].

use crate::http::HttpRequest;
use crate::response::{Response, ResponseKind, TemplateData};
use crate::sink::{ResponseSink, SinkWriter};
use crate::template::TemplateLoader;
use http::StatusCode;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use std::sync::Arc;
use webs_log::{debug, error};

/// Renders responses using a shared template loader.
///
/// The renderer holds no per-request state and can be shared across threads.
#[derive(Clone)]
pub struct ResponseRenderer {
    templates: Arc<dyn TemplateLoader>,
}

impl ResponseRenderer {
    pub fn new(templates: Arc<dyn TemplateLoader>) -> Self {
        Self { templates }
    }

    /// Render `response` for `request` into `sink`.
    ///
    /// Cookies are applied first, then headers, then the response kind.
    /// Failures are reported to the client as `500` responses. Cookies and
    /// headers applied before a failure stay applied.
    pub fn render<S: ResponseSink + ?Sized>(
        &self,
        sink: &mut S,
        request: &HttpRequest,
        response: Response,
    ) {
        let (kind, cookies, headers) = response.into_parts();

        for cookie in &cookies {
            sink.set_cookie(cookie);
        }
        for (key, value) in &headers {
            sink.add_header(key, value);
        }

        let Some(kind) = kind else {
            sink.not_found();
            return;
        };

        match kind {
            ResponseKind::Template { name, data } => self.render_template(sink, &name, &data),
            ResponseKind::Json(body) => match body.encoded() {
                Ok(bytes) => {
                    if sink.header(CONTENT_TYPE.as_str()).is_none() {
                        sink.set_header(CONTENT_TYPE.as_str(), "application/json");
                    }
                    sink.write_status(StatusCode::OK);
                    write_body(sink, bytes);
                }
                Err(e) => {
                    error!(target: "webs::render", "cannot marshal json: {}", e);
                    sink.error(
                        &format!("cannot marshal json: {}", e),
                        StatusCode::INTERNAL_SERVER_ERROR,
                    );
                }
            },
            ResponseKind::File {
                path,
                content_type,
                disposition,
            } => {
                set_overrides(sink, content_type.as_deref(), disposition.as_deref());
                sink.serve_file(request, &path);
            }
            ResponseKind::Content {
                data,
                content_type,
                disposition,
            } => {
                set_overrides(sink, content_type.as_deref(), disposition.as_deref());
                sink.write_status(StatusCode::OK);
                write_body(sink, &data);
            }
            ResponseKind::Redirect { location } => {
                sink.redirect(request, &location, StatusCode::SEE_OTHER);
            }
            ResponseKind::Status { code, text } => {
                let status = StatusCode::from_u16(code).unwrap_or_else(|_| {
                    error!(target: "webs::render", "invalid status code {}", code);
                    StatusCode::INTERNAL_SERVER_ERROR
                });
                sink.write_status(status);
                write_body(sink, text.as_bytes());
            }
        }
    }

    fn render_template<S: ResponseSink + ?Sized>(&self, sink: &mut S, name: &str, data: &TemplateData) {
        let templates = match self.templates.load() {
            Ok(templates) => templates,
            Err(e) => {
                error!(target: "webs::render", "cannot load templates: {}", e);
                sink.error(
                    &format!("cannot load templates: {}", e),
                    StatusCode::INTERNAL_SERVER_ERROR,
                );
                return;
            }
        };

        if sink.header(CONTENT_TYPE.as_str()).is_none() {
            sink.set_header(CONTENT_TYPE.as_str(), "text/html; charset=utf-8");
        }
        sink.write_status(StatusCode::OK);

        if let Err(e) = templates.render(name, data, &mut SinkWriter(&mut *sink)) {
            error!(target: "webs::render", "cannot render {}: {}", name, e);
            write_body(sink, format!("cannot render {}: {}", name, e).as_bytes());
        } else {
            debug!(target: "webs::render", "rendered template {}", name);
        }
    }
}

impl std::fmt::Debug for ResponseRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseRenderer").finish_non_exhaustive()
    }
}

fn set_overrides<S: ResponseSink + ?Sized>(
    sink: &mut S,
    content_type: Option<&str>,
    disposition: Option<&str>,
) {
    if let Some(content_type) = content_type {
        sink.set_header(CONTENT_TYPE.as_str(), content_type);
    }
    if let Some(disposition) = disposition {
        sink.set_header(CONTENT_DISPOSITION.as_str(), disposition);
    }
}

fn write_body<S: ResponseSink + ?Sized>(sink: &mut S, data: &[u8]) {
    if let Err(e) = sink.write(data) {
        error!(target: "webs::render", "error writing response body: {}", e);
    }
}
