//! End-to-end rendering through the public API.

use chrono::Duration;
use http::{Method, StatusCode};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;
use webs_core::prelude::*;
use webs_core::{Error, UploadedFile};

struct GreetingTemplates;

impl TemplateSet for GreetingTemplates {
    fn render(&self, name: &str, data: &TemplateData, out: &mut dyn Write) -> Result<()> {
        match name {
            "hello" => {
                let who = data.get("name").and_then(|v| v.as_str()).unwrap_or("stranger");
                write!(out, "<p>Hello {}</p>", who)?;
                Ok(())
            }
            other => Err(Error::TemplateRender(format!("no template named {}", other))),
        }
    }

    fn has_template(&self, name: &str) -> bool {
        name == "hello"
    }
}

struct GreetingLoader;

impl TemplateLoader for GreetingLoader {
    fn load(&self) -> Result<Arc<dyn TemplateSet>> {
        Ok(Arc::new(GreetingTemplates))
    }
}

fn renderer() -> ResponseRenderer {
    ResponseRenderer::new(Arc::new(GreetingLoader))
}

/// A handler the way an application writes one: only through `Request`.
fn greet(request: &dyn Request) -> Response {
    let name = if request.is_post() {
        request.post_form("name")
    } else {
        request.cookie_value("NAME", "")
    };
    let mut data = TemplateData::new();
    if !name.is_empty() {
        data.insert("name".into(), json!(name));
    }
    let response = Response::template("hello", data);
    if request.is_post() {
        response.with_cookie("NAME", name, Duration::hours(24))
    } else {
        response
    }
}

#[test]
fn test_handler_get_and_post() {
    let get = HttpRequest::new(Method::GET, "/").with_header("Cookie", "NAME=Bob");
    let mut sink = BufferedResponse::new();
    renderer().render(&mut sink, &get, greet(&get));
    assert_eq!(sink.status(), StatusCode::OK);
    assert_eq!(sink.body_text(), "<p>Hello Bob</p>");

    let post = HttpRequest::new(Method::POST, "/").with_form(&[("name", "Alice")]);
    let mut sink = BufferedResponse::new();
    renderer().render(&mut sink, &post, greet(&post));
    assert_eq!(sink.body_text(), "<p>Hello Alice</p>");
    assert_eq!(sink.set_cookies(), vec!["NAME=Alice; Max-Age=86400"]);
}

#[test]
fn test_unknown_template_reports_name() {
    let request = HttpRequest::new(Method::GET, "/");
    let mut sink = BufferedResponse::new();
    renderer().render(&mut sink, &request, Response::template("missing", TemplateData::new()));

    assert_eq!(sink.status(), StatusCode::OK);
    assert!(sink.body_text().starts_with("cannot render missing: "));
}

#[test]
fn test_file_response_with_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.csv");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();

    let request = HttpRequest::new(Method::GET, "/download");
    let response = Response::file(&path, Some("text/csv"), Some("attachment; filename=report.csv"));
    let mut sink = BufferedResponse::new();
    renderer().render(&mut sink, &request, response);

    assert_eq!(sink.status(), StatusCode::OK);
    assert_eq!(sink.body_text(), "a,b\n1,2\n");
    assert_eq!(sink.header("Content-Type").as_deref(), Some("text/csv"));
    assert_eq!(
        sink.header("Content-Disposition").as_deref(),
        Some("attachment; filename=report.csv")
    );
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let request = HttpRequest::new(Method::GET, "/download");
    let mut sink = BufferedResponse::new();
    renderer().render(&mut sink, &request, Response::file(dir.path().join("nope"), None, None));
    assert_eq!(sink.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_upload_echo() {
    let request = HttpRequest::new(Method::POST, "/upload")
        .with_file("doc", UploadedFile::new("notes.txt", "some notes"));

    let response = match request.form_file("doc") {
        Ok(mut file) => Response::content(file.read_all().unwrap(), Some("text/plain"), None),
        Err(e) => Response::status(e.status_code().as_u16(), e.to_string()),
    };
    let mut sink = BufferedResponse::new();
    renderer().render(&mut sink, &request, response);
    assert_eq!(sink.body_text(), "some notes");

    let response = match request.form_file("other") {
        Ok(_) => Response::status(200, "unexpected"),
        Err(e) => Response::status(e.status_code().as_u16(), e.to_string()),
    };
    let mut sink = BufferedResponse::new();
    renderer().render(&mut sink, &request, response);
    assert_eq!(sink.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_into_http_response() {
    let request = HttpRequest::new(Method::GET, "/");
    let mut sink = BufferedResponse::new();
    renderer().render(
        &mut sink,
        &request,
        Response::json(&json!({"ok": true})).with_header("X-Request-Id", "42"),
    );

    let response = sink.into_http();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "42");
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(response.body().as_ref(), br#"{"ok":true}"#);
}
