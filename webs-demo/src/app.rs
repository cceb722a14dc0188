//! Routes and handlers of the demo application.

use chrono::Duration;
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use webs_core::{BufferedResponse, HttpRequest, Request, Response, ResponseRenderer, TemplateData};
use webs_log::debug;
use webs_session::{Session, SessionStore};

/// Handler bound to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Say,
    Add,
    Static,
}

/// Exact-path routes.
const ROUTES: &[(&str, Route)] = &[("/", Route::Index), ("/say", Route::Say), ("/add", Route::Add)];

/// Prefix served from the static directory.
const STATIC_PREFIX: &str = "/static/";

impl Route {
    /// The route for `path`, or `None` when nothing is bound to it.
    pub fn resolve(path: &str) -> Option<Route> {
        if path.starts_with(STATIC_PREFIX) {
            return Some(Route::Static);
        }
        ROUTES
            .iter()
            .find(|(route_path, _)| *route_path == path)
            .map(|(_, route)| *route)
    }
}

/// Application state shared by all requests.
pub struct App {
    renderer: ResponseRenderer,
    sessions: Arc<dyn SessionStore>,
    session_cookie: String,
    static_dir: PathBuf,
}

impl App {
    pub fn new(
        renderer: ResponseRenderer,
        sessions: Arc<dyn SessionStore>,
        session_cookie: impl Into<String>,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            renderer,
            sessions,
            session_cookie: session_cookie.into(),
            static_dir: static_dir.into(),
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Run the handler bound to the request path. Unbound paths get the
    /// empty response, which renders as 404.
    pub fn handle(&self, request: &HttpRequest) -> Response {
        match Route::resolve(&request.path) {
            Some(Route::Index) => self.serv_index(request),
            Some(Route::Say) => self.serv_say(request),
            Some(Route::Add) => self.serv_add(request),
            Some(Route::Static) => self.serv_static(&request.path),
            None => Response::default(),
        }
    }

    /// Handle and render `request` into a buffered response.
    pub fn serve(&self, request: &HttpRequest) -> BufferedResponse {
        let response = self.handle(request);
        let mut sink = BufferedResponse::new();
        self.renderer.render(&mut sink, request, response);
        sink
    }

    /// `GET /` shows the greeting, `POST /` stores the name in the session.
    pub fn serv_index(&self, request: &dyn Request) -> Response {
        let session_id = request.cookie_value(&self.session_cookie, "");
        let mut session = self.sessions.find(&session_id);

        if request.is_post() {
            if session.is_zero() {
                session = Session::generate();
            }
            let session = session.with_value("name", request.post_form("name"));
            if let Err(e) = self.sessions.save(&session) {
                return Response::internal_server_error(format!("cannot save session: {}", e));
            }
            let response = Response::redirect("/");
            if session_id != session.id() {
                debug!(target: "webs::demo", "started session {}", session.id());
                return response.with_cookie(&self.session_cookie, session.id(), Duration::hours(24));
            }
            return response;
        }

        let mut data = TemplateData::new();
        data.insert("name".into(), json!(session.get("name", "")));
        Response::template("index", data)
    }

    /// `GET /say?message=...` echoes the message.
    pub fn serv_say(&self, request: &dyn Request) -> Response {
        let mut data = TemplateData::new();
        data.insert("message".into(), json!(request.query("message")));
        Response::template("say", data)
    }

    /// `POST /add` sums `value1` and `value2`. Unparsable values count as 0.
    pub fn serv_add(&self, request: &dyn Request) -> Response {
        let (mut value1, mut value2) = (0i64, 0i64);
        if request.is_post() {
            value1 = request.post_form("value1").trim().parse().unwrap_or(0);
            value2 = request.post_form("value2").trim().parse().unwrap_or(0);
        }

        let mut data = TemplateData::new();
        data.insert("value1".into(), json!(value1));
        data.insert("value2".into(), json!(value2));
        data.insert("result".into(), json!(value1.wrapping_add(value2)));
        Response::template("add", data)
    }

    /// `/static/<path>` serves a file below the static directory.
    pub fn serv_static(&self, path: &str) -> Response {
        match static_file(&self.static_dir, path) {
            Some(file) => Response::file(file, None, None),
            None => Response::default(),
        }
    }
}

/// Map a request path below [`STATIC_PREFIX`] onto `root`.
///
/// Only plain path segments are accepted; `..`, absolute paths and empty
/// remainders yield `None`.
fn static_file(root: &Path, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path.strip_prefix(STATIC_PREFIX)?);
    if relative.as_os_str().is_empty() || path.contains('\\') {
        return None;
    }
    let mut file = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => file.push(segment),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(file)
}
