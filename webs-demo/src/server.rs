// HTTP/1 server driving the demo application

use crate::app::App;
use crate::error::Result;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode, body::Incoming as IncomingBody};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use webs_core::HttpRequest;
use webs_log::{error, info, warn};

/// Largest request body read into memory, 1 MiB.
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Accept connections on `addr` until Ctrl-C.
pub async fn listen(app: Arc<App>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(target: "webs::demo", "listening on http://{} - press Ctrl-C to abort", addr);

    loop {
        let (stream, _) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = tokio::signal::ctrl_c() => {
                info!(target: "webs::demo", "shutting down");
                return Ok(());
            }
        };
        let io = TokioIo::new(stream);
        let app = app.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<IncomingBody>| {
                let app = app.clone();
                async move { handle_request(req, app).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(target: "webs::demo", "error serving connection: {:?}", err);
            }
        });
    }
}

/// Handle one exchange: convert, run the app on the blocking pool, convert back.
async fn handle_request(
    req: Request<IncomingBody>,
    app: Arc<App>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let request = match into_request(req, MAX_BODY_SIZE).await {
        Ok(request) => request,
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            warn!(target: "webs::demo", "{} {}: body exceeds {} bytes", method, path, MAX_BODY_SIZE);
            return Ok(plain(StatusCode::PAYLOAD_TOO_LARGE, "request body too large\n"));
        }
        Err(e) => {
            warn!(target: "webs::demo", "cannot read request body: {}", e);
            return Ok(plain(StatusCode::BAD_REQUEST, "cannot read request body\n"));
        }
    };

    let response = match tokio::task::spawn_blocking(move || app.serve(&request)).await {
        Ok(sink) => sink.into_http().map(Full::new),
        Err(e) => {
            error!(target: "webs::demo", "handler for {} {} failed: {}", method, path, e);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error\n")
        }
    };

    info!(target: "webs::demo", "{:<4} {:<20} - {:?}", method, path, start.elapsed());
    Ok(response)
}

/// Copy method, target, headers and the collected body into an [`HttpRequest`].
///
/// Bodies longer than `limit` fail with [`LengthLimitError`].
async fn into_request<B>(req: Request<B>, limit: usize) -> std::result::Result<HttpRequest, BoxError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let body = Limited::new(body, limit).collect().await?.to_bytes();

    let mut request = HttpRequest::new(parts.method, parts.uri.path())
        .with_query(parts.uri.query().unwrap_or(""))
        .with_body(body);
    request.headers = parts.headers;
    Ok(request)
}

fn plain(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn request(body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri("/add?x=1")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_into_request() {
        let request = into_request(request("value1=1&value2=2"), MAX_BODY_SIZE).await.unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/add");
        assert_eq!(request.body.as_ref(), b"value1=1&value2=2");
    }

    #[tokio::test]
    async fn test_into_request_rejects_large_body() {
        let err = into_request(request("value1=1&value2=2"), 8).await.unwrap_err();
        assert!(err.downcast_ref::<LengthLimitError>().is_some());
    }
}
