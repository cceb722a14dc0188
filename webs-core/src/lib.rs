// Core library for webs
// Response model, response renderer, request adapter and template contracts

//! Handlers return a [`Response`] value describing the outcome of a request;
//! a [`ResponseRenderer`] later turns it into status, headers and body on a
//! [`ResponseSink`]. Handlers never touch the transport directly, which keeps
//! them easy to test.
//!
//! ```
//! use std::sync::Arc;
//! use webs_core::{BufferedResponse, HttpRequest, NullTemplateLoader, Response, ResponseRenderer};
//!
//! let renderer = ResponseRenderer::new(Arc::new(NullTemplateLoader));
//! let request = HttpRequest::new(http::Method::GET, "/");
//! let mut sink = BufferedResponse::new();
//!
//! renderer.render(&mut sink, &request, Response::status(418, "short and stout"));
//! assert_eq!(sink.status().as_u16(), 418);
//! ```

pub mod cookie;
pub mod error;
pub mod http;
pub mod renderer;
pub mod response;
pub mod sink;
pub mod template;

// Re-export commonly used types
pub use cookie::*;
pub use error::*;
pub use self::http::*;
pub use renderer::*;
pub use response::*;
pub use sink::*;
pub use template::*;

pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::http::{FormFile, HttpRequest, Request};
    pub use crate::renderer::ResponseRenderer;
    pub use crate::response::{Response, TemplateData};
    pub use crate::sink::{BufferedResponse, ResponseSink};
    pub use crate::template::{NullTemplateLoader, TemplateLoader, TemplateSet};
}
