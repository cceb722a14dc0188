// webs - handlers return response values, a renderer performs the I/O
//
// This crate bundles the webs crates behind one dependency: the response
// model and renderer, sessions, logging and (by default) Handlebars templates.

// Re-export core functionality
pub use webs_core::*;

pub use webs_log;
pub use webs_session;

#[cfg(feature = "handlebars")]
pub use webs_handlebars;

/// Prelude module for convenient imports
pub mod prelude {
    pub use webs_core::prelude::*;
    pub use webs_session::prelude::*;

    #[cfg(feature = "handlebars")]
    pub use webs_handlebars::{HandlebarsConfig, HandlebarsTemplateLoader};
}
