//! Certificate content: Malagasy numerals, dates, statements and mentions,
//! plus the SVG layout and Handlebars binding used by certificate templates.
//!
//! - `numerals` / `dates` - numbers, dates and times as words
//! - `layout` - word wrap and `<tspan>` emission with a scoped cursor
//! - `context` - the single normalisation step for record data
//! - `address` / `statements` / `mentions` - paragraph composers
//! - `helpers` - the named helper table
//! - `engine` - Handlebars registration and template rendering

pub mod address;
pub mod context;
pub mod dates;
pub mod engine;
pub mod handlers;
pub mod helpers;
pub mod layout;
pub mod mentions;
pub mod numerals;
pub mod statements;

pub use context::RecordContext;
pub use engine::CertificateRenderer;
pub use helpers::{HelperCall, HelperRegistry};
pub use mentions::{MentionList, MentionOptions, MentionsBlock};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("failed to read certificate templates: {0}")]
    TemplateIo(#[source] std::io::Error),
    #[error("invalid certificate template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },
    #[error("unknown certificate template '{0}'")]
    UnknownTemplate(String),
    #[error("failed to render certificate: {0}")]
    Render(#[from] handlebars::RenderError),
}
