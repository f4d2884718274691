//! kisexp: KiCad s-expression documents as path-addressed trees.
//!
//! Text is parsed by the codec in [`syntax`] into a [`value::Value`], built
//! into a [`tree::Document`], queried with [`query::find`], summarised by a
//! [`schema::SchemaRegistry`] and written back by [`printer`] under a
//! [`config::LayoutConfig`].

pub use crate::diagnostics::{ErrorContext, ErrorType, SexpError, SourceContext, Span};

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod printer;
pub mod query;
pub mod schema;
pub mod syntax;
pub mod tree;
pub mod value;
