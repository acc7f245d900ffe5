//! Finds prices in text and tags them with converted amounts
//!
//! The pipeline goes text → [`parser::Scanner`] → [`parser::normalize`] → [`engine`]: prices
//! are found in the text nodes of a [`document::Document`], their numbers read whatever the
//! locale, and the text rewritten into marker elements that carry the amount in the target
//! currency.
extern crate pest;
#[macro_use]
extern crate pest_derive;

mod app;
pub mod commands;
pub mod document;
pub mod engine;
mod error;
mod list;
pub mod models;
pub mod parser;

pub use app::{date_parser, run_app, CommonOpts};
pub use error::{DocumentError, Error, ListError, MissingFileError, NormalizeError, ParserError};
pub use list::List;
