//! Parser module
//!
//! Everything that reads text lives here:
//! - the price [`Scanner`] and the number [`normalize`]r, applied to page text
//! - the pest grammars, for markup, rates files and currency formats
use pest::Parser;

mod markup;
pub mod normalize;
mod rates;
pub mod scanner;
mod utils;

pub use markup::{load_markup, parse_markup};
pub use normalize::normalize;
pub use rates::{load_rates, parse_rates};
pub use scanner::Scanner;

#[derive(Parser)]
#[grammar = "grammar/grammar.pest"]
pub struct GrammarParser;

/// Parses `content` with `rule`, wrapping pest's error message
pub(crate) fn parse_rule<'i>(
    rule: Rule,
    content: &'i str,
) -> Result<pest::iterators::Pairs<'i, Rule>, String> {
    GrammarParser::parse(rule, content).map_err(|e| format!("{}", e))
}
