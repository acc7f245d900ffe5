//! Finds prices in free text
//!
//! A price is a number next to a currency code (`EUR 10`, `10 EUR`) or after a currency symbol
//! (`€10`). Numbers accept dots, commas or whitespace between groups of three digits and an
//! optional decimal part, so `1,234.56`, `1.234,56` and `1 234,56` all match; which separator is
//! the decimal one is decided later, by [`normalize`](super::normalize::normalize).
use regex::{Captures, Regex};
use std::rc::Rc;

use crate::error::ListError;
use crate::models::{Currency, MatchForm, RawMatch};
use crate::List;

/// A number as written on a page: optional minus, up to three digits, groups of three digits
/// each optionally preceded by a separator, and a decimal part
pub const NUMBER_PATTERN: &str = r"-?[0-9]{1,3}(?:[.,\s]?[0-9]{3})*(?:[.,][0-9]+)?";

/// Price scanner for one set of currencies
#[derive(Debug, Clone)]
pub struct Scanner {
    regex: Regex,
    currencies: List<Currency>,
}

impl Scanner {
    /// Compiles the pattern for the given currencies
    ///
    /// Codes are tried before symbols at the same position: the code prefix form first, then
    /// the code suffix form, then the symbol form.
    pub fn new(currencies: List<Currency>) -> Result<Self, ListError> {
        if currencies.is_empty() {
            return Err(ListError::Empty);
        }
        let codes = alternation(currencies.names().map(|x| x.to_string()).collect());
        let symbols = alternation(
            currencies
                .values()
                .flat_map(|c| c.symbols().into_iter().map(|s| s.to_string()).collect::<Vec<_>>())
                .collect(),
        );

        let mut pattern = format!(
            r"(?i)(?:\b(?P<code1>{codes})\s*(?P<num1>{num}))|(?:(?P<num2>{num})\s*(?P<code2>{codes})\b)",
            codes = codes,
            num = NUMBER_PATTERN
        );
        if !symbols.is_empty() {
            pattern.push_str(&format!(
                r"|(?:(?P<sym>{symbols})\s*(?P<num3>{num}))",
                symbols = symbols,
                num = NUMBER_PATTERN
            ));
        }
        let regex = Regex::new(&pattern).map_err(|e| ListError::Pattern(e.to_string()))?;
        Ok(Scanner { regex, currencies })
    }

    pub fn currencies(&self) -> &List<Currency> {
        &self.currencies
    }

    /// The currency codes looked for, sorted
    pub fn codes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.currencies.names().map(|x| x.to_string()).collect();
        names.sort();
        names
    }

    /// Quick test, used to skip text that has no price in it
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Every price in `text`, left to right, never overlapping
    pub fn matches<'s, 't>(&'s self, text: &'t str) -> impl Iterator<Item = RawMatch<'t>> + 's
    where
        't: 's,
    {
        self.regex
            .captures_iter(text)
            .filter_map(move |captures| self.raw_match(&captures))
    }

    fn raw_match<'t>(&self, captures: &Captures<'t>) -> Option<RawMatch<'t>> {
        let whole = captures.get(0)?;
        let form = if let (Some(code), Some(num)) = (captures.name("code1"), captures.name("num1"))
        {
            MatchForm::CodePrefix {
                currency: self.resolve(code.as_str())?,
                number: num.as_str(),
            }
        } else if let (Some(code), Some(num)) = (captures.name("code2"), captures.name("num2")) {
            MatchForm::CodeSuffix {
                currency: self.resolve(code.as_str())?,
                number: num.as_str(),
            }
        } else if let (Some(sym), Some(num)) = (captures.name("sym"), captures.name("num3")) {
            MatchForm::Symbol {
                currency: self.resolve(sym.as_str())?,
                number: num.as_str(),
            }
        } else {
            return None;
        };
        Some(RawMatch {
            text: whole.as_str(),
            start: whole.start(),
            end: whole.end(),
            form,
        })
    }

    fn resolve(&self, token: &str) -> Option<Rc<Currency>> {
        self.currencies.get(token).ok().cloned()
    }
}

/// Escaped alternatives, longest first so `kr` never shadows `kroner`
fn alternation(mut tokens: Vec<String>) -> String {
    tokens.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    tokens.dedup();
    tokens
        .iter()
        .map(|x| regex::escape(x))
        .collect::<Vec<String>>()
        .join("|")
}
