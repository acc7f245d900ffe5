//! Rates files
//!
//! A rates file holds ledger style price directives, one per line:
//!
//! ```text
//! ; comments start with ; # % | or *
//! P 2024-03-01 EUR 25.30 CZK
//! P 2024-03-01 12:00:00 USD 23.10 CZK
//! ```
//!
//! Each directive reads "on that date, one EUR was worth 25.30 CZK".
use std::fs::read_to_string;
use std::path::Path;

use chrono::NaiveTime;
use pest::iterators::Pair;
use tracing::info;

use super::utils::{parse_date, parse_time};
use super::{parse_rule, Rule};
use crate::error::{MissingFileError, ParserError};
use crate::models::{Currency, Quote, RateTable};
use crate::Error;

/// Every quote in the content, in file order
pub fn parse_rates(content: &str) -> Result<Vec<Quote>, ParserError> {
    let mut parsed = parse_rule(Rule::rates_file, content).map_err(ParserError::Rates)?;
    let file = match parsed.next() {
        Some(x) => x,
        None => return Ok(vec![]),
    };
    let mut quotes = vec![];
    for element in file.into_inner() {
        if let Rule::price = element.as_rule() {
            quotes.push(parse_price(element).map_err(ParserError::Rates)?);
        }
    }
    Ok(quotes)
}

fn parse_price(element: Pair<Rule>) -> Result<Quote, String> {
    let line = element.as_str().to_string();
    let mut parsed = element.into_inner();
    let mut next = || {
        parsed
            .next()
            .ok_or_else(|| format!("incomplete price: {}", line))
    };

    let date = parse_date(next()?)?;
    let mut time = NaiveTime::from_hms_opt(0, 0, 0).ok_or("midnight")?;
    let commodity = {
        let time_or_commodity = next()?;
        match time_or_commodity.as_rule() {
            Rule::time => {
                time = parse_time(time_or_commodity)?;
                next()?
            }
            _ => time_or_commodity,
        }
    };
    let price: f64 = next()?
        .as_str()
        .parse()
        .map_err(|e| format!("{}: {}", line, e))?;
    let other = next()?;

    Ok(Quote {
        date: date.and_time(time),
        commodity: Currency::from(commodity.as_str()),
        price,
        other: Currency::from(other.as_str()),
    })
}

/// Reads a rates file into a table for `target`
pub fn load_rates(path: &Path, target: Currency) -> Result<RateTable, Error> {
    if !path.exists() {
        return Err(MissingFileError::RatesFileDoesNotExistError(path.to_path_buf()).into());
    }
    let content = read_to_string(path)?;
    let quotes = parse_rates(&content)?;
    info!(file = %path.display(), quotes = quotes.len(), "loaded rates");
    Ok(RateTable::from_quotes(target, quotes))
}
