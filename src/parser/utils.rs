//! This module contains auxiliary parsers

use super::Rule;
use chrono::{NaiveDate, NaiveTime};
use pest::iterators::Pair;
use std::str::FromStr;

/// Parses a date
///
/// Assumes `date` is a `Rule::date`. Both separators must be the same.
pub(crate) fn parse_date(date: Pair<Rule>) -> Result<NaiveDate, String> {
    let text = date.as_str();
    let parts: Vec<&str> = date.into_inner().map(|x| x.as_str()).collect();
    if parts.len() != 5 {
        return Err(format!("malformed date {}", text));
    }
    if parts[1] != parts[3] {
        return Err(format!("wrong date separator in {}", text));
    }
    let year = i32::from_str(parts[0]).map_err(|e| e.to_string())?;
    let month = u32::from_str(parts[2]).map_err(|e| e.to_string())?;
    let day = u32::from_str(parts[4]).map_err(|e| e.to_string())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(format!("invalid date {}", text))
}

/// Parses `HH:MM` or `HH:MM:SS`
pub(crate) fn parse_time(time: Pair<Rule>) -> Result<NaiveTime, String> {
    let text = time.as_str();
    let format = match text.len() {
        5 => "%H:%M",
        _ => "%H:%M:%S",
    };
    NaiveTime::parse_from_str(text, format).map_err(|_| format!("invalid time {}", text))
}

/// Replaces the character references found in markup text
///
/// Unknown or malformed references are kept as they are.
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        result.push_str(&rest[..start]);
        rest = &rest[start..];
        let decoded = rest
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                result.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "euro" => Some('€'),
        "pound" => Some('£'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(decimal) = name.strip_prefix('#') {
                u32::from_str(decimal).ok()?
            } else {
                return None;
            };
            std::char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities() {
        assert_eq!(decode_entities("plain"), "plain");
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&euro;10&nbsp;EUR"), "€10\u{a0}EUR");
        assert_eq!(decode_entities("&#36;5 &#x20AC;5 &#39;"), "$5 €5 '");
    }

    #[test]
    fn unknown_entities_stay() {
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&bogus; &"), "&bogus; &");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }
}
