//! Turns numbers written in any of the usual locale styles into `f64`
//!
//! There is no locale database behind this, only a few rules that get the common cases right:
//!
//! - whitespace is always a thousands separator
//! - with both `.` and `,` present, whichever comes last is the decimal separator
//! - with only commas, the last comma is decimal when exactly two digits follow it
//! - with several dots and no comma, they group thousands when the last one is followed by
//!   exactly three digits
//! - a single dot is always decimal
//!
//! `1,234` is read as one thousand two hundred thirty four, never as a number with three
//! decimals.
use crate::error::NormalizeError;

pub fn normalize(raw: &str) -> Result<f64, NormalizeError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(NormalizeError::Empty);
    }

    let last_dot = compact.rfind('.');
    let last_comma = compact.rfind(',');
    let canonical = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            let (decimal, thousands) = if comma > dot { (',', '.') } else { ('.', ',') };
            keep_last(&compact.replace(thousands, ""), decimal)
        }
        (None, Some(comma)) => match digits_after(&compact, comma) {
            2 => keep_last(&compact, ','),
            _ => compact.replace(',', ""),
        },
        (Some(dot), None) if compact.matches('.').count() > 1 => {
            match digits_after(&compact, dot) {
                3 => compact.replace('.', ""),
                _ => keep_last(&compact, '.'),
            }
        }
        _ => compact,
    };

    let cleaned: String = canonical
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| NormalizeError::NotANumber(raw.to_string()))?;
    if !value.is_finite() {
        return Err(NormalizeError::NotFinite(raw.to_string()));
    }
    Ok(value)
}

fn digits_after(text: &str, position: usize) -> usize {
    text[position + 1..].chars().count()
}

/// Drops every `separator` but the last one, which becomes a `.`
fn keep_last(text: &str, separator: char) -> String {
    let last = match text.rfind(separator) {
        Some(x) => x,
        None => return text.to_string(),
    };
    let mut result = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        if c != separator {
            result.push(c);
        } else if i == last {
            result.push('.');
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unambiguous_numbers() {
        assert_eq!(normalize("1,250.50"), Ok(1250.50));
        assert_eq!(normalize("1 250,50"), Ok(1250.50));
        assert_eq!(normalize("1.234,56"), Ok(1234.56));
        assert_eq!(normalize("89.99"), Ok(89.99));
        assert_eq!(normalize("199"), Ok(199.0));
    }

    #[test]
    fn lone_comma() {
        assert_eq!(normalize("12,50"), Ok(12.5));
        assert_eq!(normalize("1,234"), Ok(1234.0));
        assert_eq!(normalize("1,5"), Ok(15.0));
        assert_eq!(normalize("1,234,56"), Ok(1234.56));
        assert_eq!(normalize("1,234,567"), Ok(1234567.0));
    }

    #[test]
    fn dots_only() {
        assert_eq!(normalize("1.5"), Ok(1.5));
        assert_eq!(normalize("1.234"), Ok(1.234));
        assert_eq!(normalize("1.234.567"), Ok(1234567.0));
        assert_eq!(normalize("1.234.56"), Ok(1234.56));
    }

    #[test]
    fn repeated_decimal_style_separator() {
        assert_eq!(normalize("1.234,567.89"), Ok(1234567.89));
        assert_eq!(normalize("1,234.567,89"), Ok(1234567.89));
    }

    #[test]
    fn whitespace_of_any_kind() {
        assert_eq!(normalize("1\u{a0}234\u{202f}567,10"), Ok(1234567.10));
        assert_eq!(normalize(" 42 "), Ok(42.0));
    }

    #[test]
    fn negative() {
        assert_eq!(normalize("-12.50"), Ok(-12.5));
        assert_eq!(normalize("-1.234,00"), Ok(-1234.0));
    }

    #[test]
    fn unusable_input() {
        assert_eq!(normalize(""), Err(NormalizeError::Empty));
        assert_eq!(normalize("  "), Err(NormalizeError::Empty));
        assert!(matches!(normalize("-"), Err(NormalizeError::NotANumber(_))));
        assert!(matches!(normalize("abc"), Err(NormalizeError::NotANumber(_))));
        assert!(matches!(
            normalize(&"9".repeat(400)),
            Err(NormalizeError::NotFinite(_))
        ));
    }
}
