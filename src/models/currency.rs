use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use super::super::parser::{GrammarParser, Rule};
use crate::error::{ListError, ParserError};
use crate::models::{HasAliases, HasName};
use crate::List;
use pest::Parser;

/// Currency representation
///
/// A currency has an ISO code (its name) and a set of symbols it is also known by. Two currencies
/// are the same when their codes are the same, whatever symbols they carry:
///
/// # Examples
/// ```rust
/// use fxtag::models::Currency;
/// use fxtag::List;
///
/// let usd1 = Currency::from("usd");
/// let usd2 = Currency::with_symbols("USD", &["$"]);
/// assert_eq!(usd1, usd2);
///
/// let mut currencies = List::<Currency>::new();
/// currencies.insert(Currency::with_symbols("EUR", &["€"])).unwrap();
/// currencies.insert(usd2).unwrap();
/// assert_eq!(currencies.len(), 2);
/// assert_eq!(currencies.get("€").unwrap().get_name(), "EUR");
/// # use fxtag::models::HasName;
/// ```
#[derive(Debug, Clone)]
pub struct Currency {
    name: String,
    aliases: HashSet<String>,
}

impl Currency {
    pub fn with_symbols(code: &str, symbols: &[&str]) -> Self {
        let mut currency = Currency::from(code);
        currency.aliases = symbols.iter().map(|x| x.to_string()).collect();
        currency
    }

    /// Parses a currency given as `CODE[:SYMBOL[,SYMBOL...]]`, for instance `CHF:Fr.,SFr`
    pub fn from_spec(spec: &str) -> Result<Self, ParserError> {
        let (code, symbols) = match spec.find(':') {
            Some(i) => (&spec[..i], &spec[i + 1..]),
            None => (spec, ""),
        };
        let code = code.trim();
        if code.len() < 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ParserError::Format(format!(
                "{:?} is not a valid currency code",
                spec
            )));
        }
        let mut currency = Currency::from(code);
        currency.aliases = symbols
            .split(',')
            .map(|x| x.trim())
            .filter(|x| !x.is_empty())
            .map(|x| x.to_string())
            .collect();
        Ok(currency)
    }

    /// The symbols, sorted
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.aliases.iter().map(|x| x.as_str()).collect();
        symbols.sort();
        symbols
    }
}

/// The currencies looked for unless told otherwise
pub fn default_currencies() -> List<Currency> {
    let mut list = List::new();
    for (code, symbols) in [
        ("EUR", &["€"][..]),
        ("USD", &["$"][..]),
        ("GBP", &["£"][..]),
        ("DKK", &["kr"][..]),
    ]
    .iter()
    {
        // The defaults never collide
        let _ = list.insert(Currency::with_symbols(code, symbols));
    }
    list
}

/// Builds the currency list out of the defaults (unless skipped) and the extra specs
pub fn currency_list(specs: &[String], with_defaults: bool) -> Result<List<Currency>, crate::Error> {
    let mut list = match with_defaults {
        true => default_currencies(),
        false => List::new(),
    };
    for spec in specs.iter() {
        list.insert(Currency::from_spec(spec)?)?;
    }
    if list.is_empty() {
        return Err(ListError::Empty.into());
    }
    Ok(list)
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl HasName for Currency {
    fn get_name(&self) -> &str {
        self.name.as_str()
    }
}
impl HasAliases for Currency {
    fn get_aliases(&self) -> &HashSet<String> {
        &self.aliases
    }
}
impl<'a> From<&'a str> for Currency {
    fn from(name: &'a str) -> Self {
        Currency {
            name: name.trim().to_uppercase(),
            aliases: HashSet::new(),
        }
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Ord for Currency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}
impl PartialOrd for Currency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Definition of how to display an amount of the target currency
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisplayFormat {
    pub symbol: String,
    pub symbol_placement: CurrencySymbolPlacement,
    pub symbol_spacing: bool,
    pub negative_amount_display: NegativeAmountDisplay,
    pub decimal_separator: Separator,
    pub thousands_separator: Option<Separator>,
    pub decimals: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CurrencySymbolPlacement {
    BeforeAmount,
    AfterAmount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NegativeAmountDisplay {
    BeforeSymbolAndNumber, // UK   -£127.54   or Spain  -127,54 €
    Parentheses,           // US	($127.54)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Separator {
    Dot,
    Comma,
    Space,
    Other(char),
}

impl Separator {
    fn from_char(separator: char) -> Self {
        match separator {
            '.' => Separator::Dot,
            ',' => Separator::Comma,
            ' ' | '\u{a0}' | '\u{202f}' => Separator::Space,
            x => Separator::Other(x),
        }
    }
    pub fn as_char(&self) -> char {
        match self {
            Separator::Dot => '.',
            Separator::Comma => ',',
            Separator::Space => '\u{a0}',
            Separator::Other(x) => *x,
        }
    }
}

pub const DEFAULT_TARGET_FORMAT: &str = "-1 234,00 Kč";

impl DisplayFormat {
    /// Parses a sample amount such as `-1.234,00 €` or `($1,234.00)`
    ///
    /// The last separator of the number is the decimal separator and the one before it the
    /// thousands separator. A lone space is always a thousands separator.
    pub fn parse(format: &str) -> Result<Self, ParserError> {
        let parsed = GrammarParser::parse(Rule::currency_format, format)
            .map_err(|e| ParserError::Format(format!("{}", e)))?
            .next()
            .and_then(|x| x.into_inner().next())
            .ok_or_else(|| ParserError::Format(format.to_string()))?;

        let negative_amount_display = match parsed.as_rule() {
            Rule::format_parenthesized => NegativeAmountDisplay::Parentheses,
            _ => NegativeAmountDisplay::BeforeSymbolAndNumber,
        };
        let body = parsed
            .into_inner()
            .next()
            .ok_or_else(|| ParserError::Format(format.to_string()))?;
        let symbol_placement = match body.as_rule() {
            Rule::format_prefixed => CurrencySymbolPlacement::BeforeAmount,
            _ => CurrencySymbolPlacement::AfterAmount,
        };

        let mut symbol = String::new();
        let mut symbol_spacing = false;
        let mut separators: Vec<(char, usize)> = vec![];
        let mut number_end = 0;
        for part in body.into_inner() {
            match part.as_rule() {
                Rule::format_symbol => symbol = part.as_str().to_string(),
                Rule::format_space => symbol_spacing = true,
                Rule::format_number => {
                    number_end = part.as_span().end();
                    for sep in part.into_inner() {
                        if let Some(c) = sep.as_str().chars().next() {
                            separators.push((c, sep.as_span().end()));
                        }
                    }
                }
                _ => (),
            }
        }

        let mut display = DisplayFormat {
            symbol,
            symbol_placement,
            symbol_spacing,
            negative_amount_display,
            decimal_separator: Separator::Dot,
            thousands_separator: None,
            decimals: 0,
        };
        let len = separators.len();
        if len > 0 {
            let (last, end) = separators[len - 1];
            let last = Separator::from_char(last);
            if last == Separator::Space {
                display.thousands_separator = Some(last);
            } else {
                display.decimal_separator = last;
                display.decimals = number_end - end;
                if len > 1 {
                    display.thousands_separator = Some(Separator::from_char(separators[len - 2].0));
                }
            }
        }
        Ok(display)
    }

    /// Renders an amount, rounded to the number of decimals of the format
    pub fn format_amount(&self, amount: f64) -> String {
        let rounded = format!("{:.*}", self.decimals, amount.abs());
        let (integer, fraction) = match rounded.find('.') {
            Some(i) => (&rounded[..i], &rounded[i + 1..]),
            None => (rounded.as_str(), ""),
        };
        let negative = amount < 0.0 && rounded.chars().any(|c| c != '0' && c != '.');

        let mut number = String::new();
        let digits: Vec<char> = integer.chars().collect();
        for (i, digit) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                if let Some(sep) = self.thousands_separator {
                    number.push(sep.as_char());
                }
            }
            number.push(*digit);
        }
        if !fraction.is_empty() {
            number.push(self.decimal_separator.as_char());
            number.push_str(fraction);
        }

        let space = if self.symbol_spacing { "\u{a0}" } else { "" };
        let body = match self.symbol_placement {
            CurrencySymbolPlacement::BeforeAmount => format!("{}{}{}", self.symbol, space, number),
            CurrencySymbolPlacement::AfterAmount => format!("{}{}{}", number, space, self.symbol),
        };
        match (negative, self.negative_amount_display) {
            (false, _) => body,
            (true, NegativeAmountDisplay::BeforeSymbolAndNumber) => format!("-{}", body),
            (true, NegativeAmountDisplay::Parentheses) => format!("({})", body),
        }
    }
}

impl Default for DisplayFormat {
    fn default() -> Self {
        DisplayFormat {
            symbol: "Kč".to_string(),
            symbol_placement: CurrencySymbolPlacement::AfterAmount,
            symbol_spacing: true,
            negative_amount_display: NegativeAmountDisplay::BeforeSymbolAndNumber,
            decimal_separator: Separator::Comma,
            thousands_separator: Some(Separator::Space),
            decimals: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn format_1() {
        let format = DisplayFormat::parse("-1.234,00 €").unwrap();

        assert_eq!(format.decimals, 2);
        assert_eq!(format.thousands_separator, Some(Separator::Dot));
        assert_eq!(format.decimal_separator, Separator::Comma);
        assert_eq!(format.symbol, "€");
        assert!(format.symbol_spacing);
        assert_eq!(
            format.symbol_placement,
            CurrencySymbolPlacement::AfterAmount
        );
        assert_eq!(
            format.negative_amount_display,
            NegativeAmountDisplay::BeforeSymbolAndNumber
        );
    }
    #[test]
    fn format_2() {
        let format = DisplayFormat::parse("($1,234.00)").unwrap();

        assert_eq!(format.decimals, 2);
        assert_eq!(format.thousands_separator, Some(Separator::Comma));
        assert_eq!(format.decimal_separator, Separator::Dot);
        assert!(!format.symbol_spacing);
        assert_eq!(
            format.symbol_placement,
            CurrencySymbolPlacement::BeforeAmount
        );
        assert_eq!(
            format.negative_amount_display,
            NegativeAmountDisplay::Parentheses
        );
        assert_eq!(format.format_amount(-1234567.891), "($1,234,567.89)");
        assert_eq!(format.format_amount(12.5), "$12.50");
    }

    #[test]
    fn default_target_format() {
        let format = DisplayFormat::parse(DEFAULT_TARGET_FORMAT).unwrap();
        assert_eq!(format, DisplayFormat::default());
        assert_eq!(format.format_amount(2189.2512), "2\u{a0}189,25\u{a0}Kč");
        assert_eq!(format.format_amount(-5.0), "-5,00\u{a0}Kč");
        assert_eq!(format.format_amount(-0.001), "0,00\u{a0}Kč");
    }

    #[test]
    fn format_without_decimals() {
        let format = DisplayFormat::parse("1 234 kr").unwrap();
        assert_eq!(format.decimals, 0);
        assert_eq!(format.format_amount(1234567.4), "1\u{a0}234\u{a0}567\u{a0}kr");
    }

    #[test]
    fn bad_format() {
        assert!(DisplayFormat::parse("no number here").is_err());
    }

    #[test]
    fn currency_specs() {
        let chf = Currency::from_spec("chf:Fr.,SFr").unwrap();
        assert_eq!(chf.get_name(), "CHF");
        assert_eq!(chf.symbols(), vec!["Fr.", "SFr"]);
        assert!(Currency::from_spec("1X").is_err());
        assert!(Currency::from_spec(":€").is_err());
    }

    #[test]
    fn default_list() {
        let list = default_currencies();
        assert_eq!(list.len(), 4);
        assert_eq!(list.get("kr").unwrap().get_name(), "DKK");
        assert_eq!(list.get("€").unwrap().symbols(), vec!["€"]);
    }
}
