use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::models::Currency;

/// How the currency was written next to the amount
///
/// Every form carries the currency it resolved to and the number exactly as it was written,
/// separators included.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchForm<'t> {
    /// `EUR 10`
    CodePrefix {
        currency: Rc<Currency>,
        number: &'t str,
    },
    /// `10 EUR`
    CodeSuffix {
        currency: Rc<Currency>,
        number: &'t str,
    },
    /// `€10`
    Symbol {
        currency: Rc<Currency>,
        number: &'t str,
    },
}

impl<'t> MatchForm<'t> {
    pub fn currency(&self) -> &Rc<Currency> {
        match self {
            MatchForm::CodePrefix { currency, .. }
            | MatchForm::CodeSuffix { currency, .. }
            | MatchForm::Symbol { currency, .. } => currency,
        }
    }
    pub fn raw_number(&self) -> &'t str {
        match self {
            MatchForm::CodePrefix { number, .. }
            | MatchForm::CodeSuffix { number, .. }
            | MatchForm::Symbol { number, .. } => number,
        }
    }
    pub fn kind(&self) -> FormKind {
        match self {
            MatchForm::CodePrefix { .. } => FormKind::CodePrefix,
            MatchForm::CodeSuffix { .. } => FormKind::CodeSuffix,
            MatchForm::Symbol { .. } => FormKind::Symbol,
        }
    }
}

/// The shape of a [`MatchForm`] without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    CodePrefix,
    CodeSuffix,
    Symbol,
}

impl Display for FormKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormKind::CodePrefix => "code prefix",
            FormKind::CodeSuffix => "code suffix",
            FormKind::Symbol => "symbol",
        };
        write!(f, "{}", name)
    }
}

/// One hit of the scanner
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatch<'t> {
    pub text: &'t str,
    pub start: usize,
    pub end: usize,
    pub form: MatchForm<'t>,
}

impl<'t> RawMatch<'t> {
    pub fn currency(&self) -> &Rc<Currency> {
        self.form.currency()
    }
    pub fn raw_number(&self) -> &'t str {
        self.form.raw_number()
    }
    pub fn len(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A match whose number could be normalized, ready to become a marker element
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedPrice {
    pub text: String,
    pub currency: Rc<Currency>,
    pub amount: f64,
    pub form: FormKind,
}

impl TaggedPrice {
    pub fn new(raw: &RawMatch, amount: f64) -> Self {
        TaggedPrice {
            text: raw.text.to_string(),
            currency: raw.currency().clone(),
            amount,
            form: raw.form.kind(),
        }
    }

    /// Same display text, currency and amount
    pub fn same_price(&self, text: &str, currency: &str, amount: f64) -> bool {
        self.text == text && self.currency.to_string() == currency && self.amount == amount
    }
}

/// A piece of retagged text
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Tagged(TaggedPrice),
}

impl Segment {
    /// The text the segment displays
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Literal(x) => x.as_str(),
            Segment::Tagged(x) => x.text.as_str(),
        }
    }
}
