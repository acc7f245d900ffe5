//! Data model: currencies, scanner hits and exchange rates
use std::collections::HashSet;

pub use currency::{
    currency_list, default_currencies, Currency, CurrencySymbolPlacement, DisplayFormat,
    NegativeAmountDisplay, Separator, DEFAULT_TARGET_FORMAT,
};
pub use price::{FormKind, MatchForm, RawMatch, Segment, TaggedPrice};
pub use rates::{Quote, RateProvider, RateTable, SharedRates};

mod currency;
mod price;
mod rates;

pub trait HasName {
    fn get_name(&self) -> &str;
}

pub trait HasAliases {
    fn get_aliases(&self) -> &HashSet<String>;
}
