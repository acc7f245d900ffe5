use chrono::{Duration, NaiveDateTime};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use tracing::{debug, warn};

use crate::models::{Currency, HasName};

/// Anything that knows how much of the target currency one unit of another currency is worth
pub trait RateProvider {
    fn target(&self) -> Currency;
    fn rate(&self, currency: &Currency) -> Option<f64>;

    /// Converts an amount into the target currency, if there is a rate for it
    fn convert(&self, currency: &Currency, amount: f64) -> Option<f64> {
        self.rate(currency)
            .map(|rate| amount * rate)
            .filter(|x| x.is_finite())
    }
}

/// A quote relates two currencies: one unit of `commodity` is worth `price` units of `other`
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub date: NaiveDateTime,
    pub commodity: Currency,
    pub price: f64,
    pub other: Currency,
}

impl Display for Quote {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date.format("%Y-%m-%d %H:%M:%S"),
            self.commodity,
            self.price,
            self.other
        )
    }
}

/// The rates of every reachable currency into one target currency
#[derive(Debug, Clone)]
pub struct RateTable {
    target: Currency,
    quotes: Vec<Quote>,
    rates: HashMap<Currency, f64>,
}

impl RateTable {
    /// A table that only knows the target currency
    pub fn new(target: Currency) -> Self {
        let mut rates = HashMap::new();
        rates.insert(target.clone(), 1.0);
        RateTable {
            target,
            quotes: vec![],
            rates,
        }
    }

    /// Resolves the rate of every currency reachable from the target through the quotes
    ///
    /// When a pair of currencies is quoted more than once, the latest quote wins. The walk goes
    /// breadth first from the target, so a direct quote is always preferred over a path through
    /// an intermediate currency.
    pub fn from_quotes(target: Currency, quotes: Vec<Quote>) -> Self {
        let mut latest: HashMap<(Currency, Currency), &Quote> = HashMap::new();
        for q in quotes.iter() {
            if !(q.price.is_finite() && q.price > 0.0) || q.commodity == q.other {
                warn!(quote = %q, "ignoring unusable quote");
                continue;
            }
            let key = if q.commodity < q.other {
                (q.commodity.clone(), q.other.clone())
            } else {
                (q.other.clone(), q.commodity.clone())
            };
            match latest.get(&key) {
                Some(x) if x.date > q.date => (),
                _ => {
                    latest.insert(key, q);
                }
            }
        }

        // Neighbours: currency -> (other currency, units of other per unit of currency)
        let mut neighbours: HashMap<Currency, Vec<(Currency, f64)>> = HashMap::new();
        for q in latest.values() {
            neighbours
                .entry(q.commodity.clone())
                .or_insert_with(Vec::new)
                .push((q.other.clone(), q.price));
            neighbours
                .entry(q.other.clone())
                .or_insert_with(Vec::new)
                .push((q.commodity.clone(), 1.0 / q.price));
        }
        for list in neighbours.values_mut() {
            list.sort_by(|a, b| a.0.cmp(&b.0));
        }

        let mut table = RateTable::new(target.clone());
        let mut queue = VecDeque::new();
        queue.push_back(target);
        while let Some(current) = queue.pop_front() {
            let current_rate = match table.rates.get(&current) {
                Some(x) => *x,
                None => continue,
            };
            if let Some(list) = neighbours.get(&current) {
                for (next, units) in list.iter() {
                    if table.rates.contains_key(next) {
                        continue;
                    }
                    // One `next` is worth 1 / units of `current`
                    table.rates.insert(next.clone(), current_rate / units);
                    queue.push_back(next.clone());
                }
            }
        }
        debug!(
            currency = %table.target,
            quotes = quotes.len(),
            resolved = table.rates.len(),
            "resolved rate table"
        );
        table.quotes = quotes;
        table
    }

    /// Builds the table out of USD based quotes named like `USDCZK` or `USDEUR`
    pub fn from_usd_quotes(
        target: Currency,
        quotes: &HashMap<String, f64>,
        date: NaiveDateTime,
    ) -> Self {
        let usd = Currency::from("USD");
        let parsed = quotes
            .iter()
            .filter_map(|(pair, price)| {
                let upper = pair.to_uppercase();
                if upper.len() != 6 || !upper.starts_with("USD") {
                    warn!(pair = %pair, "not a USD quote");
                    return None;
                }
                Some(Quote {
                    date,
                    commodity: usd.clone(),
                    price: *price,
                    other: Currency::from(&upper[3..]),
                })
            })
            .collect();
        RateTable::from_quotes(target, parsed)
    }

    pub fn get_target(&self) -> &Currency {
        &self.target
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Date of the newest quote
    pub fn as_of(&self) -> Option<NaiveDateTime> {
        self.quotes.iter().map(|q| q.date).max()
    }

    /// A table is stale when its newest quote is older than `max_age`, or when it has no quotes
    pub fn is_stale(&self, now: NaiveDateTime, max_age: Duration) -> bool {
        match self.as_of() {
            Some(date) => now - date > max_age,
            None => true,
        }
    }

    /// Every resolved rate, sorted by currency
    pub fn rates(&self) -> Vec<(&Currency, f64)> {
        let mut rates: Vec<(&Currency, f64)> = self.rates.iter().map(|(c, r)| (c, *r)).collect();
        rates.sort_by(|a, b| a.0.get_name().cmp(b.0.get_name()));
        rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl RateProvider for RateTable {
    fn target(&self) -> Currency {
        self.target.clone()
    }
    fn rate(&self, currency: &Currency) -> Option<f64> {
        self.rates.get(currency).copied()
    }
}

/// A rate table that can be replaced out of band while the engine keeps its handle
#[derive(Debug, Clone)]
pub struct SharedRates {
    table: Rc<RefCell<RateTable>>,
}

impl SharedRates {
    pub fn new(table: RateTable) -> Self {
        SharedRates {
            table: Rc::new(RefCell::new(table)),
        }
    }
    pub fn replace(&self, table: RateTable) {
        *self.table.borrow_mut() = table;
    }
    pub fn is_stale(&self, now: NaiveDateTime, max_age: Duration) -> bool {
        self.table.borrow().is_stale(now, max_age)
    }
}

impl RateProvider for SharedRates {
    fn target(&self) -> Currency {
        self.table.borrow().target.clone()
    }
    fn rate(&self, currency: &Currency) -> Option<f64> {
        self.table.borrow().rate(currency)
    }
}

impl<T: RateProvider + ?Sized> RateProvider for Rc<T> {
    fn target(&self) -> Currency {
        self.as_ref().target()
    }
    fn rate(&self, currency: &Currency) -> Option<f64> {
        self.as_ref().rate(currency)
    }
}
