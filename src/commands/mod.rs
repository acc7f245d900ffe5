pub mod currencies;
pub mod rates;
pub mod scan;
pub mod tag;
