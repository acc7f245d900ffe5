use super::materialize::{AMOUNT_ATTRIBUTE, CONVERTED_ATTRIBUTE, CURRENCY_ATTRIBUTE};
use crate::document::{Document, NodeId};
use crate::models::{Currency, DisplayFormat, RateProvider};

/// A marker as seen by presentation code
#[derive(Debug, Clone, PartialEq)]
pub struct PriceElement {
    pub node: NodeId,
    pub text: String,
    pub currency: String,
    pub amount: f64,
    /// Converted amount recorded when the marker was created
    pub converted: Option<f64>,
}

impl PriceElement {
    /// Reads a marker back, `None` when `node` is not one
    pub fn read(document: &Document, node: NodeId, marker_class: &str) -> Option<Self> {
        let element = document.element(node)?;
        if !element.has_class(marker_class) {
            return None;
        }
        Some(PriceElement {
            node,
            text: document.text_content(node),
            currency: element.attr(CURRENCY_ATTRIBUTE)?.to_string(),
            amount: element.attr(AMOUNT_ATTRIBUTE)?.parse().ok()?,
            converted: element
                .attr(CONVERTED_ATTRIBUTE)
                .and_then(|x| x.parse().ok()),
        })
    }

    /// Every marker below `root`, in document order
    pub fn all(document: &Document, root: NodeId, marker_class: &str) -> Vec<Self> {
        document
            .descendants(root)
            .into_iter()
            .filter_map(|x| PriceElement::read(document, x, marker_class))
            .collect()
    }

    /// Converts with the rates as they are now, instead of the recorded value
    pub fn convert_with<R: RateProvider + ?Sized>(&self, rates: &R) -> Option<f64> {
        rates.convert(&Currency::from(self.currency.as_str()), self.amount)
    }

    /// Hover text, e.g. `≈ 2 189,25 Kč`
    pub fn tooltip(&self, format: &DisplayFormat) -> Option<String> {
        self.converted
            .map(|x| format!("≈ {}", format.format_amount(x)))
    }
}
