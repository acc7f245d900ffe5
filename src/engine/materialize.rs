use super::TagOptions;
use crate::document::{Document, Element, NodeId};
use crate::models::{HasName, RateProvider, Segment, TaggedPrice};

pub(crate) const CURRENCY_ATTRIBUTE: &str = "data-currency";
pub(crate) const AMOUNT_ATTRIBUTE: &str = "data-amount";
pub(crate) const CONVERTED_ATTRIBUTE: &str = "data-converted";

/// Creates the detached nodes for a list of segments, in order
///
/// The converted amount is computed once, here. Markers keep it even if the rates change later.
pub fn materialize<R: RateProvider + ?Sized>(
    document: &mut Document,
    segments: &[Segment],
    options: &TagOptions,
    rates: &R,
) -> Vec<NodeId> {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => document.create_text(text),
            Segment::Tagged(price) => marker(document, price, options, rates),
        })
        .collect()
}

fn marker<R: RateProvider + ?Sized>(
    document: &mut Document,
    price: &TaggedPrice,
    options: &TagOptions,
    rates: &R,
) -> NodeId {
    let mut element = Element::new("span");
    element.set_attr("class", &options.marker_class);
    element.set_attr(CURRENCY_ATTRIBUTE, price.currency.get_name());
    // Shortest representation that reads back to the same f64
    element.set_attr(AMOUNT_ATTRIBUTE, &format!("{}", price.amount));
    if let Some(converted) = rates.convert(&price.currency, price.amount) {
        element.set_attr(CONVERTED_ATTRIBUTE, &short_decimal(converted));
    }
    let id = document.create_element(element);
    let text = document.create_text(&price.text);
    // A fresh span always accepts a fresh text node
    let _ = document.append_child(id, text);
    id
}

/// At most six decimals, without trailing zeros
fn short_decimal(value: f64) -> String {
    let fixed = format!("{:.6}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        x => x.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_currencies, Currency, RateTable};
    use crate::parser::Scanner;

    #[test]
    fn decimals() {
        assert_eq!(short_decimal(230.0), "230");
        assert_eq!(short_decimal(2276.7470000000003), "2276.747");
        assert_eq!(short_decimal(-0.0000001), "0");
        assert_eq!(short_decimal(0.5), "0.5");
    }

    #[test]
    fn nodes_in_order() {
        let scanner = Scanner::new(default_currencies()).unwrap();
        let segments = crate::engine::retag(&scanner, "a €1 b");
        let mut document = Document::new();
        let rates = RateTable::new(Currency::from("EUR"));
        let nodes = materialize(&mut document, &segments, &TagOptions::default(), &rates);
        assert_eq!(nodes.len(), 3);
        assert_eq!(document.text(nodes[0]), Some("a "));
        assert_eq!(
            document.to_html(nodes[1]),
            "<span class=\"fx-price\" data-currency=\"EUR\" data-amount=\"1\" data-converted=\"1\">€1</span>"
        );
        assert_eq!(document.text(nodes[2]), Some(" b"));
        assert!(nodes.iter().all(|x| document.parent(*x).is_none()));
    }
}
