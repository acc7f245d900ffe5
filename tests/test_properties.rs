//! Property based tests for the normalizer, the scanner and the pass

use fxtag::document::{Document, Element};
use fxtag::engine::{retag, Retagger, TagOptions};
use fxtag::models::{default_currencies, Currency, RateTable};
use fxtag::parser::{normalize, Scanner};
use proptest::prelude::*;

/// Groups the digits of `integer` by three with `separator`
fn grouped(integer: u64, separator: &str) -> String {
    let digits = integer.to_string();
    let mut result = String::new();
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push_str(separator);
        }
        result.push(digit);
    }
    result
}

/// Pieces of page text, some of them prices or halves of prices
fn token_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "EUR 10",
        "€3,50",
        "USD",
        " ",
        "and",
        "1.234,56",
        "kr",
        "5",
        "GBP 1,250.50",
        "EU",
        "R 7",
        ",",
        "199 GBP",
        "$",
        "-12.50",
        "\u{a0}",
    ])
}

fn text_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::collection::vec(token_strategy(), 1..5).prop_map(|x| x.concat()),
        1..6,
    )
}

fn retagger() -> Retagger<RateTable> {
    Retagger::new(
        Scanner::new(default_currencies()).unwrap(),
        RateTable::new(Currency::from("EUR")),
        TagOptions::default(),
    )
}

proptest! {
    #[test]
    fn normalize_never_panics(raw in "[-0-9., \u{a0}]{0,24}") {
        if let Ok(value) = normalize(&raw) {
            prop_assert!(value.is_finite());
        }
    }

    #[test]
    fn common_styles_agree(integer in 0u64..100_000_000, cents in 0u64..100) {
        let expected: f64 = format!("{}.{:02}", integer, cents).parse().unwrap();
        let english = format!("{}.{:02}", grouped(integer, ","), cents);
        let german = format!("{},{:02}", grouped(integer, "."), cents);
        let french = format!("{},{:02}", grouped(integer, " "), cents);
        prop_assert_eq!(normalize(&english), Ok(expected));
        prop_assert_eq!(normalize(&german), Ok(expected));
        prop_assert_eq!(normalize(&french), Ok(expected));
    }

    #[test]
    fn matches_are_ordered(text in "\\PC{0,60}") {
        let scanner = Scanner::new(default_currencies()).unwrap();
        let mut end = 0;
        for m in scanner.matches(&text) {
            prop_assert!(m.start >= end);
            prop_assert_eq!(&text[m.start..m.end], m.text);
            end = m.end;
        }
        let joined: String = retag(&scanner, &text).iter().map(|x| x.as_str()).collect();
        prop_assert_eq!(joined, text);
    }

    #[test]
    fn second_pass_writes_nothing(pieces in text_strategy()) {
        let retagger = retagger();
        let mut document = Document::new();
        let root = document.root();
        let paragraph = document.create_element(Element::new("p"));
        document.append_child(root, paragraph).unwrap();
        for piece in pieces.iter() {
            let text = document.create_text(piece);
            document.append_child(paragraph, text).unwrap();
        }

        let first = retagger.pass(&mut document, root).unwrap();
        prop_assert_eq!(document.text_content(paragraph), pieces.concat());
        let html = document.to_html(root);

        document.observe(root);
        let second = retagger.pass(&mut document, root).unwrap();
        prop_assert_eq!(second.tagged, 0);
        prop_assert_eq!(second.unchanged, first.tagged);
        prop_assert!(document.take_records().is_empty());
        prop_assert_eq!(document.to_html(root), html);
    }
}
