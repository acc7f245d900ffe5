//! The re-tagging engine
//!
//! A pass walks the text nodes below a root, finds prices with the [`Scanner`] and replaces
//! each text node holding prices by plain text and marker elements:
//!
//! ```html
//! <span class="fx-price" data-currency="EUR" data-amount="89.99" data-converted="2276.75">€89.99</span>
//! ```
//!
//! Markers left by a previous pass are read back as the text they wrap, together with the text
//! next to them. When that text still reads as the same prices nothing is written, otherwise the
//! markers are unwrapped and the text tagged again. Running a pass twice over an unchanged tree
//! writes nothing the second time.
//!
//! [`LiveTagger`] keeps a changing document tagged, with the [`Scheduler`] coalescing the
//! mutation feed into passes.
use std::fmt;
use std::fmt::{Display, Formatter};

use tracing::{debug, warn};

use crate::document::{Document, NodeId};
use crate::error::DocumentError;
use crate::models::{RateProvider, Segment, TaggedPrice};
use crate::parser::{normalize, Scanner};

pub use element::PriceElement;
pub use live::{LiveTagger, RootScope};
pub use materialize::materialize;
pub use scheduler::{ScanState, Scheduler};

mod element;
mod live;
mod materialize;
mod scheduler;

pub const DEFAULT_MARKER_CLASS: &str = "fx-price";
pub const DEFAULT_EXCLUDED_TAGS: [&str; 5] = ["script", "style", "noscript", "template", "textarea"];

/// What the engine marks and what it stays away from
#[derive(Debug, Clone, PartialEq)]
pub struct TagOptions {
    pub marker_class: String,
    pub excluded_tags: Vec<String>,
}

impl TagOptions {
    pub fn exclude(&mut self, tag_name: &str) {
        let tag_name = tag_name.to_lowercase();
        if !self.excluded_tags.contains(&tag_name) {
            self.excluded_tags.push(tag_name);
        }
    }
    pub fn is_excluded(&self, tag_name: &str) -> bool {
        self.excluded_tags
            .iter()
            .any(|x| x.eq_ignore_ascii_case(tag_name))
    }
}

impl Default for TagOptions {
    fn default() -> Self {
        TagOptions {
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            excluded_tags: DEFAULT_EXCLUDED_TAGS.iter().map(|x| x.to_string()).collect(),
        }
    }
}

/// Splits text into literal pieces and prices
///
/// Matches whose number does not normalize stay as literal text. Joining the segments gives back
/// the input.
pub fn retag(scanner: &Scanner, text: &str) -> Vec<Segment> {
    let mut segments = vec![];
    let mut literal = String::new();
    let mut position = 0;
    for m in scanner.matches(text) {
        literal.push_str(&text[position..m.start]);
        position = m.end;
        match normalize(m.raw_number()) {
            Ok(amount) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Tagged(TaggedPrice::new(&m, amount)));
            }
            Err(e) => {
                debug!(text = m.text, error = %e, "unusable price");
                literal.push_str(m.text);
            }
        }
    }
    literal.push_str(&text[position..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// What a pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Text nodes and markers looked at, excluded ones not counted
    pub visited: usize,
    /// Markers created
    pub tagged: usize,
    /// Markers left as they were
    pub unchanged: usize,
    /// Nodes that could not be rewritten
    pub skipped: usize,
}

impl Display for PassReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} visited, {} tagged, {} unchanged, {} skipped",
            self.visited, self.tagged, self.unchanged, self.skipped
        )
    }
}

/// Runs passes with one scanner, one rate provider and one set of options
#[derive(Debug, Clone)]
pub struct Retagger<R: RateProvider> {
    scanner: Scanner,
    rates: R,
    options: TagOptions,
}

impl<R: RateProvider> Retagger<R> {
    pub fn new(scanner: Scanner, rates: R, options: TagOptions) -> Self {
        Retagger {
            scanner,
            rates,
            options,
        }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }
    pub fn rates(&self) -> &R {
        &self.rates
    }
    pub fn options(&self) -> &TagOptions {
        &self.options
    }

    /// Tags every price below `root`
    ///
    /// Text is handled in runs: adjacent text nodes and markers under the same parent are read
    /// as one string. A run that still reads as the markers it holds is left alone, otherwise it
    /// is replaced as a whole. Only `root` itself being unknown is an error; a run that cannot
    /// be rewritten is counted as skipped and the pass goes on.
    pub fn pass(&self, document: &mut Document, root: NodeId) -> Result<PassReport, DocumentError> {
        if document.kind(root).is_none() {
            return Err(DocumentError::NoSuchNode(root));
        }
        let mut report = PassReport::default();
        if self.is_excluded(document, root) {
            debug!(root = %root, "root is excluded");
            return Ok(report);
        }
        for parent in self.containers(document, root) {
            for run in self.runs(document, parent) {
                report.visited += run.len();
                self.retag_run(document, &run, &mut report);
            }
        }
        debug!(root = %root, report = %report, "pass done");
        Ok(report)
    }

    fn retag_run(&self, document: &mut Document, run: &[NodeId], report: &mut PassReport) {
        let items: Vec<RunItem> = run.iter().map(|x| self.run_item(document, *x)).collect();
        let markers = items
            .iter()
            .filter(|x| matches!(x, RunItem::Marker { .. }))
            .count();
        let text: String = items.iter().map(|x| x.text()).collect();
        if markers == 0 && !self.scanner.is_match(&text) {
            return;
        }

        let segments = retag(&self.scanner, &text);
        if same_run(&items, &segments) {
            report.unchanged += markers;
            return;
        }
        let prices = segments
            .iter()
            .filter(|x| matches!(x, Segment::Tagged(_)))
            .count();
        if markers == 0 && prices == 0 {
            return;
        }
        let replacement = materialize(document, &segments, &self.options, &self.rates);
        match document.replace_siblings(run, replacement) {
            Ok(()) => report.tagged += prices,
            Err(e) => {
                warn!(node = %run[0], error = %e, "could not rewrite text");
                report.skipped += 1;
            }
        }
    }

    /// Nodes below `root` whose children may hold text to tag, in document order
    fn containers(&self, document: &Document, root: NodeId) -> Vec<NodeId> {
        let mut result = vec![];
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            result.push(node);
            for child in document.children(node).iter().rev() {
                let descend = match document.element(*child) {
                    Some(element) => {
                        !self.options.is_excluded(&element.tag_name)
                            && !element.has_class(&self.options.marker_class)
                    }
                    None => false,
                };
                if descend {
                    stack.push(*child);
                }
            }
        }
        result
    }

    /// Groups of adjacent text nodes and markers
    fn runs(&self, document: &Document, parent: NodeId) -> Vec<Vec<NodeId>> {
        let mut runs = vec![];
        let mut current = vec![];
        for child in document.children(parent) {
            let in_run = document.text(*child).is_some() || self.is_marker(document, *child);
            if in_run {
                current.push(*child);
            } else if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }

    fn is_excluded(&self, document: &Document, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Some(tag_name) = document.tag_name(current) {
                if self.options.is_excluded(tag_name) {
                    return true;
                }
            }
            cursor = document.parent(current);
        }
        false
    }

    fn is_marker(&self, document: &Document, node: NodeId) -> bool {
        document
            .element(node)
            .map_or(false, |x| x.has_class(&self.options.marker_class))
    }

    fn run_item(&self, document: &Document, node: NodeId) -> RunItem {
        match document.element(node) {
            Some(element) => RunItem::Marker {
                text: document.text_content(node),
                currency: element
                    .attr(materialize::CURRENCY_ATTRIBUTE)
                    .map(|x| x.to_string()),
                amount: element
                    .attr(materialize::AMOUNT_ATTRIBUTE)
                    .and_then(|x| x.parse::<f64>().ok()),
            },
            None => RunItem::Text(document.text(node).unwrap_or_default().to_string()),
        }
    }
}

/// A member of a run, as read from the document
#[derive(Debug)]
enum RunItem {
    Text(String),
    Marker {
        text: String,
        currency: Option<String>,
        amount: Option<f64>,
    },
}

impl RunItem {
    fn text(&self) -> &str {
        match self {
            RunItem::Text(x) => x.as_str(),
            RunItem::Marker { text, .. } => text.as_str(),
        }
    }
}

/// Whether the run already shows `segments`: same literal text between the same prices
fn same_run(items: &[RunItem], segments: &[Segment]) -> bool {
    let mut segments = segments.iter();
    let mut pending = String::new();
    for item in items {
        match item {
            RunItem::Text(x) => pending.push_str(x),
            RunItem::Marker {
                text,
                currency,
                amount,
            } => {
                if !pending.is_empty() && !same_literal(segments.next(), &pending) {
                    return false;
                }
                pending.clear();
                let same = match (segments.next(), currency, amount) {
                    (Some(Segment::Tagged(price)), Some(currency), Some(amount)) => {
                        price.same_price(text, currency, *amount)
                    }
                    _ => false,
                };
                if !same {
                    return false;
                }
            }
        }
    }
    if !pending.is_empty() && !same_literal(segments.next(), &pending) {
        return false;
    }
    segments.next().is_none()
}

fn same_literal(segment: Option<&Segment>, text: &str) -> bool {
    match segment {
        Some(Segment::Literal(x)) => x == text,
        _ => false,
    }
}
