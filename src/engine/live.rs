use std::time::Instant;

use tracing::{debug, warn};

use super::{PassReport, Retagger, Scheduler};
use crate::document::{Document, MutationRecord, NodeId};
use crate::models::RateProvider;

/// Where passes start
#[derive(Debug, Clone, PartialEq)]
pub enum RootScope {
    /// The first element with that tag, looked up before every pass
    Tag(String),
    Node(NodeId),
}

impl RootScope {
    /// The root, if it is in the document right now
    pub fn resolve(&self, document: &Document) -> Option<NodeId> {
        match self {
            RootScope::Tag(tag_name) => document.find_first(tag_name),
            RootScope::Node(id) => match document.is_attached(*id) {
                true => Some(*id),
                false => None,
            },
        }
    }
}

/// Keeps a changing document tagged
///
/// The host feeds it the records of the document and polls it from its timer:
///
/// ```ignore
/// tagger.start(&mut document, Instant::now());
/// loop {
///     let records = document.take_records();
///     tagger.on_mutations(&records, Instant::now());
///     tagger.poll(&mut document, Instant::now());
/// }
/// ```
///
/// Observation is off while a pass runs, so the pass's own writes never show up as records.
#[derive(Debug, Clone)]
pub struct LiveTagger<R: RateProvider> {
    retagger: Retagger<R>,
    scheduler: Scheduler,
    root: RootScope,
}

impl<R: RateProvider> LiveTagger<R> {
    pub fn new(retagger: Retagger<R>, scheduler: Scheduler, root: RootScope) -> Self {
        LiveTagger {
            retagger,
            scheduler,
            root,
        }
    }

    pub fn retagger(&self) -> &Retagger<R> {
        &self.retagger
    }
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Runs the first pass and starts observing
    pub fn start(&mut self, document: &mut Document, now: Instant) -> Option<PassReport> {
        self.run_pass(document, now)
    }

    /// Arms the timer for a batch of records. Returns whether a pass is now pending.
    pub fn on_mutations(&mut self, records: &[MutationRecord], now: Instant) -> bool {
        if records.is_empty() {
            return false;
        }
        debug!(records = records.len(), "mutations");
        self.scheduler.notify(now)
    }

    /// Runs the pending pass if it is due
    pub fn poll(&mut self, document: &mut Document, now: Instant) -> Option<PassReport> {
        if !self.scheduler.is_due(now) {
            return None;
        }
        self.run_pass(document, now)
    }

    fn run_pass(&mut self, document: &mut Document, now: Instant) -> Option<PassReport> {
        let root = match self.root.resolve(document) {
            Some(x) => x,
            None => {
                warn!(root = ?self.root, "root not in the document, skipping pass");
                self.scheduler.cancel();
                // Watch the whole document to hear about the root showing up
                document.observe(document.root());
                return None;
            }
        };
        if !self.scheduler.begin_pass(now) {
            return None;
        }
        document.disconnect();
        let result = self.retagger.pass(document, root);
        document.observe(root);
        self.scheduler.finish_pass();
        match result {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(error = %e, "pass failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;
    use crate::engine::{ScanState, TagOptions};
    use crate::models::{default_currencies, Currency, RateTable};
    use crate::parser::{parse_markup, Scanner};
    use std::time::Duration;

    fn tagger(root: RootScope) -> LiveTagger<RateTable> {
        let retagger = Retagger::new(
            Scanner::new(default_currencies()).unwrap(),
            RateTable::new(Currency::from("EUR")),
            TagOptions::default(),
        );
        LiveTagger::new(retagger, Scheduler::default(), root)
    }

    fn ms(x: u64) -> Duration {
        Duration::from_millis(x)
    }

    #[test]
    fn own_writes_are_not_observed() {
        let t0 = Instant::now();
        let mut document = parse_markup("<body><p>€10</p></body>").unwrap();
        let mut tagger = tagger(RootScope::Tag("body".to_string()));
        let report = tagger.start(&mut document, t0).unwrap();
        assert_eq!(report.tagged, 1);
        assert!(document.is_observing());
        assert!(document.take_records().is_empty());
        assert_eq!(tagger.poll(&mut document, t0 + ms(10_000)), None);
    }

    #[test]
    fn page_changes_trigger_one_pass() {
        let t0 = Instant::now();
        let mut document = parse_markup("<body><p>€10</p></body>").unwrap();
        let mut tagger = tagger(RootScope::Tag("body".to_string()));
        tagger.start(&mut document, t0);

        let body = document.find_first("body").unwrap();
        for (i, text) in ["USD 1", "USD 2", "USD 3"].iter().enumerate() {
            let p = document.create_element(Element::new("p"));
            let t = document.create_text(text);
            document.append_child(p, t).unwrap();
            document.append_child(body, p).unwrap();
            let records = document.take_records();
            assert!(tagger.on_mutations(&records, t0 + ms(100 * i as u64)));
        }
        assert_eq!(tagger.poll(&mut document, t0 + ms(400)), None);
        let report = tagger.poll(&mut document, t0 + ms(700)).unwrap();
        assert_eq!(report.tagged, 3);
        assert_eq!(report.unchanged, 1);
        assert_eq!(tagger.scheduler().state(), ScanState::Idle);

        let records = document.take_records();
        assert!(!tagger.on_mutations(&records, t0 + ms(800)));
        assert_eq!(tagger.poll(&mut document, t0 + ms(5000)), None);
    }

    #[test]
    fn missing_root_retries() {
        let t0 = Instant::now();
        let mut document = parse_markup("<p>€10</p>").unwrap();
        let mut tagger = tagger(RootScope::Tag("body".to_string()));
        assert_eq!(tagger.start(&mut document, t0), None);
        assert_eq!(tagger.scheduler().state(), ScanState::Idle);

        let body = document.create_element(Element::new("body"));
        let text = document.create_text("£3");
        document.append_child(body, text).unwrap();
        document.append_child(document.root(), body).unwrap();
        let records = document.take_records();
        assert_eq!(records.len(), 1);
        assert!(tagger.on_mutations(&records, t0));
        let report = tagger.poll(&mut document, t0 + ms(500)).unwrap();
        assert_eq!(report.tagged, 1);
        // outside the root
        let p = document.find_first("p").unwrap();
        assert_eq!(document.text_content(p), "€10");
        assert!(document.find_first("span").is_some());
    }

    #[test]
    fn detached_node_root() {
        let t0 = Instant::now();
        let mut document = parse_markup("<div>€1</div>").unwrap();
        let div = document.find_first("div").unwrap();
        let mut tagger = tagger(RootScope::Node(div));
        document.remove(div).unwrap();
        assert_eq!(tagger.start(&mut document, t0), None);
    }
}
