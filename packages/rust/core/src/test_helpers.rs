//! In-memory collaborators shared by the unit tests in this crate.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wikimd_shared::{LinkTarget, Page, PageProvider, Result, Section, WikiMdError};

/// Link target with a canned outcome and an optional delay.
///
/// Clones share the in-flight counters, so a single probe can measure the
/// peak concurrency of a whole batch.
#[derive(Debug, Clone)]
pub struct FakeLink {
    url: Option<String>,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl FakeLink {
    pub fn ok(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            delay: Duration::ZERO,
            in_flight: Arc::default(),
            peak: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            url: None,
            ..Self::ok("")
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl LinkTarget for FakeLink {
    async fn resolve(&self) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.url
            .clone()
            .ok_or_else(|| WikiMdError::Network("lookup failed".into()))
    }
}

/// A small article with one link, one reference, and a trailing "See also".
pub fn sample_page() -> Page<FakeLink> {
    Page {
        title: "Pythagoras".into(),
        url: "https://en.wikipedia.org/wiki/Pythagoras".into(),
        language: "en".into(),
        summary: "Pythagoras was born on Samos".into(),
        sections: vec![
            Section::new("Life", 1, "He left Samos"),
            Section::new("See also", 1, "Euclid"),
        ],
        links: BTreeMap::from([("Samos".to_string(), FakeLink::ok("https://w/Samos"))]),
        references: vec!["https://example.org/pythagoras".into()],
        images: Vec::new(),
    }
}

/// Provider serving a fixed set of pages by exact title.
pub struct FakeProvider {
    pages: Vec<Page<FakeLink>>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(pages: Vec<Page<FakeLink>>) -> Self {
        Self {
            pages,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl PageProvider for FakeProvider {
    type Link = FakeLink;

    async fn fetch_page(&self, topic: &str, languages: &[String]) -> Result<Page<FakeLink>> {
        self.requests.lock().unwrap().push(topic.to_string());
        self.pages
            .iter()
            .find(|p| p.title == topic)
            .cloned()
            .ok_or_else(|| WikiMdError::NotFound {
                topic: topic.to_string(),
                languages: languages.to_vec(),
            })
    }
}
