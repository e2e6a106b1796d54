//! Concurrent link resolution and hyperlink rewriting.
//!
//! Resolution runs in two phases. All link targets are resolved concurrently
//! through a bounded pool; only once every task has finished are the
//! successful URLs applied, in one left-to-right pass over the text. The
//! output therefore does not depend on the order in which lookups complete.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::{Captures, Regex, RegexBuilder};
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use wikimd_markdown::link;
use wikimd_shared::{ConvertConfig, LinkTarget, Result, WikiMdError};

/// Default number of lookups in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 100;

/// Compiled size limit for the name-matching automaton. Pages can link to
/// thousands of articles.
const NAME_PATTERN_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// Spans copied through untouched: Markdown links and bare URLs.
const PROTECTED_SPANS: &str = r"\[[^\]\n]*\]\([^)\s]*\)|https?://[^\s)\]]+";

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

/// Link resolution settings.
#[derive(Debug, Clone)]
pub struct LinkOptions {
    /// Maximum lookups in flight.
    pub concurrency: usize,
    /// Per-lookup timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Some(Duration::from_secs(10)),
        }
    }
}

impl From<&ConvertConfig> for LinkOptions {
    fn from(config: &ConvertConfig) -> Self {
        Self {
            concurrency: config.link_concurrency.max(1),
            timeout: (config.link_timeout_secs > 0)
                .then(|| Duration::from_secs(config.link_timeout_secs)),
        }
    }
}

/// Outcome of [`resolve_links`].
#[derive(Debug, Clone)]
pub struct LinkedText {
    /// Text with every resolved name turned into a hyperlink.
    pub markdown: String,
    /// Names whose URL was found.
    pub resolved: usize,
    /// Names whose lookup failed or timed out.
    pub failed: usize,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve every target and rewrite its name in `text` into a Markdown link.
///
/// Failed lookups leave their name as plain text and never abort the batch.
#[instrument(skip_all, fields(links = targets.len(), concurrency = opts.concurrency))]
pub async fn resolve_links<L: LinkTarget>(
    text: &str,
    targets: BTreeMap<String, L>,
    opts: &LinkOptions,
) -> LinkedText {
    let total = targets.len();
    let urls = resolve_all(targets, opts).await;
    let failed = total - urls.len();

    info!(resolved = urls.len(), failed, "link resolution complete");

    LinkedText {
        markdown: apply_links(text, &urls),
        resolved: urls.len(),
        failed,
    }
}

/// Resolve all targets concurrently. Failures are logged and dropped.
async fn resolve_all<L: LinkTarget>(
    targets: BTreeMap<String, L>,
    opts: &LinkOptions,
) -> BTreeMap<String, String> {
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let mut handles = Vec::with_capacity(targets.len());

    for (name, target) in targets {
        let sem = semaphore.clone();
        let timeout = opts.timeout;

        handles.push(tokio::spawn(async move {
            let outcome = match sem.acquire_owned().await {
                Ok(_permit) => resolve_one(&target, timeout).await,
                Err(_) => Err(WikiMdError::Network("link pool closed".into())),
            };
            (name, outcome)
        }));
    }

    // Collect results
    let mut urls = BTreeMap::new();
    for handle in handles {
        match handle.await {
            Ok((name, Ok(url))) => {
                urls.insert(name, url);
            }
            Ok((name, Err(e))) => {
                debug!(%name, error = %e, "link left unresolved");
            }
            Err(e) => {
                warn!(error = %e, "link resolution task failed");
            }
        }
    }

    urls
}

async fn resolve_one<L: LinkTarget>(target: &L, timeout: Option<Duration>) -> Result<String> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, target.resolve())
            .await
            .map_err(|_| WikiMdError::Network(format!("timed out after {limit:?}")))?,
        None => target.resolve().await,
    }
}

// ---------------------------------------------------------------------------
// Rewriting
// ---------------------------------------------------------------------------

/// Replace every occurrence of each name with `[name](url)` in a single pass.
///
/// At each position the longest matching name wins. Existing Markdown links
/// and bare URLs are never rewritten. Matching is literal, not word-aware.
pub fn apply_links(text: &str, urls: &BTreeMap<String, String>) -> String {
    static PROTECTED: LazyLock<String> = LazyLock::new(|| format!("(?:{PROTECTED_SPANS})"));

    let mut names: Vec<&str> = urls
        .keys()
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return text.to_string();
    }
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!("{}|(?P<name>{alternation})", *PROTECTED);

    let re: Regex = match RegexBuilder::new(&pattern)
        .size_limit(NAME_PATTERN_SIZE_LIMIT)
        .build()
    {
        Ok(re) => re,
        Err(e) => {
            warn!(error = %e, names = names.len(), "could not compile link pattern, skipping links");
            return text.to_string();
        }
    };

    re.replace_all(text, |caps: &Captures| match caps.name("name") {
        Some(found) => {
            let name = found.as_str();
            urls.get(name)
                .map_or_else(|| name.to_string(), |url| link(name, url))
        }
        None => caps[0].to_string(),
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FakeLink;

    fn urls(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(n, u)| (n.to_string(), u.to_string()))
            .collect()
    }

    // --- apply_links ---

    #[test]
    fn apply_replaces_every_occurrence_once() {
        let map = urls(&[("Physics", "https://w/Physics")]);
        let out = apply_links("Physics is fun. I like Physics.", &map);
        assert_eq!(
            out,
            "[Physics](https://w/Physics) is fun. I like [Physics](https://w/Physics)."
        );
    }

    #[test]
    fn apply_prefers_longest_name() {
        let map = urls(&[
            ("New York", "https://w/NY"),
            ("New York City", "https://w/NYC"),
        ]);
        let out = apply_links("New York City is in New York.", &map);
        assert_eq!(
            out,
            "[New York City](https://w/NYC) is in [New York](https://w/NY)."
        );
    }

    #[test]
    fn apply_skips_existing_links_and_urls() {
        let map = urls(&[("Einstein", "https://w/Einstein")]);
        let text = "# [Albert Einstein](https://w/Albert_Einstein)\n\nEinstein\n\nhttps://w/Albert_Einstein\n";
        let out = apply_links(text, &map);
        assert_eq!(
            out,
            "# [Albert Einstein](https://w/Albert_Einstein)\n\n[Einstein](https://w/Einstein)\n\nhttps://w/Albert_Einstein\n"
        );
    }

    #[test]
    fn apply_is_literal_not_word_aware() {
        let map = urls(&[("Ion", "https://w/Ion")]);
        assert_eq!(apply_links("Ionic", &map), "[Ion](https://w/Ion)ic");
    }

    #[test]
    fn apply_escapes_regex_metacharacters() {
        let map = urls(&[("C++", "https://w/Cpp")]);
        assert_eq!(apply_links("C++ and C", &map), "[C++](https://w/Cpp) and C");
    }

    #[test]
    fn apply_with_no_names_is_identity() {
        assert_eq!(apply_links("text", &BTreeMap::new()), "text");
        assert_eq!(apply_links("text", &urls(&[("", "https://w/")])), "text");
    }

    // --- resolve_links ---

    #[tokio::test]
    async fn resolve_rewrites_successful_names() {
        let targets = BTreeMap::from([
            ("Greece".to_string(), FakeLink::ok("https://w/Greece")),
            ("Samos".to_string(), FakeLink::ok("https://w/Samos")),
        ]);

        let out = resolve_links("Samos lies off Greece.", targets, &LinkOptions::default()).await;
        assert_eq!(
            out.markdown,
            "[Samos](https://w/Samos) lies off [Greece](https://w/Greece)."
        );
        assert_eq!(out.resolved, 2);
        assert_eq!(out.failed, 0);
    }

    #[tokio::test]
    async fn failed_lookup_leaves_plain_text() {
        let targets = BTreeMap::from([
            ("Samos".to_string(), FakeLink::failing()),
            ("Greece".to_string(), FakeLink::ok("https://w/Greece")),
        ]);

        let out = resolve_links("Samos, Greece, Samos", targets, &LinkOptions::default()).await;
        assert_eq!(out.markdown, "Samos, [Greece](https://w/Greece), Samos");
        assert_eq!(out.resolved, 1);
        assert_eq!(out.failed, 1);
    }

    #[tokio::test]
    async fn output_independent_of_completion_order() {
        let text = "New York City and New York";

        let fast_long = BTreeMap::from([
            ("New York City".to_string(), FakeLink::ok("https://w/NYC")),
            (
                "New York".to_string(),
                FakeLink::ok("https://w/NY").delayed(Duration::from_millis(40)),
            ),
        ]);
        let fast_short = BTreeMap::from([
            (
                "New York City".to_string(),
                FakeLink::ok("https://w/NYC").delayed(Duration::from_millis(40)),
            ),
            ("New York".to_string(), FakeLink::ok("https://w/NY")),
        ]);

        let opts = LinkOptions::default();
        let a = resolve_links(text, fast_long, &opts).await;
        let b = resolve_links(text, fast_short, &opts).await;

        assert_eq!(a.markdown, b.markdown);
        assert_eq!(
            a.markdown,
            "[New York City](https://w/NYC) and [New York](https://w/NY)"
        );
    }

    #[tokio::test]
    async fn timeout_counts_as_failure() {
        let targets = BTreeMap::from([(
            "Slow".to_string(),
            FakeLink::ok("https://w/Slow").delayed(Duration::from_secs(5)),
        )]);
        let opts = LinkOptions {
            concurrency: 4,
            timeout: Some(Duration::from_millis(50)),
        };

        let out = resolve_links("Slow page", targets, &opts).await;
        assert_eq!(out.markdown, "Slow page");
        assert_eq!(out.failed, 1);
    }

    #[tokio::test]
    async fn in_flight_lookups_are_bounded() {
        let probe = FakeLink::ok("https://w/x").delayed(Duration::from_millis(20));
        let targets: BTreeMap<String, FakeLink> = (0..12)
            .map(|i| (format!("Name{i:02}"), probe.clone()))
            .collect();
        let opts = LinkOptions {
            concurrency: 3,
            timeout: None,
        };

        let out = resolve_links("", targets, &opts).await;
        assert_eq!(out.resolved, 12);
        assert!(probe.peak() <= 3, "peak in-flight was {}", probe.peak());
        assert!(probe.peak() >= 1);
    }

    #[test]
    fn options_from_config() {
        let mut config = ConvertConfig::from(&wikimd_shared::AppConfig::default());
        let opts = LinkOptions::from(&config);
        assert_eq!(opts.concurrency, 100);
        assert_eq!(opts.timeout, Some(Duration::from_secs(10)));

        config.link_timeout_secs = 0;
        assert_eq!(LinkOptions::from(&config).timeout, None);
    }
}
