//! Collaborator traits for page retrieval and link resolution.
//!
//! The conversion pipeline only talks to these traits, so it can run against
//! an in-memory provider in tests and the MediaWiki client in production.

use std::future::Future;

use crate::error::Result;
use crate::types::Page;

/// A named reference to another article that can be resolved to its URL.
pub trait LinkTarget: Send + Sync + 'static {
    /// Look up the canonical URL. May fail or take a variable amount of time.
    fn resolve(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Retrieves articles from an encyclopedia.
pub trait PageProvider: Send + Sync {
    /// Link type handed out with each page.
    type Link: LinkTarget;

    /// Fetch `topic` from the first language in `languages` that has it.
    ///
    /// Fails with [`crate::WikiMdError::NotFound`] when no language has the
    /// page and [`crate::WikiMdError::Disambiguation`] when the topic is ambiguous.
    fn fetch_page(
        &self,
        topic: &str,
        languages: &[String],
    ) -> impl Future<Output = Result<Page<Self::Link>>> + Send;
}
