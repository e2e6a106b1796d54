//! Core domain types for encyclopedia pages.

use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Section
// ---------------------------------------------------------------------------

/// A titled node in an article's content tree.
///
/// `level` is the depth in the source hierarchy (root = 0); the rendered
/// heading depth is `level + 1`. Children are owned and ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Heading text.
    pub title: String,
    /// Depth in the source hierarchy.
    pub level: usize,
    /// Raw plain-text body, possibly empty.
    pub body: String,
    /// Nested subsections, in document order.
    pub children: Vec<Section>,
}

impl Section {
    /// Create a leaf section.
    pub fn new(title: impl Into<String>, level: usize, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            level,
            body: body.into(),
            children: Vec::new(),
        }
    }

    /// Attach subsections, replacing any existing ones.
    pub fn with_children(mut self, children: Vec<Section>) -> Self {
        self.children = children;
        self
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A retrieved article, ready for conversion.
///
/// `L` is the provider's lazily resolvable link type; names are unique
/// because they are map keys.
#[derive(Debug, Clone)]
pub struct Page<L> {
    /// Article title as reported by the source.
    pub title: String,
    /// Canonical article URL.
    pub url: String,
    /// Language code the page was found in.
    pub language: String,
    /// Lead text before the first section.
    pub summary: String,
    /// Top-level sections.
    pub sections: Vec<Section>,
    /// Outbound links by article name.
    pub links: BTreeMap<String, L>,
    /// External reference URLs, in source order.
    pub references: Vec<String>,
    /// Image URLs, in source order.
    pub images: Vec<String>,
}
