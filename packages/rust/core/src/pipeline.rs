//! End-to-end conversion pipeline: topic → fetch → assemble → link → write.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use wikimd_shared::{ConvertConfig, Page, PageProvider, Result};

use crate::assembler::assemble;
use crate::links::{LinkOptions, resolve_links};
use crate::writer::DocumentWriter;

/// Result of [`generate_markdown`].
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Path of the written document.
    pub path: PathBuf,
    /// Article title as reported by the source.
    pub title: String,
    /// Language edition the article came from.
    pub language: String,
    /// Links turned into hyperlinks.
    pub links_resolved: usize,
    /// Links left as plain text.
    pub links_failed: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, result: &ConvertResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &ConvertResult) {}
}

/// Convert `topic` into a Markdown file.
///
/// 1. Fetch the page from the first language that has it
/// 2. Assemble the document
/// 3. Resolve outbound links and rewrite them into hyperlinks
/// 4. Write the document (and images, if enabled)
///
/// Disambiguation and not-found failures propagate unchanged; nothing is
/// written in that case.
#[instrument(skip_all, fields(topic = %topic))]
pub async fn generate_markdown<P, W>(
    topic: &str,
    config: &ConvertConfig,
    provider: &P,
    writer: &W,
    progress: &dyn ProgressReporter,
) -> Result<ConvertResult>
where
    P: PageProvider,
    W: DocumentWriter,
{
    let start = Instant::now();
    config.validate()?;

    info!(languages = ?config.languages, "starting conversion");

    // --- Phase 1: Fetch ---
    progress.phase("Fetching page");
    let page = provider.fetch_page(topic, &config.languages).await?;
    info!(
        title = %page.title,
        language = %page.language,
        sections = page.sections.len(),
        links = page.links.len(),
        "page fetched"
    );

    // --- Phase 2: Assemble ---
    progress.phase("Assembling document");
    let document = assemble(&page, config.math_style);

    // --- Phase 3: Links ---
    let Page {
        title,
        language,
        links,
        images,
        ..
    } = page;
    progress.phase(&format!("Resolving {} links", links.len()));
    let linked = resolve_links(&document, links, &LinkOptions::from(config)).await;

    // --- Phase 4: Write ---
    progress.phase("Writing document");
    let path = writer.write(topic, &linked.markdown, &images).await?;

    let result = ConvertResult {
        path,
        title,
        language,
        links_resolved: linked.resolved,
        links_failed: linked.failed,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        path = %result.path.display(),
        links_resolved = result.links_resolved,
        links_failed = result.links_failed,
        elapsed_ms = result.elapsed.as_millis(),
        "conversion complete"
    );

    Ok(result)
}
