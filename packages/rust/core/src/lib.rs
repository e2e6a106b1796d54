//! Conversion pipeline and document assembly for wikimd.
//!
//! Ties the page provider, Markdown rendering, link resolution, and output
//! writing together into one end-to-end workflow ([`generate_markdown`]).

pub mod assembler;
pub mod links;
pub mod pipeline;
pub mod writer;

#[cfg(test)]
mod test_helpers;

pub use assembler::{EXCLUDED_SECTIONS, assemble};
pub use links::{LinkOptions, LinkedText, apply_links, resolve_links};
pub use pipeline::{ConvertResult, ProgressReporter, SilentProgress, generate_markdown};
pub use writer::{DocumentWriter, FsWriter};
