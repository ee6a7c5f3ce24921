//! Error types for the slide document model.
//!
//! Parsing and extraction never surface errors: malformed input degrades to
//! a coarser result instead. Errors exist only at the splice boundary, where
//! refusing to act is what keeps the document intact.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the slide document model.
#[derive(Error, Debug)]
pub enum Error {
    /// External regeneration returned empty or unusable content; the
    /// document was left unchanged.
    #[error("Refinement produced no usable content: {0}")]
    RefinementFailed(String),

    /// A section's recorded byte range no longer addresses the content it
    /// was produced from. The caller must re-run boundary detection.
    #[error("Stale section range [{start}, {end}) against a document of {len} bytes")]
    StaleSection {
        start: usize,
        end: usize,
        len: usize,
    },
}
