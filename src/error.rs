//! Fatal-error enum for the layout/output core (spec §7, "Fatal data errors").
//!
//! Soft errors and warnings are not represented here; see [`crate::diagnostics`].

use thiserror::Error;

/// Errors that abort the pipeline. Every one of these corresponds to a
/// numbered diagnostic in the original engine that prints and exits.
#[derive(Debug, Error)]
pub enum PmwError {
    #[error("font '{0}' not found on search path")]
    MissingFont(String),

    #[error("malformed AFM file '{path}': {reason}")]
    MalformedAfm { path: String, reason: String },

    #[error("malformed UTR file '{path}': {reason}")]
    MalformedUtr { path: String, reason: String },

    #[error("no position table entry for musical offset {0}")]
    PositionNotFound(i32),

    #[error("transposition letter-change inconsistent: offset {0} out of range")]
    TranspositionRange(i32),

    #[error("unknown accent/ornament code {0}")]
    UnknownGlyph(u32),

    #[error("slur split nesting too deep (limit {limit})")]
    TooDeepSlurSplit { limit: usize },
}
