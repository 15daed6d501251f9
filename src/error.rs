//! Error types for the glossary extraction library.
//!
//! Only failures that a caller must see live here: a document that cannot be
//! opened, a glyph source that breaks mid-document, an invalid configuration.
//! Degraded data (missing headers, unresolved glyphs) is reported through
//! attempt scores and document reports instead.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting glossary tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The glyph source could not open or parse the document
    #[error("Failed to open document '{path}': {reason}")]
    SourceOpen {
        /// Path or identifier of the document
        path: String,
        /// Reason reported by the source
        reason: String,
    },

    /// Error raised by the underlying PDF library
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Page index outside the document
    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// Requested page (0-indexed)
        page: usize,
        /// Number of pages in the document
        count: usize,
    },

    /// Malformed font object graph (dangling ToUnicode reference, corrupt stream)
    #[error("Font '{font}' is unrepairable: {reason}")]
    FontGraph {
        /// Font identifier within the document
        font: String,
        /// What was wrong with the font graph
        reason: String,
    },

    /// Invalid ToUnicode CMap content
    #[error("Invalid CMap: {0}")]
    CMap(String),

    /// Invalid column boundaries (non-increasing or non-finite)
    #[error("Invalid column boundaries: {0}")]
    InvalidBoundaries(String),

    /// Invalid pipeline or extraction configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Document processing was abandoned after a fatal error on another page
    #[error("Document processing cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "pdf")]
impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Pdf(err.to_string())
    }
}
