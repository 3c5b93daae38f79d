//! Failure kinds reported by the scanner.
//!
//! Document faults never abort a scan; they are reported through the
//! progress channel and the document is skipped. Only [`ScanError`]
//! fails a scan, and only before any document is touched.

/// Why a document (or the rest of it) was skipped. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentFault {
    #[error("file does not exist")]
    Missing,

    #[error("document is encrypted")]
    Encrypted,

    #[error("cannot open document: {0}")]
    Open(String),

    #[error("cannot load page {page}: {detail}")]
    Page { page: usize, detail: String },

    #[error("text search failed on page {page}: {detail}")]
    Search { page: usize, detail: String },

    #[error("rendering failed on page {page}: {detail}")]
    Render { page: usize, detail: String },
}

/// Caller contract violations; checked before scanning starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("search text must not be empty")]
    EmptySearchText,

    #[error("no documents given")]
    NoDocuments,
}
