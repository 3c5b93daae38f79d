use std::path::Path;

use paperanim_frame_model::geometry::MatchRectangle;
use paperanim_render_engine::compositor::PageRaster;

use crate::fault::DocumentFault;

/// Opens documents for scanning.
pub trait DocumentBackend {
    type Document: OpenDocument;

    /// Open the document at `path`. The path is known to exist.
    fn open(&self, path: &Path) -> Result<Self::Document, DocumentFault>;

    /// Backend name for logs.
    fn name(&self) -> &str;
}

/// An opened document.
pub trait OpenDocument {
    type Page: DocumentPage;

    /// Whether the document needs a password before its pages can be read.
    fn is_encrypted(&self) -> bool;

    fn page_count(&self) -> Result<usize, DocumentFault>;

    /// Load a page by 0-based index.
    fn load_page(&self, index: usize) -> Result<Self::Page, DocumentFault>;
}

/// A loaded page: searchable and renderable.
pub trait DocumentPage: PageRaster {
    /// Every occurrence of `needle`, in the order the text layer yields them.
    fn search(&self, needle: &str) -> Result<Vec<MatchRectangle>, DocumentFault>;
}

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::{MupdfBackend, MupdfDocument, MupdfPage};
