//! Scan progress events and results.

use std::fmt;
use std::path::{Path, PathBuf};

use paperanim_frame_model::frame::FrameSequence;
use paperanim_frame_model::geometry::MatchRectangle;
use paperanim_render_engine::compositor::ComposeError;
use serde::Serialize;

use crate::fault::DocumentFault;

/// One progress notification. `Display` gives the user-facing message.
///
/// Page numbers are 1-based; match indices are 0-based within their page.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanProgress {
    /// The document was not read at all.
    Skipped { path: PathBuf, reason: DocumentFault },
    /// Reading stopped partway through; frames from earlier pages are kept.
    DocumentFailed { path: PathBuf, reason: DocumentFault },
    DocumentOpened { path: PathBuf, pages: usize },
    MatchFound { path: PathBuf, page: usize, index: usize },
    MatchRendered { path: PathBuf, page: usize, index: usize },
    MatchSkipped {
        path: PathBuf,
        page: usize,
        index: usize,
        reason: ComposeError,
    },
    Cancelled { frames: usize },
    Finished { frames: usize },
}

impl ScanProgress {
    pub(crate) fn log(&self) {
        match self {
            Self::Skipped { path, reason } | Self::DocumentFailed { path, reason } => {
                tracing::warn!(path = %path.display(), reason = %reason, "{}", self);
            }
            Self::MatchSkipped { path, page, reason, .. } => {
                tracing::warn!(path = %path.display(), page, reason = %reason, "{}", self);
            }
            Self::DocumentOpened { path, pages } => {
                tracing::info!(path = %path.display(), pages, "{}", self);
            }
            Self::MatchFound { path, page, index } | Self::MatchRendered { path, page, index } => {
                tracing::info!(path = %path.display(), page, index, "{}", self);
            }
            Self::Cancelled { frames } | Self::Finished { frames } => {
                tracing::info!(frames, "{}", self);
            }
        }
    }
}

impl fmt::Display for ScanProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped {
                path,
                reason: DocumentFault::Missing,
            } => write!(f, "Skipping missing file: {}", file_name(path)),
            Self::Skipped {
                path,
                reason: DocumentFault::Encrypted,
            } => write!(f, "Skipping encrypted file: {}", file_name(path)),
            Self::Skipped { path, reason } | Self::DocumentFailed { path, reason } => {
                write!(f, "PDF error in {}: {reason}", file_name(path))
            }
            Self::DocumentOpened { path, pages } => {
                write!(f, "Scanning {} ({pages} pages)", file_name(path))
            }
            Self::MatchFound { path, page, .. } => {
                write!(f, "Found match in {} (Page {page})", file_name(path))
            }
            Self::MatchRendered { path, page, .. } => {
                write!(f, "Processed match in {} (Page {page})", file_name(path))
            }
            Self::MatchSkipped {
                path, page, reason, ..
            } => write!(
                f,
                "Skipped match in {} (Page {page}): {reason}",
                file_name(path)
            ),
            Self::Cancelled { frames } => write!(f, "Processing stopped after {frames} frames"),
            Self::Finished { frames: 0 } => f.write_str("No matches found."),
            Self::Finished { frames } => write!(f, "Finished: {frames} frames"),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A located match, without a rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchLocation {
    pub path: PathBuf,
    /// 1-based page number.
    pub page: usize,
    pub rect: MatchRectangle,
}

/// Frames plus what happened while producing them.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub frames: FrameSequence,
    /// Documents that were opened, including ones that failed partway.
    pub documents_scanned: usize,
    /// Documents skipped before any page was read.
    pub documents_skipped: usize,
    /// Opened documents abandoned after a page failure.
    pub documents_failed: usize,
    /// Matches found by text search, rendered or not.
    pub matches_found: usize,
    /// Matches with no usable geometry.
    pub matches_skipped: usize,
    pub cancelled: bool,
}

impl ScanSummary {
    /// True when documents were read but nothing matched.
    pub fn is_no_match(&self) -> bool {
        self.matches_found == 0 && self.documents_scanned > 0 && !self.cancelled
    }
}
