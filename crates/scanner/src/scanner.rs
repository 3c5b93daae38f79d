//! Document scanning: every match in every document becomes one frame.

use std::ops::ControlFlow;
use std::path::Path;

use paperanim_common::cancel::CancellationToken;
use paperanim_frame_model::frame::FrameSequence;
use paperanim_frame_model::settings::RenderConfiguration;
use paperanim_render_engine::compositor::{self, ComposeError};

use crate::backend::{DocumentBackend, DocumentPage, OpenDocument};
use crate::fault::{DocumentFault, ScanError};
use crate::progress::{MatchLocation, ScanProgress, ScanSummary};

/// Walks documents in input order, pages in page order and matches in
/// search order, producing frames in exactly that order.
///
/// Cancellation is checked before every document, page and match. A
/// cancelled scan returns the frames produced so far.
pub struct Scanner<B> {
    backend: B,
    config: RenderConfiguration,
    stop: CancellationToken,
}

enum Sink<'a> {
    Frames(&'a mut FrameSequence),
    Locations(&'a mut Vec<MatchLocation>),
}

#[cfg(feature = "pdf")]
impl Scanner<crate::backend::MupdfBackend> {
    /// Scanner over PDF files.
    pub fn new(config: RenderConfiguration) -> Self {
        Self::with_backend(crate::backend::MupdfBackend::new(), config)
    }
}

impl<B: DocumentBackend> Scanner<B> {
    pub fn with_backend(backend: B, config: RenderConfiguration) -> Self {
        Self {
            backend,
            config,
            stop: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &RenderConfiguration {
        &self.config
    }

    /// Ask a running scan to finish at its next check.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Handle to this scanner's own stop flag, for use from another thread.
    pub fn cancel_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    /// Render one frame per match across `paths`.
    ///
    /// The scan halts when either `cancel` or this scanner's stop flag is
    /// set. Missing, encrypted and unreadable documents are reported
    /// through `on_progress` and skipped.
    pub fn scan<P, F>(
        &self,
        paths: &[P],
        search_text: &str,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<FrameSequence, ScanError>
    where
        P: AsRef<Path>,
        F: FnMut(&ScanProgress),
    {
        self.scan_with_summary(paths, search_text, cancel, on_progress)
            .map(|summary| summary.frames)
    }

    /// [`Scanner::scan`], also returning per-document and per-match counts.
    pub fn scan_with_summary<P, F>(
        &self,
        paths: &[P],
        search_text: &str,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<ScanSummary, ScanError>
    where
        P: AsRef<Path>,
        F: FnMut(&ScanProgress),
    {
        let mut frames = FrameSequence::new();
        let mut summary = self.walk(
            paths,
            search_text,
            cancel,
            &mut Sink::Frames(&mut frames),
            &mut on_progress,
        )?;
        summary.frames = frames;
        Ok(summary)
    }

    /// Find every match without rendering anything.
    pub fn locate<P, F>(
        &self,
        paths: &[P],
        search_text: &str,
        cancel: &CancellationToken,
        mut on_progress: F,
    ) -> Result<Vec<MatchLocation>, ScanError>
    where
        P: AsRef<Path>,
        F: FnMut(&ScanProgress),
    {
        let mut locations = Vec::new();
        self.walk(
            paths,
            search_text,
            cancel,
            &mut Sink::Locations(&mut locations),
            &mut on_progress,
        )?;
        Ok(locations)
    }

    fn walk<P, F>(
        &self,
        paths: &[P],
        search_text: &str,
        cancel: &CancellationToken,
        sink: &mut Sink<'_>,
        on_progress: &mut F,
    ) -> Result<ScanSummary, ScanError>
    where
        P: AsRef<Path>,
        F: FnMut(&ScanProgress),
    {
        if search_text.is_empty() {
            return Err(ScanError::EmptySearchText);
        }
        if paths.is_empty() {
            return Err(ScanError::NoDocuments);
        }

        tracing::info!(
            backend = self.backend.name(),
            documents = paths.len(),
            search_text,
            "Starting scan"
        );

        let mut summary = ScanSummary::default();
        for path in paths {
            if self.is_cancelled(cancel) {
                summary.cancelled = true;
                break;
            }
            let flow = self.scan_document(
                path.as_ref(),
                search_text,
                cancel,
                sink,
                &mut summary,
                on_progress,
            );
            if flow.is_break() {
                summary.cancelled = true;
                break;
            }
        }

        let frames = match sink {
            Sink::Frames(frames) => frames.len(),
            Sink::Locations(locations) => locations.len(),
        };
        let done = if summary.cancelled {
            ScanProgress::Cancelled { frames }
        } else {
            ScanProgress::Finished { frames }
        };
        emit(on_progress, done);
        Ok(summary)
    }

    fn scan_document<F>(
        &self,
        path: &Path,
        search_text: &str,
        cancel: &CancellationToken,
        sink: &mut Sink<'_>,
        summary: &mut ScanSummary,
        on_progress: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(&ScanProgress),
    {
        let mut skip = |reason: DocumentFault, on_progress: &mut F| {
            summary.documents_skipped += 1;
            emit(
                on_progress,
                ScanProgress::Skipped {
                    path: path.to_path_buf(),
                    reason,
                },
            );
            ControlFlow::Continue(())
        };

        if !path.exists() {
            return skip(DocumentFault::Missing, on_progress);
        }
        let document = match self.backend.open(path) {
            Ok(document) => document,
            Err(reason) => return skip(reason, on_progress),
        };
        if document.is_encrypted() {
            return skip(DocumentFault::Encrypted, on_progress);
        }
        let pages = match document.page_count() {
            Ok(pages) => pages,
            Err(reason) => return skip(reason, on_progress),
        };

        summary.documents_scanned += 1;
        emit(
            on_progress,
            ScanProgress::DocumentOpened {
                path: path.to_path_buf(),
                pages,
            },
        );

        for index in 0..pages {
            if self.is_cancelled(cancel) {
                return ControlFlow::Break(());
            }
            let flow = self.scan_page(
                &document,
                path,
                index,
                search_text,
                cancel,
                sink,
                summary,
                on_progress,
            );
            match flow {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => return ControlFlow::Break(()),
                Err(reason) => {
                    summary.documents_failed += 1;
                    emit(
                        on_progress,
                        ScanProgress::DocumentFailed {
                            path: path.to_path_buf(),
                            reason,
                        },
                    );
                    return ControlFlow::Continue(());
                }
            }
        }
        ControlFlow::Continue(())
    }

    #[allow(clippy::too_many_arguments)]
    fn scan_page<F>(
        &self,
        document: &B::Document,
        path: &Path,
        index: usize,
        search_text: &str,
        cancel: &CancellationToken,
        sink: &mut Sink<'_>,
        summary: &mut ScanSummary,
        on_progress: &mut F,
    ) -> Result<ControlFlow<()>, DocumentFault>
    where
        F: FnMut(&ScanProgress),
    {
        let page_number = index + 1;
        let page = document.load_page(index)?;
        let matches = page.search(search_text)?;
        tracing::debug!(
            path = %path.display(),
            page = page_number,
            matches = matches.len(),
            "Searched page"
        );

        for (match_index, matched) in matches.iter().enumerate() {
            if self.is_cancelled(cancel) {
                return Ok(ControlFlow::Break(()));
            }
            summary.matches_found += 1;

            match sink {
                Sink::Locations(locations) => {
                    locations.push(MatchLocation {
                        path: path.to_path_buf(),
                        page: page_number,
                        rect: *matched,
                    });
                    emit(
                        on_progress,
                        ScanProgress::MatchFound {
                            path: path.to_path_buf(),
                            page: page_number,
                            index: match_index,
                        },
                    );
                }
                Sink::Frames(frames) => match compositor::compose(&page, matched, &self.config) {
                    Ok(frame) => {
                        frames.push(frame);
                        emit(
                            on_progress,
                            ScanProgress::MatchRendered {
                                path: path.to_path_buf(),
                                page: page_number,
                                index: match_index,
                            },
                        );
                    }
                    Err(reason @ ComposeError::DegenerateMatch { .. }) => {
                        summary.matches_skipped += 1;
                        emit(
                            on_progress,
                            ScanProgress::MatchSkipped {
                                path: path.to_path_buf(),
                                page: page_number,
                                index: match_index,
                                reason,
                            },
                        );
                    }
                    Err(err) => {
                        return Err(DocumentFault::Render {
                            page: page_number,
                            detail: err.to_string(),
                        });
                    }
                },
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn is_cancelled(&self, cancel: &CancellationToken) -> bool {
        cancel.is_cancelled() || self.stop.is_cancelled()
    }
}

fn emit<F: FnMut(&ScanProgress)>(on_progress: &mut F, event: ScanProgress) {
    event.log();
    on_progress(&event);
}
