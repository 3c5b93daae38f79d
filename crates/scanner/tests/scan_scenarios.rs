use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use paperanim_common::cancel::CancellationToken;
use paperanim_frame_model::frame::FrameSequence;
use paperanim_frame_model::geometry::{MatchRectangle, PageRect};
use paperanim_frame_model::settings::RenderConfiguration;
use paperanim_render_engine::compositor::{ComposeError, PageRaster};
use paperanim_scanner::backend::{DocumentBackend, DocumentPage, OpenDocument};
use paperanim_scanner::{DocumentFault, ScanError, ScanProgress, Scanner};
use tempfile::TempDir;

/// Page content: the matches its text layer yields, in order.
#[derive(Debug, Clone, Default)]
struct PageSpec {
    matches: Vec<MatchRectangle>,
    fail_load: bool,
    fail_raster: bool,
}

#[derive(Debug, Clone, Default)]
struct DocSpec {
    id: u8,
    pages: Vec<PageSpec>,
    encrypted: bool,
}

#[derive(Default)]
struct FakeBackend {
    docs: HashMap<PathBuf, DocSpec>,
}

struct FakeDocument(DocSpec);

struct FakePage {
    doc_id: u8,
    number: usize,
    spec: PageSpec,
}

impl DocumentBackend for FakeBackend {
    type Document = FakeDocument;

    fn open(&self, path: &Path) -> Result<FakeDocument, DocumentFault> {
        self.docs
            .get(path)
            .cloned()
            .map(FakeDocument)
            .ok_or_else(|| DocumentFault::Open("not a PDF".to_string()))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

impl OpenDocument for FakeDocument {
    type Page = FakePage;

    fn is_encrypted(&self) -> bool {
        self.0.encrypted
    }

    fn page_count(&self) -> Result<usize, DocumentFault> {
        Ok(self.0.pages.len())
    }

    fn load_page(&self, index: usize) -> Result<FakePage, DocumentFault> {
        let spec = self.0.pages[index].clone();
        if spec.fail_load {
            return Err(DocumentFault::Page {
                page: index + 1,
                detail: "broken xref".to_string(),
            });
        }
        Ok(FakePage {
            doc_id: self.0.id,
            number: index + 1,
            spec,
        })
    }
}

impl DocumentPage for FakePage {
    fn search(&self, _needle: &str) -> Result<Vec<MatchRectangle>, DocumentFault> {
        Ok(self.spec.matches.clone())
    }
}

impl PageRaster for FakePage {
    /// Solid fill encoding (document, page, clip center x) so frames can be told apart.
    fn rasterize(&self, clip: &PageRect, scale: f64) -> Result<RgbImage, ComposeError> {
        if self.spec.fail_raster {
            return Err(ComposeError::Raster("content stream error".to_string()));
        }
        let w = (clip.width() * scale).round().max(1.0) as u32;
        let h = (clip.height() * scale).round().max(1.0) as u32;
        let (cx, _) = clip.center();
        Ok(RgbImage::from_pixel(
            w,
            h,
            Rgb([self.doc_id, self.number as u8, cx.round() as u8]),
        ))
    }
}

fn word_at(x: f64, y: f64) -> MatchRectangle {
    MatchRectangle::new(x - 20.0, y - 6.0, x + 20.0, y + 6.0)
}

fn page(centers: &[(f64, f64)]) -> PageSpec {
    PageSpec {
        matches: centers.iter().map(|&(x, y)| word_at(x, y)).collect(),
        ..PageSpec::default()
    }
}

/// Backend plus empty files on disk for each document.
struct Fixture {
    dir: TempDir,
    backend: FakeBackend,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            backend: FakeBackend::default(),
        }
    }

    fn add(&mut self, name: &str, spec: DocSpec) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, b"%PDF-1.7").unwrap();
        self.backend.docs.insert(path.clone(), spec);
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn scanner(self) -> (TempDir, Scanner<FakeBackend>) {
        let config = RenderConfiguration::builder()
            .highlight(false)
            .build()
            .unwrap();
        (self.dir, Scanner::with_backend(self.backend, config))
    }
}

fn signature(frames: &FrameSequence) -> Vec<[u8; 3]> {
    frames.iter().map(|f| f.image().get_pixel(0, 0).0).collect()
}

fn messages(events: &[ScanProgress]) -> Vec<String> {
    events.iter().map(ToString::to_string).collect()
}

#[test]
fn frames_follow_document_page_match_order() {
    let mut fx = Fixture::new();
    let a = fx.add(
        "a.pdf",
        DocSpec {
            id: 1,
            pages: vec![page(&[])],
            ..DocSpec::default()
        },
    );
    let b = fx.add(
        "b.pdf",
        DocSpec {
            id: 2,
            pages: vec![page(&[(50.0, 100.0), (150.0, 100.0)]), page(&[(90.0, 300.0)])],
            ..DocSpec::default()
        },
    );
    let (_dir, scanner) = fx.scanner();

    let mut events = Vec::new();
    let frames = scanner
        .scan(&[a, b], "Target", &CancellationToken::new(), |e| {
            events.push(e.clone())
        })
        .unwrap();

    assert_eq!(frames.len(), 3);
    assert_eq!(signature(&frames), vec![[2, 1, 50], [2, 1, 150], [2, 2, 90]]);
    assert!(frames.iter().all(|f| f.dimensions() == (1920, 1080)));

    assert!(events.len() >= 4);
    let rendered: Vec<String> = events
        .iter()
        .filter(|e| matches!(e, ScanProgress::MatchRendered { .. }))
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        rendered,
        vec![
            "Processed match in b.pdf (Page 1)",
            "Processed match in b.pdf (Page 1)",
            "Processed match in b.pdf (Page 2)",
        ]
    );
    assert_eq!(events.last(), Some(&ScanProgress::Finished { frames: 3 }));
}

#[test]
fn unreadable_documents_are_skipped() {
    let mut fx = Fixture::new();
    let locked = fx.add(
        "locked.pdf",
        DocSpec {
            id: 1,
            pages: vec![page(&[(50.0, 50.0)])],
            encrypted: true,
        },
    );
    let good = fx.add(
        "good.pdf",
        DocSpec {
            id: 2,
            pages: vec![page(&[(50.0, 50.0)])],
            ..DocSpec::default()
        },
    );
    let missing = fx.path("missing.pdf");
    let unknown = fx.path("notes.pdf");
    std::fs::write(&unknown, b"plain text").unwrap();
    let (_dir, scanner) = fx.scanner();

    let mut events = Vec::new();
    let summary = scanner
        .scan_with_summary(
            &[missing, locked, unknown, good],
            "Target",
            &CancellationToken::new(),
            |e| events.push(e.clone()),
        )
        .unwrap();

    assert_eq!(summary.frames.len(), 1);
    assert_eq!(summary.documents_skipped, 3);
    assert_eq!(summary.documents_scanned, 1);
    let msgs = messages(&events);
    assert_eq!(msgs[0], "Skipping missing file: missing.pdf");
    assert_eq!(msgs[1], "Skipping encrypted file: locked.pdf");
    assert_eq!(msgs[2], "PDF error in notes.pdf: cannot open document: not a PDF");
    assert!(msgs.contains(&"Processed match in good.pdf (Page 1)".to_string()));
}

#[test]
fn no_matches_is_empty_not_error() {
    let mut fx = Fixture::new();
    let a = fx.add(
        "a.pdf",
        DocSpec {
            id: 1,
            pages: vec![page(&[]), page(&[])],
            ..DocSpec::default()
        },
    );
    let (_dir, scanner) = fx.scanner();

    let mut last = None;
    let summary = scanner
        .scan_with_summary(&[a], "Target", &CancellationToken::new(), |e| {
            last = Some(e.to_string())
        })
        .unwrap();

    assert!(summary.frames.is_empty());
    assert!(summary.is_no_match());
    assert_eq!(last.as_deref(), Some("No matches found."));
}

#[test]
fn preconditions_fail_fast() {
    let mut fx = Fixture::new();
    let a = fx.add("a.pdf", DocSpec::default());
    let (_dir, scanner) = fx.scanner();
    let cancel = CancellationToken::new();

    let mut calls = 0;
    let err = scanner.scan(&[a], "", &cancel, |_| calls += 1).unwrap_err();
    assert_eq!(err, ScanError::EmptySearchText);

    let none: [PathBuf; 0] = [];
    let err = scanner.scan(&none, "Target", &cancel, |_| calls += 1).unwrap_err();
    assert_eq!(err, ScanError::NoDocuments);
    assert_eq!(calls, 0);
}

#[test]
fn cancel_truncates_between_matches() {
    let mut fx = Fixture::new();
    let a = fx.add(
        "a.pdf",
        DocSpec {
            id: 1,
            pages: vec![
                page(&[(40.0, 40.0), (80.0, 40.0), (120.0, 40.0)]),
                page(&[(40.0, 40.0)]),
            ],
            ..DocSpec::default()
        },
    );
    let b = fx.add(
        "b.pdf",
        DocSpec {
            id: 2,
            pages: vec![page(&[(40.0, 40.0)])],
            ..DocSpec::default()
        },
    );
    let (_dir, scanner) = fx.scanner();
    let cancel = CancellationToken::new();

    let mut events = Vec::new();
    let summary = scanner
        .scan_with_summary(&[a, b], "Target", &cancel, |e| {
            if matches!(e, ScanProgress::MatchRendered { index: 1, .. }) {
                cancel.cancel();
            }
            events.push(e.clone());
        })
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(signature(&summary.frames), vec![[1, 1, 40], [1, 1, 80]]);
    assert_eq!(events.last(), Some(&ScanProgress::Cancelled { frames: 2 }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ScanProgress::DocumentOpened { path, .. } if path.ends_with("b.pdf"))));
}

#[test]
fn scanner_stop_flag() {
    let mut fx = Fixture::new();
    let a = fx.add(
        "a.pdf",
        DocSpec {
            id: 1,
            pages: vec![page(&[(40.0, 40.0)])],
            ..DocSpec::default()
        },
    );
    let (_dir, scanner) = fx.scanner();

    scanner.stop();
    assert!(scanner.cancel_token().is_cancelled());
    let frames = scanner
        .scan(&[a], "Target", &CancellationToken::new(), |_| {})
        .unwrap();
    assert!(frames.is_empty());
}

#[test]
fn degenerate_match_skipped_scan_continues() {
    let mut fx = Fixture::new();
    let mut spec = page(&[(60.0, 60.0)]);
    spec.matches.insert(0, MatchRectangle::new(10.0, 10.0, 10.0, 22.0));
    let a = fx.add(
        "a.pdf",
        DocSpec {
            id: 1,
            pages: vec![spec],
            ..DocSpec::default()
        },
    );
    let (_dir, scanner) = fx.scanner();

    let mut events = Vec::new();
    let summary = scanner
        .scan_with_summary(&[a], "Target", &CancellationToken::new(), |e| {
            events.push(e.clone())
        })
        .unwrap();

    assert_eq!(summary.frames.len(), 1);
    assert_eq!(summary.matches_found, 2);
    assert_eq!(summary.matches_skipped, 1);
    assert!(events.iter().any(|e| matches!(
        e,
        ScanProgress::MatchSkipped {
            index: 0,
            reason: ComposeError::DegenerateMatch { .. },
            ..
        }
    )));
}

#[test]
fn page_failure_keeps_earlier_frames() {
    let mut fx = Fixture::new();
    let a = fx.add(
        "a.pdf",
        DocSpec {
            id: 1,
            pages: vec![
                page(&[(40.0, 40.0)]),
                PageSpec {
                    fail_load: true,
                    ..PageSpec::default()
                },
                page(&[(40.0, 40.0)]),
            ],
            ..DocSpec::default()
        },
    );
    let b = fx.add(
        "b.pdf",
        DocSpec {
            id: 2,
            pages: vec![PageSpec {
                fail_raster: true,
                ..page(&[(40.0, 40.0)])
            }],
            ..DocSpec::default()
        },
    );
    let c = fx.add(
        "c.pdf",
        DocSpec {
            id: 3,
            pages: vec![page(&[(40.0, 40.0)])],
            ..DocSpec::default()
        },
    );
    let (_dir, scanner) = fx.scanner();

    let mut events = Vec::new();
    let summary = scanner
        .scan_with_summary(&[a, b, c], "Target", &CancellationToken::new(), |e| {
            events.push(e.clone())
        })
        .unwrap();

    assert_eq!(signature(&summary.frames), vec![[1, 1, 40], [3, 1, 40]]);
    assert_eq!(summary.documents_failed, 2);
    let msgs = messages(&events);
    assert!(msgs.contains(&"PDF error in a.pdf: cannot load page 2: broken xref".to_string()));
    assert!(msgs
        .iter()
        .any(|m| m.starts_with("PDF error in b.pdf: rendering failed on page 1")));
}

#[test]
fn locate_reports_pages_one_based() {
    let mut fx = Fixture::new();
    let a = fx.add(
        "a.pdf",
        DocSpec {
            id: 1,
            pages: vec![page(&[]), page(&[(100.0, 200.0)])],
            ..DocSpec::default()
        },
    );
    let (_dir, scanner) = fx.scanner();

    let mut found = Vec::new();
    let locations = scanner
        .locate(&[a.clone()], "Target", &CancellationToken::new(), |e| {
            if matches!(e, ScanProgress::MatchFound { .. }) {
                found.push(e.to_string());
            }
        })
        .unwrap();

    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].path, a);
    assert_eq!(locations[0].page, 2);
    assert_eq!(locations[0].rect, word_at(100.0, 200.0));
    assert_eq!(found, vec!["Found match in a.pdf (Page 2)"]);

    let json = serde_json::to_value(&locations[0]).unwrap();
    assert_eq!(json["page"], 2);
    assert_eq!(json["rect"]["x0"], 80.0);
}
