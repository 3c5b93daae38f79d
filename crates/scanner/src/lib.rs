//! Paperanim Document Scanner
//!
//! Searches documents for a text string and composes one frame per
//! occurrence. Document access goes through the [`backend`] traits so the
//! scanner can run over MuPDF (default `pdf` feature) or any other source.
//!
//! ```text
//! paths ──► open ──► pages ──► search ──► compose ──► FrameSequence
//!            │                               │
//!            └── skip (missing, encrypted)   └── skip (degenerate match)
//! ```

pub mod backend;
pub mod fault;
pub mod progress;
pub mod scanner;

pub use fault::{DocumentFault, ScanError};
pub use progress::{MatchLocation, ScanProgress, ScanSummary};
pub use scanner::Scanner;
