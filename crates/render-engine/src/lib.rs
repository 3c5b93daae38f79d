//! Paperanim Render Engine
//!
//! Turns located text matches into finished frames and frame sequences
//! into video files.
//!
//! # Pipeline Architecture
//!
//! ```text
//! page + match rect ──┐
//!                     ├── Crop plan (zoom, aspect, dpi)
//! configuration ──────┘         │
//!                               ├── Rasterize + resize
//!                               │
//!                               ├── Effects
//!                               ▼
//!                             Frame ── ... ──┐
//!                                            ├── Encode (H.264 + AAC)
//! audio cue ─────────────────────────────────┘         │
//!                                                      ▼
//!                                                  output.mp4
//! ```

pub mod compositor;
pub mod export;

pub use compositor::{compose, ComposeError, CropPlan, PageRaster};
pub use export::*;
