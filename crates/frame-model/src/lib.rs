//! Paperanim Frame Model
//!
//! Defines the core data contracts shared by the pipeline:
//! - **Geometry:** Page-space rectangles and text-search matches
//! - **Settings:** The validated, immutable render configuration
//! - **Frames:** Fixed-size RGB rasters and their playback-ordered sequence
//! - **Quick command:** The flat `key=value` settings file
//!
//! Page coordinates follow the PDF renderer convention: origin at the
//! top-left of the page, y growing downwards, units in points.

pub mod frame;
pub mod geometry;
pub mod quick_command;
pub mod settings;

pub use frame::*;
pub use geometry::*;
pub use quick_command::*;
pub use settings::*;
