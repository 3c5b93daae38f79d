//! Page-space rectangles and search matches.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page coordinates (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRect {
    /// Left edge.
    pub x0: f64,
    /// Top edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Bottom edge.
    pub y1: f64,
}

impl PageRect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a rectangle centered at `(cx, cy)` with the given dimensions.
    /// Unlike a viewport, the result is not clamped to any bounds.
    pub fn centered(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            x0: cx - w / 2.0,
            y0: cy - h / 2.0,
            x1: cx + w / 2.0,
            y1: cy + h / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The center point of this rectangle.
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// A rectangle with no area or with non-finite coordinates.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite());
        !finite || self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Smallest rectangle enclosing both.
    pub fn union(&self, other: &PageRect) -> PageRect {
        PageRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Bounding box of one located occurrence of the search text on a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchRectangle(PageRect);

impl MatchRectangle {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self(PageRect::new(x0, y0, x1, y1))
    }

    /// Bounding box of a quadrilateral given by its four corners.
    pub fn from_corners(corners: [(f64, f64); 4]) -> Self {
        let first = PageRect::new(corners[0].0, corners[0].1, corners[0].0, corners[0].1);
        let rect = corners[1..].iter().fold(first, |acc, &(x, y)| {
            acc.union(&PageRect::new(x, y, x, y))
        });
        Self(rect)
    }

    pub fn rect(&self) -> &PageRect {
        &self.0
    }

    pub fn width(&self) -> f64 {
        self.0.width()
    }

    pub fn height(&self) -> f64 {
        self.0.height()
    }

    pub fn center(&self) -> (f64, f64) {
        self.0.center()
    }
}

impl From<PageRect> for MatchRectangle {
    fn from(rect: PageRect) -> Self {
        Self(rect)
    }
}
