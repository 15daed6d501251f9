//! Geometric primitives for layout analysis.
//!
//! Coordinates are PDF user-space units with the y axis pointing down the
//! page (top of page = 0), the convention every glyph source in this crate
//! normalizes to before handing glyphs to the layout stages.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An axis-aligned rectangle given by its corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl Rect {
    /// Create a rectangle from its corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use glossary_extract::geometry::Rect;
    ///
    /// let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.width(), 100.0);
    /// assert_eq!(rect.height(), 50.0);
    /// ```
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a rectangle from position and dimensions.
    pub fn from_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }

    /// Compute the union of this rectangle with another.
    ///
    /// # Examples
    ///
    /// ```
    /// use glossary_extract::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
    /// let r2 = Rect::new(25.0, 25.0, 75.0, 75.0);
    /// let union = r1.union(&r2);
    ///
    /// assert_eq!(union, Rect::new(0.0, 0.0, 75.0, 75.0));
    /// ```
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }
}

/// Total order on `f32` that sorts NaN after every number.
///
/// Layout stages sort by coordinates coming straight out of content streams;
/// a malformed operand must not be able to panic a sort.
pub fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        _ => Ordering::Less,
    })
}

/// Median of a set of values, ignoring non-finite entries.
///
/// Returns `None` when no finite value is present.
pub fn median(values: impl IntoIterator<Item = f32>) -> Option<f32> {
    let mut finite: Vec<f32> = values.into_iter().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(|a, b| cmp_f32(*a, *b));
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        Some((finite[mid - 1] + finite[mid]) / 2.0)
    } else {
        Some(finite[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_creation() {
        let r = Rect::new(5.0, 10.0, 105.0, 60.0);
        assert_eq!(r.x0, 5.0);
        assert_eq!(r.y0, 10.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 50.0);
    }

    #[test]
    fn test_rect_from_size() {
        let r = Rect::from_size(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r, Rect::new(10.0, 20.0, 110.0, 70.0));
    }

    #[test]
    fn test_rect_union() {
        let r1 = Rect::new(0.0, 0.0, 50.0, 50.0);
        let r2 = Rect::new(25.0, 25.0, 75.0, 75.0);
        assert_eq!(r1.union(&r2), Rect::new(0.0, 0.0, 75.0, 75.0));
    }

    #[test]
    fn test_rect_is_finite() {
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_finite());
        assert!(!Rect::new(f32::NAN, 0.0, 1.0, 1.0).is_finite());
        assert!(!Rect::new(0.0, 0.0, f32::INFINITY, 1.0).is_finite());
    }

    #[test]
    fn test_cmp_f32_nan_last() {
        let mut values = vec![3.0, f32::NAN, 1.0, 2.0];
        values.sort_by(|a, b| cmp_f32(*a, *b));
        assert_eq!(&values[..3], &[1.0, 2.0, 3.0]);
        assert!(values[3].is_nan());
    }

    #[test]
    fn test_median_odd_even() {
        assert_eq!(median([3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median([4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median([f32::NAN, 10.0]), Some(10.0));
        assert_eq!(median(Vec::<f32>::new()), None);
    }
}
