//! Column boundary detection from the horizontal glyph distribution.
//!
//! Glossary tables have no ruling lines, so columns are inferred from
//! whitespace: wherever the sorted distinct `x0` positions jump by more than a
//! gap threshold, a column boundary is placed in the middle of the jump.
//!
//! This is a heuristic. Narrow columns below the threshold merge, sparse pages
//! over-split; the extraction strategy selector compensates by trying several
//! thresholds and modes.

use crate::error::{Error, Result};
use crate::geometry::cmp_f32;
use crate::layout::glyph::Glyph;
use serde::{Deserialize, Serialize};

/// Default minimum horizontal gap (user-space units) that separates columns.
pub const DEFAULT_COLUMN_GAP: f32 = 30.0;

/// Boundaries used when gap analysis finds nothing.
///
/// Tuned on the observed layout of the glossary documents (landscape pages,
/// seven content columns).
pub const FALLBACK_BOUNDARIES: [f32; 6] = [250.0, 400.0, 550.0, 700.0, 850.0, 1000.0];

/// How column boundaries are obtained for an extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryMode {
    /// Gap analysis over the glyphs of the page itself
    #[default]
    PageGap,
    /// Gap analysis over the pooled glyphs of every page in the document
    DocumentGap,
    /// The fixed fallback boundaries, no analysis
    Fixed,
}

/// Strictly increasing x-coordinates partitioning a page into bins.
///
/// N boundaries define N+1 bins. Bin 0 holds everything left of the first
/// boundary; bin `i` holds `boundary[i-1] <= x < boundary[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnBoundarySet {
    boundaries: Vec<f32>,
}

impl ColumnBoundarySet {
    /// Create a boundary set, rejecting non-finite or non-increasing input.
    ///
    /// # Examples
    ///
    /// ```
    /// use glossary_extract::layout::ColumnBoundarySet;
    ///
    /// let set = ColumnBoundarySet::new(vec![50.0, 100.0]).unwrap();
    /// assert_eq!(set.bin_count(), 3);
    /// assert!(ColumnBoundarySet::new(vec![100.0, 50.0]).is_err());
    /// ```
    pub fn new(boundaries: Vec<f32>) -> Result<Self> {
        if let Some(bad) = boundaries.iter().find(|b| !b.is_finite()) {
            return Err(Error::InvalidBoundaries(format!("non-finite boundary {}", bad)));
        }
        if let Some(pair) = boundaries.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidBoundaries(format!(
                "boundaries not strictly increasing: {} >= {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { boundaries })
    }

    /// The fixed fallback boundary set.
    pub fn fallback() -> Self {
        Self {
            boundaries: FALLBACK_BOUNDARIES.to_vec(),
        }
    }

    /// The boundary x-coordinates.
    pub fn boundaries(&self) -> &[f32] {
        &self.boundaries
    }

    /// Number of bins (`boundaries + 1`).
    pub fn bin_count(&self) -> usize {
        self.boundaries.len() + 1
    }

    /// Bin index for an x-coordinate.
    ///
    /// A NaN coordinate lands in bin 0.
    pub fn bin_for(&self, x: f32) -> usize {
        self.boundaries.partition_point(|b| *b <= x)
    }
}

/// Outcome of boundary detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedBoundaries {
    /// The boundary set to use
    pub set: ColumnBoundarySet,
    /// True when gap analysis found nothing and the fallback was used
    pub used_fallback: bool,
}

/// Detect column boundaries from the glyph `x0` distribution.
///
/// Distinct finite `x0` values are sorted; every consecutive gap strictly
/// larger than `gap_threshold` yields a boundary at the gap midpoint. When no
/// gap qualifies (a dense or degenerate layout), the fixed fallback set is
/// returned and flagged.
///
/// # Examples
///
/// ```
/// use glossary_extract::geometry::Rect;
/// use glossary_extract::layout::{detect_boundaries, FontId, Glyph};
///
/// let font = FontId::new("F1");
/// let glyphs: Vec<Glyph> = [10.0, 60.0, 150.0]
///     .iter()
///     .map(|&x| Glyph::text("x", Rect::new(x, 0.0, x + 5.0, 10.0), font.clone(), 10.0))
///     .collect();
///
/// let detected = detect_boundaries(&glyphs, 30.0);
/// assert_eq!(detected.set.boundaries(), &[35.0, 105.0]);
/// assert!(!detected.used_fallback);
/// ```
pub fn detect_boundaries(glyphs: &[Glyph], gap_threshold: f32) -> DetectedBoundaries {
    detect_boundaries_from_x(glyphs.iter().map(|g| g.x0()), gap_threshold)
}

/// Detect column boundaries from raw `x0` values.
///
/// Used directly by document-level detection, which pools positions across
/// pages without cloning glyphs.
pub fn detect_boundaries_from_x(
    xs: impl IntoIterator<Item = f32>,
    gap_threshold: f32,
) -> DetectedBoundaries {
    let mut xs: Vec<f32> = xs.into_iter().filter(|x| x.is_finite()).collect();
    xs.sort_by(|a, b| cmp_f32(*a, *b));
    xs.dedup();

    let boundaries: Vec<f32> = xs
        .windows(2)
        .filter(|w| w[1] - w[0] > gap_threshold)
        .map(|w| (w[0] + w[1]) / 2.0)
        .collect();

    if boundaries.is_empty() {
        log::debug!(
            "No column gap above {:.1} among {} distinct x positions; using fallback boundaries",
            gap_threshold,
            xs.len()
        );
        return DetectedBoundaries {
            set: ColumnBoundarySet::fallback(),
            used_fallback: true,
        };
    }

    match ColumnBoundarySet::new(boundaries) {
        Ok(set) => DetectedBoundaries {
            set,
            used_fallback: false,
        },
        Err(e) => {
            log::warn!("Discarding detected boundaries: {}", e);
            DetectedBoundaries {
                set: ColumnBoundarySet::fallback(),
                used_fallback: true,
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::glyph::FontId;

    fn glyphs_at(xs: &[f32]) -> Vec<Glyph> {
        xs.iter()
            .map(|&x| Glyph::text("x", Rect::new(x, 0.0, x + 5.0, 10.0), FontId::new("F1"), 10.0))
            .collect()
    }

    #[test]
    fn test_gap_midpoints() {
        let detected = detect_boundaries(&glyphs_at(&[10.0, 60.0, 150.0]), 30.0);
        assert_eq!(detected.set.boundaries(), &[35.0, 105.0]);
        assert!(!detected.used_fallback);
    }

    #[test]
    fn test_gap_equal_to_threshold_is_not_a_boundary() {
        let detected = detect_boundaries(&glyphs_at(&[10.0, 40.0]), 30.0);
        assert!(detected.used_fallback);
    }

    #[test]
    fn test_dense_layout_falls_back() {
        let xs: Vec<f32> = (0..50).map(|i| i as f32 * 6.0).collect();
        let detected = detect_boundaries(&glyphs_at(&xs), 30.0);
        assert!(detected.used_fallback);
        assert_eq!(detected.set.boundaries(), &FALLBACK_BOUNDARIES);
    }

    #[test]
    fn test_empty_input_falls_back() {
        let detected = detect_boundaries(&[], 30.0);
        assert!(detected.used_fallback);
    }

    #[test]
    fn test_duplicate_positions_collapse() {
        let detected = detect_boundaries(&glyphs_at(&[10.0, 10.0, 10.0, 100.0, 100.0]), 30.0);
        assert_eq!(detected.set.boundaries(), &[55.0]);
    }

    #[test]
    fn test_non_finite_positions_ignored() {
        let detected = detect_boundaries(&glyphs_at(&[10.0, f32::NAN, 100.0, f32::INFINITY]), 30.0);
        assert_eq!(detected.set.boundaries(), &[55.0]);
    }

    #[test]
    fn test_bin_for() {
        let set = ColumnBoundarySet::new(vec![50.0, 100.0]).unwrap();
        assert_eq!(set.bin_for(0.0), 0);
        assert_eq!(set.bin_for(49.9), 0);
        assert_eq!(set.bin_for(50.0), 1);
        assert_eq!(set.bin_for(99.9), 1);
        assert_eq!(set.bin_for(100.0), 2);
        assert_eq!(set.bin_for(1e6), 2);
        assert_eq!(set.bin_for(f32::NAN), 0);
    }

    #[test]
    fn test_new_rejects_bad_input() {
        assert!(ColumnBoundarySet::new(vec![10.0, 10.0]).is_err());
        assert!(ColumnBoundarySet::new(vec![f32::NAN]).is_err());
        assert!(ColumnBoundarySet::new(vec![]).is_ok());
    }

    #[test]
    fn test_boundary_mode_serde_names() {
        let mode: BoundaryMode = serde_json::from_str("\"document_gap\"").unwrap();
        assert_eq!(mode, BoundaryMode::DocumentGap);
    }
}
