//! Row clustering: grouping glyphs into text lines.
//!
//! Glossary pages are ruled only by whitespace, so rows are recovered from
//! glyph positions alone. A single sorted pass assigns each glyph to the line
//! that is open when it is visited.

use crate::geometry::cmp_f32;
use crate::layout::glyph::{Glyph, TextLine};

/// Default vertical tolerance (user-space units) for glyphs sharing a line.
pub const DEFAULT_ROW_TOLERANCE: f32 = 5.0;

/// Cluster the glyphs of one page into text lines.
///
/// Glyphs are sorted by `(y0, x0)`. Walking that order, a glyph joins the
/// current line when `|y0 - reference_y| <= row_tolerance`, otherwise it opens
/// a new line and becomes its reference. There is no backtracking: a glyph
/// vertically between two lines goes to whichever line is open, and ties
/// extend the current line. Every input glyph ends up in exactly one line;
/// glyphs within a line are sorted by `x0`.
///
/// # Arguments
///
/// * `glyphs` - All glyphs of one page
/// * `row_tolerance` - Maximum distance from the line's reference y
///
/// # Examples
///
/// ```
/// use glossary_extract::geometry::Rect;
/// use glossary_extract::layout::{cluster_into_lines, FontId, Glyph};
///
/// let font = FontId::new("F1");
/// let glyphs = vec![
///     Glyph::text("b", Rect::new(20.0, 101.0, 25.0, 111.0), font.clone(), 10.0),
///     Glyph::text("a", Rect::new(10.0, 100.0, 15.0, 110.0), font.clone(), 10.0),
///     Glyph::text("c", Rect::new(10.0, 200.0, 15.0, 210.0), font, 10.0),
/// ];
///
/// let lines = cluster_into_lines(glyphs, 5.0);
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[0].text(), "ab");
/// ```
pub fn cluster_into_lines(mut glyphs: Vec<Glyph>, row_tolerance: f32) -> Vec<TextLine> {
    if glyphs.is_empty() {
        return Vec::new();
    }

    glyphs.sort_by(|a, b| cmp_f32(a.y0(), b.y0()).then_with(|| cmp_f32(a.x0(), b.x0())));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<Glyph> = Vec::new();
    let mut reference_y = f32::NAN;

    for glyph in glyphs {
        let y = glyph.y0();
        // NaN never compares within tolerance: such a glyph opens its own line
        if !current.is_empty() && (y - reference_y).abs() <= row_tolerance {
            current.push(glyph);
        } else {
            if !current.is_empty() {
                lines.push(finish_line(reference_y, std::mem::take(&mut current)));
            }
            reference_y = y;
            current.push(glyph);
        }
    }

    if !current.is_empty() {
        lines.push(finish_line(reference_y, current));
    }

    log::trace!("Clustered glyphs into {} lines (tolerance {:.1})", lines.len(), row_tolerance);
    lines
}

fn finish_line(y: f32, mut glyphs: Vec<Glyph>) -> TextLine {
    glyphs.sort_by(|a, b| cmp_f32(a.x0(), b.x0()));
    TextLine { y, glyphs }
}
