//! Positioned glyphs and the text lines built from them.
//!
//! A [`Glyph`] is the atomic unit every glyph source produces: either text the
//! PDF library could map to Unicode, or an opaque font-local CID that only the
//! font's ToUnicode CMap can explain.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a font resource within one document.
///
/// For PDF sources this is the object reference of the font dictionary
/// (e.g. `"12 0 R"`); for inline font dictionaries it is the page-scoped
/// resource name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FontId(pub String);

impl FontId {
    /// Create a font identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FontId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Render the explicit marker used for a CID that has no Unicode mapping.
///
/// The marker matches the placeholder PDF libraries emit, so text that passes
/// through several tools keeps one recognizable form.
///
/// # Examples
///
/// ```
/// use glossary_extract::layout::cid_marker;
///
/// assert_eq!(cid_marker(545), "(cid:545)");
/// ```
pub fn cid_marker(cid: u32) -> String {
    format!("(cid:{})", cid)
}

/// The content of a glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlyphCode {
    /// Resolved Unicode text (may be several scalars for ligatures)
    Text(String),
    /// Font-local character identifier without a known Unicode mapping
    Cid(u32),
}

impl GlyphCode {
    /// Interpret a string produced by a PDF library.
    ///
    /// Libraries that cannot map a glyph emit the literal placeholder
    /// `(cid:N)`; that exact form becomes [`GlyphCode::Cid`], anything else is
    /// kept as text.
    ///
    /// # Examples
    ///
    /// ```
    /// use glossary_extract::layout::GlyphCode;
    ///
    /// assert_eq!(GlyphCode::parse("(cid:545)"), GlyphCode::Cid(545));
    /// assert_eq!(GlyphCode::parse("A"), GlyphCode::Text("A".to_string()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        raw.strip_prefix("(cid:")
            .and_then(|rest| rest.strip_suffix(')'))
            .and_then(|digits| digits.parse::<u32>().ok())
            .map(GlyphCode::Cid)
            .unwrap_or_else(|| GlyphCode::Text(raw.to_string()))
    }

    /// Append this code's textual form to `out`.
    pub fn render_into(&self, out: &mut String) {
        match self {
            GlyphCode::Text(text) => out.push_str(text),
            GlyphCode::Cid(cid) => out.push_str(&cid_marker(*cid)),
        }
    }
}

/// One positioned rendered symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Resolved text or opaque CID
    pub code: GlyphCode,
    /// Bounding box in top-down user space
    pub bbox: Rect,
    /// Originating font
    pub font: FontId,
    /// Font size in user-space units
    pub size: f32,
}

impl Glyph {
    /// Create a glyph with resolved text.
    pub fn text(text: impl Into<String>, bbox: Rect, font: FontId, size: f32) -> Self {
        Self {
            code: GlyphCode::Text(text.into()),
            bbox,
            font,
            size,
        }
    }

    /// Create a glyph carrying an unresolved CID.
    pub fn cid(cid: u32, bbox: Rect, font: FontId, size: f32) -> Self {
        Self {
            code: GlyphCode::Cid(cid),
            bbox,
            font,
            size,
        }
    }

    /// Left edge of the glyph.
    pub fn x0(&self) -> f32 {
        self.bbox.x0
    }

    /// Top edge of the glyph.
    pub fn y0(&self) -> f32 {
        self.bbox.y0
    }
}

/// Glyphs sharing an inferred baseline, sorted by `x0` ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Reference y of the line (the `y0` that opened it)
    pub y: f32,
    /// Glyphs in left-to-right order
    pub glyphs: Vec<Glyph>,
}

impl TextLine {
    /// Text of the whole line with CID markers for unresolved glyphs.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for glyph in &self.glyphs {
            glyph.code.render_into(&mut out);
        }
        out
    }

    /// Number of glyphs in the line.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the line holds no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}
