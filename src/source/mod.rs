//! Glyph sources: where positioned glyphs come from.
//!
//! The layout stages never see a PDF library. They consume [`Glyph`]s from a
//! [`GlyphSource`], which also hands out the raw ToUnicode CMap bytes of a
//! font so CIDs can be repaired later.

#[cfg(feature = "pdf")]
mod lopdf_source;
mod text_state;

#[cfg(feature = "pdf")]
pub use lopdf_source::LopdfSource;
pub use text_state::{Matrix, TextState};

use crate::error::{Error, Result};
use crate::fonts::FontCMapCache;
use crate::layout::{FontId, Glyph};
use std::collections::HashMap;

/// A document that yields positioned glyphs per page.
///
/// Implementations must be shareable across the page workers of one
/// document.
pub trait GlyphSource: Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// All glyphs of a page (0-indexed), in top-down user space.
    fn page_glyphs(&self, page: usize) -> Result<Vec<Glyph>>;

    /// Decompressed ToUnicode CMap bytes of a font.
    ///
    /// `Ok(None)` means the font carries no ToUnicode stream; an error means
    /// the font's object graph is malformed.
    fn embedded_font_object(&self, font: &FontId) -> Result<Option<Vec<u8>>>;

    /// The document's CMap cache, when the source fills one while decoding.
    ///
    /// CID repair shares it so each font's CMap is built once per document;
    /// sources returning `None` get a cache owned by the pipeline run.
    fn font_cache(&self) -> Option<&FontCMapCache> {
        None
    }
}

/// A glyph source backed by in-memory pages.
///
/// # Examples
///
/// ```
/// use glossary_extract::geometry::Rect;
/// use glossary_extract::layout::{FontId, Glyph};
/// use glossary_extract::source::{GlyphSource, MemorySource};
///
/// let mut source = MemorySource::new();
/// source.add_page(vec![Glyph::text("No.", Rect::new(10.0, 100.0, 25.0, 110.0), FontId::new("F1"), 10.0)]);
/// assert_eq!(source.page_count(), 1);
/// assert_eq!(source.page_glyphs(0).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<Vec<Glyph>>,
    cmaps: HashMap<FontId, Vec<u8>>,
    failing_pages: HashMap<usize, String>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page and return its index.
    pub fn add_page(&mut self, glyphs: Vec<Glyph>) -> usize {
        self.pages.push(glyphs);
        self.pages.len() - 1
    }

    /// Register the ToUnicode CMap bytes of a font.
    pub fn add_cmap(&mut self, font: impl Into<FontId>, data: Vec<u8>) {
        self.cmaps.insert(font.into(), data);
    }

    /// Make reading a page fail, as a corrupt content stream would.
    pub fn fail_page(&mut self, page: usize, reason: impl Into<String>) {
        self.failing_pages.insert(page, reason.into());
    }
}

impl GlyphSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_glyphs(&self, page: usize) -> Result<Vec<Glyph>> {
        if let Some(reason) = self.failing_pages.get(&page) {
            return Err(Error::Pdf(reason.clone()));
        }
        self.pages.get(page).cloned().ok_or(Error::PageOutOfRange {
            page,
            count: self.pages.len(),
        })
    }

    fn embedded_font_object(&self, font: &FontId) -> Result<Option<Vec<u8>>> {
        Ok(self.cmaps.get(font).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_out_of_range() {
        let source = MemorySource::new();
        assert!(matches!(source.page_glyphs(0), Err(Error::PageOutOfRange { page: 0, count: 0 })));
    }

    #[test]
    fn test_failing_page() {
        let mut source = MemorySource::new();
        source.add_page(Vec::new());
        source.fail_page(0, "corrupt content stream");
        assert!(matches!(source.page_glyphs(0), Err(Error::Pdf(_))));
    }

    #[test]
    fn test_cmap_lookup() {
        let mut source = MemorySource::new();
        source.add_cmap("F1", b"cmap".to_vec());
        assert_eq!(source.embedded_font_object(&FontId::new("F1")).unwrap(), Some(b"cmap".to_vec()));
        assert_eq!(source.embedded_font_object(&FontId::new("F2")).unwrap(), None);
    }
}
