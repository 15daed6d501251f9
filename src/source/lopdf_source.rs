//! Glyph source over `lopdf` documents.
//!
//! Interprets the text operators of each page's content stream and places
//! every shown glyph with its font's advance widths. Codes are decoded through
//! the font's ToUnicode CMap when one exists; composite-font codes the CMap
//! does not cover are emitted as opaque CIDs.

use super::text_state::{Matrix, TextState};
use super::GlyphSource;
use crate::error::{Error, Result};
use crate::fonts::{FontCMap, FontCMapCache, FontEntry};
use crate::layout::{FontId, Glyph, GlyphCode};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Parent chain depth limit when looking up inherited page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Advance width used when a font gives none.
const DEFAULT_SIMPLE_WIDTH: f32 = 500.0;

/// CID font default width (`/DW` default).
const DEFAULT_CID_WIDTH: f32 = 1000.0;

/// Largest number of CIDs one `/W` entry may cover.
const MAX_WIDTH_SPAN: u32 = 0x1_0000;

/// Glyph source reading a PDF with `lopdf`.
pub struct LopdfSource {
    doc: Document,
    pages: Vec<ObjectId>,
    cmaps: FontCMapCache,
}

impl LopdfSource {
    /// Open a PDF file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let doc = Document::load(path).map_err(|e| Error::SourceOpen {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Parse a PDF held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| Error::SourceOpen {
            path: "<memory>".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self {
            doc,
            pages,
            cmaps: FontCMapCache::new(),
        }
    }

    fn page_dict(&self, page: usize) -> Result<(ObjectId, &Dictionary)> {
        let id = *self.pages.get(page).ok_or(Error::PageOutOfRange {
            page,
            count: self.pages.len(),
        })?;
        Ok((id, self.doc.get_object(id)?.as_dict()?))
    }

    /// Resolve a page attribute that may be inherited from the page tree.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut dict = page;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(obj) = dict.get(key) {
                return deref(&self.doc, obj).ok();
            }
            let parent = dict.get(b"Parent").ok()?;
            dict = deref(&self.doc, parent).ok()?.as_dict().ok()?;
        }
        None
    }

    fn page_top(&self, page: &Dictionary) -> f32 {
        self.inherited(page, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| {
                let values: Vec<f32> = arr.iter().filter_map(|o| number(&self.doc, o)).collect();
                (values.len() == 4).then(|| values[1].max(values[3]))
            })
            .unwrap_or(792.0)
    }

    fn page_fonts(&self, page: usize, dict: &Dictionary) -> HashMap<Vec<u8>, PageFont> {
        let mut fonts = HashMap::new();
        let Some(font_dict) = self
            .inherited(dict, b"Resources")
            .and_then(|r| r.as_dict().ok())
            .and_then(|r| r.get(b"Font").ok())
            .and_then(|f| deref(&self.doc, f).ok())
            .and_then(|f| f.as_dict().ok())
        else {
            return fonts;
        };

        for (name, obj) in font_dict.iter() {
            let id = match obj {
                Object::Reference(r) => FontId::new(format!("{} {} R", r.0, r.1)),
                _ => FontId::new(format!("p{}/{}", page, String::from_utf8_lossy(name))),
            };
            let Some(font) = deref(&self.doc, obj).ok().and_then(|o| o.as_dict().ok()) else {
                log::warn!("Font resource /{} on page {} is not a dictionary", String::from_utf8_lossy(name), page);
                continue;
            };
            fonts.insert(name.clone(), self.describe_font(id, font));
        }
        fonts
    }

    fn describe_font(&self, id: FontId, font: &Dictionary) -> PageFont {
        let composite = matches!(font.get(b"Subtype").and_then(Object::as_name), Ok(b"Type0"));
        let widths = if composite {
            self.cid_widths(font)
        } else {
            self.simple_widths(font)
        };
        let cmap = if font.has(b"ToUnicode") {
            match self.cmaps.load(self, &id) {
                FontEntry::Repairable(cmap) => Some(cmap),
                FontEntry::Unrepairable { .. } => None,
            }
        } else {
            None
        };
        PageFont {
            id,
            composite,
            widths,
            cmap,
        }
    }

    fn simple_widths(&self, font: &Dictionary) -> Widths {
        let first = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| number(&self.doc, o))
            .unwrap_or(0.0) as u32;
        let widths = font
            .get(b"Widths")
            .ok()
            .and_then(|o| deref(&self.doc, o).ok())
            .and_then(|o| o.as_array().ok())
            .map(|arr| arr.iter().map(|o| number(&self.doc, o).unwrap_or(0.0)).collect())
            .unwrap_or_default();
        let missing = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| deref(&self.doc, o).ok())
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(|o| number(&self.doc, o))
            .unwrap_or(DEFAULT_SIMPLE_WIDTH);
        Widths::Simple {
            first,
            widths,
            missing,
        }
    }

    fn cid_widths(&self, font: &Dictionary) -> Widths {
        let descendant = font
            .get(b"DescendantFonts")
            .ok()
            .and_then(|o| deref(&self.doc, o).ok())
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| arr.first())
            .and_then(|o| deref(&self.doc, o).ok())
            .and_then(|o| o.as_dict().ok());

        let Some(descendant) = descendant else {
            return Widths::Cid {
                map: HashMap::new(),
                default: DEFAULT_CID_WIDTH,
            };
        };

        let default = descendant
            .get(b"DW")
            .ok()
            .and_then(|o| number(&self.doc, o))
            .unwrap_or(DEFAULT_CID_WIDTH);
        let mut map = HashMap::new();
        let w = descendant
            .get(b"W")
            .ok()
            .and_then(|o| deref(&self.doc, o).ok())
            .and_then(|o| o.as_array().ok());

        // /W: `c [w1 w2 ...]` or `c_first c_last w`
        if let Some(w) = w {
            let mut i = 0;
            while i < w.len() {
                let Some(start) = number(&self.doc, &w[i]) else {
                    break;
                };
                // Float to int casts saturate: negative or huge operands stay in range
                let start = start as u32;
                match w.get(i + 1).map(|o| deref(&self.doc, o)) {
                    Some(Ok(Object::Array(list))) => {
                        for (offset, width) in list.iter().take(MAX_WIDTH_SPAN as usize).enumerate() {
                            let Some(cid) = start.checked_add(offset as u32) else {
                                break;
                            };
                            if let Some(width) = number(&self.doc, width) {
                                map.insert(cid, width);
                            }
                        }
                        i += 2;
                    },
                    Some(Ok(end)) => {
                        let (Some(end), Some(width)) =
                            (number(&self.doc, end), w.get(i + 2).and_then(|o| number(&self.doc, o)))
                        else {
                            break;
                        };
                        let end = end as u32;
                        if end < start {
                            log::debug!("Skipping inverted /W range {}..{}", start, end);
                        } else {
                            let span = (end - start).min(MAX_WIDTH_SPAN - 1);
                            if span < end - start {
                                log::warn!("/W range {}..{} truncated to {} CIDs", start, end, span + 1);
                            }
                            for cid in start..=start + span {
                                map.insert(cid, width);
                            }
                        }
                        i += 3;
                    },
                    _ => break,
                }
            }
        }
        Widths::Cid { map, default }
    }

    fn show(
        &self,
        bytes: &[u8],
        font: Option<&PageFont>,
        state: &mut TextState,
        page_top: f32,
        glyphs: &mut Vec<Glyph>,
    ) {
        let Some(font) = font else {
            // Unknown font resource: Latin-1 with default widths
            for &b in bytes {
                let bbox = state.glyph_box(DEFAULT_SIMPLE_WIDTH, page_top);
                glyphs.push(Glyph::text(
                    char::from(b).to_string(),
                    bbox,
                    FontId::new("unknown"),
                    state.effective_font_size(),
                ));
                state.advance(DEFAULT_SIMPLE_WIDTH, b == b' ');
            }
            return;
        };

        let codes: Vec<u32> = if font.composite {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        };

        for code in codes {
            let width = font.widths.width(code);
            let bbox = state.glyph_box(width, page_top);
            let glyph_code = match font.cmap.as_deref().and_then(|c| c.get(code)) {
                Some(text) => GlyphCode::Text(text.to_string()),
                None if font.composite => GlyphCode::Cid(code),
                // Simple fonts without a mapping: read the byte as Latin-1
                None => GlyphCode::Text(char::from_u32(code).map(String::from).unwrap_or_default()),
            };
            glyphs.push(Glyph {
                code: glyph_code,
                bbox,
                font: font.id.clone(),
                size: state.effective_font_size(),
            });
            state.advance(width, !font.composite && code == 32);
        }
    }
}

impl GlyphSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_glyphs(&self, page: usize) -> Result<Vec<Glyph>> {
        let (page_id, dict) = self.page_dict(page)?;
        let page_top = self.page_top(dict);
        let fonts = self.page_fonts(page, dict);
        let data = self.doc.get_page_content(page_id)?;
        let content = Content::decode(&data)?;

        let mut glyphs = Vec::new();
        let mut state = TextState::default();
        let mut stack: Vec<TextState> = Vec::new();

        for op in &content.operations {
            let operands = &op.operands;
            let num = |i: usize| operands.get(i).and_then(|o| number(&self.doc, o));
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                },
                "cm" => {
                    if let (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) =
                        (num(0), num(1), num(2), num(3), num(4), num(5))
                    {
                        state.concat(Matrix::new(a, b, c, d, e, f));
                    }
                },
                "BT" => state.begin_text(),
                "ET" => {},
                "Tf" => {
                    if let Some(name) = operands.first().and_then(|o| o.as_name().ok()) {
                        state.font = Some(name.to_vec());
                    }
                    if let Some(size) = num(1) {
                        state.font_size = size;
                    }
                },
                "Td" => {
                    if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                        state.move_line(tx, ty);
                    }
                },
                "TD" => {
                    if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                        state.move_line_set_leading(tx, ty);
                    }
                },
                "Tm" => {
                    if let (Some(a), Some(b), Some(c), Some(d), Some(e), Some(f)) =
                        (num(0), num(1), num(2), num(3), num(4), num(5))
                    {
                        state.set_text_matrix(Matrix::new(a, b, c, d, e, f));
                    }
                },
                "T*" => state.next_line(),
                "TL" => state.leading = num(0).unwrap_or(state.leading),
                "Tc" => state.char_space = num(0).unwrap_or(state.char_space),
                "Tw" => state.word_space = num(0).unwrap_or(state.word_space),
                "Tz" => state.horizontal_scaling = num(0).unwrap_or(state.horizontal_scaling),
                "Ts" => state.text_rise = num(0).unwrap_or(state.text_rise),
                "Tj" | "'" | "\"" => {
                    let text_index = match op.operator.as_str() {
                        "'" => {
                            state.next_line();
                            0
                        },
                        "\"" => {
                            state.word_space = num(0).unwrap_or(state.word_space);
                            state.char_space = num(1).unwrap_or(state.char_space);
                            state.next_line();
                            2
                        },
                        _ => 0,
                    };
                    if let Some(Object::String(bytes, _)) = operands.get(text_index) {
                        let font = state.font.as_ref().and_then(|f| fonts.get(f));
                        self.show(bytes, font, &mut state, page_top, &mut glyphs);
                    }
                },
                "TJ" => {
                    let Some(Object::Array(items)) = operands.first() else {
                        continue;
                    };
                    for item in items {
                        match item {
                            Object::String(bytes, _) => {
                                let font = state.font.as_ref().and_then(|f| fonts.get(f));
                                self.show(bytes, font, &mut state, page_top, &mut glyphs);
                            },
                            other => {
                                if let Some(amount) = number(&self.doc, other) {
                                    state.adjust(amount);
                                }
                            },
                        }
                    }
                },
                _ => {},
            }
        }

        log::debug!("Page {}: {} glyphs from {} fonts", page, glyphs.len(), fonts.len());
        Ok(glyphs)
    }

    fn embedded_font_object(&self, font: &FontId) -> Result<Option<Vec<u8>>> {
        let font_dict = self.font_dict(font)?;
        let Ok(to_unicode) = font_dict.get(b"ToUnicode") else {
            return Ok(None);
        };
        let graph_error = |reason: String| Error::FontGraph {
            font: font.to_string(),
            reason,
        };
        let target = deref(&self.doc, to_unicode).map_err(|e| graph_error(e.to_string()))?;
        match target {
            Object::Stream(stream) => Ok(Some(
                stream.decompressed_content().unwrap_or_else(|_| stream.content.clone()),
            )),
            // Predefined CMap names (Identity-H) carry no Unicode information
            Object::Name(_) => Ok(None),
            _ => Err(graph_error("ToUnicode is neither a stream nor a name".to_string())),
        }
    }

    fn font_cache(&self) -> Option<&FontCMapCache> {
        Some(&self.cmaps)
    }
}

impl LopdfSource {
    fn font_dict(&self, font: &FontId) -> Result<&Dictionary> {
        let graph_error = |reason: &str| Error::FontGraph {
            font: font.to_string(),
            reason: reason.to_string(),
        };

        if let Some(reference) = font.as_str().strip_suffix(" R") {
            let mut parts = reference.split_whitespace();
            let id: ObjectId = match (
                parts.next().map(str::parse::<u32>),
                parts.next().map(str::parse::<u16>),
            ) {
                (Some(Ok(number)), Some(Ok(generation))) => (number, generation),
                _ => return Err(graph_error("malformed object reference")),
            };
            return self
                .doc
                .get_object(id)
                .and_then(Object::as_dict)
                .map_err(|e| graph_error(&e.to_string()));
        }

        let (page, name) = font
            .as_str()
            .strip_prefix('p')
            .and_then(|rest| rest.split_once('/'))
            .and_then(|(page, name)| Some((page.parse::<usize>().ok()?, name)))
            .ok_or_else(|| graph_error("unknown font identifier"))?;
        let (_, dict) = self.page_dict(page)?;
        self.inherited(dict, b"Resources")
            .and_then(|r| r.as_dict().ok())
            .and_then(|r| r.get(b"Font").ok())
            .and_then(|f| deref(&self.doc, f).ok())
            .and_then(|f| f.as_dict().ok())
            .and_then(|f| f.get(name.as_bytes()).ok())
            .and_then(|f| f.as_dict().ok())
            .ok_or_else(|| graph_error("font resource not found"))
    }
}

/// A font as used on one page.
struct PageFont {
    id: FontId,
    composite: bool,
    widths: Widths,
    cmap: Option<Arc<FontCMap>>,
}

/// Advance widths in glyph space (thousandths of the font size).
enum Widths {
    Simple {
        first: u32,
        widths: Vec<f32>,
        missing: f32,
    },
    Cid {
        map: HashMap<u32, f32>,
        default: f32,
    },
}

impl Widths {
    fn width(&self, code: u32) -> f32 {
        match self {
            Widths::Simple {
                first,
                widths,
                missing,
            } => code
                .checked_sub(*first)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing),
            Widths::Cid { map, default } => map.get(&code).copied().unwrap_or(*default),
        }
    }
}

fn deref<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        _ => Ok(obj),
    }
}

fn number(doc: &Document, obj: &Object) -> Option<f32> {
    match deref(doc, obj).ok()? {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{dictionary, Stream, StringFormat};

    /// One-page document with a simple font F1 and a Type0 font F2 whose
    /// ToUnicode maps CID 1 to "A" only.
    fn build_document(operations: Vec<Operation>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let simple_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "FirstChar" => 32,
            "Widths" => Object::Array(vec![Object::Integer(250); 95]),
        });
        let to_unicode = doc.add_object(Stream::new(
            Dictionary::new(),
            b"1 beginbfchar\n<0001> <0041>\nendbfchar".to_vec(),
        ));
        let descendant = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "DW" => 1000,
            "W" => Object::Array(vec![Object::Integer(1), Object::Array(vec![Object::Integer(600)])]),
        });
        let composite_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(descendant)],
            "ToUnicode" => Object::Reference(to_unicode),
        });

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    "F1" => Object::Reference(simple_font),
                    "F2" => Object::Reference(composite_font),
                },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
                "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(842),
                Object::Integer(595),
            ]),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn literal(bytes: &[u8]) -> Object {
        Object::String(bytes.to_vec(), StringFormat::Literal)
    }

    #[test]
    fn test_simple_font_positions() {
        let pdf = build_document(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![10.into(), 495.into()]),
            Operation::new("Tj", vec![literal(b"No.")]),
            Operation::new("ET", vec![]),
        ]);
        let source = LopdfSource::from_bytes(&pdf).unwrap();
        assert_eq!(source.page_count(), 1);

        let glyphs = source.page_glyphs(0).unwrap();
        let text: String = glyphs
            .iter()
            .map(|g| match &g.code {
                GlyphCode::Text(t) => t.clone(),
                GlyphCode::Cid(_) => "?".to_string(),
            })
            .collect();
        assert_eq!(text, "No.");
        // MediaBox inherited from the page tree: top-down y = 595 - (495 + 8)
        assert!((glyphs[0].y0() - 92.0).abs() < 1e-3);
        assert_eq!(glyphs[0].x0(), 10.0);
        assert!((glyphs[1].x0() - 12.5).abs() < 1e-3);
    }

    #[test]
    fn test_composite_font_emits_unmapped_cids() {
        let pdf = build_document(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F2".into(), 10.into()]),
            Operation::new("Td", vec![100.into(), 400.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![literal(&[0x00, 0x01]), (-1000).into(), literal(&[0x02, 0x21])])],
            ),
            Operation::new("ET", vec![]),
        ]);
        let source = LopdfSource::from_bytes(&pdf).unwrap();
        let glyphs = source.page_glyphs(0).unwrap();

        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].code, GlyphCode::Text("A".to_string()));
        assert_eq!(glyphs[1].code, GlyphCode::Cid(545));
        // CID 1 is 600 wide, then the TJ adjustment moves 10 units right
        assert!((glyphs[1].x0() - 116.0).abs() < 1e-3);
        assert!(glyphs[1].font.as_str().ends_with(" R"));
    }

    #[test]
    fn test_embedded_font_object() {
        let pdf = build_document(vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F2".into(), 10.into()]),
            Operation::new("Tj", vec![literal(&[0x00, 0x01])]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Tj", vec![literal(b"x")]),
            Operation::new("ET", vec![]),
        ]);
        let source = LopdfSource::from_bytes(&pdf).unwrap();
        let glyphs = source.page_glyphs(0).unwrap();

        let cmap = source.embedded_font_object(&glyphs[0].font).unwrap();
        assert!(cmap.is_some_and(|data| data.starts_with(b"1 beginbfchar")));
        assert_eq!(source.embedded_font_object(&glyphs[1].font).unwrap(), None);
        assert!(source.embedded_font_object(&FontId::new("999 0 R")).is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let err = LopdfSource::open("/nonexistent/glossary.pdf").err().unwrap();
        assert!(matches!(err, Error::SourceOpen { .. }));
    }

    #[test]
    fn test_page_out_of_range() {
        let pdf = build_document(vec![]);
        let source = LopdfSource::from_bytes(&pdf).unwrap();
        assert!(matches!(source.page_glyphs(3), Err(Error::PageOutOfRange { page: 3, count: 1 })));
    }

    fn type0_with_widths(w: Vec<Object>) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "Subtype" => "CIDFontType2",
                "DW" => 1000,
                "W" => Object::Array(w),
            })],
        }
    }

    #[test]
    fn test_malformed_cid_widths_degrade() {
        let source = LopdfSource::from_bytes(&build_document(vec![])).unwrap();

        // Array form starting at the top of the code space stops instead of overflowing
        let font = type0_with_widths(vec![
            Object::Integer(4_294_967_295),
            Object::Array(vec![Object::Integer(500), Object::Integer(600)]),
        ]);
        let widths = source.cid_widths(&font);
        assert_eq!(widths.width(u32::MAX), 500.0);
        assert_eq!(widths.width(0), 1000.0);

        // Huge range form is capped
        let font = type0_with_widths(vec![
            Object::Integer(0),
            Object::Integer(4_000_000_000),
            Object::Integer(500),
        ]);
        let widths = source.cid_widths(&font);
        assert_eq!(widths.width(0), 500.0);
        assert_eq!(widths.width(MAX_WIDTH_SPAN - 1), 500.0);
        assert_eq!(widths.width(MAX_WIDTH_SPAN), 1000.0);

        // Inverted range is skipped, later entries still apply
        let font = type0_with_widths(vec![
            Object::Integer(10),
            Object::Integer(5),
            Object::Integer(500),
            Object::Integer(20),
            Object::Array(vec![Object::Integer(700)]),
        ]);
        let widths = source.cid_widths(&font);
        assert_eq!(widths.width(7), 1000.0);
        assert_eq!(widths.width(20), 700.0);

        // Negative operands saturate to zero
        let font = type0_with_widths(vec![Object::Integer(-5), Object::Array(vec![Object::Integer(300)])]);
        assert_eq!(source.cid_widths(&font).width(0), 300.0);
    }
}
