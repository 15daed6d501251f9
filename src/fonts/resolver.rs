//! Repair of unresolved CID glyphs.
//!
//! A CID is looked up first in the ToUnicode CMap of the font it came from,
//! then in operator-supplied overrides. Anything still unknown keeps its
//! explicit `(cid:N)` marker and is counted.

use crate::error::Result;
use crate::fonts::cache::FontCMapCache;
use crate::layout::{Cell, CellPiece, FontId};
use crate::source::GlyphSource;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Override key matching every font.
pub const WILDCARD_FONT: &str = "*";

/// Operator-supplied CID mappings.
///
/// JSON form: `{ "<font id or *>": { "<cid>": "<text>" } }`. A font-specific
/// entry takes precedence over the `*` wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CidOverrides {
    fonts: HashMap<String, HashMap<u32, String>>,
}

impl CidOverrides {
    /// Create an empty override table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides from JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use glossary_extract::fonts::CidOverrides;
    /// use glossary_extract::layout::FontId;
    ///
    /// let overrides = CidOverrides::from_json(r#"{"*": {"545": "្ស"}}"#).unwrap();
    /// assert_eq!(overrides.get(&FontId::new("F1"), 545), Some("្ស"));
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load overrides from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Add a mapping; `None` registers it for every font.
    pub fn insert(&mut self, font: Option<&FontId>, cid: u32, text: impl Into<String>) {
        let key = font.map_or(WILDCARD_FONT, FontId::as_str).to_string();
        self.fonts.entry(key).or_default().insert(cid, text.into());
    }

    /// Mapping for a CID of a font, falling back to the wildcard table.
    pub fn get(&self, font: &FontId, cid: u32) -> Option<&str> {
        self.fonts
            .get(font.as_str())
            .and_then(|table| table.get(&cid))
            .or_else(|| self.fonts.get(WILDCARD_FONT).and_then(|table| table.get(&cid)))
            .map(String::as_str)
    }

    /// Total number of mappings across all fonts.
    pub fn len(&self) -> usize {
        self.fonts.values().map(HashMap::len).sum()
    }

    /// Whether no mapping is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counts of CIDs that stayed unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnresolvedStats {
    /// Occurrences per CID
    pub occurrences: BTreeMap<u32, usize>,
    /// Number of cells holding at least one unresolved CID
    pub cells_affected: usize,
}

impl UnresolvedStats {
    /// Record one unresolved occurrence of `cid`.
    pub fn record(&mut self, cid: u32) {
        *self.occurrences.entry(cid).or_insert(0) += 1;
    }

    /// Fold another set of statistics into this one.
    pub fn merge(&mut self, other: &UnresolvedStats) {
        for (cid, count) in &other.occurrences {
            *self.occurrences.entry(*cid).or_insert(0) += count;
        }
        self.cells_affected += other.cells_affected;
    }

    /// Total unresolved occurrences.
    pub fn total(&self) -> usize {
        self.occurrences.values().sum()
    }

    /// Whether every glyph was resolved.
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// Resolves CID pieces using font CMaps and overrides.
pub struct CidGlyphResolver<'a, S: GlyphSource + ?Sized> {
    source: &'a S,
    cache: &'a FontCMapCache,
    overrides: &'a CidOverrides,
}

impl<'a, S: GlyphSource + ?Sized> CidGlyphResolver<'a, S> {
    /// Create a resolver over a document's source and font cache.
    pub fn new(source: &'a S, cache: &'a FontCMapCache, overrides: &'a CidOverrides) -> Self {
        Self {
            source,
            cache,
            overrides,
        }
    }

    /// Unicode text for a CID of a font, if any mapping knows it.
    pub fn lookup(&self, font: &FontId, cid: u32) -> Option<String> {
        let entry = self.cache.load(self.source, font);
        if let Some(text) = entry.cmap().and_then(|cmap| cmap.get(cid)) {
            return Some(text.to_string());
        }
        self.overrides.get(font, cid).map(str::to_string)
    }

    /// Resolve every CID piece of a cell.
    ///
    /// Resolved text is NFC-normalized; unresolved CIDs stay as
    /// [`CellPiece::Cid`] and are recorded in `stats`.
    pub fn resolve_cell(&self, cell: &Cell, stats: &mut UnresolvedStats) -> Cell {
        let mut resolved = Cell::empty();
        for piece in &cell.pieces {
            match piece {
                CellPiece::Text(text) => resolved.push_text(text),
                CellPiece::Cid { cid, font } => match self.lookup(font, *cid) {
                    Some(text) => resolved.push_text(&text),
                    None => {
                        stats.record(*cid);
                        resolved.pieces.push(piece.clone());
                    },
                },
            }
        }
        if resolved.has_unresolved() {
            stats.cells_affected += 1;
        }
        for piece in &mut resolved.pieces {
            if let CellPiece::Text(text) = piece {
                *text = text.nfc().collect();
            }
        }
        resolved
    }

    /// Replace `(cid:N)` placeholders in free text emitted by a PDF library.
    ///
    /// Placeholders that cannot be resolved are left in place and recorded.
    pub fn resolve_text(&self, text: &str, font: &FontId, stats: &mut UnresolvedStats) -> String {
        lazy_static::lazy_static! {
            static ref CID_RE: Regex = Regex::new(r"\(cid:(\d+)\)").unwrap();
        }

        let mut unresolved = false;
        let replaced = CID_RE.replace_all(text, |caps: &Captures| {
            let resolved = caps[1].parse::<u32>().ok().and_then(|cid| {
                let text = self.lookup(font, cid);
                if text.is_none() {
                    stats.record(cid);
                }
                text
            });
            match resolved {
                Some(text) => text,
                None => {
                    unresolved = true;
                    caps[0].to_string()
                },
            }
        });
        if unresolved {
            stats.cells_affected += 1;
        }
        replaced.nfc().collect()
    }
}
