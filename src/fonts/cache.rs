//! Build-once, per-document cache of parsed ToUnicode CMaps.
//!
//! Pages are processed on several threads and many of them reference the same
//! fonts. Each font's CMap is fetched and parsed exactly once; concurrent
//! requests for the same font wait on its `OnceLock` while other fonts fill
//! independently.

use crate::fonts::cmap::FontCMap;
use crate::layout::FontId;
use crate::source::GlyphSource;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

/// Cached outcome of loading one font's CMap.
#[derive(Debug, Clone, PartialEq)]
pub enum FontEntry {
    /// The font has a usable ToUnicode CMap
    Repairable(Arc<FontCMap>),
    /// The font cannot be repaired from its own data
    Unrepairable {
        /// Why the CMap is unavailable
        reason: String,
    },
}

impl FontEntry {
    /// The CMap, when the font is repairable.
    pub fn cmap(&self) -> Option<&FontCMap> {
        match self {
            FontEntry::Repairable(cmap) => Some(cmap),
            FontEntry::Unrepairable { .. } => None,
        }
    }
}

/// Document-scoped map from fonts to their parsed CMaps.
#[derive(Debug, Default)]
pub struct FontCMapCache {
    entries: Mutex<HashMap<FontId, Arc<OnceLock<FontEntry>>>>,
    builds: AtomicUsize,
}

impl FontCMapCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `font`, running `build` if the font has not been seen.
    ///
    /// The map lock is held only while the font's slot is looked up; `build`
    /// runs outside it.
    pub fn get_or_init(&self, font: &FontId, build: impl FnOnce() -> FontEntry) -> FontEntry {
        let slot = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(entries.entry(font.clone()).or_default())
        };
        slot.get_or_init(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            build()
        })
        .clone()
    }

    /// Entry for `font`, loading its ToUnicode stream from `source` on first use.
    pub fn load<S: GlyphSource + ?Sized>(&self, source: &S, font: &FontId) -> FontEntry {
        self.get_or_init(font, || build_entry(source, font))
    }

    /// Fonts that could not be repaired, with their reasons, sorted by font.
    pub fn unrepairable_fonts(&self) -> Vec<(FontId, String)> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut fonts: Vec<(FontId, String)> = entries
            .iter()
            .filter_map(|(font, slot)| match slot.get() {
                Some(FontEntry::Unrepairable { reason }) => Some((font.clone(), reason.clone())),
                _ => None,
            })
            .collect();
        fonts.sort();
        fonts
    }

    /// Number of entries built so far, one per font.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Number of fonts with a filled entry.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|slot| slot.get().is_some()).count()
    }

    /// Whether no font has been loaded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn build_entry<S: GlyphSource + ?Sized>(source: &S, font: &FontId) -> FontEntry {
    let data = match source.embedded_font_object(font) {
        Ok(Some(data)) => data,
        Ok(None) => {
            log::warn!("Font {} has no ToUnicode CMap; its CIDs stay unresolved", font);
            return FontEntry::Unrepairable {
                reason: "no ToUnicode stream".to_string(),
            };
        },
        Err(e) => {
            log::warn!("Font {} graph is malformed: {}", font, e);
            return FontEntry::Unrepairable {
                reason: e.to_string(),
            };
        },
    };

    match FontCMap::parse(&data) {
        Ok(cmap) => {
            if cmap.unsupported_ranges() > 0 {
                log::warn!(
                    "Font {}: {} bfrange entries with multi-character destinations were skipped",
                    font,
                    cmap.unsupported_ranges()
                );
            }
            FontEntry::Repairable(Arc::new(cmap))
        },
        Err(e) => {
            log::warn!("Font {} ToUnicode CMap is unparseable: {}", font, e);
            FontEntry::Unrepairable {
                reason: e.to_string(),
            }
        },
    }
}
