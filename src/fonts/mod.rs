//! Font CMaps and CID repair.
//!
//! This module provides ToUnicode CMap parsing, a per-document CMap cache
//! and the resolver that turns unresolved CIDs back into text.

pub mod cache;
pub mod cmap;
pub mod resolver;

pub use cache::{FontCMapCache, FontEntry};
pub use cmap::FontCMap;
pub use resolver::{CidGlyphResolver, CidOverrides, UnresolvedStats, WILDCARD_FONT};
