//! Layout analysis for grid-less glossary tables.
//!
//! This module turns positioned glyphs into a cell grid:
//! - Row clustering (glyphs → text lines)
//! - Gap-based column boundary detection
//! - Table assembly with header sentinel detection

pub mod clustering;
pub mod column_detector;
pub mod glyph;
pub mod table_detector;

// Re-export main types
pub use clustering::{cluster_into_lines, DEFAULT_ROW_TOLERANCE};
pub use column_detector::{
    detect_boundaries, detect_boundaries_from_x, BoundaryMode, ColumnBoundarySet,
    DetectedBoundaries, DEFAULT_COLUMN_GAP, FALLBACK_BOUNDARIES,
};
pub use glyph::{cid_marker, FontId, Glyph, GlyphCode, TextLine};
pub use table_detector::{
    assemble_table, is_header_sentinel, AssemblyOptions, AttemptFailure, Cell, CellPiece, Table,
    DEFAULT_HEADER_SCAN_ROWS, HEADER_SENTINELS,
};
