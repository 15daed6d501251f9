//! Table assembly from text lines and column boundaries.
//!
//! Every line becomes a candidate row by dropping each glyph into its column
//! bin. The header is the first row (within a scan window) holding a cell
//! that reads exactly as a record-number sentinel such as `No.`; rows above
//! it are titles and decoration.

use crate::layout::column_detector::ColumnBoundarySet;
use crate::layout::glyph::{cid_marker, FontId, Glyph, GlyphCode, TextLine};
use serde::Serialize;
use std::fmt;

/// Tokens meaning "No." that head the record-number column in each language
/// variant of the glossary.
pub const HEADER_SENTINELS: &[&str] = &[
    "No.",
    "No",
    "Số",
    "番号",
    "번호",
    "หมายเลข",
    "नंबर",
    "លេខ",
    "序号",
];

/// Default number of rows scanned for the header sentinel.
pub const DEFAULT_HEADER_SCAN_ROWS: usize = 10;

/// Whether a trimmed cell text is a header sentinel.
pub fn is_header_sentinel(text: &str) -> bool {
    let trimmed = text.trim();
    HEADER_SENTINELS.iter().any(|s| *s == trimmed)
}

/// A fragment of cell content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CellPiece {
    /// Resolved text
    Text(String),
    /// Unresolved CID together with the font it came from
    Cid {
        /// Font-local character identifier
        cid: u32,
        /// Originating font
        font: FontId,
    },
}

/// Content of one (row, column) position.
///
/// Pieces keep the originating font of every unresolved CID so the resolver
/// can consult the right CMap later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    /// Ordered content fragments
    pub pieces: Vec<CellPiece>,
}

impl Cell {
    /// An empty cell.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A cell holding plain text.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::empty();
        }
        Self {
            pieces: vec![CellPiece::Text(text)],
        }
    }

    /// Append a glyph, merging adjacent text fragments.
    pub fn push_glyph(&mut self, glyph: &Glyph) {
        match &glyph.code {
            GlyphCode::Text(text) => self.push_text(text),
            GlyphCode::Cid(cid) => self.pieces.push(CellPiece::Cid {
                cid: *cid,
                font: glyph.font.clone(),
            }),
        }
    }

    /// Append text, merging with a trailing text fragment.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(CellPiece::Text(last)) = self.pieces.last_mut() {
            last.push_str(text);
        } else {
            self.pieces.push(CellPiece::Text(text.to_string()));
        }
    }

    /// Rendered text; unresolved CIDs appear as `(cid:N)` markers.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                CellPiece::Text(text) => out.push_str(text),
                CellPiece::Cid { cid, .. } => out.push_str(&cid_marker(*cid)),
            }
        }
        out
    }

    /// Whether the cell is empty after trimming whitespace.
    ///
    /// An unresolved CID counts as content.
    pub fn is_blank(&self) -> bool {
        self.pieces.iter().all(|piece| match piece {
            CellPiece::Text(text) => text.trim().is_empty(),
            CellPiece::Cid { .. } => false,
        })
    }

    /// CIDs in this cell that are still unresolved.
    pub fn unresolved_cids(&self) -> impl Iterator<Item = u32> + '_ {
        self.pieces.iter().filter_map(|piece| match piece {
            CellPiece::Cid { cid, .. } => Some(*cid),
            CellPiece::Text(_) => None,
        })
    }

    /// Whether any unresolved CID remains.
    pub fn has_unresolved(&self) -> bool {
        self.unresolved_cids().next().is_some()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// A reconstructed page table.
///
/// Every data row has exactly as many cells as the header (or as the
/// boundary set has bins when no header was located).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// Page index (0-based) the table came from
    pub page: usize,
    /// Name of the extraction configuration that produced the table
    pub config: String,
    /// Header row, when one was located
    pub header: Option<Vec<Cell>>,
    /// Data rows below the header
    pub rows: Vec<Vec<Cell>>,
    /// Boundaries used to split the rows
    pub boundaries: ColumnBoundarySet,
}

impl Table {
    /// Number of columns in every row.
    pub fn column_count(&self) -> usize {
        self.boundaries.bin_count()
    }

    /// Header texts, or empty strings when no header was located.
    pub fn header_texts(&self) -> Vec<String> {
        match &self.header {
            Some(header) => header.iter().map(|c| c.text().trim().to_string()).collect(),
            None => vec![String::new(); self.column_count()],
        }
    }

    /// Values of one column across the data rows.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

/// Why an extraction attempt produced no table for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttemptFailure {
    /// The page had no glyphs at all
    NoGlyphs,
    /// No header sentinel in the first `scanned` non-blank rows
    HeaderNotFound {
        /// Number of rows scanned
        scanned: usize,
    },
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::NoGlyphs => write!(f, "page has no glyphs"),
            AttemptFailure::HeaderNotFound { scanned } => {
                write!(f, "header not found in first {} rows", scanned)
            },
        }
    }
}

/// Options controlling table assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Rows scanned for the header sentinel
    pub header_scan_rows: usize,
    /// Fail the attempt when no header is found (otherwise all rows are data)
    pub require_header: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
            require_header: true,
        }
    }
}

/// Split text lines into a cell grid and separate the header from the data.
///
/// Each glyph goes to bin `i` with `boundary[i-1] <= x0 < boundary[i]`;
/// glyph text is concatenated per bin in x order. The first of the first
/// `header_scan_rows` rows holding a sentinel cell becomes the header; rows
/// above it are discarded. The scan window counts every clustered row,
/// blank ones included. Data rows whose cells are all blank are dropped, as
/// are rows repeating a sentinel in their leading non-blank cell (repeated
/// page headers).
///
/// # Errors
///
/// [`AttemptFailure::HeaderNotFound`] when `require_header` is set and no
/// sentinel appears in the scan window; [`AttemptFailure::NoGlyphs`] for an
/// empty page.
pub fn assemble_table(
    page: usize,
    lines: &[TextLine],
    boundaries: &ColumnBoundarySet,
    options: AssemblyOptions,
) -> Result<Table, AttemptFailure> {
    if lines.iter().all(|l| l.is_empty()) {
        return Err(AttemptFailure::NoGlyphs);
    }

    let bins = boundaries.bin_count();
    let rows: Vec<Vec<Cell>> = lines.iter().map(|line| split_line(line, boundaries, bins)).collect();

    let scan = options.header_scan_rows.min(rows.len());
    let header_idx = rows
        .iter()
        .take(scan)
        .position(|row| row.iter().any(|cell| is_header_sentinel(&cell.text())));

    let (header, data) = match header_idx {
        Some(idx) => {
            let mut rows = rows;
            let data = rows.split_off(idx + 1);
            let header = rows.pop();
            (header, data)
        },
        None if options.require_header => {
            log::debug!("Page {}: header not found in first {} rows", page, scan);
            return Err(AttemptFailure::HeaderNotFound { scanned: scan });
        },
        None => (None, rows),
    };

    let data: Vec<Vec<Cell>> = data
        .into_iter()
        .filter(|row| !row.iter().all(Cell::is_blank) && !is_repeated_header(row))
        .collect();

    Ok(Table {
        page,
        config: String::new(),
        header,
        rows: data,
        boundaries: boundaries.clone(),
    })
}

fn split_line(line: &TextLine, boundaries: &ColumnBoundarySet, bins: usize) -> Vec<Cell> {
    let mut row = vec![Cell::empty(); bins];
    for glyph in &line.glyphs {
        let bin = boundaries.bin_for(glyph.x0()).min(bins - 1);
        row[bin].push_glyph(glyph);
    }
    row
}

fn is_repeated_header(row: &[Cell]) -> bool {
    row.iter()
        .find(|cell| !cell.is_blank())
        .map(|cell| is_header_sentinel(&cell.text()))
        .unwrap_or(false)
}
