//! Extraction attempts and winner selection.
//!
//! Every page is cut into a table once per menu entry. Attempts are scored by
//! how many rows carry a translation and how many start with a plausible
//! record number; the best attempt is kept.

use crate::geometry::{cmp_f32, median};
use crate::layout::{
    assemble_table, cluster_into_lines, detect_boundaries, AssemblyOptions, AttemptFailure,
    BoundaryMode, ColumnBoundarySet, DetectedBoundaries, Glyph, Table,
};
use crate::pipeline::config::ExtractionConfig;
use crate::schema::SchemaReconciler;
use serde::Serialize;
use std::cmp::Ordering;

/// Largest record number accepted as valid.
const MAX_RECORD_NUMBER: u32 = 10_000;

/// Quality of an extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttemptScore {
    /// Fraction of data rows with a non-empty translation
    pub translation_fill_ratio: f32,
    /// Fraction of data rows whose leading cell is a record number
    pub valid_row_ratio: f32,
    /// Whether column detection gave up and used the fallback boundaries
    pub used_fallback: bool,
}

impl AttemptScore {
    /// Score of an attempt that produced no table; below every real score.
    pub const FAILED: AttemptScore = AttemptScore {
        translation_fill_ratio: -1.0,
        valid_row_ratio: -1.0,
        used_fallback: false,
    };
}

/// One page table reconstruction under one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionAttempt {
    /// Position of the configuration in the menu
    pub index: usize,
    /// Name of the configuration
    pub config: String,
    /// The table, or why there is none
    pub outcome: Result<Table, AttemptFailure>,
    /// Attempt quality
    pub score: AttemptScore,
}

impl ExtractionAttempt {
    /// Compare by fill ratio, then valid ratio, then earlier menu position.
    pub fn rank(&self, other: &Self) -> Ordering {
        cmp_f32(self.score.translation_fill_ratio, other.score.translation_fill_ratio)
            .then_with(|| cmp_f32(self.score.valid_row_ratio, other.score.valid_row_ratio))
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Whether a cell reads as a record number.
fn is_record_number(text: &str) -> bool {
    text.trim()
        .parse::<u32>()
        .map(|n| n <= MAX_RECORD_NUMBER)
        .unwrap_or(false)
}

/// Score a table.
///
/// An empty table scores zero on both ratios.
pub fn score_table(table: &Table, reconciler: &SchemaReconciler, used_fallback: bool) -> AttemptScore {
    let total = table.rows.len();
    if total == 0 {
        return AttemptScore {
            translation_fill_ratio: 0.0,
            valid_row_ratio: 0.0,
            used_fallback,
        };
    }

    let valid = table
        .rows
        .iter()
        .filter(|row| row.first().map(|cell| is_record_number(&cell.text())).unwrap_or(false))
        .count();
    let filled = reconciler
        .translation_column(table)
        .map(|column| table.column(column).filter(|cell| !cell.is_blank()).count())
        .unwrap_or(0);

    AttemptScore {
        translation_fill_ratio: filled as f32 / total as f32,
        valid_row_ratio: valid as f32 / total as f32,
        used_fallback,
    }
}

/// Run one configuration against a page.
///
/// `document_boundaries` is used for [`BoundaryMode::DocumentGap`]; when it
/// is missing the page's own glyphs are analysed instead.
pub fn run_attempt(
    page: usize,
    glyphs: &[Glyph],
    index: usize,
    config: &ExtractionConfig,
    document_boundaries: Option<&DetectedBoundaries>,
    reconciler: &SchemaReconciler,
    require_header: bool,
) -> ExtractionAttempt {
    let failed = |failure: AttemptFailure| ExtractionAttempt {
        index,
        config: config.name.clone(),
        outcome: Err(failure),
        score: AttemptScore::FAILED,
    };

    if glyphs.is_empty() {
        return failed(AttemptFailure::NoGlyphs);
    }

    let median_size = median(glyphs.iter().map(|g| g.size));
    let tolerance = config.row_tolerance.resolve(median_size);
    let gap = config.column_gap_threshold.resolve(median_size);

    let detected = match (config.boundary_mode, document_boundaries) {
        (BoundaryMode::Fixed, _) => DetectedBoundaries {
            set: ColumnBoundarySet::fallback(),
            used_fallback: false,
        },
        (BoundaryMode::DocumentGap, Some(document)) => document.clone(),
        (BoundaryMode::DocumentGap, None) => {
            log::debug!("Page {}: no document boundaries for {}, using page gaps", page, config.name);
            detect_boundaries(glyphs, gap)
        },
        (BoundaryMode::PageGap, _) => detect_boundaries(glyphs, gap),
    };

    let lines = cluster_into_lines(glyphs.to_vec(), tolerance);
    let options = AssemblyOptions {
        header_scan_rows: config.header_scan_rows,
        require_header,
    };

    match assemble_table(page, &lines, &detected.set, options) {
        Ok(mut table) => {
            table.config = config.name.clone();
            let score = score_table(&table, reconciler, detected.used_fallback);
            log::debug!(
                "Page {} [{}]: {} lines, {} columns, {} rows, fill {:.2}, valid {:.2}{}",
                page,
                config.name,
                lines.len(),
                table.column_count(),
                table.rows.len(),
                score.translation_fill_ratio,
                score.valid_row_ratio,
                if detected.used_fallback { ", fallback boundaries" } else { "" }
            );
            ExtractionAttempt {
                index,
                config: config.name.clone(),
                outcome: Ok(table),
                score,
            }
        },
        Err(failure) => {
            log::debug!("Page {} [{}]: {}", page, config.name, failure);
            failed(failure)
        },
    }
}

/// Run every configuration of the menu against a page, in menu order.
pub fn run_attempts(
    page: usize,
    glyphs: &[Glyph],
    menu: &[ExtractionConfig],
    document_boundaries: &[Option<DetectedBoundaries>],
    reconciler: &SchemaReconciler,
    require_header: bool,
) -> Vec<ExtractionAttempt> {
    menu.iter()
        .enumerate()
        .map(|(index, config)| {
            run_attempt(
                page,
                glyphs,
                index,
                config,
                document_boundaries.get(index).and_then(Option::as_ref),
                reconciler,
                require_header,
            )
        })
        .collect()
}

/// Pick the best attempt.
///
/// The result does not depend on the order of `attempts`. Returns `None`
/// when there are no attempts or none produced a table.
pub fn select_best(attempts: impl IntoIterator<Item = ExtractionAttempt>) -> Option<ExtractionAttempt> {
    attempts
        .into_iter()
        .filter(|attempt| attempt.outcome.is_ok())
        .max_by(|a, b| a.rank(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::{Cell, FontId};
    use crate::pipeline::config::default_menu;
    use crate::schema::Language;

    fn glyph(text: &str, x: f32, y: f32) -> Glyph {
        Glyph::text(text, Rect::new(x, y, x + 5.0, y + 10.0), FontId::new("F1"), 10.0)
    }

    fn attempt(index: usize, fill: f32, valid: f32) -> ExtractionAttempt {
        ExtractionAttempt {
            index,
            config: format!("c{}", index),
            outcome: Ok(Table {
                page: 0,
                config: format!("c{}", index),
                header: None,
                rows: Vec::new(),
                boundaries: ColumnBoundarySet::fallback(),
            }),
            score: AttemptScore {
                translation_fill_ratio: fill,
                valid_row_ratio: valid,
                used_fallback: false,
            },
        }
    }

    #[test]
    fn test_is_record_number() {
        assert!(is_record_number(" 12 "));
        assert!(is_record_number("10000"));
        assert!(!is_record_number("10001"));
        assert!(!is_record_number("-1"));
        assert!(!is_record_number("No."));
    }

    #[test]
    fn test_select_prefers_fill_then_valid_then_index() {
        let best = select_best(vec![attempt(0, 0.5, 1.0), attempt(1, 0.9, 0.1), attempt(2, 0.9, 0.1)]);
        assert_eq!(best.unwrap().index, 1);

        let best = select_best(vec![attempt(0, 0.9, 0.5), attempt(1, 0.9, 0.8)]);
        assert_eq!(best.unwrap().index, 1);
    }

    #[test]
    fn test_select_is_order_independent() {
        let attempts = vec![attempt(0, 0.9, 0.5), attempt(1, 0.9, 0.5), attempt(2, 0.2, 1.0)];
        let forward = select_best(attempts.clone()).unwrap().index;
        let backward = select_best(attempts.into_iter().rev()).unwrap().index;
        assert_eq!(forward, 0);
        assert_eq!(backward, 0);
    }

    #[test]
    fn test_failed_attempts_never_win() {
        let failed = ExtractionAttempt {
            index: 0,
            config: "c0".to_string(),
            outcome: Err(AttemptFailure::HeaderNotFound { scanned: 10 }),
            score: AttemptScore::FAILED,
        };
        assert_eq!(select_best(vec![failed.clone(), attempt(1, 0.0, 0.0)]).unwrap().index, 1);
        assert!(select_best(vec![failed]).is_none());
    }

    #[test]
    fn test_score_table() {
        let reconciler = SchemaReconciler::new(Language::English);
        let table = Table {
            page: 0,
            config: String::new(),
            header: Some(vec![Cell::from_text("No."), Cell::from_text("Translation")]),
            rows: vec![
                vec![Cell::from_text("1"), Cell::from_text("scaffold")],
                vec![Cell::from_text("x"), Cell::from_text("")],
            ],
            boundaries: ColumnBoundarySet::new(vec![50.0]).unwrap(),
        };
        let score = score_table(&table, &reconciler, false);
        assert_eq!(score.translation_fill_ratio, 0.5);
        assert_eq!(score.valid_row_ratio, 0.5);
    }

    #[test]
    fn test_run_attempts_on_page() {
        let glyphs = vec![
            glyph("No.", 10.0, 100.0),
            glyph("Word", 60.0, 100.0),
            glyph("Translation", 150.0, 100.0),
            glyph("1", 10.0, 200.0),
            glyph("足場", 60.0, 200.0),
            glyph("scaffold", 150.0, 200.0),
        ];
        let reconciler = SchemaReconciler::new(Language::English);
        let menu = default_menu();
        let attempts = run_attempts(0, &glyphs, &menu, &[], &reconciler, true);
        assert_eq!(attempts.len(), menu.len());

        let best = select_best(attempts).unwrap();
        assert_eq!(best.config, "gap-30/tol-5");
        let table = best.outcome.unwrap();
        assert_eq!(table.config, "gap-30/tol-5");
        assert_eq!(table.boundaries.boundaries(), &[35.0, 105.0]);
        assert_eq!(best.score.translation_fill_ratio, 1.0);
    }

    #[test]
    fn test_empty_page_fails_every_attempt() {
        let reconciler = SchemaReconciler::new(Language::English);
        let attempts = run_attempts(0, &[], &default_menu(), &[], &reconciler, true);
        assert!(attempts.iter().all(|a| a.outcome == Err(AttemptFailure::NoGlyphs)));
    }
}
