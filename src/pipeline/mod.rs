//! Document-level glossary extraction pipeline.
//!
//! ```text
//! GlyphSource
//!     ↓  (page workers)
//! Glyph[] per page
//!     ↓
//! [ExtractionConfig menu] → ExtractionAttempt[] → best attempt per page
//!     ↓
//! [CidGlyphResolver] (ToUnicode CMaps + overrides)
//!     ↓
//! [SchemaReconciler]
//!     ↓
//! CanonicalRecord[]
//! ```
//!
//! Pages are independent: they are read and scored on scoped worker threads.
//! The only state shared between them is the per-document CMap cache, which
//! is filled once per font. A source error on any page cancels the document.

pub mod config;
pub mod strategy;

pub use config::{default_menu, ExtractionConfig, Length, LengthUnit, PipelineConfig};
pub use strategy::{
    run_attempt, run_attempts, score_table, select_best, AttemptScore, ExtractionAttempt,
};

use crate::error::{Error, Result};
use crate::fonts::{CidGlyphResolver, FontCMapCache, UnresolvedStats};
use crate::geometry::median;
use crate::layout::{
    detect_boundaries_from_x, AttemptFailure, BoundaryMode, Cell, DetectedBoundaries, FontId,
    Glyph, Table,
};
use crate::schema::{CanonicalRecord, Language, SchemaReconciler};
use crate::sink::RecordSink;
use crate::source::GlyphSource;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

/// What happened on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageOutcome {
    /// Page index (0-based)
    pub page: usize,
    /// Winning configuration, if any attempt produced a table
    pub config: Option<String>,
    /// Score of the winning attempt
    pub score: Option<AttemptScore>,
    /// Records produced by the page
    pub records: usize,
    /// Failure of every attempt, when none produced a table
    pub failures: Vec<(String, AttemptFailure)>,
}

/// Result of running the pipeline over one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    /// Language the document was reconciled as
    pub language: Language,
    /// Records in page order
    pub records: Vec<CanonicalRecord>,
    /// One outcome per page
    pub pages: Vec<PageOutcome>,
    /// CIDs that stayed unresolved
    pub unresolved: UnresolvedStats,
    /// Fonts whose CMap could not be used, with reasons
    pub unrepairable_fonts: Vec<(FontId, String)>,
}

impl DocumentReport {
    /// Pages on which no attempt produced a table.
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageOutcome> + '_ {
        self.pages.iter().filter(|p| p.config.is_none())
    }

    /// Send every record to a sink.
    pub fn write_records(&self, sink: &mut dyn RecordSink) -> Result<()> {
        for record in &self.records {
            sink.write_record(record)?;
        }
        sink.finish()
    }
}

struct PageResult {
    outcome: PageOutcome,
    records: Vec<CanonicalRecord>,
    unresolved: UnresolvedStats,
}

/// Runs the extraction menu over every page of a document.
///
/// # Examples
///
/// ```
/// use glossary_extract::geometry::Rect;
/// use glossary_extract::layout::{FontId, Glyph};
/// use glossary_extract::pipeline::{DocumentPipeline, PipelineConfig};
/// use glossary_extract::schema::Language;
/// use glossary_extract::source::MemorySource;
///
/// let font = FontId::new("F1");
/// let glyph = |text: &str, x: f32, y: f32| {
///     Glyph::text(text, Rect::new(x, y, x + 5.0, y + 10.0), font.clone(), 10.0)
/// };
/// let mut source = MemorySource::new();
/// source.add_page(vec![
///     glyph("No.", 10.0, 100.0),
///     glyph("Word", 60.0, 100.0),
///     glyph("Translation", 150.0, 100.0),
///     glyph("1", 10.0, 200.0),
///     glyph("足場", 60.0, 200.0),
///     glyph("scaffold", 150.0, 200.0),
/// ]);
///
/// let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
/// let report = pipeline.run(&source, Language::English).unwrap();
/// assert_eq!(report.records[0].translation, "scaffold");
/// ```
#[derive(Debug, Clone)]
pub struct DocumentPipeline {
    config: PipelineConfig,
}

impl DocumentPipeline {
    /// Create a pipeline after validating its configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Language for a document: the configured one, else detected from the
    /// file name.
    pub fn language_for(&self, file_name: &str) -> Option<Language> {
        self.config.language.or_else(|| Language::from_file_name(file_name))
    }

    /// Extract every page of a document.
    pub fn run<S: GlyphSource + ?Sized>(&self, source: &S, language: Language) -> Result<DocumentReport> {
        self.run_with_cancel(source, language, &AtomicBool::new(false))
    }

    /// Extract every page, abandoning the document once `cancel` is set.
    ///
    /// # Errors
    ///
    /// The first source error of any page, or [`Error::Cancelled`] when the
    /// flag was raised from outside.
    pub fn run_with_cancel<S: GlyphSource + ?Sized>(
        &self,
        source: &S,
        language: Language,
        cancel: &AtomicBool,
    ) -> Result<DocumentReport> {
        let page_count = source.page_count();
        let workers = self.config.effective_workers(page_count);
        log::info!("Extracting {} pages ({}) on {} workers", page_count, language, workers);

        let pages = for_each_page(page_count, workers, cancel, |page| source.page_glyphs(page))?;
        let document_boundaries = self.document_boundaries(&pages);

        let reconciler = SchemaReconciler::new(language);
        let run_cache = FontCMapCache::new();
        let cache = source.font_cache().unwrap_or(&run_cache);
        let resolver = CidGlyphResolver::new(source, cache, &self.config.overrides);

        let results = for_each_page(page_count, workers, cancel, |page| {
            Ok(self.process_page(page, &pages[page], &document_boundaries, &reconciler, &resolver))
        })?;

        let mut report = DocumentReport {
            language,
            records: Vec::new(),
            pages: Vec::with_capacity(page_count),
            unresolved: UnresolvedStats::default(),
            unrepairable_fonts: cache.unrepairable_fonts(),
        };
        for result in results {
            report.records.extend(result.records);
            report.pages.push(result.outcome);
            report.unresolved.merge(&result.unresolved);
        }

        for (font, reason) in &report.unrepairable_fonts {
            log::warn!("Font {} is unrepairable: {}", font, reason);
        }
        log::info!(
            "Extracted {} records; {} pages without a table; {} unresolved glyphs",
            report.records.len(),
            report.failed_pages().count(),
            report.unresolved.total()
        );
        Ok(report)
    }

    /// Boundaries for document-gap entries of the menu, indexed like the menu.
    fn document_boundaries(&self, pages: &[Vec<Glyph>]) -> Vec<Option<DetectedBoundaries>> {
        let median_size = median(pages.iter().flatten().map(|g| g.size));
        self.config
            .menu
            .iter()
            .map(|config| match config.boundary_mode {
                BoundaryMode::DocumentGap => {
                    let gap = config.column_gap_threshold.resolve(median_size);
                    let detected =
                        detect_boundaries_from_x(pages.iter().flatten().map(|g| g.x0()), gap);
                    log::debug!(
                        "[{}] document boundaries {:?}",
                        config.name,
                        detected.set.boundaries()
                    );
                    Some(detected)
                },
                BoundaryMode::PageGap | BoundaryMode::Fixed => None,
            })
            .collect()
    }

    fn process_page<S: GlyphSource + ?Sized>(
        &self,
        page: usize,
        glyphs: &[Glyph],
        document_boundaries: &[Option<DetectedBoundaries>],
        reconciler: &SchemaReconciler,
        resolver: &CidGlyphResolver<'_, S>,
    ) -> PageResult {
        let attempts = run_attempts(
            page,
            glyphs,
            &self.config.menu,
            document_boundaries,
            reconciler,
            self.config.require_header,
        );
        let failures: Vec<(String, AttemptFailure)> = attempts
            .iter()
            .filter_map(|a| a.outcome.as_ref().err().map(|f| (a.config.clone(), f.clone())))
            .collect();

        let Some(best) = select_best(attempts) else {
            log::warn!(
                "Page {}: no configuration produced a table ({})",
                page,
                failures.first().map(|(_, f)| f.to_string()).unwrap_or_default()
            );
            return PageResult {
                outcome: PageOutcome {
                    page,
                    config: None,
                    score: None,
                    records: 0,
                    failures,
                },
                records: Vec::new(),
                unresolved: UnresolvedStats::default(),
            };
        };

        let mut unresolved = UnresolvedStats::default();
        let records = match best.outcome {
            Ok(table) => reconciler.reconcile(&resolve_table(&table, resolver, &mut unresolved)),
            Err(_) => Vec::new(),
        };
        log::debug!("Page {}: {} wins with {} records", page, best.config, records.len());

        PageResult {
            outcome: PageOutcome {
                page,
                config: Some(best.config),
                score: Some(best.score),
                records: records.len(),
                failures: Vec::new(),
            },
            records,
            unresolved,
        }
    }
}

fn resolve_table<S: GlyphSource + ?Sized>(
    table: &Table,
    resolver: &CidGlyphResolver<'_, S>,
    stats: &mut UnresolvedStats,
) -> Table {
    let mut resolve_row = |row: &[Cell]| -> Vec<Cell> {
        row.iter().map(|cell| resolver.resolve_cell(cell, stats)).collect()
    };
    let header = table.header.as_ref().map(|header| resolve_row(header));
    let rows = table.rows.iter().map(|row| resolve_row(row)).collect();
    Table {
        page: table.page,
        config: table.config.clone(),
        header,
        rows,
        boundaries: table.boundaries.clone(),
    }
}

/// Run `work` for every page on scoped workers, returning results in page
/// order.
///
/// The first error sets `cancel`; workers stop taking pages once it is set.
fn for_each_page<T, F>(pages: usize, workers: usize, cancel: &AtomicBool, work: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync,
{
    let next = AtomicUsize::new(0);
    let first_error: Mutex<Option<Error>> = Mutex::new(None);

    let finished: Vec<Vec<(usize, T)>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers.max(1))
            .map(|_| {
                let (next, first_error, work) = (&next, &first_error, &work);
                scope.spawn(move || {
                    let mut done = Vec::new();
                    while !cancel.load(Ordering::Acquire) {
                        let page = next.fetch_add(1, Ordering::Relaxed);
                        if page >= pages {
                            break;
                        }
                        match work(page) {
                            Ok(value) => done.push((page, value)),
                            Err(e) => {
                                log::error!("Page {}: {}; cancelling document", page, e);
                                cancel.store(true, Ordering::Release);
                                let mut slot = first_error.lock().unwrap_or_else(|e| e.into_inner());
                                slot.get_or_insert(e);
                                break;
                            },
                        }
                    }
                    done
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    if let Some(e) = first_error.into_inner().unwrap_or_else(|e| e.into_inner()) {
        return Err(e);
    }

    let mut slots: Vec<Option<T>> = (0..pages).map(|_| None).collect();
    for (page, value) in finished.into_iter().flatten() {
        slots[page] = Some(value);
    }
    slots.into_iter().map(|slot| slot.ok_or(Error::Cancelled)).collect()
}
