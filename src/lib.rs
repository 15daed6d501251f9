// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::redundant_closure)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Glossary Extract
//!
//! Recovers multilingual glossary records from PDF tables that have no drawn
//! grid lines.
//!
//! ## Core Features
//!
//! - **Grid-less tables**: rows from baseline clustering, columns from gaps in
//!   the horizontal glyph distribution
//! - **Header location**: record-number sentinels (`No.`, `番号`, `លេខ`, ...)
//!   separate titles from data
//! - **Strategy menu**: several clustering/boundary configurations per page,
//!   scored by translation fill and record-number validity
//! - **CID repair**: unresolved glyphs are mapped back to Unicode through the
//!   font's own ToUnicode CMap or operator-supplied overrides; whatever stays
//!   unknown keeps an explicit `(cid:N)` marker
//! - **Canonical schema**: per-language header rules map ad hoc headers onto
//!   `number / word / reading / translation / note / example`
//!
//! ## Quick Start
//!
//! ```ignore
//! use glossary_extract::pipeline::{DocumentPipeline, PipelineConfig};
//! use glossary_extract::schema::Language;
//! use glossary_extract::sink::JsonLinesSink;
//! use glossary_extract::source::LopdfSource;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = LopdfSource::open("glossary_khmer.pdf")?;
//! let pipeline = DocumentPipeline::new(PipelineConfig::default())?;
//! let report = pipeline.run(&source, Language::Khmer)?;
//!
//! let mut sink = JsonLinesSink::new(std::io::stdout());
//! report.write_records(&mut sink)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 (<http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license (<http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Layout analysis
pub mod geometry;
pub mod layout;

// Glyph sources
pub mod source;

// ToUnicode CMaps and CID repair
pub mod fonts;

// Canonical record schema
pub mod schema;

// Per-document orchestration
pub mod pipeline;

// Record output
pub mod sink;

// Re-exports
pub use error::{Error, Result};
pub use fonts::{CidGlyphResolver, CidOverrides, FontCMap, FontCMapCache};
pub use layout::{Cell, Glyph, GlyphCode, Table};
pub use pipeline::{DocumentPipeline, DocumentReport, PipelineConfig};
pub use schema::{CanonicalRecord, ColumnRole, Language, SchemaReconciler};
pub use sink::{JsonLinesSink, RecordSink};
#[cfg(feature = "pdf")]
pub use source::LopdfSource;
pub use source::{GlyphSource, MemorySource};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
