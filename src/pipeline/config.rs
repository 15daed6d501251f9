//! Configuration for glossary extraction.
//!
//! An [`ExtractionConfig`] is one way of cutting a page into a table; the
//! [`PipelineConfig`] holds the menu of them tried on every page together
//! with document-wide settings. Both are plain serde structs so a run can be
//! described in a JSON file.

use crate::error::{Error, Result};
use crate::fonts::CidOverrides;
use crate::layout::{BoundaryMode, DEFAULT_COLUMN_GAP, DEFAULT_HEADER_SCAN_ROWS, DEFAULT_ROW_TOLERANCE};
use crate::schema::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Font size assumed when an em-relative length has no glyphs to measure.
const FALLBACK_EM: f32 = 12.0;

/// Unit of a [`Length`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    /// PDF user-space units
    #[default]
    Units,
    /// Multiples of the median glyph size
    Em,
}

/// A distance threshold, absolute or relative to the text size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    /// Magnitude
    pub value: f32,
    /// Unit of `value`
    #[serde(default)]
    pub unit: LengthUnit,
}

impl Length {
    /// A length in user-space units.
    pub const fn units(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::Units,
        }
    }

    /// A length in multiples of the median glyph size.
    pub const fn em(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::Em,
        }
    }

    /// The length in user-space units.
    ///
    /// # Examples
    ///
    /// ```
    /// use glossary_extract::pipeline::Length;
    ///
    /// assert_eq!(Length::units(30.0).resolve(Some(10.0)), 30.0);
    /// assert_eq!(Length::em(0.5).resolve(Some(10.0)), 5.0);
    /// ```
    pub fn resolve(&self, median_size: Option<f32>) -> f32 {
        match self.unit {
            LengthUnit::Units => self.value,
            LengthUnit::Em => {
                let em = median_size.filter(|s| s.is_finite() && *s > 0.0).unwrap_or(FALLBACK_EM);
                self.value * em
            },
        }
    }

    fn validate(&self, what: &str, config: &str) -> Result<()> {
        if !self.value.is_finite() || self.value <= 0.0 {
            return Err(Error::Config(format!(
                "{}: {} must be positive and finite, got {}",
                config, what, self.value
            )));
        }
        Ok(())
    }
}

/// One entry of the extraction menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Name reported for tables this configuration produces
    pub name: String,
    /// Maximum vertical distance from a line's reference y
    pub row_tolerance: Length,
    /// Minimum horizontal gap that separates two columns
    pub column_gap_threshold: Length,
    /// Where column boundaries come from
    pub boundary_mode: BoundaryMode,
    /// Rows scanned for the header sentinel
    #[serde(default = "default_header_scan_rows")]
    pub header_scan_rows: usize,
}

fn default_header_scan_rows() -> usize {
    DEFAULT_HEADER_SCAN_ROWS
}

impl ExtractionConfig {
    /// Gap analysis over the page's own glyphs.
    pub fn page_gap(gap: f32, tolerance: f32) -> Self {
        Self {
            name: format!("gap-{}/tol-{}", gap, tolerance),
            row_tolerance: Length::units(tolerance),
            column_gap_threshold: Length::units(gap),
            boundary_mode: BoundaryMode::PageGap,
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
        }
    }

    /// Gap analysis over the pooled glyphs of the whole document.
    pub fn document_gap(gap: f32, tolerance: f32) -> Self {
        Self {
            name: format!("document-gap-{}/tol-{}", gap, tolerance),
            boundary_mode: BoundaryMode::DocumentGap,
            ..Self::page_gap(gap, tolerance)
        }
    }

    /// The fixed fallback boundaries.
    pub fn fixed(tolerance: f32) -> Self {
        Self {
            name: format!("fixed/tol-{}", tolerance),
            boundary_mode: BoundaryMode::Fixed,
            ..Self::page_gap(DEFAULT_COLUMN_GAP, tolerance)
        }
    }

    /// Rename the configuration.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the header scan window.
    pub fn with_header_scan_rows(mut self, rows: usize) -> Self {
        self.header_scan_rows = rows;
        self
    }

    /// Set the row tolerance.
    pub fn with_row_tolerance(mut self, tolerance: Length) -> Self {
        self.row_tolerance = tolerance;
        self
    }

    /// Set the column gap threshold.
    pub fn with_column_gap_threshold(mut self, gap: Length) -> Self {
        self.column_gap_threshold = gap;
        self
    }

    /// Check that thresholds are usable.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("extraction configuration without a name".to_string()));
        }
        self.row_tolerance.validate("row_tolerance", &self.name)?;
        self.column_gap_threshold.validate("column_gap_threshold", &self.name)?;
        if self.header_scan_rows == 0 {
            return Err(Error::Config(format!("{}: header_scan_rows must be at least 1", self.name)));
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::page_gap(DEFAULT_COLUMN_GAP, DEFAULT_ROW_TOLERANCE)
    }
}

/// The configurations tried on every page, in declaration order.
pub fn default_menu() -> Vec<ExtractionConfig> {
    vec![
        ExtractionConfig::page_gap(30.0, 5.0),
        ExtractionConfig::page_gap(20.0, 5.0),
        ExtractionConfig::page_gap(45.0, 5.0),
        ExtractionConfig::page_gap(30.0, 3.0),
        ExtractionConfig::document_gap(30.0, 5.0),
        ExtractionConfig::fixed(5.0),
    ]
}

/// Document-wide pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Extraction menu; earlier entries win ties
    pub menu: Vec<ExtractionConfig>,
    /// Page worker threads; 0 uses the available parallelism
    pub worker_threads: usize,
    /// Document language; detected from the file name when absent
    pub language: Option<Language>,
    /// Reject pages whose header sentinel cannot be found
    pub require_header: bool,
    /// Operator-supplied CID mappings
    pub overrides: CidOverrides,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            menu: default_menu(),
            worker_threads: 0,
            language: None,
            require_header: true,
            overrides: CidOverrides::new(),
        }
    }
}

impl PipelineConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; missing fields take defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the extraction menu.
    pub fn with_menu(mut self, menu: Vec<ExtractionConfig>) -> Self {
        self.menu = menu;
        self
    }

    /// Set the number of page workers.
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Fix the document language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Allow or reject header-less pages.
    pub fn with_require_header(mut self, require: bool) -> Self {
        self.require_header = require;
        self
    }

    /// Set the CID overrides.
    pub fn with_overrides(mut self, overrides: CidOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Number of workers to spawn for `pages` pages.
    pub fn effective_workers(&self, pages: usize) -> usize {
        let wanted = if self.worker_threads == 0 {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            self.worker_threads
        };
        wanted.min(pages).max(1)
    }

    /// Check the menu: non-empty, unique names, usable thresholds.
    pub fn validate(&self) -> Result<()> {
        if self.menu.is_empty() {
            return Err(Error::Config("extraction menu is empty".to_string()));
        }
        let mut names = HashSet::new();
        for config in &self.menu {
            config.validate()?;
            if !names.insert(config.name.as_str()) {
                return Err(Error::Config(format!("duplicate configuration name '{}'", config.name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_menu_names() {
        let names: Vec<String> = default_menu().into_iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "gap-30/tol-5",
                "gap-20/tol-5",
                "gap-45/tol-5",
                "gap-30/tol-3",
                "document-gap-30/tol-5",
                "fixed/tol-5",
            ]
        );
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let config = ExtractionConfig::default().with_row_tolerance(Length::units(0.0));
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ExtractionConfig::default().with_column_gap_threshold(Length::em(f32::NAN));
        assert!(config.validate().is_err());

        let config = ExtractionConfig::default().with_header_scan_rows(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let config = PipelineConfig::new()
            .with_menu(vec![ExtractionConfig::page_gap(30.0, 5.0), ExtractionConfig::page_gap(30.0, 5.0)]);
        assert!(config.validate().is_err());
        assert!(PipelineConfig::new().with_menu(Vec::new()).validate().is_err());
    }

    #[test]
    fn test_em_length_without_glyphs() {
        assert_eq!(Length::em(2.0).resolve(None), 24.0);
        assert_eq!(Length::em(2.0).resolve(Some(0.0)), 24.0);
    }

    #[test]
    fn test_effective_workers() {
        let config = PipelineConfig::new().with_worker_threads(8);
        assert_eq!(config.effective_workers(3), 3);
        assert_eq!(config.effective_workers(0), 1);
        assert!(PipelineConfig::new().effective_workers(100) >= 1);
    }

    #[test]
    fn test_from_path_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "language": "khmer",
                "worker_threads": 2,
                "menu": [
                    {{
                        "name": "tight",
                        "row_tolerance": {{"value": 0.3, "unit": "em"}},
                        "column_gap_threshold": {{"value": 25}},
                        "boundary_mode": "page_gap"
                    }}
                ],
                "overrides": {{"*": {{"545": "្ស"}}}}
            }}"#
        )
        .unwrap();

        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.language, Some(Language::Khmer));
        assert_eq!(config.worker_threads, 2);
        assert!(config.require_header);
        assert_eq!(config.menu.len(), 1);
        assert_eq!(config.menu[0].row_tolerance, Length::em(0.3));
        assert_eq!(config.menu[0].column_gap_threshold, Length::units(25.0));
        assert_eq!(config.menu[0].header_scan_rows, DEFAULT_HEADER_SCAN_ROWS);
        assert_eq!(config.overrides.len(), 1);
    }
}
