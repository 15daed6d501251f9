//! Mapping of ad hoc table headers onto canonical glossary records.

use crate::layout::{is_header_sentinel, Cell, Table};
use crate::schema::role::{ColumnRole, Language};
use crate::schema::rules::{placeholder_count, squash, GENERIC_RULES};
use crate::schema::script::{Script, ScriptHistogram};
use indexmap::IndexMap;
use serde::Serialize;

/// Rows sampled when classifying a column by its values.
const SAMPLE_ROWS: usize = 20;

/// Extras key for sign and picture columns.
pub const SIGN_IMAGE_KEY: &str = "sign_image";

/// A normalized glossary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    /// Language of the source document
    pub language: Language,
    /// Page index (0-based) the record came from
    pub page: usize,
    /// Record number as printed
    pub number: String,
    /// Japanese term
    pub word: String,
    /// Hiragana reading
    pub reading: String,
    /// Term in the document language
    pub translation: String,
    /// Explanatory note
    pub note: String,
    /// Example sentence
    pub example: String,
    /// Sign/picture values and unclassified columns, keyed by header text
    pub extras: IndexMap<String, String>,
}

impl CanonicalRecord {
    /// Value of a role other than `SignImage`, which lives in `extras`.
    pub fn field(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Number => Some(&self.number),
            ColumnRole::Word => Some(&self.word),
            ColumnRole::Reading => Some(&self.reading),
            ColumnRole::Translation => Some(&self.translation),
            ColumnRole::Note => Some(&self.note),
            ColumnRole::Example => Some(&self.example),
            ColumnRole::SignImage => self.extras.get(SIGN_IMAGE_KEY).map(String::as_str),
        }
    }
}

/// Whether a header can't be classified by its text: nothing left after
/// removing placeholders and whitespace, or more placeholders than readable
/// characters.
pub fn header_unreadable(header: &str) -> bool {
    let readable = squash(header).chars().count();
    readable == 0 || placeholder_count(header) > readable
}

/// Merge same-role columns row by row: the first non-empty value, left to
/// right, wins.
///
/// # Examples
///
/// ```
/// use glossary_extract::schema::merge_columns;
///
/// let a = vec!["".to_string(), "x".to_string()];
/// let b = vec!["y".to_string(), "".to_string()];
/// assert_eq!(merge_columns(&[a, b]), vec!["y", "x"]);
/// ```
pub fn merge_columns(columns: &[Vec<String>]) -> Vec<String> {
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    (0..rows)
        .map(|i| first_non_empty(columns.iter().filter_map(|c| c.get(i).map(String::as_str))))
        .collect()
}

fn first_non_empty<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Classifies columns and builds canonical records for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaReconciler {
    language: Language,
}

impl SchemaReconciler {
    /// Create a reconciler for a document language.
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Language the reconciler was built for.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Classify a header by its text.
    ///
    /// Tries the record-number sentinels, then the language's rules, then
    /// the generic cross-script tokens.
    pub fn classify_header(&self, header: &str) -> Option<ColumnRole> {
        if is_header_sentinel(header) {
            return Some(ColumnRole::Number);
        }
        self.language
            .rules()
            .iter()
            .chain(GENERIC_RULES.iter())
            .find(|rule| rule.pattern.matches(header))
            .map(|rule| rule.role)
    }

    /// Classify a column by the dominant script of its values.
    ///
    /// Unresolved `(cid:N)` glyphs count toward the document language's
    /// script; in Japanese documents they are ignored, so a column of
    /// nothing but markers stays unclassified and lands in extras.
    pub fn classify_values<'a>(&self, values: impl IntoIterator<Item = &'a str>) -> Option<ColumnRole> {
        let mut histogram = ScriptHistogram::from_values(values);
        if self.language != Language::Japanese {
            histogram.credit_placeholders(self.language.script());
        }
        let dominant = histogram.dominant()?;
        match dominant {
            Script::Digit => Some(ColumnRole::Number),
            Script::Hiragana => Some(ColumnRole::Reading),
            s if s == self.language.script()
                && self.language != Language::Japanese
                && !(s == Script::Han && histogram.has_kana()) =>
            {
                Some(ColumnRole::Translation)
            },
            Script::Han | Script::Katakana => Some(ColumnRole::Word),
            _ => None,
        }
    }

    /// Role of every column of a table, `None` for unclassified columns.
    ///
    /// Readable headers are classified by text; unreadable (or missing)
    /// headers fall back to the script of the column's values.
    pub fn column_roles(&self, table: &Table) -> Vec<Option<ColumnRole>> {
        table
            .header_texts()
            .iter()
            .enumerate()
            .map(|(i, header)| {
                if header_unreadable(header) {
                    let role = self.classify_values(sample_column(table, i).iter().map(String::as_str));
                    log::trace!(
                        "Page {}: unreadable header {:?} in column {} classified as {:?}",
                        table.page,
                        header,
                        i,
                        role
                    );
                    role
                } else {
                    self.classify_header(header)
                }
            })
            .collect()
    }

    /// Index of the column holding translations.
    ///
    /// The header classifier is consulted first; when no header reads as a
    /// translation, the first column whose values look like the document
    /// language is used.
    pub fn translation_column(&self, table: &Table) -> Option<usize> {
        let headers = table.header_texts();
        headers
            .iter()
            .position(|h| {
                !header_unreadable(h) && self.classify_header(h) == Some(ColumnRole::Translation)
            })
            .or_else(|| {
                (0..table.column_count()).find(|&i| {
                    self.classify_values(sample_column(table, i).iter().map(String::as_str))
                        == Some(ColumnRole::Translation)
                })
            })
    }

    /// Build one canonical record per data row.
    pub fn reconcile(&self, table: &Table) -> Vec<CanonicalRecord> {
        let roles = self.column_roles(table);
        let headers = table.header_texts();

        let mut groups: IndexMap<ColumnRole, Vec<usize>> = IndexMap::new();
        let mut extras: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, role) in roles.iter().enumerate() {
            match role {
                Some(ColumnRole::SignImage) => {
                    extras.entry(SIGN_IMAGE_KEY.to_string()).or_default().push(i)
                },
                Some(role) => groups.entry(*role).or_default().push(i),
                None if headers[i].is_empty() && table.column(i).all(Cell::is_blank) => {},
                None => {
                    let key = if headers[i].is_empty() {
                        format!("column_{}", i + 1)
                    } else {
                        headers[i].clone()
                    };
                    extras.entry(key).or_default().push(i);
                },
            }
        }

        log::debug!(
            "Page {} ({}): {} columns, roles {:?}",
            table.page,
            self.language,
            roles.len(),
            roles
        );

        table
            .rows
            .iter()
            .map(|row| {
                let texts: Vec<String> = row.iter().map(|c| c.text()).collect();
                let pick = |columns: &[usize]| {
                    first_non_empty(columns.iter().filter_map(|&i| texts.get(i).map(String::as_str)))
                };
                let field = |role: ColumnRole| groups.get(&role).map(|c| pick(c.as_slice())).unwrap_or_default();

                CanonicalRecord {
                    language: self.language,
                    page: table.page,
                    number: field(ColumnRole::Number),
                    word: field(ColumnRole::Word),
                    reading: field(ColumnRole::Reading),
                    translation: field(ColumnRole::Translation),
                    note: field(ColumnRole::Note),
                    example: field(ColumnRole::Example),
                    extras: extras.iter().map(|(key, columns)| (key.clone(), pick(columns.as_slice()))).collect(),
                }
            })
            .collect()
    }
}

fn sample_column(table: &Table, index: usize) -> Vec<String> {
    table.column(index).take(SAMPLE_ROWS).map(|c| c.text()).collect()
}
