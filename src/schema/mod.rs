//! Canonical glossary schema.
//!
//! Headers in each language edition are matched against static rule tables;
//! columns with unreadable headers are classified by the script of their
//! values.

mod reconciler;
mod role;
mod rules;
mod script;

pub use reconciler::{
    header_unreadable, merge_columns, CanonicalRecord, SchemaReconciler, SIGN_IMAGE_KEY,
};
pub use role::{ColumnRole, Language};
pub use rules::{placeholder_count, squash, strip_placeholders, Pattern, Rule, GENERIC_RULES};
pub use script::{Script, ScriptHistogram};
