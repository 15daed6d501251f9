//! Canonical column roles and document languages.

use crate::error::{Error, Result};
use crate::schema::script::Script;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic role of a glossary column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Record number
    Number,
    /// Japanese term
    Word,
    /// Hiragana reading of the term
    Reading,
    /// Term in the document language
    Translation,
    /// Explanatory note
    Note,
    /// Example sentence
    Example,
    /// Sign or picture column
    SignImage,
}

impl ColumnRole {
    /// Field name used in serialized records.
    pub fn field_name(&self) -> &'static str {
        match self {
            ColumnRole::Number => "number",
            ColumnRole::Word => "word",
            ColumnRole::Reading => "reading",
            ColumnRole::Translation => "translation",
            ColumnRole::Note => "note",
            ColumnRole::Example => "example",
            ColumnRole::SignImage => "sign_image",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Language a glossary is written in (besides Japanese).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// English
    English,
    /// Tagalog
    Tagalog,
    /// Khmer (Cambodian)
    Khmer,
    /// Simplified Chinese
    Chinese,
    /// Indonesian
    Indonesian,
    /// Burmese
    Myanmar,
    /// Thai
    Thai,
    /// Vietnamese
    Vietnamese,
    /// Japanese-only glossary
    Japanese,
}

/// File name fragments identifying each language, Japanese names first.
const FILE_NAME_HINTS: &[(&str, Language)] = &[
    ("英語", Language::English),
    ("タガログ", Language::Tagalog),
    ("カンボジア", Language::Khmer),
    ("クメール", Language::Khmer),
    ("中国語", Language::Chinese),
    ("インドネシア", Language::Indonesian),
    ("ミャンマー", Language::Myanmar),
    ("タイ", Language::Thai),
    ("ベトナム", Language::Vietnamese),
    ("english", Language::English),
    ("tagalog", Language::Tagalog),
    ("filipino", Language::Tagalog),
    ("khmer", Language::Khmer),
    ("cambodia", Language::Khmer),
    ("chinese", Language::Chinese),
    ("indonesia", Language::Indonesian),
    ("myanmar", Language::Myanmar),
    ("burmese", Language::Myanmar),
    ("thai", Language::Thai),
    ("vietnam", Language::Vietnamese),
    ("日本語", Language::Japanese),
    ("japanese", Language::Japanese),
];

impl Language {
    /// Every supported language.
    pub const ALL: [Language; 9] = [
        Language::English,
        Language::Tagalog,
        Language::Khmer,
        Language::Chinese,
        Language::Indonesian,
        Language::Myanmar,
        Language::Thai,
        Language::Vietnamese,
        Language::Japanese,
    ];

    /// Detect the language from a document file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use glossary_extract::schema::Language;
    ///
    /// assert_eq!(Language::from_file_name("用語集_カンボジア語.pdf"), Some(Language::Khmer));
    /// assert_eq!(Language::from_file_name("Glossary-Vietnamese.pdf"), Some(Language::Vietnamese));
    /// assert_eq!(Language::from_file_name("glossary.pdf"), None);
    /// ```
    pub fn from_file_name(name: &str) -> Option<Language> {
        let lower = name.to_lowercase();
        FILE_NAME_HINTS
            .iter()
            .find(|(hint, _)| lower.contains(hint))
            .map(|(_, language)| *language)
    }

    /// Script the language's translations are written in.
    pub fn script(&self) -> Script {
        match self {
            Language::English | Language::Tagalog | Language::Indonesian | Language::Vietnamese => {
                Script::Latin
            },
            Language::Khmer => Script::Khmer,
            Language::Chinese | Language::Japanese => Script::Han,
            Language::Myanmar => Script::Myanmar,
            Language::Thai => Script::Thai,
        }
    }

    /// Lowercase English name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Tagalog => "tagalog",
            Language::Khmer => "khmer",
            Language::Chinese => "chinese",
            Language::Indonesian => "indonesian",
            Language::Myanmar => "myanmar",
            Language::Thai => "thai",
            Language::Vietnamese => "vietnamese",
            Language::Japanese => "japanese",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.name() == lower)
            .or_else(|| Language::from_file_name(&lower))
            .ok_or_else(|| Error::Config(format!("unknown language '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_name_japanese_names() {
        assert_eq!(Language::from_file_name("建設用語集（英語版）.pdf"), Some(Language::English));
        assert_eq!(Language::from_file_name("タガログ語.pdf"), Some(Language::Tagalog));
        assert_eq!(Language::from_file_name("中国語.pdf"), Some(Language::Chinese));
        assert_eq!(Language::from_file_name("タイ語.pdf"), Some(Language::Thai));
        assert_eq!(Language::from_file_name("ミャンマー語.pdf"), Some(Language::Myanmar));
    }

    #[test]
    fn test_from_file_name_is_case_insensitive() {
        assert_eq!(Language::from_file_name("THAI.pdf"), Some(Language::Thai));
        assert_eq!(Language::from_file_name("Indonesian_glossary.PDF"), Some(Language::Indonesian));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Khmer".parse::<Language>().unwrap(), Language::Khmer);
        assert_eq!("カンボジア".parse::<Language>().unwrap(), Language::Khmer);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_script() {
        assert_eq!(Language::Vietnamese.script(), Script::Latin);
        assert_eq!(Language::Khmer.script(), Script::Khmer);
        assert_eq!(Language::Chinese.script(), Script::Han);
    }

    #[test]
    fn test_role_serde_names() {
        assert_eq!(serde_json::to_string(&ColumnRole::SignImage).unwrap(), "\"sign_image\"");
        assert_eq!(ColumnRole::Translation.to_string(), "translation");
    }
}
