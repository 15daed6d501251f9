//! Unicode script classification used when headers are unreadable.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Writing systems that occur in glossary columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    /// ASCII digits
    Digit,
    /// Latin letters, including Vietnamese and Tagalog diacritics
    Latin,
    /// Hiragana
    Hiragana,
    /// Katakana
    Katakana,
    /// CJK ideographs (kanji / hanzi)
    Han,
    /// Thai
    Thai,
    /// Khmer
    Khmer,
    /// Myanmar
    Myanmar,
}

impl Script {
    const ALL: [Script; 8] = [
        Script::Digit,
        Script::Latin,
        Script::Hiragana,
        Script::Katakana,
        Script::Han,
        Script::Thai,
        Script::Khmer,
        Script::Myanmar,
    ];

    /// Script of a character, `None` for punctuation, spaces, marks and
    /// anything outside the tracked blocks.
    pub fn of(c: char) -> Option<Script> {
        match c as u32 {
            0x30..=0x39 => Some(Script::Digit),
            0x41..=0x5A | 0x61..=0x7A => Some(Script::Latin),
            0xC0..=0x24F | 0x1E00..=0x1EFF => {
                if c == '\u{D7}' || c == '\u{F7}' {
                    None
                } else {
                    Some(Script::Latin)
                }
            },
            0x3041..=0x309F => Some(Script::Hiragana),
            0x30A0..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F => Some(Script::Katakana),
            0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2FA1F => {
                Some(Script::Han)
            },
            0x0E00..=0x0E7F => Some(Script::Thai),
            0x1780..=0x17FF | 0x19E0..=0x19FF => Some(Script::Khmer),
            0x1000..=0x109F | 0xA9E0..=0xA9FF | 0xAA60..=0xAA7F => Some(Script::Myanmar),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-script character counts over a set of values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptHistogram {
    counts: [usize; 8],
    placeholders: usize,
}

impl ScriptHistogram {
    /// Count the characters of every value.
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut histogram = Self::default();
        for value in values {
            histogram.add(value);
        }
        histogram
    }

    /// Count the characters of one value.
    ///
    /// `(cid:N)` markers are counted as placeholders; their letters and
    /// digits never reach the script counts.
    pub fn add(&mut self, text: &str) {
        lazy_static::lazy_static! {
            static ref CID_RE: Regex = Regex::new(r"\(cid:\d+\)").unwrap();
        }

        let mut rest = 0;
        for marker in CID_RE.find_iter(text) {
            self.placeholders += 1;
            self.count_chars(&text[rest..marker.start()]);
            rest = marker.end();
        }
        self.count_chars(&text[rest..]);
    }

    fn count_chars(&mut self, text: &str) {
        for script in text.chars().filter_map(Script::of) {
            self.counts[script.index()] += 1;
        }
    }

    /// Unresolved glyph markers seen.
    pub fn placeholders(&self) -> usize {
        self.placeholders
    }

    /// Attribute every placeholder to `script`.
    ///
    /// Unresolved glyphs come from the document's own script fonts, so the
    /// caller credits them to the script it expects.
    pub fn credit_placeholders(&mut self, script: Script) {
        self.counts[script.index()] += self.placeholders;
        self.placeholders = 0;
    }

    /// Characters counted for a script.
    pub fn count(&self, script: Script) -> usize {
        self.counts[script.index()]
    }

    /// Total characters counted.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Most frequent script; ties go to the script declared first.
    pub fn dominant(&self) -> Option<Script> {
        Script::ALL
            .iter()
            .copied()
            .filter(|s| self.count(*s) > 0)
            .max_by_key(|s| (self.count(*s), std::cmp::Reverse(s.index())))
    }

    /// Whether any kana was seen.
    pub fn has_kana(&self) -> bool {
        self.count(Script::Hiragana) + self.count(Script::Katakana) > 0
    }
}
