//! Header rule tables.
//!
//! Each language has an ordered list of header patterns observed in its
//! glossary, including the spelling variants that PDF text extraction
//! produces for complex scripts (split clusters, stray spaces, unresolved
//! placeholders). The first matching rule wins.

use crate::schema::role::ColumnRole::{
    Example, Note, Number, Reading, SignImage, Translation, Word,
};
use crate::schema::role::{ColumnRole, Language};
use regex::Regex;

/// How a rule's text is compared with a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Trimmed header equals the text
    Exact(&'static str),
    /// Lowercased header contains the (lowercase) text
    Contains(&'static str),
    /// Equal after removing `(cid:N)` placeholders and whitespace from both
    Placeholder(&'static str),
}

impl Pattern {
    /// Whether a header matches this pattern.
    pub fn matches(&self, header: &str) -> bool {
        match self {
            Pattern::Exact(text) => header.trim() == *text,
            Pattern::Contains(text) => header.to_lowercase().contains(text),
            Pattern::Placeholder(text) => {
                let squashed = squash(header);
                !squashed.is_empty() && squashed == squash(text)
            },
        }
    }
}

/// A header pattern and the role it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Pattern to match
    pub pattern: Pattern,
    /// Role of a matching column
    pub role: ColumnRole,
}

const fn exact(text: &'static str, role: ColumnRole) -> Rule {
    Rule {
        pattern: Pattern::Exact(text),
        role,
    }
}

const fn loose(text: &'static str, role: ColumnRole) -> Rule {
    Rule {
        pattern: Pattern::Placeholder(text),
        role,
    }
}

const fn contains(text: &'static str, role: ColumnRole) -> Rule {
    Rule {
        pattern: Pattern::Contains(text),
        role,
    }
}

static JAPANESE_RULES: &[Rule] = &[
    exact("番号", Number),
    exact("単語", Word),
    exact("読み方（ひらがな）", Reading),
    exact("翻訳", Translation),
    exact("備考", Note),
    exact("例文", Example),
    exact("写真", SignImage),
    exact("標識", SignImage),
];

static ENGLISH_RULES: &[Rule] = &[
    exact("Word/Phrase", Word),
    exact("Translation", Translation),
    exact("How to read (Hiragana)", Reading),
    exact("Note", Note),
    exact("Example", Example),
    exact("Picture", SignImage),
    exact("Sign", SignImage),
];

static TAGALOG_RULES: &[Rule] = &[
    exact("Talasalitaan", Word),
    exact("Pagsasalin", Translation),
    exact("Paano Magbasa", Reading),
    exact("Annotasyon", Note),
    exact("Halimbawa", Example),
    exact("Larawan", SignImage),
    exact("Palatandaan", SignImage),
];

static KHMER_RULES: &[Rule] = &[
    loose("វាក្យសព្ទ", Word),
    loose("វាកយសពទ", Word),
    loose("វាកយសព្ទ", Word),
    loose("វាក្យសពទ", Word),
    loose("វាក្យសព្ា", Word),
    loose("(cid:700)ក(cid:679)សព(cid:635)", Word),
    loose("ការបកប្រែ", Translation),
    loose("កា បក្ប្រប", Translation),
    loose("កា បកដរប", Translation),
    loose("កា បកប្រប", Translation),
    loose("កា បក្ប្គ្ប", Translation),
    loose("កា បក្ប្្ប", Translation),
    loose("កា រក្ប្ប្រ", Translation),
    loose("(cid:535)របកែ(cid:688)ប", Translation),
    loose("របៀបអាន", Reading),
    loose("មបៀបអាន", Reading),
    loose("មរៀរអាន", Reading),
    loose("រេប(cid:827)ប(cid:738)ន", Reading),
    loose("ចាំណា ពនយល់", Note),
    loose("ចំណា ពនយល់", Note),
    loose("ចំណា ព្នយល់", Note),
    loose("ច្ំណា ពនយល់", Note),
    loose("ច្ំណា ព្នយល់", Note),
    loose("ចំ(cid:622)រពន(cid:679)ល់", Note),
    loose("ឧទាហរណ៍", Example),
    loose("ឧទាហ ណ៍", Example),
    loose("ឧទាហ ណ្៍", Example),
    loose("ឧទាហ្ ណ៍", Example),
    loose("ឧ(cid:637)ហរណ៍", Example),
    loose("រូបភាព", SignImage),
    loose("សញ្ញា", SignImage),
];

static CHINESE_RULES: &[Rule] = &[
    exact("词汇", Word),
    exact("中文词意", Translation),
    loose("读音 （假名）", Reading),
    exact("注解", Note),
    exact("例句", Example),
    exact("照片", SignImage),
    exact("标识", SignImage),
];

static INDONESIAN_RULES: &[Rule] = &[
    exact("Kosakata", Word),
    exact("Terjemahan", Translation),
    exact("Cara membaca (Hiragana)", Reading),
    exact("Anotasi", Note),
    exact("Annotasyon", Note),
    exact("Contoh", Example),
    exact("Foto", SignImage),
    exact("Tanda", SignImage),
];

static MYANMAR_RULES: &[Rule] = &[
    loose("ခ ေါဟာရ", Word),
    loose("ဘာသာ ြန ဆ ို ခင်း", Translation),
    loose("စာဖတန ည်း", Reading),
    loose("မှတခ ျက", Note),
    loose("ဥြမာ", Example),
    loose("အမှတအ သာ်း/ဆငို ်း ဘတို", SignImage),
];

static THAI_RULES: &[Rule] = &[
    loose("ศพั ท์", Word),
    loose("ศพ ัท์", Word),
    loose("ศัพท์", Word),
    loose("คา แปล", Translation),
    loose("คำแปล", Translation),
    loose("อา่ นวา่", Reading),
    loose("วธิ ก ีารอา่ น", Reading),
    loose("วธิ ก ีำรอำ่ น", Reading),
    loose("วิธกีารอ่าน", Reading),
    loose("ความคดิ เห็น", Note),
    loose("ความคิดเห็น", Note),
    loose("ควำมคดิ เห็น", Note),
    loose("หมายเหตุ", Note),
    loose("เหตผุ ล", Note),
    loose("เหตุผล", Note),
    loose("ตว ัอย่าง", Example),
    loose("ตวั อยา่ ง", Example),
    loose("ตวัอย่าง", Example),
    loose("รปู ภาพ", SignImage),
    loose("รูปภาพ", SignImage),
    loose("เครอื่ งหมาย", SignImage),
];

static VIETNAMESE_RULES: &[Rule] = &[
    exact("Từ vựng", Word),
    exact("Dịch", Translation),
    exact("Cách đọc (Hiragana)", Reading),
    exact("Chú thích", Note),
    exact("Ví dụ câu", Example),
    exact("Ảnh", SignImage),
    exact("Biển báo", SignImage),
];

/// Cross-script tokens tried when no language rule matches.
///
/// Order matters: `How to read (Hiragana)` must hit Reading before anything
/// else could claim it.
pub static GENERIC_RULES: &[Rule] = &[
    contains("hiragana", Reading),
    contains("ひらがな", Reading),
    contains("読み", Reading),
    contains("reading", Reading),
    contains("example", Example),
    contains("例文", Example),
    contains("note", Note),
    contains("annotation", Note),
    contains("備考", Note),
    contains("translation", Translation),
    contains("meaning", Translation),
    contains("翻訳", Translation),
    contains("word", Word),
    contains("vocabulary", Word),
    contains("単語", Word),
    contains("picture", SignImage),
    contains("photo", SignImage),
    contains("image", SignImage),
    contains("sign", SignImage),
    contains("写真", SignImage),
    contains("標識", SignImage),
];

impl Language {
    /// Header rules for this language, most specific first.
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            Language::English => ENGLISH_RULES,
            Language::Tagalog => TAGALOG_RULES,
            Language::Khmer => KHMER_RULES,
            Language::Chinese => CHINESE_RULES,
            Language::Indonesian => INDONESIAN_RULES,
            Language::Myanmar => MYANMAR_RULES,
            Language::Thai => THAI_RULES,
            Language::Vietnamese => VIETNAMESE_RULES,
            Language::Japanese => JAPANESE_RULES,
        }
    }
}

/// Remove `(cid:N)` placeholders and all whitespace.
pub fn squash(text: &str) -> String {
    strip_placeholders(text).chars().filter(|c| !c.is_whitespace()).collect()
}

/// Remove `(cid:N)` placeholders.
pub fn strip_placeholders(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref CID_RE: Regex = Regex::new(r"\(cid:\d+\)").unwrap();
    }
    CID_RE.replace_all(text, "").into_owned()
}

/// Number of `(cid:N)` placeholders in a text.
pub fn placeholder_count(text: &str) -> usize {
    lazy_static::lazy_static! {
        static ref CID_RE: Regex = Regex::new(r"\(cid:\d+\)").unwrap();
    }
    CID_RE.find_iter(text).count()
}
