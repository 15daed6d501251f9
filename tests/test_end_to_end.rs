//! End-to-end extraction over in-memory glyph sources.
//!
//! Covers the full path: row clustering, gap boundaries, header location,
//! strategy selection, CID repair and schema reconciliation.

use glossary_extract::geometry::Rect;
use glossary_extract::layout::{FontId, Glyph};
use glossary_extract::pipeline::{DocumentPipeline, PipelineConfig};
use glossary_extract::schema::Language;
use glossary_extract::sink::{JsonLinesSink, RecordSink};
use glossary_extract::source::MemorySource;
use glossary_extract::CidOverrides;

fn text(text: &str, x: f32, y: f32) -> Glyph {
    Glyph::text(text, Rect::new(x, y, x + 5.0, y + 10.0), FontId::new("F1"), 10.0)
}

fn cid(cid: u32, x: f32, y: f32, font: &str) -> Glyph {
    Glyph::cid(cid, Rect::new(x, y, x + 5.0, y + 10.0), FontId::new(font), 10.0)
}

/// The Khmer page: header at y=100, one record at y=200 whose translation
/// contains CID 545 between Khmer text.
fn khmer_page() -> Vec<Glyph> {
    vec![
        text("No.", 10.0, 100.0),
        text("単語", 60.0, 100.0),
        text("ការបកប្រែ", 150.0, 100.0),
        text("1", 10.0, 200.0),
        text("足場", 60.0, 200.0),
        text("ស", 150.0, 200.0),
        cid(545, 155.0, 200.0, "F9"),
        text("្សែ", 160.0, 200.0),
    ]
}

#[test]
fn test_scenario_header_and_one_record() {
    let mut source = MemorySource::new();
    source.add_page(vec![
        text("Construction glossary", 10.0, 40.0),
        text("No.", 10.0, 100.0),
        text("Word/Phrase", 61.0, 100.0),
        text("Translation", 150.0, 100.0),
        text("1", 10.0, 200.0),
        text("足場", 60.0, 200.0),
        text("scaffold", 151.0, 200.0),
    ]);

    let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
    let report = pipeline.run(&source, Language::English).unwrap();

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.number, "1");
    assert_eq!(record.word, "足場");
    assert_eq!(record.translation, "scaffold");
    assert_eq!(record.page, 0);
    assert_eq!(report.pages[0].config.as_deref(), Some("gap-30/tol-5"));
    assert!(report.unresolved.is_empty());
}

#[test]
fn test_unresolved_cid_keeps_marker() {
    let mut source = MemorySource::new();
    source.add_page(khmer_page());

    let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
    let report = pipeline.run(&source, Language::Khmer).unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].translation, "ស(cid:545)្សែ");
    assert_eq!(report.unresolved.occurrences.get(&545), Some(&1));
    assert_eq!(report.unresolved.cells_affected, 1);
    assert_eq!(report.unrepairable_fonts.len(), 1);
    assert_eq!(report.unrepairable_fonts[0].0, FontId::new("F9"));
}

#[test]
fn test_unresolved_translation_under_unreadable_header() {
    let mut source = MemorySource::new();
    source.add_page(vec![
        text("No.", 10.0, 100.0),
        text("単語", 60.0, 100.0),
        cid(1201, 150.0, 100.0, "F9"),
        cid(1302, 155.0, 100.0, "F9"),
        text("1", 10.0, 200.0),
        text("足場", 60.0, 200.0),
        cid(1545, 150.0, 200.0, "F9"),
        cid(1546, 155.0, 200.0, "F9"),
        text("ក", 160.0, 200.0),
    ]);

    let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
    let report = pipeline.run(&source, Language::Khmer).unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].number, "1");
    assert_eq!(report.records[0].word, "足場");
    assert_eq!(report.records[0].translation, "(cid:1545)(cid:1546)ក");
    assert!(report.records[0].extras.is_empty());
    assert_eq!(report.pages[0].score.map(|s| s.translation_fill_ratio), Some(1.0));
}

#[test]
fn test_cid_repaired_from_font_cmap() {
    let mut source = MemorySource::new();
    source.add_page(khmer_page());
    source.add_cmap("F9", b"1 beginbfchar\n<0221> <17D2179F>\nendbfchar".to_vec());

    let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
    let report = pipeline.run(&source, Language::Khmer).unwrap();

    assert_eq!(report.records[0].translation, "ស្ស្សែ");
    assert!(report.unresolved.is_empty());
    assert!(report.unrepairable_fonts.is_empty());
}

#[test]
fn test_cid_repaired_from_overrides() {
    let mut source = MemorySource::new();
    source.add_page(khmer_page());

    let overrides = CidOverrides::from_json(r#"{"*": {"545": "ា"}}"#).unwrap();
    let config = PipelineConfig::default().with_overrides(overrides);
    let report = DocumentPipeline::new(config).unwrap().run(&source, Language::Khmer).unwrap();

    assert_eq!(report.records[0].translation, "សា្សែ");
    assert!(report.unresolved.is_empty());
}

#[test]
fn test_multi_page_document_to_json_lines() {
    let mut source = MemorySource::new();
    for page in 0..3 {
        let number = (page + 1).to_string();
        source.add_page(vec![
            text("番号", 10.0, 100.0),
            text("単語", 60.0, 100.0),
            text("読み方（ひらがな）", 150.0, 100.0),
            text("Dịch", 300.0, 100.0),
            text(&number, 10.0, 200.0),
            text("安全帯", 60.0, 200.0),
            text("あんぜんたい", 150.0, 200.0),
            text("dây an toàn", 300.0, 200.0),
        ]);
    }

    let pipeline = DocumentPipeline::new(PipelineConfig::default().with_worker_threads(2)).unwrap();
    let report = pipeline.run(&source, Language::Vietnamese).unwrap();
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.records[2].number, "3");
    assert_eq!(report.records[0].reading, "あんぜんたい");
    assert_eq!(report.records[0].translation, "dây an toàn");

    let file = tempfile::NamedTempFile::new().unwrap();
    let mut sink = JsonLinesSink::new(file.reopen().unwrap());
    report.write_records(&mut sink).unwrap();
    assert_eq!(sink.written(), 3);

    let written = std::fs::read_to_string(file.path()).unwrap();
    let pages: Vec<u64> = written
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap())
        .map(|value| value["page"].as_u64().unwrap())
        .collect();
    assert_eq!(pages, vec![0, 1, 2]);
}

#[test]
fn test_header_less_pages_allowed() {
    let mut source = MemorySource::new();
    source.add_page(vec![
        text("7", 10.0, 200.0),
        text("足場", 60.0, 200.0),
        text("あしば", 150.0, 200.0),
        text("scaffold", 300.0, 200.0),
    ]);

    let strict = DocumentPipeline::new(PipelineConfig::default()).unwrap();
    assert!(strict.run(&source, Language::English).unwrap().records.is_empty());

    let lenient =
        DocumentPipeline::new(PipelineConfig::default().with_require_header(false)).unwrap();
    let report = lenient.run(&source, Language::English).unwrap();
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].number, "7");
    assert_eq!(report.records[0].reading, "あしば");
    assert_eq!(report.records[0].translation, "scaffold");
}
