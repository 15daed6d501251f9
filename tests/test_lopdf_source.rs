//! Extraction from real PDF bytes through the lopdf glyph source.

#![cfg(feature = "pdf")]

use glossary_extract::layout::GlyphCode;
use glossary_extract::pipeline::{DocumentPipeline, PipelineConfig};
use glossary_extract::schema::Language;
use glossary_extract::source::{GlyphSource, LopdfSource};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use std::path::Path;

fn show_simple(x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("Tf", vec!["F1".into(), 10.into()]),
        Operation::new("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()]),
        Operation::new("Tj", vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)]),
    ]
}

fn show_cids(x: i64, y: i64, cids: &[u16]) -> Vec<Operation> {
    let bytes: Vec<u8> = cids.iter().flat_map(|c| c.to_be_bytes()).collect();
    vec![
        Operation::new("Tf", vec!["F2".into(), 10.into()]),
        Operation::new("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()]),
        Operation::new("Tj", vec![Object::String(bytes, StringFormat::Hexadecimal)]),
    ]
}

/// A one-page English glossary: Latin text in Helvetica, Japanese terms in a
/// composite font whose ToUnicode knows CIDs 1 and 2 but not 545.
fn write_glossary(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "FirstChar" => 32,
        "Widths" => Object::Array(vec![Object::Integer(250); 95]),
    });
    let to_unicode = doc.add_object(Stream::new(
        Dictionary::new(),
        b"2 beginbfchar\n<0001> <8DB3>\n<0002> <5834>\nendbfchar".to_vec(),
    ));
    let descendant = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "KozMinPro",
        "DW" => 1000,
    });
    let composite = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "KozMinPro",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Reference(descendant)],
        "ToUnicode" => Object::Reference(to_unicode),
    });

    let mut operations = vec![Operation::new("BT", vec![])];
    operations.extend(show_simple(40, 760, "Glossary"));
    operations.extend(show_simple(40, 700, "No."));
    operations.extend(show_simple(100, 700, "Word"));
    operations.extend(show_simple(200, 700, "Translation"));
    operations.extend(show_simple(40, 680, "1"));
    operations.extend(show_cids(100, 680, &[1, 2]));
    operations.extend(show_simple(200, 680, "scaffold"));
    operations.extend(show_simple(40, 660, "2"));
    operations.extend(show_cids(100, 660, &[2]));
    operations.extend(show_simple(200, 660, "a"));
    operations.extend(show_cids(210, 660, &[545]));
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "Contents" => Object::Reference(content_id),
        "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ]),
        "Resources" => dictionary! {
            "Font" => dictionary! {
                "F1" => Object::Reference(helvetica),
                "F2" => Object::Reference(composite),
            },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(path).unwrap();
}

#[test]
fn test_glyphs_from_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glossary_english.pdf");
    write_glossary(&path);

    let source = LopdfSource::open(&path).unwrap();
    assert_eq!(source.page_count(), 1);

    let glyphs = source.page_glyphs(0).unwrap();
    let terms: Vec<&GlyphCode> = glyphs
        .iter()
        .filter(|g| g.font.as_str() != glyphs[0].font.as_str())
        .map(|g| &g.code)
        .collect();
    assert_eq!(
        terms,
        vec![
            &GlyphCode::Text("足".to_string()),
            &GlyphCode::Text("場".to_string()),
            &GlyphCode::Text("場".to_string()),
            &GlyphCode::Cid(545),
        ]
    );
}

#[test]
fn test_pipeline_over_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glossary_english.pdf");
    write_glossary(&path);

    let pipeline = DocumentPipeline::new(PipelineConfig::default()).unwrap();
    let language = pipeline.language_for("glossary_english.pdf").unwrap();
    let source = LopdfSource::open(&path).unwrap();
    let report = pipeline.run(&source, language).unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].number, "1");
    assert_eq!(report.records[0].word, "足場");
    assert_eq!(report.records[0].translation, "scaffold");
    assert_eq!(report.records[1].word, "場");
    assert_eq!(report.records[1].translation, "a(cid:545)");
    assert_eq!(report.unresolved.occurrences.get(&545), Some(&1));
    assert!(report.unrepairable_fonts.is_empty());
}

#[test]
fn test_open_garbage_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    std::fs::write(&path, b"not a pdf at all").unwrap();
    assert!(LopdfSource::open(&path).is_err());
}

#[test]
fn test_cmap_built_once_per_font() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glossary_english.pdf");
    write_glossary(&path);

    let source = LopdfSource::open(&path).unwrap();
    let pipeline = DocumentPipeline::new(PipelineConfig::default().with_worker_threads(2)).unwrap();
    let report = pipeline.run(&source, Language::English).unwrap();
    assert_eq!(report.records.len(), 2);

    // Only the composite font has a ToUnicode stream; decoding pages and
    // repairing CID 545 share its single entry
    let cache = source.font_cache().unwrap();
    assert_eq!(cache.builds(), 1);
    assert_eq!(cache.len(), 1);

    pipeline.run(&source, Language::English).unwrap();
    assert_eq!(cache.builds(), 1);
}
