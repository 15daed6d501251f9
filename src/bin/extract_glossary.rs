//! Extract glossary records from PDFs as JSON lines.
//!
//! Usage:
//!   extract_glossary <pdf>... [--config FILE] [--overrides FILE]
//!                    [--language NAME] [--workers N] [--output FILE] [--verbose]
//!
//! The language is taken from `--language`, the config file, or the PDF file
//! name, in that order. Records go to `--output` (or stdout); a summary per
//! document goes to stderr.

use glossary_extract::fonts::CidOverrides;
use glossary_extract::pipeline::{DocumentPipeline, DocumentReport, PipelineConfig};
use glossary_extract::schema::Language;
use glossary_extract::sink::{JsonLinesSink, RecordSink};
use glossary_extract::source::LopdfSource;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

struct CliArgs {
    pdfs: Vec<PathBuf>,
    config: Option<PathBuf>,
    overrides: Option<PathBuf>,
    language: Option<String>,
    workers: Option<usize>,
    output: Option<PathBuf>,
    verbose: bool,
}

impl CliArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut cli = CliArgs {
            pdfs: Vec::new(),
            config: None,
            overrides: None,
            language: None,
            workers: None,
            output: None,
            verbose: false,
        };

        let mut i = 1;
        while i < args.len() {
            let value = |i: usize| {
                args.get(i + 1)
                    .cloned()
                    .ok_or_else(|| format!("{} needs a value", args[i]))
            };
            match args[i].as_str() {
                "--config" => {
                    cli.config = Some(PathBuf::from(value(i)?));
                    i += 1;
                },
                "--overrides" => {
                    cli.overrides = Some(PathBuf::from(value(i)?));
                    i += 1;
                },
                "--language" => {
                    cli.language = Some(value(i)?);
                    i += 1;
                },
                "--workers" => {
                    let raw = value(i)?;
                    cli.workers = Some(raw.parse().map_err(|_| format!("bad worker count '{}'", raw))?);
                    i += 1;
                },
                "--output" | "-o" => {
                    cli.output = Some(PathBuf::from(value(i)?));
                    i += 1;
                },
                "--verbose" | "-v" => cli.verbose = true,
                "--help" | "-h" => return Err(String::new()),
                flag if flag.starts_with('-') => return Err(format!("unknown option '{}'", flag)),
                path => cli.pdfs.push(PathBuf::from(path)),
            }
            i += 1;
        }

        if cli.pdfs.is_empty() {
            return Err("no input PDF given".to_string());
        }
        Ok(cli)
    }
}

fn usage() {
    eprintln!(
        "Usage: extract_glossary <pdf>... [--config FILE] [--overrides FILE] \
         [--language NAME] [--workers N] [--output FILE] [--verbose]"
    );
}

fn build_config(cli: &CliArgs) -> glossary_extract::Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(path) = &cli.overrides {
        config = config.with_overrides(CidOverrides::from_path(path)?);
    }
    if let Some(name) = &cli.language {
        config = config.with_language(name.parse::<Language>()?);
    }
    if let Some(workers) = cli.workers {
        config = config.with_worker_threads(workers);
    }
    Ok(config)
}

fn extract(pipeline: &DocumentPipeline, path: &Path) -> glossary_extract::Result<DocumentReport> {
    let file_name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    let language = pipeline.language_for(&file_name).unwrap_or_else(|| {
        log::warn!("Could not detect the language of {}; assuming English", file_name);
        Language::English
    });
    let source = LopdfSource::open(path)?;
    pipeline.run(&source, language)
}

fn print_summary(path: &Path, report: &DocumentReport, elapsed: f64) {
    eprintln!(
        "✓ {} [{}]: {} records from {} pages in {:.2}s",
        path.display(),
        report.language,
        report.records.len(),
        report.pages.len(),
        elapsed
    );
    let failed: Vec<String> = report.failed_pages().map(|p| (p.page + 1).to_string()).collect();
    if !failed.is_empty() {
        eprintln!("  pages without a table: {}", failed.join(", "));
    }
    if !report.unresolved.is_empty() {
        eprintln!(
            "  unresolved glyphs: {} occurrences of {} CIDs in {} cells",
            report.unresolved.total(),
            report.unresolved.occurrences.len(),
            report.unresolved.cells_affected
        );
    }
    for (font, reason) in &report.unrepairable_fonts {
        eprintln!("  unrepairable font {}: {}", font, reason);
    }
}

fn main() {
    let cli = match CliArgs::from_args() {
        Ok(cli) => cli,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("Error: {}", message);
            }
            usage();
            std::process::exit(2);
        },
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "warn" }),
    )
    .init();

    let pipeline = match build_config(&cli).and_then(DocumentPipeline::new) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        },
    };

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                eprintln!("Error: cannot create {}: {}", path.display(), e);
                std::process::exit(2);
            },
        },
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut sink = JsonLinesSink::new(writer);

    let mut failed = 0;
    for path in &cli.pdfs {
        let start = Instant::now();
        match extract(&pipeline, path).and_then(|report| {
            report.write_records(&mut sink)?;
            Ok(report)
        }) {
            Ok(report) => print_summary(path, &report, start.elapsed().as_secs_f64()),
            Err(e) => {
                eprintln!("✗ {}: {}", path.display(), e);
                failed += 1;
            },
        }
    }

    if let Err(e) = sink.finish() {
        eprintln!("Error: {}", e);
        failed += 1;
    }
    eprintln!("{} records written", sink.written());

    if failed > 0 {
        std::process::exit(1);
    }
}
