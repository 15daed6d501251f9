//! Destinations for canonical records.

use crate::error::Result;
use crate::schema::CanonicalRecord;
use std::io::Write;

/// Receives records as they are produced.
pub trait RecordSink {
    /// Write one record.
    fn write_record(&mut self, record: &CanonicalRecord) -> Result<()>;

    /// Flush buffered output.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl RecordSink for Vec<CanonicalRecord> {
    fn write_record(&mut self, record: &CanonicalRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}

/// Writes one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn write_record(&mut self, record: &CanonicalRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
