// src/output.rs
// =============================================================================
// Writes the results as CSV.
//
// Rows are written (and flushed) one at a time as they are found, so you can
// `tail -f results.csv` while a long crawl is running, or start analyzing
// before it finishes. If the run is killed, everything already written is
// still a valid CSV row.
//
// At the very end, any URLs that could not be fetched are listed after a
// "Missed URLs:" line so they can be retried by hand.
//
// Rust concepts:
// - Generics: Emitter<W> writes to anything that implements io::Write
//   (stdout, a file, or a Vec<u8> in tests)
// - csv crate: Handles quoting of titles that contain commas or quotes
// =============================================================================

use anyhow::{Context, Result};
use csv::{Writer, WriterBuilder};
use std::io::Write;

use crate::wiki::{ContributionRecord, MissedRequest};

/// Column names, in the same order as the fields of ContributionRecord.
pub const HEADER: [&str; 8] = [
    "user",
    "lang",
    "title",
    "timestamp",
    "pageid",
    "revid",
    "parentid",
    "sizediff",
];

pub struct Emitter<W: Write> {
    writer: Writer<W>,
    rows: u64,
}

impl<W: Write> Emitter<W> {
    // Creates the emitter and immediately writes the header row
    pub fn new(out: W) -> Result<Self> {
        // We write the header ourselves so it appears even if nothing is found
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
        writer.write_record(HEADER).context("Could not write CSV header")?;
        writer.flush()?;

        Ok(Emitter { writer, rows: 0 })
    }

    pub fn emit(&mut self, record: &ContributionRecord) -> Result<()> {
        self.writer.serialize(record).context("Could not write CSV row")?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    // Finishes the output, appending the missed URLs (if any).
    //
    // Returns the underlying writer.
    pub fn finish(self, missed: &[MissedRequest]) -> Result<W> {
        let mut out = self
            .writer
            .into_inner()
            .map_err(|e| e.into_error())
            .context("Could not flush CSV output")?;

        if !missed.is_empty() {
            writeln!(out, "Missed URLs:")?;
            for request in missed {
                writeln!(out, "{}", request.url)?;
            }
        }

        out.flush()?;
        Ok(out)
    }
}
