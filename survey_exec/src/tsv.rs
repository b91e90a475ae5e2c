//! Tab separated output of projected measures

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use csv::{Writer, WriterBuilder};
use std::io;

use crate::measure::ProjectedMeasure;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

pub const TSV_HEADER: [&str; 7] = ["timestamp", "utm_x", "utm_y", "utm_z", "proj_x", "proj_y", "proj_z"];

/// Timestamps are written to the millisecond without an offset.
pub const TSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Writes projected measures one per line.
pub struct TsvWriter<W: io::Write> {
    writer: Writer<W>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<W: io::Write> TsvWriter<W> {
    /// Create a new writer, writing the header line first if `header` is
    /// set.
    pub fn new(inner: W, header: bool) -> Result<Self, csv::Error> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(inner);

        if header {
            writer.write_record(&TSV_HEADER)?;
        }

        Ok(Self { writer })
    }

    pub fn write(&mut self, m: &ProjectedMeasure) -> Result<(), csv::Error> {
        self.writer.write_record(&[
            m.timestamp.format(TSV_TIMESTAMP_FORMAT).to_string(),
            m.utm_x.to_string(),
            m.utm_y.to_string(),
            m.utm_z.to_string(),
            m.proj_x.to_string(),
            m.proj_y.to_string(),
            m.proj_z.to_string(),
        ])
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W, csv::Error> {
        self.writer.flush()?;

        self.writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::measure::parse_timestamp;
    use positioner::Position;

    fn measure() -> ProjectedMeasure {
        ProjectedMeasure::new(
            parse_timestamp("2024-06-01T12:00:01.5+00:00").unwrap(),
            &Position::new(500000.0, 6600000.5, 100.25),
            &Position::new(500002.57, 6600000.5, 100.25),
        )
    }

    #[test]
    fn test_tsv_output() {
        let mut w = TsvWriter::new(Vec::new(), true).unwrap();
        w.write(&measure()).unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();

        assert_eq!(
            out,
            "timestamp\tutm_x\tutm_y\tutm_z\tproj_x\tproj_y\tproj_z\n\
             2024-06-01T12:00:01.500\t500000\t6600000.5\t100.25\t500002.57\t6600000.5\t100.25\n"
        );
    }

    #[test]
    fn test_tsv_no_header() {
        let mut w = TsvWriter::new(Vec::new(), false).unwrap();
        w.write(&measure()).unwrap();
        w.write(&measure()).unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2024-06-01T12:00:01.500\t"));
        assert_eq!(lines[0].split('\t').count(), 7);
    }
}
