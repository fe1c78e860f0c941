//! Result file writing and console progress display
//!
//! [`ResultSink`] ranks aggregate records and writes them one per line;
//! [`ConsoleReporter`] renders scheduler progress and the final summary.

mod progress;

pub use progress::{ConsoleReporter, PerformanceLevel};

use crate::{
    error::{ErrorContext, Result},
    models::AggregateRecord,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes ranked aggregate records
pub struct ResultSink;

impl ResultSink {
    /// Order records by ascending representative latency
    ///
    /// Failed records (`+∞`) land after every reachable one. The sort is
    /// stable, so ties keep their input order.
    pub fn rank(records: &[AggregateRecord]) -> Vec<&AggregateRecord> {
        let mut ranked: Vec<&AggregateRecord> = records.iter().collect();
        ranked.sort_by(|a, b| a.representative_latency_ms.total_cmp(&b.representative_latency_ms));
        ranked
    }

    /// Render one output line (without newline)
    ///
    /// `1.1.1.1:443#US CF 20.00 ms`, `8.8.8.8:53#US Google Failed`, or
    /// `1.1.1.1:443#6.00 ms` when the endpoint has no tags.
    pub fn render_record(record: &AggregateRecord) -> String {
        let mut line = record.endpoint.display_prefix();
        if !record.endpoint.tags.is_empty() {
            line.push(' ');
        }
        match record.latency() {
            Some(ms) => line.push_str(&format!("{:.2} ms", ms)),
            None => line.push_str("Failed"),
        }
        line
    }

    /// Write ranked records to `writer`, one per line
    pub fn write<W: Write>(records: &[AggregateRecord], writer: W) -> Result<usize> {
        let mut writer = BufWriter::new(writer);
        let ranked = Self::rank(records);

        for record in &ranked {
            writeln!(writer, "{}", Self::render_record(record))?;
        }
        writer.flush()?;

        Ok(ranked.len())
    }

    /// Create or truncate `path` and write the ranked records to it
    pub fn write_to_path(records: &[AggregateRecord], path: &Path) -> Result<usize> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file '{}'", path.display()))?;
        Self::write(records, file)
            .with_context(|| format!("Failed to write output file '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecordStatus;
    use crate::validator::validate;
    use std::io;

    fn record(line: &str, latency: f64) -> AggregateRecord {
        AggregateRecord {
            endpoint: validate(line).unwrap(),
            representative_latency_ms: latency,
            status: if latency.is_finite() { RecordStatus::Ok } else { RecordStatus::Failed },
            successes: if latency.is_finite() { 1 } else { 0 },
            attempts: 3,
        }
    }

    fn sample_records() -> Vec<AggregateRecord> {
        vec![
            record("1.1.1.1,443,US,CF", 20.0),
            record("8.8.8.8,53,US,Google", f64::INFINITY),
            record("9.9.9.9,999,Quad9", 6.0),
        ]
    }

    #[test]
    fn test_write_ranked_lines() {
        let mut buffer = Vec::new();
        let written = ResultSink::write(&sample_records(), &mut buffer).unwrap();

        assert_eq!(written, 3);
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "9.9.9.9:999#Quad9 6.00 ms\n1.1.1.1:443#US CF 20.00 ms\n8.8.8.8:53#US Google Failed\n"
        );
    }

    #[test]
    fn test_render_without_tags() {
        assert_eq!(ResultSink::render_record(&record("1.1.1.1,443", 6.0)), "1.1.1.1:443#6.00 ms");
        assert_eq!(ResultSink::render_record(&record("1.1.1.1,443", f64::INFINITY)), "1.1.1.1:443#Failed");
    }

    #[test]
    fn test_render_keeps_ip_text_and_rounds() {
        let line = ResultSink::render_record(&record("010.001.001.001, 8443 , HK , Relay 2", 123.456));
        assert_eq!(line, "010.001.001.001:8443#HK Relay 2 123.46 ms");
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let records = vec![
            record("1.1.1.1,1", f64::INFINITY),
            record("2.2.2.2,2", 5.0),
            record("3.3.3.3,3", f64::INFINITY),
            record("4.4.4.4,4", 5.0),
        ];
        let ranked: Vec<&str> = ResultSink::rank(&records).iter().map(|r| r.endpoint.id()).collect();
        assert_eq!(ranked, vec!["2.2.2.2,2", "4.4.4.4,4", "1.1.1.1,1", "3.3.3.3,3"]);
    }

    #[test]
    fn test_write_empty_records() {
        let mut buffer = Vec::new();
        assert_eq!(ResultSink::write(&[], &mut buffer).unwrap(), 0);
        assert!(buffer.is_empty());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn test_write_error_is_reported() {
        let err = ResultSink::write(&sample_records(), FailingWriter).unwrap_err();
        assert_eq!(err.category(), "IO");
        assert_eq!(err.exit_code(), 5);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_write_to_path_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latencyresult.txt");
        std::fs::write(&path, "stale content that is much longer than the new output\n".repeat(10)).unwrap();

        ResultSink::write_to_path(&[record("9.9.9.9,999,Quad9", 6.0)], &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "9.9.9.9:999#Quad9 6.00 ms\n");
    }

    #[test]
    fn test_write_to_path_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.txt");
        let err = ResultSink::write_to_path(&sample_records(), &path).unwrap_err();
        assert_eq!(err.category(), "IO");
        assert!(err.to_string().contains("out.txt"));
    }
}
