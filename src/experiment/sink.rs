// src/experiment/sink.rs
//! Per-tick record output

use crate::config::constants::experiment::CSV_HEADER;
use crate::error::{BioError, BioResult};
use crate::signal::Sample;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One recorded tick: `step,risk,HR,HRV,EDA`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub step: u32,
    pub risk: f64,
    #[serde(rename = "HR")]
    pub hr: f64,
    #[serde(rename = "HRV")]
    pub hrv: f64,
    #[serde(rename = "EDA")]
    pub eda: f64,
}

impl Record {
    pub fn new(step: u32, risk: f64, sample: Sample) -> Self {
        Self {
            step,
            risk,
            hr: sample.hr,
            hrv: sample.hrv,
            eda: sample.eda,
        }
    }

    pub fn sample(&self) -> Sample {
        Sample::new(self.hr, self.hrv, self.eda)
    }
}

pub trait RecordSink {
    fn write_record(&mut self, record: &Record) -> BioResult<()>;

    fn flush(&mut self) -> BioResult<()>;
}

/// Delimited output with a header row written up front, so a case that
/// records nothing still produces a well-formed file.
pub struct CsvRecordSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvRecordSink<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> BioResult<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| BioError::io("create record file", path, e))?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvRecordSink<W> {
    pub fn from_writer(inner: W) -> BioResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(CSV_HEADER)?;
        Ok(Self { writer })
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> BioResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| BioError::from(csv::Error::from(e.into_error())))
    }
}

impl<W: Write> RecordSink for CsvRecordSink<W> {
    fn write_record(&mut self, record: &Record) -> BioResult<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    fn flush(&mut self) -> BioResult<()> {
        self.writer.flush().map_err(|e| BioError::from(csv::Error::from(e)))
    }
}

/// Keeps records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<Record>,
}

impl RecordSink for MemorySink {
    fn write_record(&mut self, record: &Record) -> BioResult<()> {
        self.records.push(*record);
        Ok(())
    }

    fn flush(&mut self) -> BioResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_written_without_rows() {
        let sink = CsvRecordSink::from_writer(Vec::new()).unwrap();
        let bytes = sink.into_inner().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "step,risk,HR,HRV,EDA\n");
    }

    #[test]
    fn test_rows_follow_header() {
        let mut sink = CsvRecordSink::from_writer(Vec::new()).unwrap();
        sink.write_record(&Record::new(3, 0.5, Sample::new(61.0, 40.0, 0.75)))
            .unwrap();
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["step,risk,HR,HRV,EDA", "3,0.5,61.0,40.0,0.75"]);
    }

    #[test]
    fn test_csv_reads_back() {
        let mut sink = CsvRecordSink::from_writer(Vec::new()).unwrap();
        let record = Record::new(0, 0.25, Sample::new(65.123, 49.5, 0.51));
        sink.write_record(&record).unwrap();
        let bytes = sink.into_inner().unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let parsed: Vec<Record> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(parsed, vec![record]);
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let err = CsvRecordSink::create("/nonexistent/dir/case.csv").err().unwrap();
        assert!(matches!(err, BioError::Io { .. }));
    }
}
