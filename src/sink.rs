//! Record sinks: append-only storage of the jet and constituent tables.
//!
//! `CsvSink` creates two files in the configured output directory:
//! - `jets.csv` (one row per selected jet)
//! - `cons.csv` (one row per constituent of a selected jet)

use crate::{
    error::SinkError,
    record::{RecordBatch, CONSTITUENT_COLUMNS, JET_COLUMNS},
};

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use csv::{Writer, WriterBuilder};
use log::{debug, error};

/// Name of the jet table file
pub const JETS_FILE: &str = "jets.csv";

/// Name of the constituent table file
pub const CONSTITUENTS_FILE: &str = "cons.csv";

/// Append-only writer of the two record tables
pub trait RecordSink {
    /// Append the records of a range of events
    fn append(&mut self, batch: &RecordBatch) -> Result<(), SinkError>;

    /// Flush and close all underlying storage.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> Result<(), SinkError>;
}

/// Writes the records to two CSV files
pub struct CsvSink {
    dir: PathBuf,
    jets: Writer<File>,
    constituents: Writer<File>,
    finished: bool,
}
//
impl CsvSink {
    /// Create the output directory if needed, then create the two CSV files
    /// and write their header rows
    pub fn create(dir: &Path) -> Result<Self, SinkError> {
        fs::create_dir_all(dir)?;
        let mut jets = Self::table(&dir.join(JETS_FILE))?;
        jets.write_record(JET_COLUMNS)?;
        let mut constituents = Self::table(&dir.join(CONSTITUENTS_FILE))?;
        constituents.write_record(CONSTITUENT_COLUMNS)?;
        debug!("Writing records into {:?}", dir);
        Ok(Self {
            dir: dir.to_owned(),
            jets,
            constituents,
            finished: false,
        })
    }

    /// Headers are written by hand, so that empty tables still carry them
    fn table(path: &Path) -> Result<Writer<File>, SinkError> {
        Ok(WriterBuilder::new().has_headers(false).from_path(path)?)
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, batch: &RecordBatch) -> Result<(), SinkError> {
        if self.finished {
            return Err(SinkError::Finished);
        }
        for row in &batch.jets {
            self.jets.serialize(row)?;
        }
        for row in &batch.constituents {
            self.constituents.serialize(row)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.jets.flush()?;
        self.constituents.flush()?;
        Ok(())
    }
}

impl Drop for CsvSink {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            error!("Failed to finalize records in {:?}: {}", self.dir, e);
        }
    }
}

/// Keeps the records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Everything appended so far
    pub records: RecordBatch,

    /// Number of append calls
    pub appends: usize,

    finished: bool,
}
//
impl MemorySink {
    /// Truth that finish() was called
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl RecordSink for MemorySink {
    fn append(&mut self, batch: &RecordBatch) -> Result<(), SinkError> {
        if self.finished {
            return Err(SinkError::Finished);
        }
        self.appends += 1;
        self.records.append(batch.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ConstituentRecord, JetRecord};
    use tempfile::TempDir;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn batch() -> RecordBatch {
        RecordBatch {
            jets: vec![JetRecord {
                n_constituents: 2,
                pt: 25.5,
                px: 25.5,
                py: 0.,
                pz: -3.25,
                e: 26.,
                event_num: 4,
            }],
            constituents: vec![
                ConstituentRecord { pt: 20., jt: 0.5, r: 0.125, z: 0.75, pid: 211, event_num: 4 },
                ConstituentRecord { pt: 5.5, jt: 0.5, r: 0.25, z: 0.25, pid: -321, event_num: 4 },
            ],
        }
    }

    fn read_table(path: &Path) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn headers_are_written_for_empty_tables() {
        let dir = tmp();
        let mut sink = CsvSink::create(dir.path()).unwrap();
        sink.finish().unwrap();

        let (headers, rows) = read_table(&dir.path().join(JETS_FILE));
        assert_eq!(headers, JET_COLUMNS);
        assert!(rows.is_empty());
        let (headers, rows) = read_table(&dir.path().join(CONSTITUENTS_FILE));
        assert_eq!(headers, CONSTITUENT_COLUMNS);
        assert!(rows.is_empty());
    }

    #[test]
    fn rows_follow_column_order() {
        let dir = tmp();
        let mut sink = CsvSink::create(dir.path()).unwrap();
        sink.append(&batch()).unwrap();
        sink.finish().unwrap();

        let (_, jets) = read_table(&dir.path().join(JETS_FILE));
        assert_eq!(jets.len(), 1);
        assert_eq!(&jets[0][0], "2"); // nConstituents
        assert_eq!(jets[0][1].parse::<f64>().unwrap(), 25.5); // jPt
        assert_eq!(jets[0][4].parse::<f64>().unwrap(), -3.25); // jPz
        assert_eq!(&jets[0][6], "4"); // eventNum

        let (_, cons) = read_table(&dir.path().join(CONSTITUENTS_FILE));
        assert_eq!(cons.len(), 2);
        assert_eq!(cons[0].len(), CONSTITUENT_COLUMNS.len());
        assert_eq!(cons[0][3].parse::<f64>().unwrap(), 0.75); // cz
        assert_eq!(&cons[1][4], "-321"); // cPid
    }

    #[test]
    fn dropping_the_sink_flushes_it() {
        let dir = tmp();
        {
            let mut sink = CsvSink::create(dir.path()).unwrap();
            sink.append(&batch()).unwrap();
        }
        let (_, cons) = read_table(&dir.path().join(CONSTITUENTS_FILE));
        assert_eq!(cons.len(), 2);
    }

    #[test]
    fn finish_is_idempotent_and_final() {
        let dir = tmp();
        let mut sink = CsvSink::create(dir.path()).unwrap();
        sink.finish().unwrap();
        sink.finish().unwrap();
        assert!(matches!(sink.append(&batch()), Err(SinkError::Finished)));
    }

    #[test]
    fn missing_directories_are_created() {
        let dir = tmp();
        let nested = dir.path().join("run").join("001");
        let _sink = CsvSink::create(&nested).unwrap();
        assert!(nested.join(JETS_FILE).exists());
    }

    #[test]
    fn memory_sink_accumulates() {
        let mut sink = MemorySink::default();
        sink.append(&batch()).unwrap();
        sink.append(&batch()).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.appends, 2);
        assert_eq!(sink.records.jets.len(), 2);
        assert_eq!(sink.records.constituents.len(), 4);
        assert!(sink.is_finished());
    }
}
