//! Record dumps exported from the upstream broker table.
//!
//! Two layouts are accepted: a single JSON array of row objects, or JSON
//! Lines with one row object per line. Blank lines are skipped.

use std::path::Path;

use brokerlens_core::RawBrokerRecord;
use tracing::info;

use crate::StoreError;

/// Layout of a record dump, detected from its first non-blank character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpFormat {
    JsonArray,
    JsonLines,
}

impl DumpFormat {
    pub fn detect(contents: &str) -> Self {
        if contents.trim_start().starts_with('[') {
            Self::JsonArray
        } else {
            Self::JsonLines
        }
    }
}

/// Raw broker records loaded into memory, in file order.
#[derive(Debug, Clone, Default)]
pub struct RecordDump {
    records: Vec<RawBrokerRecord>,
}

impl RecordDump {
    /// Read and parse a dump file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::FileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let dump = Self::parse(&contents)?;
        info!(count = dump.len(), path = %path.display(), "loaded broker records");
        Ok(dump)
    }

    /// Parse dump contents already in memory.
    pub fn parse(contents: &str) -> Result<Self, StoreError> {
        let records = match DumpFormat::detect(contents) {
            DumpFormat::JsonArray => RawBrokerRecord::parse_records(contents)?,
            DumpFormat::JsonLines => parse_lines(contents)?,
        };
        Ok(Self { records })
    }

    pub fn records(&self) -> &[RawBrokerRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawBrokerRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_lines(contents: &str) -> Result<Vec<RawBrokerRecord>, StoreError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<RawBrokerRecord>(line)
                .map_err(|source| StoreError::Line { line: i + 1, source })
        })
        .collect()
}
