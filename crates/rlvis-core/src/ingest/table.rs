//! Raw tables as read from uploaded CSV files, before normalization.

use std::io::Read;
use std::path::Path;

use crate::domain::error::ValidationError;

/// Header row plus string cells, exactly as the file provided them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// Parse CSV with a header row. `file` is only used in error messages.
    pub fn from_reader<R: Read>(reader: R, file: &str) -> Result<Self, ValidationError> {
        let unreadable = |e: csv::Error| ValidationError::UnreadableFile {
            file: file.to_string(),
            reason: e.to_string(),
        };

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = rdr
            .headers()
            .map_err(unreadable)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(unreadable)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Rename a column in place. Returns false if `from` is absent.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }
}

/// One file of an upload batch: its display name and raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk, labelled by its file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, contents })
    }

    pub fn table(&self) -> Result<RawTable, ValidationError> {
        RawTable::from_reader(self.contents.as_slice(), &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_rows() {
        let csv = "timestep,value_estimate,cumulative_reward\n1,0.5,\n2,0.6,12.5\n";
        let table = RawTable::from_reader(csv.as_bytes(), "ppo.csv").unwrap();

        assert_eq!(
            table.columns(),
            ["timestep", "value_estimate", "cumulative_reward"]
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][2], "");
        assert_eq!(table.rows()[1][2], "12.5");
    }

    #[test]
    fn ragged_rows_are_unreadable() {
        let csv = "timestep,cumulative_reward\n1,2,3\n";
        let err = RawTable::from_reader(csv.as_bytes(), "bad.csv").unwrap_err();
        assert!(matches!(err, ValidationError::UnreadableFile { ref file, .. } if file == "bad.csv"));
    }

    #[test]
    fn rename_column_reports_absence() {
        let mut table = RawTable::new(vec!["a".into(), "b".into()], vec![]);
        assert!(table.rename_column("b", "c"));
        assert!(!table.rename_column("zzz", "c"));
        assert_eq!(table.columns(), ["a", "c"]);
    }

    #[test]
    fn uploaded_file_uses_file_name_as_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("breakout_log.csv");
        std::fs::write(&path, "timestep\n1\n").unwrap();

        let file = UploadedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "breakout_log.csv");
        assert_eq!(file.table().unwrap().row_count(), 1);
    }
}
