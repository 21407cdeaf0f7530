use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, Writer};
use tempfile::NamedTempFile;

use crate::error::{ReportError, Result};
use crate::table::Table;

/// Raw lines of a file, for fingerprinting before any header-aware parsing.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| ReportError::FileReadError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    Ok(content.lines().map(|l| l.to_string()).collect())
}

/// Reads a CSV file into a `Table`, skipping `skip_rows` physical lines of
/// preamble before the real header row.
///
/// The reader runs in flexible mode because scanner preambles are ragged:
/// metadata rows rarely have the same field count as the data that follows.
pub fn read_table(path: &Path, skip_rows: usize) -> Result<Table> {
    let content = fs::read_to_string(path).map_err(|e| ReportError::FileReadError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    // Skip counts physical lines, not CSV records: the csv reader drops
    // blank lines silently, and scanner preambles do contain them. Cutting
    // the preamble off before parsing keeps the count aligned with the
    // fingerprint's raw-line indexing.
    let mut remainder = content.as_str();
    for _ in 0..skip_rows {
        match remainder.find('\n') {
            Some(newline) => remainder = &remainder[newline + 1..],
            None => {
                return Err(ReportError::FileReadError {
                    path: path.to_path_buf(),
                    details: format!("file ends before the header row (skip={})", skip_rows),
                }
                .into());
            }
        }
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(remainder.as_bytes());
    let mut records = reader.records();

    let header_record = match records.next() {
        Some(record) => record.map_err(|e| ReportError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?,
        None => {
            return Err(ReportError::FileReadError {
                path: path.to_path_buf(),
                details: "file has no header row".to_string(),
            }
            .into());
        }
    };

    let mut table = Table::new(header_record.iter().map(|f| f.to_string()).collect());
    for record in records {
        let record = record.map_err(|e| ReportError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        table.push_row(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(table)
}

/// Writes a `Table` to `path` atomically: the CSV is serialized into a
/// temporary file in the destination directory and renamed into place only
/// once fully written. A failure mid-write never leaves a truncated report.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let temp = match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new_in("."),
    }
    .map_err(|e| ReportError::FileWriteError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    let write_error = |e: csv::Error| ReportError::FileWriteError {
        path: path.to_path_buf(),
        details: e.to_string(),
    };

    let mut writer = Writer::from_writer(temp);
    writer.write_record(&table.headers).map_err(write_error)?;
    for row in &table.rows {
        writer.write_record(row).map_err(write_error)?;
    }

    let temp = writer
        .into_inner()
        .map_err(|e| ReportError::FileWriteError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
    temp.persist(path).map_err(|e| ReportError::FileWriteError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_table_plain_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.csv");
        fs::write(&path, "IP,Port\n10.0.0.1,443\n10.0.0.2,22\n").unwrap();

        let table = read_table(&path, 0).unwrap();
        assert_eq!(table.headers, vec!["IP", "Port"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 0), "10.0.0.2");
    }

    #[test]
    fn test_read_table_skips_preamble() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preamble.csv");
        fs::write(
            &path,
            "Report generated\nfor,acme,corp\n\nIP,Port\n10.0.0.1,443\n",
        )
        .unwrap();

        let table = read_table(&path, 3).unwrap();
        assert_eq!(table.headers, vec!["IP", "Port"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_read_table_blank_preamble_line_counts_as_a_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.csv");
        // six metadata lines plus one blank, header at raw line index 7 -
        // the same position the fingerprint rules index against
        let mut content = String::new();
        for i in 0..6 {
            content.push_str(&format!("metadata {}\n", i));
        }
        content.push('\n');
        content.push_str("IP,Port\n10.0.0.1,443\n");
        fs::write(&path, content).unwrap();

        let table = read_table(&path, 7).unwrap();
        assert_eq!(table.headers, vec!["IP", "Port"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 0), "10.0.0.1");
    }

    #[test]
    fn test_read_table_truncated_preamble_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.csv");
        fs::write(&path, "only,one,row\n").unwrap();

        let err = read_table(&path, 7).unwrap_err();
        assert!(format!("{}", err).contains("ends before the header row"));
    }

    #[test]
    fn test_write_table_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let mut table = Table::new(vec!["A".to_string(), "B".to_string()]);
        table.push_row(vec!["1".to_string(), "hello, world".to_string()]);
        write_table(&path, &table).unwrap();

        let back = read_table(&path, 0).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_write_table_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_table(&path, &Table::new(vec!["A".to_string()])).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["out.csv"]);
    }

    #[test]
    fn test_read_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("raw.csv");
        fs::write(&path, "a,b\nc,d\n").unwrap();
        assert_eq!(read_lines(&path).unwrap(), vec!["a,b", "c,d"]);
    }
}
