#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Header row used by most register fixtures.
pub const REGISTER_HEADER: &str =
    "S No,Name of Scheme,Name of Work/Site,Sd Amount (In Lakh),Date of TS,Remarks";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes one line per entry, newline terminated.
    pub fn write_lines(&self, name: &str, lines: &[&str]) -> PathBuf {
        let mut contents = lines.join("\n");
        contents.push('\n');
        self.write(name, &contents)
    }
}

/// Splits CSV output into rows of fields.
pub fn parse_csv(output: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(output.as_bytes());
    reader
        .records()
        .map(|record| {
            record
                .expect("valid csv record")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

/// Value of `column` in every data row of parsed CSV output.
pub fn column_values(rows: &[Vec<String>], column: &str) -> Vec<String> {
    let idx = rows[0]
        .iter()
        .position(|h| h == column)
        .unwrap_or_else(|| panic!("column {column} missing from {:?}", rows[0]));
    rows[1..].iter().map(|row| row[idx].clone()).collect()
}
