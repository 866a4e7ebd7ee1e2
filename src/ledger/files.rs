use super::LedgerStore;
use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Newline-delimited file of bare keys. A missing file is an empty ledger.
pub struct TitleLedgerFile {
    path: PathBuf,
}

impl TitleLedgerFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LedgerStore for TitleLedgerFile {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content.lines().find(|line| *line == key).map(str::to_string))
    }

    /// Appends `key`; the value is implied by the key for this format.
    fn put(&self, key: &str, _value: &str) -> Result<()> {
        append_line(&self.path, key)
    }

    fn values(&self) -> Result<Vec<String>> {
        read_lines(&self.path)
    }
}

/// Newline-delimited JSON objects, keyed by one string field of each object.
pub struct JsonLinesLedgerFile {
    path: PathBuf,
    key_field: &'static str,
}

impl JsonLinesLedgerFile {
    pub fn new(path: impl Into<PathBuf>, key_field: &'static str) -> Self {
        Self {
            path: path.into(),
            key_field,
        }
    }
}

impl LedgerStore for JsonLinesLedgerFile {
    /// Scans from the top and returns the first line whose key field matches.
    /// Lines that are not valid JSON are skipped.
    fn get(&self, key: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(fs::File::open(&self.path)?);
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
                continue;
            };
            if value.get(self.key_field).and_then(|v| v.as_str()) == Some(key) {
                return Ok(Some(line.to_string()));
            }
        }
        Ok(None)
    }

    fn put(&self, _key: &str, value: &str) -> Result<()> {
        append_line(&self.path, value)
    }

    fn values(&self) -> Result<Vec<String>> {
        read_lines(&self.path)
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)?;
    Ok(())
}
