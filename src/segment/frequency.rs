use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Rows at the top of every URL export that are not URLs.
pub const EXPORT_HEADER_ROWS: usize = 2;

/// Occurrence count per key for a single pass over the export.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    pub counts: HashMap<String, usize>,
    pub lines_read: usize,
}

impl FrequencyTable {
    /// Lines scanned minus the export header rows, never below zero.
    pub fn records(&self) -> usize {
        self.lines_read.saturating_sub(EXPORT_HEADER_ROWS)
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn largest(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    fn record(&mut self, key: String) {
        *self.counts.entry(key).or_insert(0) += 1;
    }
}

/// Stream `reader` once, counting every key `extract` yields per line.
pub fn aggregate<R, F, I>(mut reader: R, mut extract: F) -> Result<FrequencyTable>
where
    R: BufRead,
    F: FnMut(&str) -> I,
    I: IntoIterator<Item = String>,
{
    let mut table = FrequencyTable::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .context("Failed to scan input file")?;
        if n == 0 {
            break;
        }
        table.lines_read += 1;

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        for key in extract(line) {
            table.record(key);
        }
    }

    Ok(table)
}

/// Open `path` and aggregate it.
pub fn aggregate_file<F, I>(path: &Path, extract: F) -> Result<FrequencyTable>
where
    F: FnMut(&str) -> I,
    I: IntoIterator<Item = String>,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;
    aggregate(BufReader::new(file), extract)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::classify::{parameter_keys, path_prefix, LEVEL1_PARTS};

    fn level1(input: &str) -> FrequencyTable {
        aggregate(input.as_bytes(), |l| path_prefix(l, LEVEL1_PARTS)).unwrap()
    }

    #[test]
    fn shared_prefix_counted() {
        let table = level1(
            "http://example.com/a/b/1\nhttp://example.com/a/b/2\nhttp://example.com/a/c/1\n",
        );
        assert_eq!(table.counts.len(), 1);
        assert_eq!(table.counts["http://example.com/a"], 3);
        assert_eq!(table.largest(), 3);
        assert_eq!(table.lines_read, 3);
        assert_eq!(table.records(), 1);
    }

    #[test]
    fn quoted_lines_skipped() {
        let table = level1("\"url\",\"status\"\nhttp://example.com/a/1\n\"http://example.com/a/2\"\n");
        assert_eq!(table.counts["http://example.com/a"], 1);
        assert_eq!(table.lines_read, 3);
    }

    #[test]
    fn empty_input() {
        let table = level1("");
        assert!(table.counts.is_empty());
        assert_eq!(table.largest(), 0);
        assert_eq!(table.records(), 0);
    }

    #[test]
    fn header_only_input() {
        let table = level1("url\nexport\n");
        assert_eq!(table.records(), 0);
        assert_eq!(table.distinct(), 0);
    }

    #[test]
    fn crlf_and_missing_final_newline() {
        let table = level1("http://example.com/a/1\r\nhttp://example.com/b/1");
        assert_eq!(table.counts["http://example.com/a"], 1);
        assert_eq!(table.counts["http://example.com/b"], 1);
    }

    #[test]
    fn many_keys_per_line() {
        let table = aggregate("https://example.com/?a=1&b=2\nhttps://example.com/?a=3\n".as_bytes(), parameter_keys)
            .unwrap();
        assert_eq!(table.counts["a"], 2);
        assert_eq!(table.counts["b"], 1);
    }

    #[test]
    fn missing_file() {
        let err = aggregate_file(Path::new("does/not/exist.csv"), |l| path_prefix(l, LEVEL1_PARTS))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to open input file"));
    }

    #[test]
    fn sample_export_fixture() {
        let table = aggregate_file(Path::new("tests/fixtures/export.csv"), |l| {
            path_prefix(l, LEVEL1_PARTS)
        })
        .unwrap();
        assert_eq!(table.counts["https://www.example-shop.com/products"], 8);
        assert!(table.records() > 0);
    }
}
