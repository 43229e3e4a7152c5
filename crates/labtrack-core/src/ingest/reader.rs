//! Minimal CSV reader for uploads.
//!
//! Handles a header row, quoted fields with doubled-quote escapes, and CRLF
//! line endings. Rows are addressed by header name; a row shorter or longer
//! than the header fails the whole parse.

use std::collections::HashMap;

use super::{IngestError, IngestResult};

/// A parsed CSV file: one header row plus data records.
#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<Vec<String>>,
}

impl CsvTable {
    /// Parse the full text of an upload.
    pub fn parse(text: &str) -> IngestResult<Self> {
        let mut records = split_records(text);
        if records.is_empty() {
            return Err(IngestError::Empty);
        }
        let headers = records.remove(0);

        for (i, record) in records.iter().enumerate() {
            if record.len() != headers.len() {
                return Err(IngestError::MalformedRow {
                    line: i + 1,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
        }

        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        Ok(Self {
            headers,
            index,
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate data rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = CsvRow<'_>> {
        (0..self.records.len()).map(move |i| CsvRow {
            table: self,
            index: i,
        })
    }
}

/// One data row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct CsvRow<'a> {
    table: &'a CsvTable,
    index: usize,
}

impl CsvRow<'_> {
    /// 1-based data row number, for error messages.
    pub fn line(&self) -> usize {
        self.index + 1
    }

    /// Field value by column name.
    pub fn get(&self, column: &str) -> IngestResult<&str> {
        let col = self
            .table
            .index
            .get(column)
            .ok_or_else(|| IngestError::MissingColumn(column.to_string()))?;
        Ok(self.table.records[self.index][*col].as_str())
    }
}

/// Split raw text into records of unescaped fields.
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();
    let mut saw_any = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                saw_any = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                saw_any = true;
            }
            '\r' => {}
            '\n' => {
                if saw_any || !field.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                saw_any = false;
            }
            _ => {
                field.push(c);
                saw_any = true;
            }
        }
    }
    if saw_any || !field.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let table = CsvTable::parse("a,b,c\n1,2,3\n4,5,6\n").unwrap();
        assert_eq!(table.headers(), &["a", "b", "c"]);
        assert_eq!(table.len(), 2);

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].get("a").unwrap(), "1");
        assert_eq!(rows[1].get("c").unwrap(), "6");
    }

    #[test]
    fn test_quoted_fields() {
        let table = CsvTable::parse("name,notes\n\"Pérez, Ana\",\"said \"\"ok\"\"\"\n").unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("name").unwrap(), "Pérez, Ana");
        assert_eq!(row.get("notes").unwrap(), "said \"ok\"");
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let table = CsvTable::parse("a,b\r\n1,2\r\n3,4").unwrap();
        assert_eq!(table.len(), 2);
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[1].get("b").unwrap(), "4");
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(CsvTable::parse(""), Err(IngestError::Empty)));
    }

    #[test]
    fn test_unknown_column() {
        let table = CsvTable::parse("a,b\n1,2\n").unwrap();
        let row = table.rows().next().unwrap();
        assert!(matches!(
            row.get("missing"),
            Err(IngestError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = CsvTable::parse("a,b,c\n1,2\n").unwrap_err();
        match err {
            IngestError::MalformedRow {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 1);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = CsvTable::parse("a,b\n\n1,2\n\n").unwrap();
        assert_eq!(table.len(), 1);
    }
}
