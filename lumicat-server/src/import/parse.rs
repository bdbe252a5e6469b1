//! Delimited-text decoding
//!
//! Uploads come from spreadsheet exports: either `;` (French locale) or `,`
//! separated, sometimes with a UTF-8 byte order mark.

use lumicat_common::{Error, Result};

/// Parsed upload: trimmed header names plus raw data rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub delimiter: u8,
}

/// One data row viewed through the header names
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    /// 1-based data row index (the header is not counted)
    pub index: usize,
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> Row<'a> {
    /// First non-empty trimmed value among the alias columns, in alias order
    pub fn pick(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases.iter().find_map(|alias| {
            self.headers
                .iter()
                .zip(self.values.iter())
                .filter(|(header, _)| header.as_str() == *alias)
                .map(|(_, value)| value.trim())
                .find(|value| !value.is_empty())
        })
    }
}

impl Table {
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(move |(i, values)| Row {
            index: i + 1,
            headers: &self.headers,
            values,
        })
    }
}

/// Lossy UTF-8 decoding with the byte order mark removed
pub fn decode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&text).to_string()
}

fn parse_with(text: &str, delimiter: u8) -> std::result::Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table {
        headers,
        rows,
        delimiter,
    })
}

/// Decode and parse an upload
///
/// `;` is tried first and kept only when it yields more than one column;
/// otherwise `,` is used. A file that parses under neither, has no header
/// or has no data rows is rejected as a whole.
pub fn parse_table(bytes: &[u8]) -> Result<Table> {
    let text = decode(bytes);

    let table = match parse_with(&text, b';') {
        Ok(table) if table.headers.len() > 1 => table,
        _ => parse_with(&text, b',')
            .map_err(|e| Error::InvalidInput(format!("Unable to parse file: {}", e)))?,
    };

    if table.headers.iter().all(|h| h.is_empty()) {
        return Err(Error::InvalidInput("File has no header row".to_string()));
    }
    if table.rows.is_empty() {
        return Err(Error::InvalidInput("File contains no data rows".to_string()));
    }

    Ok(table)
}
