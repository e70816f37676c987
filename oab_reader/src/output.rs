//! Output formatters for decoded records
//!
//! Supports JSON and CSV output formats.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::oab::{OabError, Record, Result, Value};

pub const DEFAULT_JSON_INDENT: usize = 4;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format '{}'. Use 'json' or 'csv'", s)),
        }
    }
}

pub fn render(records: &[Record], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(records, DEFAULT_JSON_INDENT),
        OutputFormat::Csv => Ok(to_csv(records)),
    }
}

/// Pretty JSON array of records, fields in decode order.
pub fn to_json(records: &[Record], indent: usize) -> Result<String> {
    let indent = vec![b' '; indent];
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
    records
        .serialize(&mut serializer)
        .map_err(OabError::render)?;
    // serde_json only emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// CSV with a header row of every field name seen, sorted.
pub fn to_csv(records: &[Record]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut headers: Vec<&str> = records
        .iter()
        .flat_map(|record| record.keys().map(String::as_str))
        .collect();
    headers.sort_unstable();
    headers.dedup();

    let mut output = String::new();
    write_row(&mut output, headers.iter().map(|h| h.to_string()));
    for record in records {
        write_row(
            &mut output,
            headers
                .iter()
                .map(|h| record.get(*h).map(format_cell).unwrap_or_default()),
        );
    }
    output
}

fn write_row(output: &mut String, cells: impl Iterator<Item = String>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            output.push(',');
        }
        if cell.contains(|c: char| matches!(c, ',' | '"' | '\r' | '\n')) {
            output.push('"');
            output.push_str(&cell.replace('"', "\"\""));
            output.push('"');
        } else {
            output.push_str(&cell);
        }
    }
    output.push('\n');
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) | Value::Binary(s) => s.clone(),
        Value::Boolean(true) => "True".to_string(),
        Value::Boolean(false) => "False".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Multiple(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
