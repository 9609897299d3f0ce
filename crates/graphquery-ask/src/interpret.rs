//! Result-shape classification and terminal rendering.
//!
//! Graph queries return loosely shaped records, so the display mode is
//! chosen from the shape of the JSON value:
//!
//! | shape                                   | mode     |
//! |-----------------------------------------|----------|
//! | list of exactly one single-key mapping  | `Scalar` |
//! | any other non-empty list                | `Table`  |
//! | empty list                              | `Empty`  |
//! | mapping with a `result` key             | recurse  |
//! | anything else                           | `Raw`    |

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use serde_json::{Map, Value};

/// Column name used for list elements that are not mappings.
const VALUE_COLUMN: &str = "value";

/// How a result should be presented.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderMode {
    /// One labelled value, e.g. a count.
    Scalar { label: String, value: Value },
    /// Records unified into a grid. Missing cells are `Null`.
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// The query matched nothing.
    Empty,
    /// Any other shape, shown as pretty JSON.
    Raw(Value),
}

/// Choose the render mode for a result. Pure and total.
pub fn classify(result: &Value) -> RenderMode {
    match result {
        Value::Array(items) if items.is_empty() => RenderMode::Empty,
        Value::Array(items) => {
            if let [Value::Object(record)] = items.as_slice() {
                if let Some((label, value)) = sole_entry(record) {
                    return RenderMode::Scalar {
                        label: label.clone(),
                        value: value.clone(),
                    };
                }
            }
            tabulate(items)
        }
        Value::Object(map) => match map.get("result") {
            Some(inner) => classify(inner),
            None => RenderMode::Raw(result.clone()),
        },
        other => RenderMode::Raw(other.clone()),
    }
}

fn sole_entry(record: &Map<String, Value>) -> Option<(&String, &Value)> {
    let mut entries = record.iter();
    match (entries.next(), entries.next()) {
        (Some(entry), None) => Some(entry),
        _ => None,
    }
}

fn tabulate(items: &[Value]) -> RenderMode {
    let mut columns: Vec<String> = Vec::new();
    for item in items {
        match item {
            Value::Object(record) => {
                for key in record.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
            _ => {
                if !columns.iter().any(|c| c == VALUE_COLUMN) {
                    columns.push(VALUE_COLUMN.to_string());
                }
            }
        }
    }

    let rows = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|column| match item {
                    Value::Object(record) => record.get(column).cloned().unwrap_or(Value::Null),
                    other if column == VALUE_COLUMN => other.clone(),
                    _ => Value::Null,
                })
                .collect()
        })
        .collect();

    RenderMode::Table { columns, rows }
}

/// Render a mode for a terminal.
pub fn render(mode: &RenderMode) -> String {
    match mode {
        RenderMode::Scalar { label, value } => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![Cell::new(label.to_uppercase()).set_alignment(CellAlignment::Center)]);
            table.add_row(vec![Cell::new(format_cell(value)).set_alignment(CellAlignment::Center)]);
            table.to_string()
        }
        RenderMode::Table { columns, rows } => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(columns);
            for row in rows {
                table.add_row(row.iter().map(format_cell).collect::<Vec<_>>());
            }
            format!("{table}\n{} row(s)", rows.len())
        }
        RenderMode::Empty => "No results found.".to_string(),
        RenderMode::Raw(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
