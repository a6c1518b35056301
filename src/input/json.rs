use super::InputError;
use crate::models::{parse_decimal, Cell, Table};
use indexmap::IndexSet;
use serde_json::Value;

/// 读取 JSON 行数组: 表头按键首次出现的顺序, 缺失键补空
pub fn read_json(content: &[u8]) -> Result<Table, InputError> {
    let value: Value = serde_json::from_slice(content)?;
    let Value::Array(items) = value else {
        return Err(InputError::Malformed(
            "expected a JSON array of row objects".to_string(),
        ));
    };

    let mut objects = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(obj) => objects.push(obj),
            other => {
                return Err(InputError::Malformed(format!(
                    "row {} is not an object: {}",
                    idx + 1,
                    other
                )))
            }
        }
    }

    let headers: IndexSet<String> = objects
        .iter()
        .flat_map(|obj| obj.keys().cloned())
        .collect();

    let rows: Vec<Vec<Cell>> = objects
        .iter()
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(value_to_cell).unwrap_or(Cell::Empty))
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(Table {
        headers: headers.into_iter().collect(),
        rows,
    })
}

fn value_to_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => parse_decimal(&n.to_string())
            .map(Cell::Number)
            .unwrap_or_else(|| Cell::Text(n.to_string())),
        Value::String(s) if s.trim().is_empty() => Cell::Empty,
        Value::String(s) => Cell::Text(s.trim().to_string()),
        other => Cell::Text(other.to_string()),
    }
}
