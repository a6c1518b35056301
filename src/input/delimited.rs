use super::InputError;
use crate::models::{Cell, Table};
use csv::{ReaderBuilder, Trim};

/// 读取 CSV: 首行为表头, 短行补空, 超长行报错
pub fn read_csv(content: &[u8]) -> Result<Table, InputError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Ok(Table::default());
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() > headers.len() {
            return Err(InputError::Malformed(format!(
                "row {} has {} fields, expected {}",
                idx + 1,
                record.len(),
                headers.len()
            )));
        }
        let mut cells: Vec<Cell> = record.iter().map(Cell::infer).collect();
        cells.resize(headers.len(), Cell::Empty);
        rows.push(cells);
    }

    Ok(Table { headers, rows })
}
