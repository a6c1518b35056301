pub mod delimited;
pub mod json;

use crate::models::record::{COL_DATE, COL_INVOICE_NUMBER, COL_PART_NUMBER};
use crate::models::{parse_date, Cell, Table};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// 上传文件解析错误 (客户端错误)
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Only JSON or CSV files supported (got '{0}')")]
    UnsupportedFileType(String),
    #[error("File read error: no rows found")]
    Empty,
    #[error("File read error: required column '{0}' not found")]
    MissingColumn(&'static str),
    #[error("File read error: {0}")]
    Malformed(String),
    #[error("File read error: {0}")]
    Csv(#[from] csv::Error),
    #[error("File read error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 支持的上传格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// 根据扩展名判断格式 (不区分大小写)
    pub fn from_filename(filename: &str) -> Result<Self, InputError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("json") => Ok(InputFormat::Json),
            _ => Err(InputError::UnsupportedFileType(filename.to_string())),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Csv => f.write_str("csv"),
            InputFormat::Json => f.write_str("json"),
        }
    }
}

/// 解析上传内容为表格, 并检查关键列
pub fn parse_table(format: InputFormat, content: &[u8]) -> Result<Table, InputError> {
    let content = content.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(content);

    let mut table = match format {
        InputFormat::Csv => delimited::read_csv(content)?,
        InputFormat::Json => json::read_json(content)?,
    };

    if table.headers.is_empty() {
        return Err(InputError::Empty);
    }
    for required in [COL_INVOICE_NUMBER, COL_PART_NUMBER] {
        if table.column_index(required).is_none() {
            return Err(InputError::MissingColumn(required));
        }
    }

    coerce_dates(&mut table);
    Ok(table)
}

/// date 列中可识别的文本转为日期
fn coerce_dates(table: &mut Table) {
    let Some(idx) = table.column_index(COL_DATE) else {
        return;
    };
    for row in &mut table.rows {
        let parsed = match row.get(idx) {
            Some(Cell::Text(s)) => parse_date(s),
            _ => None,
        };
        if let Some(d) = parsed {
            row[idx] = Cell::Date(d);
        }
    }
}
