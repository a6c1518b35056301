use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const COL_INVOICE_NUMBER: &str = "invoice_number";
pub const COL_PART_NUMBER: &str = "part_number";
pub const COL_QTY: &str = "qty";
pub const COL_SELL_PRICE: &str = "sell_price";
pub const COL_COST_PRICE: &str = "cost_price";
pub const COL_TOTAL_SALE_VALUE: &str = "total_sale_value";
pub const COL_TOTAL_COST_VALUE: &str = "total_cost_value";
pub const COL_PROFIT: &str = "profit";
pub const COL_DATE: &str = "date";

/// 数值文本长度上限
const MAX_DECIMAL_TEXT_LEN: usize = 1000;
/// 小数位/指数上限, 超出视为非数值 (避免舍入时构造超大整数)
const MAX_DECIMAL_SCALE: i64 = 1000;

/// 解析十进制数; 过长或指数过大的文本返回 None
pub fn parse_decimal(raw: &str) -> Option<BigDecimal> {
    let s = raw.trim();
    if s.is_empty() || s.len() > MAX_DECIMAL_TEXT_LEN {
        return None;
    }
    let n = BigDecimal::from_str(s).ok()?;
    let (_, scale) = n.as_bigint_and_exponent();
    if scale.abs() > MAX_DECIMAL_SCALE {
        return None;
    }
    Some(n)
}

/// 能被 f64 精确表示时返回该值 (f64 的最短文本可解析回同一十进制数)
pub fn exact_f64(n: &BigDecimal) -> Option<f64> {
    let v = n.to_f64().filter(|v| v.is_finite())?;
    let back = BigDecimal::from_str(&v.to_string()).ok()?;
    (back == *n).then_some(v)
}

/// 单元格值 (解析时已完成类型推断)
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(BigDecimal),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
}

impl Cell {
    /// CSV 文本单元格的类型推断
    pub fn infer(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return Cell::Empty;
        }
        if s.eq_ignore_ascii_case("true") {
            return Cell::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return Cell::Bool(false);
        }
        match parse_decimal(s) {
            Some(n) => Cell::Number(n),
            None => Cell::Text(s.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// 作为标识符使用的文本形式; 空单元格返回 None
    ///
    /// 数值先去掉尾随零, 1001 与 1001.0 视为同一标识
    pub fn key_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(n.normalized().to_plain_string()),
            other => Some(other.to_string()),
        }
    }

    /// 转为精确十进制
    fn as_decimal(&self, field: &'static str) -> Result<BigDecimal, FieldError> {
        match self {
            Cell::Number(n) => Ok(n.clone()),
            Cell::Empty => Err(FieldError::Missing { field }),
            Cell::Text(s) => parse_decimal(s).ok_or_else(|| FieldError::NotNumeric {
                field,
                value: s.clone(),
            }),
            other => Err(FieldError::NotNumeric {
                field,
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => f.write_str(&n.to_plain_string()),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Date(d) => write!(f, "{}", d.format("%m/%d/%Y")),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Empty => serializer.serialize_none(),
            Cell::Number(n) => {
                if n.is_integer() {
                    if let Some(i) = n.to_i64() {
                        return serializer.serialize_i64(i);
                    }
                }
                match exact_f64(n) {
                    Some(v) => serializer.serialize_f64(v),
                    None => serializer.serialize_str(&n.to_plain_string()),
                }
            }
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Bool(b) => serializer.serialize_bool(*b),
            Cell::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// 日期列支持的文本格式
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// 解析日期; 无法识别时返回 None (日期列为可选, 不视为错误)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// 已解析的输入表: 表头 + 行 (每行单元格数与表头一致)
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 单行字段错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing value for '{field}'")]
    Missing { field: &'static str },
    #[error("'{field}' is not numeric: '{value}'")]
    NotNumeric { field: &'static str, value: String },
}

/// 发票明细行
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub invoice_number: String,
    pub part_number: String,
    pub qty: BigDecimal,
    pub sell_price: BigDecimal,
    pub cost_price: BigDecimal,
    pub total_sale_value: BigDecimal,
    pub total_cost_value: BigDecimal,
    pub profit: BigDecimal,
    pub date: Option<NaiveDate>,
}

/// 记录各字段在表头中的位置, 每张表解析一次
#[derive(Debug, Clone, Copy)]
pub struct RecordColumns {
    invoice_number: Option<usize>,
    part_number: Option<usize>,
    qty: Option<usize>,
    sell_price: Option<usize>,
    cost_price: Option<usize>,
    total_sale_value: Option<usize>,
    total_cost_value: Option<usize>,
    profit: Option<usize>,
    date: Option<usize>,
}

impl RecordColumns {
    pub fn resolve(table: &Table) -> Self {
        Self {
            invoice_number: table.column_index(COL_INVOICE_NUMBER),
            part_number: table.column_index(COL_PART_NUMBER),
            qty: table.column_index(COL_QTY),
            sell_price: table.column_index(COL_SELL_PRICE),
            cost_price: table.column_index(COL_COST_PRICE),
            total_sale_value: table.column_index(COL_TOTAL_SALE_VALUE),
            total_cost_value: table.column_index(COL_TOTAL_COST_VALUE),
            profit: table.column_index(COL_PROFIT),
            date: table.column_index(COL_DATE),
        }
    }

    /// 重复检测键 (invoice_number, part_number)
    pub fn duplicate_key(&self, cells: &[Cell]) -> (Option<String>, Option<String>) {
        (
            cell_at(cells, self.invoice_number).key_text(),
            cell_at(cells, self.part_number).key_text(),
        )
    }

    /// 按固定字段顺序构建记录, 返回遇到的第一个字段错误
    pub fn record(&self, cells: &[Cell]) -> Result<Record, FieldError> {
        Ok(Record {
            invoice_number: identifier(cells, self.invoice_number, COL_INVOICE_NUMBER)?,
            part_number: identifier(cells, self.part_number, COL_PART_NUMBER)?,
            qty: cell_at(cells, self.qty).as_decimal(COL_QTY)?,
            sell_price: cell_at(cells, self.sell_price).as_decimal(COL_SELL_PRICE)?,
            cost_price: cell_at(cells, self.cost_price).as_decimal(COL_COST_PRICE)?,
            total_sale_value: cell_at(cells, self.total_sale_value)
                .as_decimal(COL_TOTAL_SALE_VALUE)?,
            total_cost_value: cell_at(cells, self.total_cost_value)
                .as_decimal(COL_TOTAL_COST_VALUE)?,
            profit: cell_at(cells, self.profit).as_decimal(COL_PROFIT)?,
            date: match cell_at(cells, self.date) {
                Cell::Date(d) => Some(*d),
                _ => None,
            },
        })
    }
}

static EMPTY: Cell = Cell::Empty;

fn cell_at(cells: &[Cell], idx: Option<usize>) -> &Cell {
    idx.and_then(|i| cells.get(i)).unwrap_or(&EMPTY)
}

fn identifier(cells: &[Cell], idx: Option<usize>, field: &'static str) -> Result<String, FieldError> {
    cell_at(cells, idx)
        .key_text()
        .ok_or(FieldError::Missing { field })
}
