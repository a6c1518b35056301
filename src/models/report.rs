use super::issue::{join_issues, Issue, Status};
use super::record::Cell;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const COL_ISSUE_TYPE: &str = "Issue Type";
pub const COL_STATUS: &str = "Status";

/// 带校验结果的行
#[derive(Debug, Clone)]
pub struct AnnotatedRow {
    pub cells: Vec<Cell>,
    pub issues: Vec<Issue>,
    pub status: Status,
}

impl AnnotatedRow {
    pub fn issue_text(&self) -> String {
        join_issues(&self.issues)
    }

    pub fn is_duplicate(&self) -> bool {
        self.issues.contains(&Issue::DuplicateInvoice)
    }
}

/// 校验统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub duplicate_rows: usize,
}

/// 完整校验报告
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub headers: Vec<String>,
    pub rows: Vec<AnnotatedRow>,
    pub summary: ReportSummary,
}

impl ValidationReport {
    /// 导出列: 原始列 + Issue Type + Status
    pub fn output_headers(&self) -> Vec<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .chain([COL_ISSUE_TYPE, COL_STATUS])
            .collect()
    }

    pub fn json_rows(&self) -> Vec<JsonRow<'_>> {
        self.rows
            .iter()
            .map(|row| JsonRow {
                headers: &self.headers,
                row,
            })
            .collect()
    }
}

/// JSON 模式下的一行: 原始值 + 结构化问题 + 展示字符串
pub struct JsonRow<'a> {
    headers: &'a [String],
    row: &'a AnnotatedRow,
}

struct RowValues<'a> {
    headers: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for RowValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, cell) in self.headers.iter().zip(self.cells) {
            map.serialize_entry(header, cell)?;
        }
        map.end()
    }
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(
            "values",
            &RowValues {
                headers: self.headers,
                cells: &self.row.cells,
            },
        )?;
        map.serialize_entry("issues", &self.row.issues)?;
        map.serialize_entry("issue_type", &self.row.issue_text())?;
        map.serialize_entry("status", &self.row.status)?;
        map.end()
    }
}
