use super::duplicates::flag_duplicates;
use super::validator::validate_record;
use crate::models::{
    AnnotatedRow, Cell, Issue, RecordColumns, ReportSummary, Status, Table, ValidationReport,
};

/// 单行问题列表: 字段错误时只记录该错误, 其余规则跳过
fn row_issues(columns: &RecordColumns, cells: &[Cell], is_duplicate: bool) -> Vec<Issue> {
    let mut issues = match columns.record(cells) {
        Ok(record) => validate_record(&record),
        Err(e) => vec![Issue::ValidationError(e.to_string())],
    };
    if is_duplicate {
        issues.push(Issue::DuplicateInvoice);
    }
    issues
}

/// 汇总: 重复检测 -> 逐行校验 -> 状态
pub fn assemble(table: Table) -> ValidationReport {
    let columns = RecordColumns::resolve(&table);
    let duplicates = flag_duplicates(&table, &columns);

    let mut summary = ReportSummary {
        total_rows: table.rows.len(),
        ..Default::default()
    };

    let rows: Vec<AnnotatedRow> = table
        .rows
        .into_iter()
        .zip(duplicates)
        .map(|(cells, is_duplicate)| {
            let issues = row_issues(&columns, &cells, is_duplicate);
            let status = Status::from_issues(&issues);
            match status {
                Status::Valid => summary.valid_rows += 1,
                Status::Invalid => summary.invalid_rows += 1,
            }
            if is_duplicate {
                summary.duplicate_rows += 1;
            }
            AnnotatedRow {
                cells,
                issues,
                status,
            }
        })
        .collect();

    ValidationReport {
        headers: table.headers,
        rows,
        summary,
    }
}
