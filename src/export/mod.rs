pub mod csv_file;
pub mod xlsx;

use chrono::NaiveDate;
use std::path::Path;
use thiserror::Error;

pub use csv_file::write_csv;
pub use xlsx::write_workbook;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// 导出错误 (服务端错误)
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Excel export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Export I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// 输出文件名: validated_<原文件名>_<YYYYMMDD>.<ext>
///
/// 文件名会放进 Content-Disposition 头, 非 [A-Za-z0-9_-.] 字符替换为 '_'
pub fn output_filename(input_filename: &str, date: NaiveDate, extension: &str) -> String {
    let stem: String = Path::new(input_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "invoices" } else { stem.as_str() };
    format!("validated_{}_{}.{}", stem, date.format("%Y%m%d"), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_uses_stem_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(
            output_filename("march_invoices.csv", date, "xlsx"),
            "validated_march_invoices_20240509.xlsx"
        );
        assert_eq!(
            output_filename("uploads/batch.json", date, "csv"),
            "validated_batch_20240509.csv"
        );
        assert_eq!(output_filename("", date, "xlsx"), "validated_invoices_20240509.xlsx");
        assert_eq!(
            output_filename("q1 \"east\".csv", date, "xlsx"),
            "validated_q1__east__20240509.xlsx"
        );
    }
}
