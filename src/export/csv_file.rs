use super::ExportError;
use crate::models::ValidationReport;
use csv::Writer;

/// 导出校验结果到 CSV (无格式)
pub fn write_csv(report: &ValidationReport) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());

    writer.write_record(report.output_headers())?;

    for row in &report.rows {
        let mut record: Vec<String> = row.cells.iter().map(|c| c.to_string()).collect();
        record.push(row.issue_text());
        record.push(row.status.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
