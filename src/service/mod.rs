pub mod duplicates;
pub mod report;
pub mod validator;

pub use duplicates::flag_duplicates;
pub use report::assemble;
pub use validator::{round2, validate_record};

use crate::config::ExportConfig;
use crate::export::{self, ExportError, CSV_CONTENT_TYPE, XLSX_CONTENT_TYPE};
use crate::input::{parse_table, InputError, InputFormat};
use crate::models::ValidationReport;
use chrono::Local;

/// 导出结果文件
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// 发票校验服务 (无状态, 仅持有导出配置)
pub struct ValidationService {
    export: ExportConfig,
}

impl ValidationService {
    pub fn new(export: ExportConfig) -> Self {
        Self { export }
    }

    /// 解析上传文件并完成全部校验
    pub fn validate_upload(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<ValidationReport, InputError> {
        let format = InputFormat::from_filename(filename)?;
        let table = parse_table(format, content)?;

        tracing::info!(
            "文件 {} 解析完成: 格式 {}, {} 行, {} 列",
            filename,
            format,
            table.len(),
            table.headers.len()
        );

        let report = assemble(table);
        let s = &report.summary;
        tracing::info!(
            "文件 {} 校验完成: 有效 {}, 无效 {}, 重复 {} (共 {} 行)",
            filename,
            s.valid_rows,
            s.invalid_rows,
            s.duplicate_rows,
            s.total_rows
        );

        Ok(report)
    }

    /// 导出 Excel (红/绿底色)
    pub fn export_xlsx(
        &self,
        report: &ValidationReport,
        input_filename: &str,
    ) -> Result<ExportedFile, ExportError> {
        let bytes = export::write_workbook(report, &self.export.sheet_name)?;
        Ok(ExportedFile {
            filename: export::output_filename(input_filename, Local::now().date_naive(), "xlsx"),
            content_type: XLSX_CONTENT_TYPE,
            bytes,
        })
    }

    /// 导出 CSV
    pub fn export_csv(
        &self,
        report: &ValidationReport,
        input_filename: &str,
    ) -> Result<ExportedFile, ExportError> {
        let bytes = export::write_csv(report)?;
        Ok(ExportedFile {
            filename: export::output_filename(input_filename, Local::now().date_naive(), "csv"),
            content_type: CSV_CONTENT_TYPE,
            bytes,
        })
    }

    /// 配置了输出目录时, 在磁盘上保留一份导出文件
    pub async fn persist_copy(&self, file: &ExportedFile) -> Result<(), ExportError> {
        let Some(dir) = &self.export.output_dir else {
            return Ok(());
        };
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&file.filename);
        tokio::fs::write(&path, &file.bytes).await?;
        tracing::info!("导出文件已保存: {}", path.display());
        Ok(())
    }
}
