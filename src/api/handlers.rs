use super::error::AppError;
use crate::models::{JsonRow, ReportSummary};
use crate::service::{ExportedFile, ValidationService};
use axum::{
    extract::{Json, Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 上传字段名
const FILE_FIELD: &str = "file";

/// 返回格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Json,
    Csv,
}

/// 查询参数: ?format=xlsx|json|csv
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub format: OutputFormat,
}

/// JSON 模式响应体
#[derive(Serialize)]
pub struct ValidationResponse<'a> {
    pub filename: &'a str,
    pub summary: &'a ReportSummary,
    pub rows: Vec<JsonRow<'a>>,
}

/// 健康检查响应体
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// 健康检查
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Invoice Validation API running",
    })
}

/// 上传发票文件并校验
pub async fn upload_invoices(
    State(service): State<Arc<ValidationService>>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let (filename, content) = read_upload(&mut multipart).await?;
    tracing::info!(
        "收到上传文件 {} ({} bytes), 返回格式 {:?}",
        filename,
        content.len(),
        query.format
    );

    // 解析/校验/导出均为 CPU 计算, 放到阻塞线程池执行
    let worker = Arc::clone(&service);
    let format = query.format;
    let rendered =
        tokio::task::spawn_blocking(move || render(&worker, &filename, &content, format)).await??;

    let file = match rendered {
        Rendered::Json(body) => {
            return Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response());
        }
        Rendered::File(file) => file,
    };

    service.persist_copy(&file).await?;
    tracing::info!("导出 {} ({} bytes)", file.filename, file.bytes.len());
    Ok(attachment(file))
}

/// 校验结果的输出形式
enum Rendered {
    Json(Vec<u8>),
    File(ExportedFile),
}

/// 同步流水线: 解析 -> 校验 -> 按格式输出
fn render(
    service: &ValidationService,
    filename: &str,
    content: &[u8],
    format: OutputFormat,
) -> Result<Rendered, AppError> {
    let report = service.validate_upload(filename, content)?;

    let rendered = match format {
        OutputFormat::Json => {
            let response = ValidationResponse {
                filename,
                summary: &report.summary,
                rows: report.json_rows(),
            };
            Rendered::Json(serde_json::to_vec(&response)?)
        }
        OutputFormat::Xlsx => Rendered::File(service.export_xlsx(&report, filename)?),
        OutputFormat::Csv => Rendered::File(service.export_csv(&report, filename)?),
    };
    Ok(rendered)
}

/// 读取 multipart 中的 file 字段
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok((filename, bytes.to_vec()));
    }
    Err(AppError::MissingFile)
}

fn attachment(file: ExportedFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response()
}
