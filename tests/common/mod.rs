//! Shared fixtures for the invoice-validator integration tests

use invoice_validator::config::ExportConfig;
use invoice_validator::models::ValidationReport;
use invoice_validator::ValidationService;

pub const HEADER: &str =
    "invoice_number,part_number,qty,sell_price,cost_price,total_sale_value,total_cost_value,profit,date";

pub const BOUNDARY: &str = "----invoice-validator-test-boundary";

/// CSV content with the standard header followed by the given data lines
#[allow(dead_code)]
pub fn csv_with_rows(rows: &[&str]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    out
}

#[allow(dead_code)]
pub fn service() -> ValidationService {
    ValidationService::new(ExportConfig::default())
}

/// Parse and validate a CSV upload, panicking on input errors
#[allow(dead_code)]
pub fn validate_csv(rows: &[&str]) -> ValidationReport {
    service()
        .validate_upload("invoices.csv", csv_with_rows(rows).as_bytes())
        .expect("fixture CSV should parse")
}

/// multipart/form-data body with a single part
#[allow(dead_code)]
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

#[allow(dead_code)]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
