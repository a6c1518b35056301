use super::ExportError;
use crate::models::record::COL_DATE;
use crate::models::{exact_f64, Cell, Status, ValidationReport};
use chrono::Datelike;
use rust_xlsxwriter::{Color, ExcelDateTime, Format, FormatBorder, FormatPattern, Workbook, Worksheet};

/// 无效行底色
pub const INVALID_FILL: u32 = 0xFFC7CE;
/// 有效行底色
pub const VALID_FILL: u32 = 0xC6EFCE;

const DATE_NUM_FORMAT: &str = "mm/dd/yyyy";
/// Excel 日期可表示的年份
const EXCEL_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

/// 同一状态下的单元格格式
struct RowFormats {
    base: Format,
    date: Format,
}

impl RowFormats {
    fn with_fill(rgb: u32) -> Self {
        let base = Format::new()
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(rgb));
        let date = base.clone().set_num_format(DATE_NUM_FORMAT);
        Self { base, date }
    }
}

/// 生成带红/绿底色的校验结果工作簿 (内存中)
pub fn write_workbook(report: &ValidationReport, sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header = Format::new().set_bold().set_border(FormatBorder::Thin);
    for (col, name) in report.output_headers().into_iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header)?;
    }

    let invalid = RowFormats::with_fill(INVALID_FILL);
    let valid = RowFormats::with_fill(VALID_FILL);
    let date_col = report.headers.iter().position(|h| h == COL_DATE);
    let issue_col = report.headers.len() as u16;

    for (idx, row) in report.rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        let formats = match row.status {
            Status::Invalid => &invalid,
            Status::Valid => &valid,
        };

        for (col, cell) in row.cells.iter().enumerate() {
            let format = if Some(col) == date_col {
                &formats.date
            } else {
                &formats.base
            };
            write_cell(worksheet, r, col as u16, cell, format)?;
        }

        write_text(worksheet, r, issue_col, &row.issue_text(), &formats.base)?;
        write_text(worksheet, r, issue_col + 1, row.status.as_str(), &formats.base)?;
    }

    worksheet.autofit();

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

fn write_text(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    format: &Format,
) -> Result<(), ExportError> {
    if text.is_empty() {
        ws.write_blank(row, col, format)?;
    } else {
        ws.write_string_with_format(row, col, text, format)?;
    }
    Ok(())
}

fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: &Format,
) -> Result<(), ExportError> {
    match cell {
        Cell::Empty => {
            ws.write_blank(row, col, format)?;
        }
        // 超出 f64 精度的数值 (如长编号) 按文本写出, 避免丢位
        Cell::Number(n) => match exact_f64(n) {
            Some(v) => {
                ws.write_number_with_format(row, col, v, format)?;
            }
            None => write_text(ws, row, col, &n.to_plain_string(), format)?,
        },
        Cell::Text(s) => write_text(ws, row, col, s, format)?,
        Cell::Bool(b) => {
            ws.write_boolean_with_format(row, col, *b, format)?;
        }
        Cell::Date(d) if EXCEL_YEARS.contains(&d.year()) => {
            let dt = ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8)?;
            ws.write_datetime_with_format(row, col, &dt, format)?;
        }
        // Excel 无法表示的年份按 MM/DD/YYYY 文本写出
        Cell::Date(d) => write_text(ws, row, col, &d.format("%m/%d/%Y").to_string(), format)?,
    }
    Ok(())
}
