//! Workbook export: values read back with calamine, cell fills resolved through styles.xml

use bigdecimal::BigDecimal;
use calamine::{Data, DataType, Reader, Xlsx};
use chrono::NaiveDate;
use invoice_validator::config::ExportConfig;
use invoice_validator::export::write_workbook;
use invoice_validator::models::{Cell, Status, ValidationReport};
use invoice_validator::ValidationService;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader as XmlReader;
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::str::FromStr;

mod common;

use common::{service, validate_csv};

const SHEET: &str = "Validated Invoices";

fn read_sheet(bytes: &[u8]) -> Vec<Vec<Data>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec())).expect("valid xlsx");
    let range = workbook.worksheet_range(SHEET).expect("sheet exists");
    range.rows().map(|r| r.to_vec()).collect()
}

fn zip_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).expect("xlsx is a zip");
    let mut part = String::new();
    archive
        .by_name(name)
        .expect("part exists")
        .read_to_string(&mut part)
        .expect("utf-8 part");
    part
}

fn attr(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// cellXfs index -> fill foreground rgb (None for unfilled styles)
fn xf_fills(styles: &str) -> Vec<Option<String>> {
    let mut fills: Vec<Option<String>> = Vec::new();
    let mut xf_fill_ids: Vec<usize> = Vec::new();
    let (mut in_fills, mut in_cell_xfs) = (false, false);

    let mut reader = XmlReader::from_str(styles);
    loop {
        match reader.read_event().expect("valid styles.xml") {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"fills" => in_fills = true,
                b"fill" if in_fills => fills.push(None),
                b"fgColor" if in_fills => {
                    if let Some(last) = fills.last_mut() {
                        *last = attr(&e, "rgb");
                    }
                }
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => xf_fill_ids.push(
                    attr(&e, "fillId").map_or(0, |id| id.parse().expect("numeric fillId")),
                ),
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"fills" => in_fills = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    xf_fill_ids
        .into_iter()
        .map(|id| fills.get(id).cloned().flatten())
        .collect()
}

/// sheet row number (1-based) -> fill rgb of each written cell, in column order
fn row_fills(bytes: &[u8]) -> BTreeMap<u32, Vec<Option<String>>> {
    let fills = xf_fills(&zip_part(bytes, "xl/styles.xml"));
    let sheet = zip_part(bytes, "xl/worksheets/sheet1.xml");

    let mut rows: BTreeMap<u32, Vec<Option<String>>> = BTreeMap::new();
    let mut reader = XmlReader::from_str(&sheet);
    loop {
        match reader.read_event().expect("valid sheet xml") {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"c" => {
                let reference = attr(&e, "r").expect("cell reference");
                let row: u32 = reference
                    .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                    .parse()
                    .expect("row number");
                let style: usize = attr(&e, "s").map_or(0, |s| s.parse().expect("numeric style"));
                rows.entry(row)
                    .or_default()
                    .push(fills.get(style).cloned().flatten());
            }
            Event::Eof => break,
            _ => {}
        }
    }
    rows
}

/// every data cell (original columns + Issue Type + Status) carries the fill of its status
fn assert_row_fills(report: &ValidationReport, bytes: &[u8]) {
    let rows = row_fills(bytes);
    let width = report.headers.len() + 2;

    for (idx, annotated) in report.rows.iter().enumerate() {
        let expected = match annotated.status {
            Status::Invalid => "FFC7CE",
            Status::Valid => "C6EFCE",
        };
        let cells = &rows[&(idx as u32 + 2)];
        assert_eq!(cells.len(), width, "row {} should write every column", idx + 2);
        for (col, fill) in cells.iter().enumerate() {
            let rgb = fill.as_deref().unwrap_or("");
            assert!(
                rgb.ends_with(expected),
                "row {} col {} has fill {:?}, expected {}",
                idx + 2,
                col,
                fill,
                expected
            );
        }
    }

    // header row is not filled
    assert!(rows[&1].iter().all(|f| f.is_none()));
}

fn number(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        other => panic!("expected a number, got {:?}", other),
    }
}

fn text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => panic!("expected text, got {:?}", other),
    }
}

fn export(report: &ValidationReport) -> Vec<u8> {
    write_workbook(report, SHEET).expect("export succeeds")
}

#[test]
fn test_header_row_adds_issue_and_status() {
    let report = validate_csv(&["INV-1,P-1,2,10,6,20,12,8,2024-03-15"]);
    let rows = read_sheet(&export(&report));

    let headers: Vec<String> = rows[0].iter().map(text).collect();
    assert_eq!(
        headers,
        vec![
            "invoice_number",
            "part_number",
            "qty",
            "sell_price",
            "cost_price",
            "total_sale_value",
            "total_cost_value",
            "profit",
            "date",
            "Issue Type",
            "Status"
        ]
    );
}

#[test]
fn test_roundtrip_preserves_data_columns() {
    let report = validate_csv(&[
        "INV-1,P-1,2,10,6,20,12,8,2024-03-15",
        "INV-1,P-1,-1,10.5,6.25,-10.5,-6.25,-4.25,03/16/2024",
        "INV-2,P-9,3,1.1,0.5,3.3,1.5,1.9,",
        "12345678901234567891,P-9,1,1,1,1,1,0,",
    ]);
    let rows = read_sheet(&export(&report));
    assert_eq!(rows.len(), report.rows.len() + 1);

    for (annotated, sheet_row) in report.rows.iter().zip(&rows[1..]) {
        for (cell, read) in annotated.cells.iter().zip(sheet_row) {
            match cell {
                Cell::Text(s) => assert_eq!(&text(read), s),
                Cell::Number(n) => match read {
                    Data::String(s) => assert_eq!(&BigDecimal::from_str(s).unwrap(), n),
                    _ => {
                        let expected: f64 = n.to_string().parse().unwrap();
                        assert_eq!(number(read), expected);
                    }
                },
                Cell::Date(d) => assert_eq!(read.as_date(), Some(*d)),
                Cell::Empty => assert!(read.is_empty()),
                Cell::Bool(b) => assert_eq!(read, &Data::Bool(*b)),
            }
        }
        let n = report.headers.len();
        assert_eq!(text(&sheet_row[n]), annotated.issue_text());
        assert_eq!(text(&sheet_row[n + 1]), annotated.status.to_string());
    }

    assert_eq!(
        rows[2][8].as_date(),
        NaiveDate::from_ymd_opt(2024, 3, 16)
    );
    // 超出 f64 精度的编号按文本写出
    assert_eq!(rows[4][0], Data::String("12345678901234567891".to_string()));
}

#[test]
fn test_dates_outside_excel_range_are_written_as_text() {
    let report = validate_csv(&[
        "INV-1,P-1,2,10,6,20,12,8,0500-01-01",
        "INV-2,P-1,2,10,6,20,12,8,2024-03-15",
    ]);
    assert!(matches!(report.rows[0].cells[8], Cell::Date(_)));

    let bytes = export(&report);
    let rows = read_sheet(&bytes);
    assert_eq!(rows[1][8], Data::String("01/01/0500".to_string()));
    assert_eq!(rows[2][8].as_date(), NaiveDate::from_ymd_opt(2024, 3, 15));
    assert_row_fills(&report, &bytes);
}

#[test]
fn test_all_valid_rows_use_green_fill_only() {
    let report = validate_csv(&[
        "INV-1,P-1,2,10,6,20,12,8,2024-03-15",
        "INV-2,P-1,1,5,3,5,3,2,2024-03-15",
    ]);
    let bytes = export(&report);
    assert_row_fills(&report, &bytes);

    let styles = zip_part(&bytes, "xl/styles.xml");
    assert!(!styles.contains("FFC7CE"));
    assert!(styles.contains("mm/dd/yyyy"));
}

#[test]
fn test_every_cell_of_a_row_uses_its_status_fill() {
    // empty date, empty sell_price and empty Issue Type cells are filled too
    let report = validate_csv(&[
        "INV-1,P-1,2,10,6,20,12,8,",
        "INV-2,P-1,0,10,6,0,0,0,2024-03-15",
        "INV-3,P-1,2,,6,20,12,8,",
        "INV-4,P-4,1,5,3,5,3,2,2024-03-15",
    ]);
    assert_eq!(report.rows[0].status, Status::Valid);
    assert_eq!(report.rows[1].status, Status::Invalid);
    assert_eq!(report.rows[2].status, Status::Invalid);
    assert_eq!(report.rows[3].status, Status::Valid);

    assert_row_fills(&report, &export(&report));
}

#[tokio::test]
async fn test_output_dir_keeps_a_copy() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("exports");
    let svc = ValidationService::new(ExportConfig {
        output_dir: Some(out.clone()),
        ..ExportConfig::default()
    });

    let report = svc
        .validate_upload("april.csv", common::csv_with_rows(&["INV-1,P-1,2,10,6,20,12,8,"]).as_bytes())
        .unwrap();
    let file = svc.export_xlsx(&report, "april.csv").unwrap();
    svc.persist_copy(&file).await.unwrap();

    let saved = std::fs::read(out.join(&file.filename)).unwrap();
    assert_eq!(saved, file.bytes);
}

#[tokio::test]
async fn test_no_output_dir_writes_nothing() {
    let svc = service();
    let report = svc
        .validate_upload("may.csv", common::csv_with_rows(&["INV-1,P-1,2,10,6,20,12,8,"]).as_bytes())
        .unwrap();
    let file = svc.export_csv(&report, "may.csv").unwrap();
    svc.persist_copy(&file).await.unwrap();
    assert!(!std::path::Path::new(&file.filename).exists());
}

#[test]
fn test_service_export_names_file_after_input() {
    let svc = service();
    let report = svc
        .validate_upload("march.csv", common::csv_with_rows(&["INV-1,P-1,2,10,6,20,12,8,"]).as_bytes())
        .unwrap();
    let file = svc.export_xlsx(&report, "march.csv").unwrap();
    assert!(file.filename.starts_with("validated_march_"));
    assert!(file.filename.ends_with(".xlsx"));
    assert_eq!(
        file.content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(!read_sheet(&file.bytes).is_empty());
}
