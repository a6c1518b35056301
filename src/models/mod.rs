pub mod issue;
pub mod record;
pub mod report;

pub use issue::{join_issues, Issue, Status};
pub use record::{exact_f64, parse_date, parse_decimal, Cell, FieldError, Record, RecordColumns, Table};
pub use report::{AnnotatedRow, JsonRow, ReportSummary, ValidationReport};
