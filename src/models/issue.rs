use serde::Serialize;
use std::fmt;

/// 校验问题类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Issue {
    TotalSaleMismatch,
    TotalCostMismatch,
    ProfitMismatch,
    InvalidQuantity,
    DuplicateInvoice,
    ValidationError(String),
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::TotalSaleMismatch => f.write_str("Total sale mismatch"),
            Issue::TotalCostMismatch => f.write_str("Total cost mismatch"),
            Issue::ProfitMismatch => f.write_str("Profit mismatch"),
            Issue::InvalidQuantity => f.write_str("Invalid quantity"),
            Issue::DuplicateInvoice => f.write_str("Duplicate invoice"),
            Issue::ValidationError(cause) => write!(f, "Validation error: {}", cause),
        }
    }
}

/// 行状态, 由问题列表是否为空决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Valid,
    Invalid,
}

impl Status {
    pub fn from_issues(issues: &[Issue]) -> Self {
        if issues.is_empty() {
            Status::Valid
        } else {
            Status::Invalid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Valid => "Valid",
            Status::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 展示用问题字符串, 以 ", " 连接
pub fn join_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
