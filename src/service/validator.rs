use crate::models::{Issue, Record};
use bigdecimal::{BigDecimal, RoundingMode, Zero};

/// 金额比较精度 (小数位)
const MONEY_SCALE: i64 = 2;

/// 保留两位小数, 银行家舍入 (half-to-even)
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(MONEY_SCALE, RoundingMode::HalfEven)
}

fn amounts_differ(computed: &BigDecimal, declared: &BigDecimal) -> bool {
    round2(computed) != round2(declared)
}

/// 单行校验: 四条规则逐条独立判断, 不短路
pub fn validate_record(record: &Record) -> Vec<Issue> {
    let mut issues = Vec::new();

    if amounts_differ(&(&record.sell_price * &record.qty), &record.total_sale_value) {
        issues.push(Issue::TotalSaleMismatch);
    }

    if amounts_differ(&(&record.cost_price * &record.qty), &record.total_cost_value) {
        issues.push(Issue::TotalCostMismatch);
    }

    if amounts_differ(
        &(&record.total_sale_value - &record.total_cost_value),
        &record.profit,
    ) {
        issues.push(Issue::ProfitMismatch);
    }

    if record.qty <= BigDecimal::zero() {
        issues.push(Issue::InvalidQuantity);
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn record(qty: &str, sell: &str, cost: &str, sale_total: &str, cost_total: &str, profit: &str) -> Record {
        Record {
            invoice_number: "INV-1".to_string(),
            part_number: "P-1".to_string(),
            qty: dec(qty),
            sell_price: dec(sell),
            cost_price: dec(cost),
            total_sale_value: dec(sale_total),
            total_cost_value: dec(cost_total),
            profit: dec(profit),
            date: None,
        }
    }

    #[test]
    fn consistent_record_has_no_issues() {
        let r = record("2", "10", "6", "20.00", "12", "8");
        assert!(validate_record(&r).is_empty());
    }

    #[test]
    fn sale_total_off_by_a_cent() {
        let r = record("2", "10", "6", "20.01", "12", "8.01");
        assert_eq!(validate_record(&r), vec![Issue::TotalSaleMismatch]);
    }

    #[test]
    fn all_rules_are_evaluated() {
        let r = record("0", "10", "6", "5", "4", "9");
        assert_eq!(
            validate_record(&r),
            vec![
                Issue::TotalSaleMismatch,
                Issue::TotalCostMismatch,
                Issue::ProfitMismatch,
                Issue::InvalidQuantity,
            ]
        );
    }

    #[test]
    fn negative_quantity_is_flagged_even_when_totals_agree() {
        let r = record("-1", "10", "6", "-10", "-6", "-4");
        assert_eq!(validate_record(&r), vec![Issue::InvalidQuantity]);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round2(&dec("2.675")), dec("2.68"));
        assert_eq!(round2(&dec("2.665")), dec("2.66"));
        assert_eq!(round2(&dec("-1.005")), dec("-1.00"));

        // 3.333 * 3 = 9.999 -> 10.00
        let r = record("3", "3.333", "1", "10", "3", "7");
        assert!(validate_record(&r).is_empty());
    }
}
