// ==========================================
// TruckFlow 运输台账 - 表单校验引擎
// ==========================================
// 规则顺序（每行）: 合作方 → 起点 → 终点 → 起终点相同 → 金额 → 车数
// 输出: 全部失败字段用于高亮；仅第一个失败（行号最小、规则最靠前）作为阻断消息
// 红线: 本地校验不发起任何远程调用
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::{is_unset, EntryRow, FormField};

/// 空表单提示
pub const EMPTY_FORM_MESSAGE: &str = "Please add at least one entry";

// ==========================================
// ValidationIssue - 阻断性校验错误
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// 行索引（从 0 开始）；空表单时为 None
    pub row_index: Option<usize>,
    /// 字段；空表单时为 None
    pub field: Option<FormField>,
    pub message: String,
}

impl ValidationIssue {
    /// 不关联任何字段的错误
    pub fn form_level(message: impl Into<String>) -> Self {
        Self {
            row_index: None,
            field: None,
            message: message.into(),
        }
    }
}

// ==========================================
// ValidationReport - 校验结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub first_error: Option<ValidationIssue>,
    /// (行索引, 字段)
    pub fields_to_highlight: BTreeSet<(usize, FormField)>,
}

impl ValidationReport {
    fn empty_form() -> Self {
        Self {
            ok: false,
            first_error: Some(ValidationIssue::form_level(EMPTY_FORM_MESSAGE)),
            fields_to_highlight: BTreeSet::new(),
        }
    }
}

// ==========================================
// ValidationEngine
// ==========================================
pub struct ValidationEngine;

impl ValidationEngine {
    /// 校验全部录入行
    pub fn validate(rows: &[EntryRow]) -> ValidationReport {
        if rows.is_empty() {
            return ValidationReport::empty_form();
        }

        let mut first_error: Option<ValidationIssue> = None;
        let mut highlights = BTreeSet::new();

        for (index, row) in rows.iter().enumerate() {
            for failure in row_failures(index + 1, row) {
                for field in failure.highlight {
                    highlights.insert((index, *field));
                }
                if first_error.is_none() {
                    first_error = Some(ValidationIssue {
                        row_index: Some(index),
                        field: Some(failure.field),
                        message: failure.message,
                    });
                }
            }
        }

        ValidationReport {
            ok: first_error.is_none(),
            first_error,
            fields_to_highlight: highlights,
        }
    }
}

struct RuleFailure {
    field: FormField,
    highlight: &'static [FormField],
    message: String,
}

fn missing(value: Option<&str>) -> bool {
    value.map(is_unset).unwrap_or(true)
}

/// 按固定规则顺序列出一行的全部失败
fn row_failures(row_num: usize, row: &EntryRow) -> Vec<RuleFailure> {
    let mut failures = Vec::new();

    if missing(row.partner.as_deref()) {
        failures.push(RuleFailure {
            field: FormField::Partner,
            highlight: &[FormField::Partner],
            message: format!("Row {}: Please select a partner", row_num),
        });
    }

    if missing(row.from.as_deref()) {
        failures.push(RuleFailure {
            field: FormField::From,
            highlight: &[FormField::From],
            message: format!("Row {}: Please select a \"From\" location", row_num),
        });
    }

    if missing(row.to.as_deref()) {
        failures.push(RuleFailure {
            field: FormField::To,
            highlight: &[FormField::To],
            message: format!("Row {}: Please select a \"To\" location", row_num),
        });
    }

    if let (Some(from), Some(to)) = (row.from.as_deref(), row.to.as_deref()) {
        if !missing(Some(from)) && !missing(Some(to)) && from == to {
            failures.push(RuleFailure {
                field: FormField::To,
                highlight: &[FormField::From, FormField::To],
                message: format!(
                    "Row {}: \"From\" and \"To\" locations cannot be the same",
                    row_num
                ),
            });
        }
    }

    let amount_ok = matches!(row.amount, Some(a) if a.is_finite() && a > 0.0);
    if !amount_ok {
        failures.push(RuleFailure {
            field: FormField::Amount,
            highlight: &[FormField::Amount],
            message: format!("Row {}: Please enter a valid amount greater than 0", row_num),
        });
    }

    if !matches!(row.truck_count, Some(n) if n > 0) {
        failures.push(RuleFailure {
            field: FormField::TruckCount,
            highlight: &[FormField::TruckCount],
            message: format!(
                "Row {}: Please enter a valid truck count greater than 0",
                row_num
            ),
        });
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CUSTOM_SENTINEL;

    fn valid_row() -> EntryRow {
        let mut row = EntryRow::empty();
        row.partner = Some("A".into());
        row.from = Some("X".into());
        row.to = Some("Y".into());
        row.amount = Some(100.0);
        row.truck_count = Some(2);
        row
    }

    #[test]
    fn test_empty_form_is_invalid_without_field() {
        let report = ValidationEngine::validate(&[]);
        assert!(!report.ok);
        let issue = report.first_error.unwrap();
        assert_eq!(issue.message, "Please add at least one entry");
        assert_eq!(issue.row_index, None);
        assert_eq!(issue.field, None);
        assert!(report.fields_to_highlight.is_empty());
    }

    #[test]
    fn test_valid_rows_pass() {
        let report = ValidationEngine::validate(&[valid_row(), valid_row()]);
        assert!(report.ok);
        assert!(report.first_error.is_none());
        assert!(report.fields_to_highlight.is_empty());
    }

    #[test]
    fn test_second_row_missing_to() {
        let mut second = valid_row();
        second.to = Some(String::new());
        let report = ValidationEngine::validate(&[valid_row(), second]);

        assert!(!report.ok);
        let issue = report.first_error.unwrap();
        assert_eq!(issue.row_index, Some(1));
        assert_eq!(issue.field, Some(FormField::To));
        assert_eq!(issue.message, "Row 2: Please select a \"To\" location");
        assert_eq!(
            report.fields_to_highlight,
            BTreeSet::from([(1, FormField::To)])
        );
    }

    #[test]
    fn test_first_error_follows_row_then_rule_order() {
        let mut first = valid_row();
        first.amount = Some(0.0);
        let mut second = EntryRow::empty();
        second.partner = Some(CUSTOM_SENTINEL.into());

        let report = ValidationEngine::validate(&[first, second]);
        let issue = report.first_error.unwrap();
        assert_eq!(issue.row_index, Some(0));
        assert_eq!(issue.field, Some(FormField::Amount));
        assert_eq!(
            issue.message,
            "Row 1: Please enter a valid amount greater than 0"
        );
        // 第二行全部字段均被高亮
        for field in [
            FormField::Partner,
            FormField::From,
            FormField::To,
            FormField::Amount,
            FormField::TruckCount,
        ] {
            assert!(report.fields_to_highlight.contains(&(1, field)));
        }
        assert_eq!(report.fields_to_highlight.len(), 6);
    }

    #[test]
    fn test_same_locations_highlight_both() {
        let mut row = valid_row();
        row.to = Some("X".into());
        let report = ValidationEngine::validate(&[row]);

        let issue = report.first_error.unwrap();
        assert_eq!(
            issue.message,
            "Row 1: \"From\" and \"To\" locations cannot be the same"
        );
        assert_eq!(issue.field, Some(FormField::To));
        assert_eq!(
            report.fields_to_highlight,
            BTreeSet::from([(0, FormField::From), (0, FormField::To)])
        );
    }

    #[test]
    fn test_truck_count_and_nan_amount() {
        let mut row = valid_row();
        row.amount = Some(f64::NAN);
        row.truck_count = Some(-1);
        let report = ValidationEngine::validate(&[row]);
        assert_eq!(
            report.fields_to_highlight,
            BTreeSet::from([(0, FormField::Amount), (0, FormField::TruckCount)])
        );
    }

    #[test]
    fn test_unset_locations_are_not_reported_as_equal() {
        let mut row = valid_row();
        row.from = Some(CUSTOM_SENTINEL.into());
        row.to = Some(CUSTOM_SENTINEL.into());

        let failures = row_failures(1, &row);
        assert!(failures
            .iter()
            .all(|f| !f.message.contains("cannot be the same")));
        assert_eq!(failures.len(), 2);

        let report = ValidationEngine::validate(&[row]);
        let issue = report.first_error.unwrap();
        assert_eq!(issue.message, "Row 1: Please select a \"From\" location");
        assert!(report.fields_to_highlight.contains(&(0, FormField::From)));
        assert!(report.fields_to_highlight.contains(&(0, FormField::To)));
    }
}
