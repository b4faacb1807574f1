// ==========================================
// EntryFormApi 集成测试
// ==========================================
// 测试范围:
// 1. 打开表单: 目录加载、当日已用合作方、加载失败
// 2. 行编辑: 合作方唯一、地点互斥、删除唯一行
// 3. 切换日期
// 4. 提交前校验与高亮
// ==========================================

mod helpers;

use std::time::Duration;

use helpers::fixtures::{as_store, entry_date, standard_remote, test_config};
use truckflow::api::{ApiError, EntryFormApi};
use truckflow::domain::{FormField, LocationField, Selection, SelectOption, Severity};
use truckflow::remote::RemoteError;

fn partner_values(form: &EntryFormApi, row: truckflow::domain::RowId) -> Vec<String> {
    form.options(row)
        .unwrap()
        .partners
        .iter()
        .map(|o| o.value().to_string())
        .collect()
}

// ==========================================
// 打开表单
// ==========================================

#[tokio::test]
async fn test_open_excludes_partners_used_today() {
    let remote = standard_remote();
    remote.set_used(entry_date(), &["Beta"]);

    let form = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .unwrap();

    let rows = form.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        partner_values(&form, rows[0].id),
        vec!["Acme", "Cargo", "__custom__"]
    );
    assert_eq!(form.date().unwrap(), entry_date());
    assert!(form.default_persist());
}

#[tokio::test]
async fn test_used_partner_failure_degrades_to_empty_set() {
    let remote = standard_remote();
    remote.set_used(entry_date(), &["Beta"]);
    remote.fail_used_partners(RemoteError::Transport("offline".into()));

    let form = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .expect("已用合作方加载失败不应阻断表单");

    let row = form.rows().unwrap()[0].id;
    assert_eq!(
        partner_values(&form, row),
        vec!["Acme", "Beta", "Cargo", "__custom__"]
    );
}

#[tokio::test]
async fn test_catalog_failure_reports_load_error() {
    let remote = standard_remote();
    remote.fail_catalog(RemoteError::Transport("offline".into()));

    let err = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .err()
        .expect("目录加载失败应返回错误");
    assert!(err.is_retryable());
    assert_eq!(err.user_message(), "Failed to load data. Please try again.");
}

// ==========================================
// 行编辑
// ==========================================

#[tokio::test]
async fn test_partner_held_by_one_row_is_hidden_from_others() {
    let remote = standard_remote();
    let form = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .unwrap();
    let first = form.rows().unwrap()[0].id;
    let second = form.add_row().unwrap();

    form.select_partner(first, Selection::Value("Acme".into()))
        .unwrap();
    assert_eq!(
        partner_values(&form, second),
        vec!["Beta", "Cargo", "__custom__"]
    );
    assert_eq!(
        partner_values(&form, first),
        vec!["Acme", "Beta", "Cargo", "__custom__"]
    );

    let err = form
        .select_partner(second, Selection::Value("Acme".into()))
        .unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    assert_eq!(err.severity(), Severity::Warning);

    // 释放后重新可选
    form.select_partner(first, Selection::Clear).unwrap();
    assert!(partner_values(&form, second).contains(&"Acme".to_string()));
}

#[tokio::test]
async fn test_from_and_to_exclude_each_other() {
    let remote = standard_remote();
    let form = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .unwrap();
    let row = form.rows().unwrap()[0].id;

    form.select_location(row, LocationField::From, Selection::Value("Port".into()))
        .unwrap();
    let options = form.options(row).unwrap();
    assert!(!options.to.contains(&SelectOption::Existing("Port".into())));
    assert!(options.from.contains(&SelectOption::Existing("Port".into())));
    assert_eq!(options.to.last(), Some(&SelectOption::CreateNew));

    let err = form
        .select_location(row, LocationField::To, Selection::Value("Port".into()))
        .unwrap_err();
    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));

    // 地点可在多行重复使用
    let other = form.add_row().unwrap();
    form.select_location(other, LocationField::From, Selection::Value("Port".into()))
        .unwrap();
}

#[tokio::test]
async fn test_deleting_sole_row_clears_it() {
    let remote = standard_remote();
    let form = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .unwrap();
    let row = form.rows().unwrap()[0].id;
    form.select_partner(row, Selection::Value("Acme".into()))
        .unwrap();
    form.set_amount(row, Some(500.0)).unwrap();

    let notice = form.delete_row(row).unwrap().expect("应返回警告");
    assert_eq!(notice.severity, Severity::Warning);
    assert_eq!(notice.message, "At least one entry row is required");

    let rows = form.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, row);
    assert_eq!(rows[0].partner, None);
    assert_eq!(rows[0].amount, None);
    assert!(partner_values(&form, row).contains(&"Acme".to_string()));
}

#[tokio::test]
async fn test_deleting_row_releases_partner() {
    let remote = standard_remote();
    let form = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .unwrap();
    let first = form.rows().unwrap()[0].id;
    let second = form.add_row().unwrap();
    form.select_partner(second, Selection::Value("Cargo".into()))
        .unwrap();
    assert!(!partner_values(&form, first).contains(&"Cargo".to_string()));

    assert_eq!(form.delete_row(second).unwrap(), None);
    assert!(partner_values(&form, first).contains(&"Cargo".to_string()));
    assert!(form.options(second).is_err());
}

// ==========================================
// 切换日期
// ==========================================

#[tokio::test]
async fn test_change_date_clears_colliding_partner() {
    let remote = standard_remote();
    let next_day = entry_date().succ_opt().unwrap();
    remote.set_used(next_day, &["Acme"]);

    let form = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .unwrap();
    let row = form.rows().unwrap()[0].id;
    form.select_partner(row, Selection::Value("Acme".into()))
        .unwrap();

    let released = form.change_date(next_day).await.unwrap();
    assert_eq!(released, vec![row]);
    assert_eq!(form.rows().unwrap()[0].partner, None);
    assert_eq!(
        partner_values(&form, row),
        vec!["Beta", "Cargo", "__custom__"]
    );
    assert_eq!(remote.calls("getUsedPartnersForDate"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_date_changes_keep_latest_request() {
    let remote = standard_remote();
    let slow_day = entry_date().succ_opt().unwrap();
    let fast_day = slow_day.succ_opt().unwrap();
    remote.set_used(slow_day, &["Acme"]);
    remote.delay_used(slow_day, Duration::from_secs(5));
    remote.delay_used(fast_day, Duration::from_secs(1));

    let form = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .unwrap();
    let row = form.rows().unwrap()[0].id;
    form.select_partner(row, Selection::Value("Acme".into()))
        .unwrap();

    let (slow, fast) = tokio::join!(form.change_date(slow_day), form.change_date(fast_day));
    assert!(slow.unwrap().is_empty());
    assert!(fast.unwrap().is_empty());

    // 晚到的旧日期结果不覆盖最后一次请求
    assert_eq!(form.date().unwrap(), fast_day);
    assert_eq!(form.rows().unwrap()[0].partner.as_deref(), Some("Acme"));
    assert_eq!(remote.calls("getUsedPartnersForDate"), 3);
}

// ==========================================
// 校验
// ==========================================

#[tokio::test]
async fn test_validation_highlights_only_missing_to() {
    let remote = standard_remote();
    let form = EntryFormApi::open(as_store(&remote), &test_config(), entry_date())
        .await
        .unwrap();

    let first = form.rows().unwrap()[0].id;
    let second = form.add_row().unwrap();
    for (row, partner) in [(first, "Acme"), (second, "Beta")] {
        form.select_partner(row, Selection::Value(partner.into()))
            .unwrap();
        form.select_location(row, LocationField::From, Selection::Value("Depot".into()))
            .unwrap();
        form.set_amount(row, Some(100.0)).unwrap();
        form.set_truck_count(row, Some(1)).unwrap();
    }
    form.select_location(first, LocationField::To, Selection::Value("Port".into()))
        .unwrap();

    let report = form.validate().unwrap();
    assert!(!report.ok);
    let issue = report.first_error.unwrap();
    assert_eq!(issue.row_index, Some(1));
    assert_eq!(issue.field, Some(FormField::To));
    assert_eq!(issue.message, "Row 2: Please select a \"To\" location");

    let highlighted = form.highlighted_fields().unwrap();
    assert_eq!(highlighted.len(), 1);
    assert!(highlighted.contains(&(1, FormField::To)));

    // 编辑该字段后高亮清除
    form.select_location(second, LocationField::To, Selection::Value("Yard".into()))
        .unwrap();
    assert!(form.highlighted_fields().unwrap().is_empty());
    assert!(form.validate().unwrap().ok);
}
