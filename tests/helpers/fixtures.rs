// ==========================================
// 测试数据 - 用于集成测试
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use truckflow::config::AppConfig;
use truckflow::domain::{EntryStatus, Transaction};
use truckflow::remote::RemoteStore;

use super::mock_remote::MockRemoteStore;

pub fn entry_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        endpoint_url: "http://localhost:9/exec".to_string(),
        ..AppConfig::default()
    }
}

/// 默认目录: 合作方 Acme/Beta/Cargo，地点 Depot/Port/Yard
pub fn standard_remote() -> Arc<MockRemoteStore> {
    truckflow::logging::init_test();
    Arc::new(MockRemoteStore::new(
        &["Acme", "Beta", "Cargo"],
        &["Depot", "Port", "Yard"],
    ))
}

pub fn as_store(mock: &Arc<MockRemoteStore>) -> Arc<dyn RemoteStore> {
    mock.clone()
}

pub fn transaction(row_number: i64, partner: &str) -> Transaction {
    Transaction {
        date: entry_date(),
        partner: partner.to_string(),
        from: "Depot".to_string(),
        to: "Port".to_string(),
        amount: 1200.0,
        truck_count: 2,
        status: EntryStatus::Paid,
        row_number: Some(row_number),
        row_id: None,
    }
}
