// ==========================================
// TruckFlow 运输台账 - 交易记录与提交载荷
// ==========================================
// 职责: 远程接口的记录格式（camelCase）
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::types::EntryStatus;

// ==========================================
// EntryPayload - 提交/更新载荷
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    pub date: NaiveDate,
    pub partner: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub truck_count: i64,
    pub status: EntryStatus,
}

// ==========================================
// EntryRef - 已记录交易的定位符
// ==========================================
/// 远程记录定位：表格行号或行标识，均以 `rowNumber` 字段发送
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryRef {
    RowNumber(i64),
    RowId(String),
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryRef::RowNumber(n) => write!(f, "{}", n),
            EntryRef::RowId(id) => write!(f, "{}", id),
        }
    }
}

// ==========================================
// Transaction - 已记录交易
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: NaiveDate,
    pub partner: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub truck_count: i64,
    #[serde(default)]
    pub status: EntryStatus,
    #[serde(default)]
    pub row_number: Option<i64>,
    #[serde(default)]
    pub row_id: Option<String>,
}

impl Transaction {
    /// 是否匹配给定定位符（行号或行标识任一匹配即可）
    pub fn matches(&self, entry_ref: &EntryRef) -> bool {
        match entry_ref {
            EntryRef::RowNumber(n) => self.row_number == Some(*n),
            EntryRef::RowId(id) => {
                self.row_id.as_deref() == Some(id.as_str())
                    || id
                        .parse::<i64>()
                        .map(|n| self.row_number == Some(n))
                        .unwrap_or(false)
            }
        }
    }

    /// 首选定位符：优先行号
    pub fn entry_ref(&self) -> Option<EntryRef> {
        match (self.row_number, &self.row_id) {
            (Some(n), _) => Some(EntryRef::RowNumber(n)),
            (None, Some(id)) => Some(EntryRef::RowId(id.clone())),
            (None, None) => None,
        }
    }
}

// ==========================================
// 汇总数据（由远程计算，本库仅透传）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_trucks: i64,
    #[serde(default)]
    pub total_paid: f64,
    #[serde(default)]
    pub total_outstanding: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(default)]
    pub summary: DashboardSummary,
    #[serde(default)]
    pub table_data: Vec<Transaction>,
}
