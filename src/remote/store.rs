// ==========================================
// TruckFlow 运输台账 - 远程存储 Trait
// ==========================================
// 职责: 定义远程接口契约（不包含实现）
// 实现者: HttpRemoteStore（单一入口、按 action 分发的 JSON 接口）
// 说明: 测试中以内存实现替代
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DashboardData, DateFilter, EntityCategory, EntryPayload, EntryRef};
use crate::remote::error::{RemoteError, RemoteResult};

// ==========================================
// 远程状态字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Success,
    Exists,
    Partial,
    Error,
    #[serde(other)]
    Unknown,
}

impl RemoteStatus {
    /// 仅 success 视为成功，其余转换为业务错误
    pub fn require_success(self, message: Option<String>) -> RemoteResult<()> {
        match self {
            RemoteStatus::Success => Ok(()),
            _ => Err(RemoteError::logic(message)),
        }
    }
}

/// 目录快照（合作方 + 地点）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogLists {
    pub partners: Vec<String>,
    pub locations: Vec<String>,
}

/// 新建实体的远程结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateStatus {
    Created,
    AlreadyExists,
}

/// 批量提交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Success,
    Partial,
}

/// 批量提交回执
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReceipt {
    pub status: BatchStatus,
    pub saved_count: usize,
}

// ==========================================
// RemoteStore Trait
// ==========================================
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// getPartnersAndLocations
    async fn get_partners_and_locations(&self) -> RemoteResult<CatalogLists>;

    /// getUsedPartnersForDate
    async fn get_used_partners_for_date(&self, date: NaiveDate) -> RemoteResult<Vec<String>>;

    /// getData（按日期过滤）
    async fn get_data(&self, filter: &DateFilter) -> RemoteResult<DashboardData>;

    /// addPartner / addLocation
    ///
    /// # 返回
    /// - Created / AlreadyExists: 远程已持有该名称
    /// - Err(RemoteError::Logic): 远程返回 error 或其他状态
    async fn create_entity(&self, category: EntityCategory, name: &str)
        -> RemoteResult<CreateStatus>;

    /// deletePartner / deleteLocation
    async fn delete_entity(&self, category: EntityCategory, name: &str) -> RemoteResult<()>;

    /// addEntries（一次批量请求）
    ///
    /// success / partial 之外的状态返回业务错误
    async fn add_entries(&self, entries: &[EntryPayload]) -> RemoteResult<BatchReceipt>;

    /// updateEntry
    async fn update_entry(&self, entry_ref: &EntryRef, entry: &EntryPayload) -> RemoteResult<()>;

    /// deleteEntry
    async fn delete_entry(&self, entry_ref: &EntryRef) -> RemoteResult<()>;
}
