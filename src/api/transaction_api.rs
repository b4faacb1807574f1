// ==========================================
// TruckFlow 运输台账 - 交易记录 API
// ==========================================
// 职责: 按日期过滤加载交易、编辑与删除已记录交易
// 状态: 记住当前过滤器与最近一次加载结果，编辑/删除成功后按当前过滤器刷新
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::{DashboardData, DateFilter, EntryPayload, EntryRef, EntryStatus, Transaction};
use crate::remote::{bounded, RemoteStore};

pub const DASHBOARD_LOAD_FAILED_MESSAGE: &str = "Failed to load dashboard data";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update entry. Please try again.";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete entry";

// ==========================================
// EntryUpdate - 编辑表单内容
// ==========================================
/// 编辑已记录交易时提交的字段；数值未填按 0 发送
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryUpdate {
    pub date: Option<NaiveDate>,
    pub partner: Option<String>,
    pub from: String,
    pub to: String,
    pub amount: Option<f64>,
    pub truck_count: Option<i64>,
    pub status: EntryStatus,
}

impl EntryUpdate {
    /// 以已记录交易为初始内容
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            date: Some(tx.date),
            partner: Some(tx.partner.clone()),
            from: tx.from.clone(),
            to: tx.to.clone(),
            amount: Some(tx.amount),
            truck_count: Some(tx.truck_count),
            status: tx.status,
        }
    }

    fn into_payload(self) -> ApiResult<EntryPayload> {
        let partner = self
            .partner
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ApiError::validation("Please select a partner"))?;
        let date = self
            .date
            .ok_or_else(|| ApiError::validation("Please select a date"))?;
        Ok(EntryPayload {
            date,
            partner,
            from: self.from,
            to: self.to,
            amount: self.amount.filter(|a| a.is_finite()).unwrap_or_default(),
            truck_count: self.truck_count.unwrap_or_default(),
            status: self.status,
        })
    }
}

#[derive(Debug, Default)]
struct TransactionView {
    active_filter: DateFilter,
    data: DashboardData,
}

// ==========================================
// TransactionApi
// ==========================================
pub struct TransactionApi {
    remote: Arc<dyn RemoteStore>,
    timeout: Duration,
    view: Mutex<TransactionView>,
}

impl TransactionApi {
    pub fn new(remote: Arc<dyn RemoteStore>, timeout: Duration) -> Self {
        Self {
            remote,
            timeout,
            view: Mutex::new(TransactionView::default()),
        }
    }

    fn lock_view(&self) -> ApiResult<MutexGuard<'_, TransactionView>> {
        self.view
            .lock()
            .map_err(|e| ApiError::InternalError(format!("锁获取失败: {}", e)))
    }

    /// 构造自定义区间过滤器
    ///
    /// # 返回
    /// - Err(ApiError::ValidationFailed): 缺少日期或起始晚于结束
    pub fn custom_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> ApiResult<DateFilter> {
        match (start, end) {
            (Some(start), Some(end)) if start > end => {
                Err(ApiError::validation("Start date cannot be after end date"))
            }
            (Some(start), Some(end)) => Ok(DateFilter::Custom { start, end }),
            _ => Err(ApiError::validation(
                "Please select both start and end dates",
            )),
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按过滤器加载，成功后记为当前过滤器
    #[instrument(skip(self))]
    pub async fn load(&self, filter: DateFilter) -> ApiResult<DashboardData> {
        if let Some((start, end)) = filter.range() {
            Self::custom_range(Some(start), Some(end))?;
        }

        let data = bounded(self.timeout, self.remote.get_data(&filter))
            .await
            .map_err(|e| {
                warn!(error = %e, "交易数据加载失败");
                ApiError::from_remote(e, DASHBOARD_LOAD_FAILED_MESSAGE)
            })?;

        debug!(rows = data.table_data.len(), "交易数据已加载");
        let mut view = self.lock_view()?;
        view.active_filter = filter;
        view.data = data.clone();
        Ok(data)
    }

    /// 按当前过滤器重新加载
    pub async fn refresh(&self) -> ApiResult<DashboardData> {
        let filter = self.active_filter()?;
        self.load(filter).await
    }

    pub fn active_filter(&self) -> ApiResult<DateFilter> {
        Ok(self.lock_view()?.active_filter)
    }

    /// 最近一次加载的交易
    pub fn transactions(&self) -> ApiResult<Vec<Transaction>> {
        Ok(self.lock_view()?.data.table_data.clone())
    }

    pub fn find(&self, entry_ref: &EntryRef) -> ApiResult<Transaction> {
        self.lock_view()?
            .data
            .table_data
            .iter()
            .find(|tx| tx.matches(entry_ref))
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Entry not found".to_string()))
    }

    // ==========================================
    // 编辑 / 删除
    // ==========================================

    /// 更新已记录交易，成功后尽力刷新
    #[instrument(skip(self, update))]
    pub async fn update_entry(&self, entry_ref: &EntryRef, update: EntryUpdate) -> ApiResult<()> {
        let payload = update.into_payload()?;

        bounded(self.timeout, self.remote.update_entry(entry_ref, &payload))
            .await
            .map_err(|e| {
                warn!(%entry_ref, error = %e, "交易更新失败");
                ApiError::from_remote(e, UPDATE_FAILED_MESSAGE)
            })?;
        info!(%entry_ref, "交易已更新");

        self.refresh_after_write().await;
        Ok(())
    }

    /// 删除已记录交易，成功后尽力刷新
    #[instrument(skip(self))]
    pub async fn delete_entry(&self, entry_ref: &EntryRef) -> ApiResult<()> {
        bounded(self.timeout, self.remote.delete_entry(entry_ref))
            .await
            .map_err(|e| {
                warn!(%entry_ref, error = %e, "交易删除失败");
                ApiError::from_remote(e, DELETE_FAILED_MESSAGE)
            })?;
        info!(%entry_ref, "交易已删除");

        self.refresh_after_write().await;
        Ok(())
    }

    async fn refresh_after_write(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "写入成功，但刷新交易列表失败");
        }
    }
}
