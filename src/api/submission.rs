// ==========================================
// TruckFlow 运输台账 - 批量提交
// ==========================================
// 职责: 把有效录入行序列化为一次批量请求，并解释远程结果
// 红线: 提交失败不修改任何本地状态，可原样重试
// ==========================================

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::api::notice::Notice;
use crate::domain::{EntryPayload, EntryRow, EntryStatus};
use crate::remote::{bounded, BatchStatus, RemoteStore};

pub const NO_COMPLETE_ENTRY_MESSAGE: &str = "Please fill in at least one complete entry";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to save entries. Please try again.";

// ==========================================
// SubmitOutcome - 提交结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Success { saved_count: usize },
    /// 部分保存，非致命
    Partial { saved_count: usize, total: usize },
}

impl SubmitOutcome {
    pub fn saved_count(&self) -> usize {
        match self {
            SubmitOutcome::Success { saved_count } | SubmitOutcome::Partial { saved_count, .. } => {
                *saved_count
            }
        }
    }

    pub fn notice(&self) -> Notice {
        match self {
            SubmitOutcome::Success { saved_count } => {
                Notice::success(format!("{} entries saved successfully!", saved_count))
            }
            SubmitOutcome::Partial { saved_count, total } => {
                Notice::warning(format!("{} of {} entries saved", saved_count, total))
            }
        }
    }
}

// ==========================================
// SubmissionCoordinator
// ==========================================
#[derive(Clone)]
pub struct SubmissionCoordinator {
    remote: Arc<dyn RemoteStore>,
    timeout: Duration,
    default_status: EntryStatus,
}

impl SubmissionCoordinator {
    pub fn new(remote: Arc<dyn RemoteStore>, timeout: Duration, default_status: EntryStatus) -> Self {
        Self {
            remote,
            timeout,
            default_status,
        }
    }

    /// 选出已选合作方的行，逐行生成载荷（按行顺序）
    ///
    /// 未填写的数值按 0 发送，状态缺省使用配置的默认状态
    pub fn build_payloads(&self, date: NaiveDate, rows: &[EntryRow]) -> Vec<EntryPayload> {
        rows.iter()
            .filter_map(|row| {
                let partner = row.selected_partner()?;
                Some(EntryPayload {
                    date,
                    partner: partner.to_string(),
                    from: row.from.clone().unwrap_or_default(),
                    to: row.to.clone().unwrap_or_default(),
                    amount: row.amount.unwrap_or_default(),
                    truck_count: row.truck_count.unwrap_or_default(),
                    status: row.status.unwrap_or(self.default_status),
                })
            })
            .collect()
    }

    /// 发送一次批量请求
    ///
    /// # 返回
    /// - Ok(SubmitOutcome): success / partial
    /// - Err(ApiError::ValidationFailed): 无可提交的行
    /// - Err(ApiError::RemoteTransport / RemoteLogic): 远程失败
    #[instrument(skip(self, payloads), fields(total = payloads.len()))]
    pub async fn submit(&self, payloads: &[EntryPayload]) -> ApiResult<SubmitOutcome> {
        if payloads.is_empty() {
            return Err(ApiError::validation(NO_COMPLETE_ENTRY_MESSAGE));
        }

        let receipt = bounded(self.timeout, self.remote.add_entries(payloads))
            .await
            .map_err(|e| {
                warn!(error = %e, "批量提交失败");
                ApiError::from_remote(e, SUBMIT_FAILED_MESSAGE)
            })?;

        let total = payloads.len();
        let outcome = match receipt.status {
            BatchStatus::Success => SubmitOutcome::Success {
                saved_count: receipt.saved_count,
            },
            BatchStatus::Partial => SubmitOutcome::Partial {
                saved_count: receipt.saved_count.min(total),
                total,
            },
        };
        info!(?outcome, "批量提交完成");
        Ok(outcome)
    }
}
