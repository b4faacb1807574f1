// ==========================================
// TruckFlow 运输台账 - 自定义实体流程
// ==========================================
// 职责: 录入中"新建合作方/地点"
// 策略: 本地优先回填，可选远程持久化，远程失败降级为仅本次会话
// ==========================================
// 顺序保证:
// - 回填目标在发起时按值捕获（PendingCustomTarget），完成时只按快照回填
// - 远程调用期间不持有会话锁；目录加入 + 回填 + 重算在同一次加锁内完成
// - 多个请求可并发，互不覆盖对方的目标
// ==========================================

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::api::error::{lock_session, ApiError, ApiResult};
use crate::api::notice::Notice;
use crate::domain::{EntityCategory, PendingCustomTarget};
use crate::engine::{ApplyOutcome, FormError, SharedSession};
use crate::remote::{bounded, RemoteStore};

// ==========================================
// CreateOutcome - 新建结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// 目录中已存在，直接选中，未调用远程
    AlreadyExists,
    /// 远程已保存（含远程返回"已存在"）
    Persisted,
    /// 远程保存失败，仅加入本次会话
    LocalOnlyDegraded { reason: String },
    /// 未要求持久化，仅加入本次会话
    SessionOnly,
}

/// 一次新建请求的完整结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEntityResult {
    pub category: EntityCategory,
    pub name: String,
    pub target: PendingCustomTarget,
    pub outcome: CreateOutcome,
    pub apply: ApplyOutcome,
}

impl CustomEntityResult {
    /// 名称是否已写入目标字段
    pub fn applied(&self) -> bool {
        self.apply.is_applied()
    }

    pub fn notice(&self) -> Notice {
        let label = self.category.label();
        match &self.outcome {
            CreateOutcome::AlreadyExists => {
                Notice::info(format!("{} already exists. Selecting it now.", label))
            }
            CreateOutcome::Persisted => Notice::success(format!("{} added successfully", label)),
            CreateOutcome::LocalOnlyDegraded { .. } => {
                Notice::warning(format!("{} added for this session", label))
            }
            CreateOutcome::SessionOnly => Notice::info(format!("{} added for this entry", label)),
        }
    }
}

// ==========================================
// CustomEntityFlow
// ==========================================
#[derive(Clone)]
pub struct CustomEntityFlow {
    session: SharedSession,
    remote: Arc<dyn RemoteStore>,
    timeout: Duration,
}

impl CustomEntityFlow {
    pub fn new(session: SharedSession, remote: Arc<dyn RemoteStore>, timeout: Duration) -> Self {
        Self {
            session,
            remote,
            timeout,
        }
    }

    /// 新建合作方/地点并回填到捕获的目标
    ///
    /// # 参数
    /// - category: 实体类别（需与目标字段一致）
    /// - name: 用户输入的名称（会 trim）
    /// - persist_permanently: 是否远程保存
    /// - target: 发起时捕获的回填目标
    ///
    /// # 返回
    /// - Ok(CustomEntityResult): 远程失败也返回 Ok（LocalOnlyDegraded）
    /// - Err(ApiError::ValidationFailed): 名称为空
    #[instrument(skip(self), fields(row_id = %target.row_id))]
    pub async fn request_create(
        &self,
        category: EntityCategory,
        name: &str,
        persist_permanently: bool,
        target: PendingCustomTarget,
    ) -> ApiResult<CustomEntityResult> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(FormError::EmptyName(category).into());
        }
        if target.category() != category {
            return Err(ApiError::InvalidInput(format!(
                "目标字段 {:?} 不接受 {} 类别",
                target.field, category
            )));
        }

        // 已存在: 判定与回填在同一次加锁内完成
        {
            let mut session = lock_session(&self.session)?;
            if session.catalog().contains(category, &name) {
                let apply = session.apply_custom(target, &name);
                info!(%name, ?apply, "名称已存在，直接选中");
                return Ok(CustomEntityResult {
                    category,
                    name,
                    target,
                    outcome: CreateOutcome::AlreadyExists,
                    apply,
                });
            }
        }

        let outcome = if persist_permanently {
            match bounded(self.timeout, self.remote.create_entity(category, &name)).await {
                Ok(status) => {
                    info!(%name, ?status, "远程保存成功");
                    CreateOutcome::Persisted
                }
                Err(e) => {
                    warn!(%name, error = %e, "远程保存失败，仅加入本次会话");
                    CreateOutcome::LocalOnlyDegraded {
                        reason: e.to_string(),
                    }
                }
            }
        } else {
            CreateOutcome::SessionOnly
        };

        let apply = {
            let mut session = lock_session(&self.session)?;
            session.apply_custom(target, &name)
        };
        if !apply.is_applied() {
            warn!(%name, ?apply, "名称已加入目录，但未能回填到目标字段");
        }

        Ok(CustomEntityResult {
            category,
            name,
            target,
            outcome,
            apply,
        })
    }
}
