// ==========================================
// TruckFlow 运输台账 - 录入表单 API
// ==========================================
// 职责: 组合表单会话、自定义实体流程、校验与批量提交
// 生命周期: open 时加载目录与当日已用合作方，丢弃即关闭表单
// 红线: 持锁期间不 await；远程调用前释放会话锁
// ==========================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use chrono::NaiveDate;

use crate::api::custom_entity::{CustomEntityFlow, CustomEntityResult};
use crate::api::error::{lock_session, ApiError, ApiResult};
use crate::api::notice::Notice;
use crate::api::submission::{SubmissionCoordinator, SubmitOutcome};
use crate::config::AppConfig;
use crate::domain::{
    EntityCategory, EntryRow, EntryStatus, FormField, LocationField, PendingCustomTarget, RowId,
    Selection,
};
use crate::engine::{
    DeleteRowOutcome, EntityCatalog, FormSession, RowOptions, SelectionEffect, SharedSession,
    UsedPartnerTracker, ValidationReport,
};
use crate::remote::{bounded, RemoteStore};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data. Please try again.";
pub const LAST_ROW_MESSAGE: &str = "At least one entry row is required";

// ==========================================
// EntryFormApi
// ==========================================

/// 录入表单 API
///
/// 职责：
/// 1. 行编辑（选择合作方/地点、金额、车数、状态）
/// 2. "新建"合作方/地点（委托 CustomEntityFlow）
/// 3. 提交前校验与批量提交
pub struct EntryFormApi {
    session: SharedSession,
    remote: Arc<dyn RemoteStore>,
    timeout: Duration,
    persist_custom_by_default: bool,
    custom_entity: CustomEntityFlow,
    submission: SubmissionCoordinator,
}

impl EntryFormApi {
    /// 打开录入表单
    ///
    /// # 参数
    /// - remote: 远程存储
    /// - config: 应用配置（超时、默认状态、"永久保存"默认值）
    /// - date: 录入日期
    ///
    /// # 返回
    /// - Err(ApiError): 目录加载失败（已用合作方加载失败只降级，不报错）
    #[instrument(skip(remote, config))]
    pub async fn open(
        remote: Arc<dyn RemoteStore>,
        config: &AppConfig,
        date: NaiveDate,
    ) -> ApiResult<Self> {
        let timeout = config.request_timeout();

        let lists = bounded(timeout, remote.get_partners_and_locations())
            .await
            .map_err(|e| {
                warn!(error = %e, "目录加载失败");
                ApiError::from_remote(e, LOAD_FAILED_MESSAGE)
            })?;
        let catalog = EntityCatalog::from_lists(lists.partners, lists.locations);
        let used = UsedPartnerTracker::fetch(remote.as_ref(), date, timeout).await;

        Ok(Self::with_session(
            FormSession::open(catalog, used).into_shared(),
            remote,
            config,
        ))
    }

    /// 以已有会话构造（不访问远程）
    pub fn with_session(
        session: SharedSession,
        remote: Arc<dyn RemoteStore>,
        config: &AppConfig,
    ) -> Self {
        let timeout = config.request_timeout();
        Self {
            custom_entity: CustomEntityFlow::new(session.clone(), remote.clone(), timeout),
            submission: SubmissionCoordinator::new(
                remote.clone(),
                timeout,
                config.default_entry_status,
            ),
            session,
            remote,
            timeout,
            persist_custom_by_default: config.persist_custom_by_default,
        }
    }

    // ==========================================
    // 查询接口
    // ==========================================

    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    /// 会话状态快照
    pub fn snapshot(&self) -> ApiResult<FormSession> {
        Ok(lock_session(&self.session)?.clone())
    }

    pub fn date(&self) -> ApiResult<NaiveDate> {
        Ok(lock_session(&self.session)?.date())
    }

    pub fn rows(&self) -> ApiResult<Vec<EntryRow>> {
        Ok(lock_session(&self.session)?.rows().to_vec())
    }

    pub fn options(&self, id: RowId) -> ApiResult<RowOptions> {
        lock_session(&self.session)?
            .options(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("录入行(id={})不存在", id)))
    }

    pub fn highlighted_fields(&self) -> ApiResult<BTreeSet<(usize, FormField)>> {
        Ok(lock_session(&self.session)?.highlighted_fields())
    }

    /// "永久保存"复选框的默认值
    pub fn default_persist(&self) -> bool {
        self.persist_custom_by_default
    }

    pub fn custom_entity(&self) -> &CustomEntityFlow {
        &self.custom_entity
    }

    // ==========================================
    // 行编辑
    // ==========================================

    pub fn add_row(&self) -> ApiResult<RowId> {
        Ok(lock_session(&self.session)?.add_row())
    }

    /// 删除行；唯一的一行被清空时返回警告提示
    pub fn delete_row(&self, id: RowId) -> ApiResult<Option<Notice>> {
        let outcome = lock_session(&self.session)?.delete_row(id)?;
        Ok(match outcome {
            DeleteRowOutcome::Removed => None,
            DeleteRowOutcome::Cleared => Some(Notice::warning(LAST_ROW_MESSAGE)),
        })
    }

    pub fn select_partner(&self, id: RowId, selection: Selection) -> ApiResult<SelectionEffect> {
        Ok(lock_session(&self.session)?.select_partner(id, selection)?)
    }

    pub fn select_location(
        &self,
        id: RowId,
        field: LocationField,
        selection: Selection,
    ) -> ApiResult<SelectionEffect> {
        Ok(lock_session(&self.session)?.select_location(id, field, selection)?)
    }

    pub fn set_amount(&self, id: RowId, amount: Option<f64>) -> ApiResult<()> {
        Ok(lock_session(&self.session)?.set_amount(id, amount)?)
    }

    pub fn set_truck_count(&self, id: RowId, truck_count: Option<i64>) -> ApiResult<()> {
        Ok(lock_session(&self.session)?.set_truck_count(id, truck_count)?)
    }

    pub fn set_status(&self, id: RowId, status: Option<EntryStatus>) -> ApiResult<()> {
        Ok(lock_session(&self.session)?.set_status(id, status)?)
    }

    /// 切换录入日期: 重新加载已用合作方，清空冲突的合作方
    ///
    /// 并发切换时只应用最后一次请求的日期
    ///
    /// # 返回
    /// - 被清空合作方的行（结果已过期时为空）
    #[instrument(skip(self))]
    pub async fn change_date(&self, date: NaiveDate) -> ApiResult<Vec<RowId>> {
        lock_session(&self.session)?.request_date(date);
        let used = UsedPartnerTracker::fetch(self.remote.as_ref(), date, self.timeout).await;
        let applied = lock_session(&self.session)?.change_date(used);
        let Some(released) = applied else {
            debug!("日期切换已被更晚的请求取代");
            return Ok(Vec::new());
        };
        if !released.is_empty() {
            info!(released = released.len(), "日期切换后清空了冲突的合作方");
        }
        Ok(released)
    }

    // ==========================================
    // 新建合作方/地点
    // ==========================================

    pub async fn request_create(
        &self,
        category: EntityCategory,
        name: &str,
        persist_permanently: bool,
        target: PendingCustomTarget,
    ) -> ApiResult<CustomEntityResult> {
        self.custom_entity
            .request_create(category, name, persist_permanently, target)
            .await
    }

    // ==========================================
    // 校验与提交
    // ==========================================

    pub fn validate(&self) -> ApiResult<ValidationReport> {
        Ok(lock_session(&self.session)?.validate())
    }

    /// 校验并提交全部有效行
    ///
    /// 校验失败时不访问远程；远程失败时本地状态保持不变；
    /// 保存成功（含部分保存）后重置为一个空行并重新加载当日已用合作方
    #[instrument(skip(self))]
    pub async fn submit(&self) -> ApiResult<SubmitOutcome> {
        let (date, payloads) = {
            let mut session = lock_session(&self.session)?;
            let report = session.validate();
            if !report.ok {
                let issue = report.first_error.ok_or_else(|| {
                    ApiError::InternalError("校验未通过但缺少错误信息".to_string())
                })?;
                return Err(ApiError::ValidationFailed(issue));
            }
            let date = session.date();
            (date, self.submission.build_payloads(date, session.rows()))
        };

        let outcome = self.submission.submit(&payloads).await?;

        let used = UsedPartnerTracker::fetch(self.remote.as_ref(), date, self.timeout).await;
        lock_session(&self.session)?.reset(used);
        Ok(outcome)
    }
}
