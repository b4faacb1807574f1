// ==========================================
// TruckFlow 运输台账 - 目录管理 API
// ==========================================
// 职责: 合作方/地点的查询、新增、删除（远程优先）
// 同步: 挂接录入会话时，远程成功后同步到会话目录并重算候选
// ==========================================

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::api::error::{lock_session, ApiError, ApiResult};
use crate::api::notice::Notice;
use crate::domain::EntityCategory;
use crate::engine::{FormError, SharedSession};
use crate::remote::{bounded, CreateStatus, RemoteStore};

/// 目录变更结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogChange {
    Added,
    AlreadyExists,
    Deleted,
}

impl CatalogChange {
    pub fn notice(&self, category: EntityCategory) -> Notice {
        let label = category.label();
        match self {
            CatalogChange::Added => Notice::success(format!("{} added successfully", label)),
            CatalogChange::AlreadyExists => Notice::warning(format!("{} already exists", label)),
            CatalogChange::Deleted => Notice::success(format!("{} deleted successfully", label)),
        }
    }
}

// ==========================================
// CatalogApi
// ==========================================
pub struct CatalogApi {
    remote: Arc<dyn RemoteStore>,
    timeout: Duration,
    session: Option<SharedSession>,
}

impl CatalogApi {
    pub fn new(remote: Arc<dyn RemoteStore>, timeout: Duration) -> Self {
        Self {
            remote,
            timeout,
            session: None,
        }
    }

    /// 挂接录入会话
    pub fn with_session(mut self, session: SharedSession) -> Self {
        self.session = Some(session);
        self
    }

    /// 查询某类名称（升序）
    #[instrument(skip(self))]
    pub async fn list(&self, category: EntityCategory) -> ApiResult<Vec<String>> {
        let lists = bounded(self.timeout, self.remote.get_partners_and_locations())
            .await
            .map_err(|e| ApiError::from_remote(e, "Failed to load data. Please try again."))?;
        let mut names = match category {
            EntityCategory::Partner => lists.partners,
            EntityCategory::Location => lists.locations,
        };
        names.retain(|n| !n.trim().is_empty());
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// 新增名称
    ///
    /// # 返回
    /// - Ok(Added): 远程已新建
    /// - Ok(AlreadyExists): 远程已存在（仍同步到会话）
    /// - Err(ApiError): 名称为空或远程失败
    #[instrument(skip(self))]
    pub async fn add(&self, category: EntityCategory, name: &str) -> ApiResult<CatalogChange> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FormError::EmptyName(category).into());
        }

        let status = bounded(self.timeout, self.remote.create_entity(category, name))
            .await
            .map_err(|e| {
                warn!(%name, error = %e, "新增失败");
                ApiError::from_remote(e, &format!("Failed to add {}", category))
            })?;

        if let Some(session) = &self.session {
            lock_session(session)?.add_catalog_entry(category, name);
        }

        let change = match status {
            CreateStatus::Created => CatalogChange::Added,
            CreateStatus::AlreadyExists => CatalogChange::AlreadyExists,
        };
        info!(%name, ?change, "目录新增完成");
        Ok(change)
    }

    /// 删除名称
    #[instrument(skip(self))]
    pub async fn delete(&self, category: EntityCategory, name: &str) -> ApiResult<CatalogChange> {
        bounded(self.timeout, self.remote.delete_entity(category, name))
            .await
            .map_err(|e| {
                warn!(%name, error = %e, "删除失败");
                ApiError::from_remote(e, &format!("Failed to delete {}", category))
            })?;

        if let Some(session) = &self.session {
            lock_session(session)?.remove_catalog_entry(category, name);
        }
        info!(%name, "目录删除完成");
        Ok(CatalogChange::Deleted)
    }
}
