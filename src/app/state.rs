// ==========================================
// TruckFlow 运输台账 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::Arc;
use tracing::info;

use chrono::NaiveDate;

use crate::api::{ApiResult, CatalogApi, EntryFormApi, TransactionApi};
use crate::config::{AppConfig, ConfigManager};
use crate::remote::{HttpRemoteStore, RemoteResult, RemoteStore};

/// 应用状态
///
/// 包含配置、远程存储和长期存在的 API 实例；
/// 录入表单按需打开，每次打开得到独立的会话
pub struct AppState {
    /// 当前配置
    pub config: AppConfig,

    /// 远程存储
    pub remote: Arc<dyn RemoteStore>,

    /// 交易记录API
    pub transaction_api: Arc<TransactionApi>,
}

impl AppState {
    /// 从配置管理器创建（使用 HTTP 远程存储）
    pub fn new(config_manager: &ConfigManager) -> RemoteResult<Self> {
        let config = config_manager.config().clone();
        let remote: Arc<dyn RemoteStore> = Arc::new(HttpRemoteStore::from_config(&config)?);
        info!(endpoint = %config.endpoint_url, "远程存储已初始化");
        Ok(Self::with_remote(config, remote))
    }

    /// 以任意远程存储实现创建
    pub fn with_remote(config: AppConfig, remote: Arc<dyn RemoteStore>) -> Self {
        let transaction_api = Arc::new(TransactionApi::new(
            remote.clone(),
            config.request_timeout(),
        ));
        Self {
            config,
            remote,
            transaction_api,
        }
    }

    /// 打开录入表单
    pub async fn open_entry_form(&self, date: NaiveDate) -> ApiResult<EntryFormApi> {
        EntryFormApi::open(self.remote.clone(), &self.config, date).await
    }

    /// 目录管理API；传入录入表单时同步到其会话
    pub fn catalog_api(&self, form: Option<&EntryFormApi>) -> CatalogApi {
        let api = CatalogApi::new(self.remote.clone(), self.config.request_timeout());
        match form {
            Some(form) => api.with_session(form.session()),
            None => api,
        }
    }
}
