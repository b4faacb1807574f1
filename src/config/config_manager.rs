// ==========================================
// TruckFlow 运输台账 - 配置管理器
// ==========================================
// 职责: 配置加载、环境变量覆写、保存
// 存储: JSON 文件（默认位于用户配置目录）
// 优先级: 环境变量 > 配置文件 > 默认值
// ==========================================

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::EntryStatus;

// ==========================================
// 配置键 / 环境变量
// ==========================================
pub mod config_keys {
    /// 配置文件路径
    pub const ENV_CONFIG_PATH: &str = "TRUCKFLOW_CONFIG_PATH";
    /// 远程接口地址
    pub const ENV_ENDPOINT_URL: &str = "TRUCKFLOW_ENDPOINT_URL";

    pub const ENDPOINT_URL: &str = "endpoint_url";
    pub const REQUEST_TIMEOUT_SECS: &str = "request_timeout_secs";
    pub const DEFAULT_ENTRY_STATUS: &str = "default_entry_status";
    pub const PERSIST_CUSTOM_BY_DEFAULT: &str = "persist_custom_by_default";

    /// 远程调用默认超时（秒）
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
}

// ==========================================
// AppConfig - 应用配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 远程接口地址（单一入口）
    pub endpoint_url: String,
    /// 单次远程调用超时（秒）
    pub request_timeout_secs: u64,
    /// 行未选择状态时提交使用的默认状态
    pub default_entry_status: EntryStatus,
    /// "新建"对话框中"永久保存"的默认勾选
    pub persist_custom_by_default: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            request_timeout_secs: config_keys::DEFAULT_REQUEST_TIMEOUT_SECS,
            default_entry_status: EntryStatus::Paid,
            persist_custom_by_default: true,
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    path: PathBuf,
    config: AppConfig,
}

impl ConfigManager {
    /// 从默认位置加载（环境变量可覆写路径和接口地址）
    pub fn load_default() -> Result<Self, Box<dyn Error>> {
        let mut manager = Self::load(&default_config_path())?;
        manager.apply_env_overrides();
        Ok(manager)
    }

    /// 从指定文件加载
    ///
    /// # 说明
    /// - 文件不存在时使用默认配置
    /// - 文件存在但格式错误时返回错误
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let config = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<AppConfig>(&raw)?
        } else {
            tracing::info!("配置文件不存在，使用默认配置: {}", path.display());
            AppConfig::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// 应用环境变量覆写
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(config_keys::ENV_ENDPOINT_URL) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.config.endpoint_url = trimmed.to_string();
            }
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 更新配置（仅内存，需调用 save 持久化）
    pub fn update(&mut self, config: AppConfig) {
        self.config = config;
    }

    /// 保存配置为格式化 JSON
    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(&self.path, raw)?;
        tracing::info!("配置已保存: {}", self.path.display());
        Ok(())
    }

    /// 校验配置是否可用于远程调用
    pub fn validate(&self) -> Result<(), String> {
        let url = self.config.endpoint_url.trim();
        if url.is_empty() {
            return Err(format!("{} 未配置", config_keys::ENDPOINT_URL));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("{} 必须以 http(s):// 开头: {}", config_keys::ENDPOINT_URL, url));
        }
        if self.config.request_timeout_secs == 0 {
            return Err(format!("{} 必须大于 0", config_keys::REQUEST_TIMEOUT_SECS));
        }
        Ok(())
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> PathBuf {
    // 允许通过环境变量显式指定路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(config_keys::ENV_CONFIG_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("truckflow").join("config.json"),
        None => PathBuf::from("./truckflow.json"),
    }
}
