// ==========================================
// TruckFlow 运输台账 - 配置层
// ==========================================
// 职责: 应用配置（接口地址、超时、录入默认值）
// 存储: JSON 文件 + 环境变量覆写
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, default_config_path, AppConfig, ConfigManager};
