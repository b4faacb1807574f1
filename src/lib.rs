// ==========================================
// TruckFlow 运输台账 - 核心库
// ==========================================
// 技术栈: Rust + tokio + reqwest（单一远程 JSON 接口）
// 系统定位: 多行录入表单的选择约束、自定义实体与提交
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 选择约束 / 校验 / 表单会话
pub mod engine;

// 远程层 - 接口契约与 HTTP 实现
pub mod remote;

// 配置层
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DateFilter, EntityCategory, EntryPayload, EntryRef, EntryRow, EntryStatus, LocationField,
    PendingCustomTarget, RowId, SelectField, SelectOption, Selection, Severity, Transaction,
};

// 引擎
pub use engine::{
    EntityCatalog, FormSession, RowConstraintEngine, UsedPartnerTracker, ValidationEngine,
};

// 远程
pub use remote::{HttpRemoteStore, RemoteError, RemoteStore};

// API
pub use api::{ApiError, ApiResult, CatalogApi, EntryFormApi, Notice, TransactionApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "TruckFlow";
