// ==========================================
// TruckFlow 运输台账 - API 层
// ==========================================
// 职责: 面向表现层的业务接口（录入表单、目录管理、交易记录）
// 约定: 返回 ApiResult，成功/降级结果附带 Notice 供表现层提示
// ==========================================

pub mod catalog_api;
pub mod custom_entity;
pub mod entry_form_api;
pub mod error;
pub mod notice;
pub mod submission;
pub mod transaction_api;

// 重导出核心类型
pub use catalog_api::{CatalogApi, CatalogChange};
pub use custom_entity::{CreateOutcome, CustomEntityFlow, CustomEntityResult};
pub use entry_form_api::EntryFormApi;
pub use error::{ApiError, ApiResult, GENERIC_REMOTE_MESSAGE};
pub use notice::Notice;
pub use submission::{SubmissionCoordinator, SubmitOutcome};
pub use transaction_api::{EntryUpdate, TransactionApi};
