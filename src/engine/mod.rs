// ==========================================
// TruckFlow 运输台账 - 引擎层
// ==========================================
// 职责: 表单状态与业务规则（选择约束、校验）
// 红线: 引擎不做远程写入；已用合作方加载失败时降级为空集合
// ==========================================

pub mod catalog;
pub mod error;
pub mod form_session;
pub mod row_constraint;
pub mod used_partners;
pub mod validation;

// 重导出核心类型
pub use catalog::EntityCatalog;
pub use error::{FormError, FormResult};
pub use form_session::{FormSession, SharedSession};
pub use row_constraint::{
    ApplyOutcome, DeleteRowOutcome, RowConstraintEngine, RowOptions, SelectionEffect,
};
pub use used_partners::UsedPartnerTracker;
pub use validation::{ValidationEngine, ValidationIssue, ValidationReport, EMPTY_FORM_MESSAGE};
