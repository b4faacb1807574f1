// ==========================================
// TruckFlow 运输台账 - 领域层
// ==========================================
// 职责: 领域实体与类型定义（不包含业务逻辑）
// ==========================================

pub mod entry;
pub mod transaction;
pub mod types;

// 重导出核心类型
pub use entry::{
    is_unset, EntryRow, PendingCustomTarget, RowId, SelectOption, Selection, CUSTOM_SENTINEL,
};
pub use transaction::{DashboardData, DashboardSummary, EntryPayload, EntryRef, Transaction};
pub use types::{
    DateFilter, EntityCategory, EntryStatus, FormField, LocationField, SelectField, Severity,
};
