// ==========================================
// TruckFlow 运输台账 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

use crate::domain::{EntityCategory, RowId};

/// 表单引擎错误类型
///
/// 均为本地可纠正的错误，不涉及远程调用
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("录入行不存在: row_id={0}")]
    RowNotFound(RowId),

    #[error("合作方不可选: {name}（已被其他行占用或当日已录入）")]
    PartnerUnavailable { name: String },

    #[error("{category}不在目录中: {name}")]
    NotInCatalog {
        category: EntityCategory,
        name: String,
    },

    #[error("起点与终点不能相同: {name}")]
    SameLocation { name: String },

    #[error("{0}名称不能为空")]
    EmptyName(EntityCategory),
}

/// Result 类型别名
pub type FormResult<T> = Result<T, FormError>;
