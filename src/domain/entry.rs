// ==========================================
// TruckFlow 运输台账 - 录入行实体
// ==========================================
// 职责: 录入行、行标识、下拉选项、自定义实体回填目标
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::types::{EntityCategory, EntryStatus, LocationField, SelectField};

/// 下拉框中"新建"选项的取值
pub const CUSTOM_SENTINEL: &str = "__custom__";

// ==========================================
// RowId - 录入行标识
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(Uuid);

impl RowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// EntryRow - 录入行
// ==========================================
/// 一行待提交的运输记录
///
/// 合作方与地点为空表示尚未选择；金额与车数为空表示尚未填写。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRow {
    pub id: RowId,
    pub partner: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<f64>,
    pub truck_count: Option<i64>,
    pub status: Option<EntryStatus>,
}

impl EntryRow {
    /// 创建空行
    pub fn empty() -> Self {
        Self {
            id: RowId::new(),
            partner: None,
            from: None,
            to: None,
            amount: None,
            truck_count: None,
            status: None,
        }
    }

    /// 清空所有字段（保留行标识）
    pub fn clear(&mut self) {
        *self = Self {
            id: self.id,
            ..Self::empty()
        };
    }

    pub fn location(&self, field: LocationField) -> Option<&str> {
        match field {
            LocationField::From => self.from.as_deref(),
            LocationField::To => self.to.as_deref(),
        }
    }

    pub fn location_mut(&mut self, field: LocationField) -> &mut Option<String> {
        match field {
            LocationField::From => &mut self.from,
            LocationField::To => &mut self.to,
        }
    }

    /// 已选择的合作方（空串或"新建"选项视为未选择）
    pub fn selected_partner(&self) -> Option<&str> {
        self.partner.as_deref().filter(|p| !is_unset(p))
    }
}

/// 空值或"新建"占位值视为未选择
pub fn is_unset(value: &str) -> bool {
    value.trim().is_empty() || value == CUSTOM_SENTINEL
}

// ==========================================
// SelectOption - 下拉选项
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectOption {
    Existing(String),
    CreateNew,
}

impl SelectOption {
    /// 选项取值（"新建"为 `__custom__`）
    pub fn value(&self) -> &str {
        match self {
            SelectOption::Existing(name) => name,
            SelectOption::CreateNew => CUSTOM_SENTINEL,
        }
    }

    /// 选项显示文本
    pub fn label(&self, category: EntityCategory) -> String {
        match self {
            SelectOption::Existing(name) => name.clone(),
            SelectOption::CreateNew => format!("+ Add Custom {}...", category.label()),
        }
    }
}

// ==========================================
// Selection - 用户的一次下拉选择
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// 选回占位项（清空字段）
    Clear,
    /// 选择已有名称
    Value(String),
    /// 选择"新建"
    CreateNew,
}

impl Selection {
    /// 从下拉框原始取值解析
    pub fn parse(raw: &str) -> Self {
        if raw == CUSTOM_SENTINEL {
            Selection::CreateNew
        } else if raw.trim().is_empty() {
            Selection::Clear
        } else {
            Selection::Value(raw.to_string())
        }
    }
}

// ==========================================
// PendingCustomTarget - 自定义实体回填目标
// ==========================================
/// 发起"新建"请求时按值捕获的回填位置
///
/// 不可变；完成时只按此快照回填，与期间打开/关闭的对话框无关。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingCustomTarget {
    pub row_id: RowId,
    pub field: SelectField,
}

impl PendingCustomTarget {
    pub fn new(row_id: RowId, field: SelectField) -> Self {
        Self { row_id, field }
    }

    pub fn category(&self) -> EntityCategory {
        self.field.category()
    }
}
