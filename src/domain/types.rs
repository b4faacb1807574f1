// ==========================================
// TruckFlow 运输台账 - 领域类型定义
// ==========================================
// 职责: 实体类别、字段标识、状态、提示级别、日期过滤器
// 序列化格式: 与远程接口保持一致
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体类别 (Entity Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Partner,  // 合作方
    Location, // 地点
}

impl EntityCategory {
    /// 用户提示中使用的名称（首字母大写）
    pub fn label(&self) -> &'static str {
        match self {
            EntityCategory::Partner => "Partner",
            EntityCategory::Location => "Location",
        }
    }

    /// 远程新增动作名
    pub fn add_action(&self) -> &'static str {
        match self {
            EntityCategory::Partner => "addPartner",
            EntityCategory::Location => "addLocation",
        }
    }

    /// 远程删除动作名
    pub fn delete_action(&self) -> &'static str {
        match self {
            EntityCategory::Partner => "deletePartner",
            EntityCategory::Location => "deleteLocation",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityCategory::Partner => write!(f, "partner"),
            EntityCategory::Location => write!(f, "location"),
        }
    }
}

// ==========================================
// 录入状态 (Entry Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryStatus {
    #[default]
    Paid,        // 已结清
    Outstanding, // 未结清
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Paid => write!(f, "Paid"),
            EntryStatus::Outstanding => write!(f, "Outstanding"),
        }
    }
}

// ==========================================
// 地点字段 (From / To)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationField {
    From,
    To,
}

impl LocationField {
    /// 同一行内的另一个地点字段
    pub fn sibling(&self) -> LocationField {
        match self {
            LocationField::From => LocationField::To,
            LocationField::To => LocationField::From,
        }
    }
}

// ==========================================
// 可选择字段 (下拉框)
// ==========================================
// 自定义实体请求的回填目标只可能是这三个字段之一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectField {
    Partner,
    From,
    To,
}

impl SelectField {
    pub fn category(&self) -> EntityCategory {
        match self {
            SelectField::Partner => EntityCategory::Partner,
            SelectField::From | SelectField::To => EntityCategory::Location,
        }
    }

    pub fn location_field(&self) -> Option<LocationField> {
        match self {
            SelectField::Partner => None,
            SelectField::From => Some(LocationField::From),
            SelectField::To => Some(LocationField::To),
        }
    }
}

impl From<LocationField> for SelectField {
    fn from(field: LocationField) -> Self {
        match field {
            LocationField::From => SelectField::From,
            LocationField::To => SelectField::To,
        }
    }
}

// ==========================================
// 表单字段 (校验 / 高亮)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Partner,
    From,
    To,
    Amount,
    TruckCount,
    Status,
}

impl From<SelectField> for FormField {
    fn from(field: SelectField) -> Self {
        match field {
            SelectField::Partner => FormField::Partner,
            SelectField::From => FormField::From,
            SelectField::To => FormField::To,
        }
    }
}

impl From<LocationField> for FormField {
    fn from(field: LocationField) -> Self {
        SelectField::from(field).into()
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormField::Partner => write!(f, "partner"),
            FormField::From => write!(f, "from"),
            FormField::To => write!(f, "to"),
            FormField::Amount => write!(f, "amount"),
            FormField::TruckCount => write!(f, "truckCount"),
            FormField::Status => write!(f, "status"),
        }
    }
}

// ==========================================
// 提示级别 (Severity)
// ==========================================
// 仅用于表现层决定提示样式，本库不负责渲染
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Info => write!(f, "info"),
        }
    }
}

// ==========================================
// 日期过滤器 (Date Filter)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFilter {
    #[default]
    Today,
    Week,
    Month,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl DateFilter {
    /// 远程接口 filter 参数
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFilter::Today => "today",
            DateFilter::Week => "week",
            DateFilter::Month => "month",
            DateFilter::Custom { .. } => "custom",
        }
    }

    /// 自定义区间（仅 Custom 有值）
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            DateFilter::Custom { start, end } => Some((*start, *end)),
            _ => None,
        }
    }
}
