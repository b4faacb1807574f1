// ==========================================
// TruckFlow 运输台账 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换引擎/远程错误为用户可读的错误消息
// 分类: 校验错误（本地阻断）/ 远程传输错误（可重试）/ 远程业务错误
// ==========================================

use std::sync::MutexGuard;
use thiserror::Error;

use crate::domain::Severity;
use crate::engine::{FormError, FormSession, SharedSession, ValidationIssue};
use crate::remote::RemoteError;

/// 远程调用失败且无更具体提示时的通用消息
pub const GENERIC_REMOTE_MESSAGE: &str = "Request failed. Please try again.";

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 本地错误（不触达远程）
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 阻断性校验错误
    #[error("校验失败: {}", .0.message)]
    ValidationFailed(ValidationIssue),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 远程错误
    // ==========================================
    /// 网络 / 5xx / 超时；本地状态未改变，可原样重试
    #[error("远程服务不可用: {message}")]
    RemoteTransport {
        message: String,
        #[source]
        source: RemoteError,
    },

    /// 远程返回非成功状态
    #[error("远程操作失败: {message}")]
    RemoteLogic { message: String },

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 按错误类别转换远程错误
    ///
    /// # 参数
    /// - err: 远程错误
    /// - fallback: 远程未给出原因时对用户展示的消息
    pub fn from_remote(err: RemoteError, fallback: &str) -> Self {
        if err.is_transport() {
            ApiError::RemoteTransport {
                message: fallback.to_string(),
                source: err,
            }
        } else {
            ApiError::RemoteLogic {
                message: err.remote_message().unwrap_or(fallback).to_string(),
            }
        }
    }

    /// 不关联字段的校验错误
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::ValidationFailed(ValidationIssue::form_level(message))
    }

    /// 面向用户的消息
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ValidationFailed(issue) => issue.message.clone(),
            ApiError::InvalidInput(msg)
            | ApiError::NotFound(msg)
            | ApiError::BusinessRuleViolation(msg) => msg.clone(),
            ApiError::RemoteTransport { message, .. } | ApiError::RemoteLogic { message } => {
                message.clone()
            }
            ApiError::InternalError(_) | ApiError::Other(_) => {
                "An unexpected error occurred".to_string()
            }
        }
    }

    /// 提示级别
    pub fn severity(&self) -> Severity {
        match self {
            ApiError::BusinessRuleViolation(_) | ApiError::NotFound(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// 是否可不做修改直接重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RemoteTransport { .. })
    }
}

// ==========================================
// 从 RemoteError 转换
// ==========================================
impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        ApiError::from_remote(err, GENERIC_REMOTE_MESSAGE)
    }
}

// ==========================================
// 从 FormError 转换
// ==========================================
impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::RowNotFound(id) => ApiError::NotFound(format!("录入行(id={})不存在", id)),
            FormError::EmptyName(category) => {
                ApiError::validation(format!("Please enter a {} name", category))
            }
            FormError::PartnerUnavailable { .. }
            | FormError::NotInCatalog { .. }
            | FormError::SameLocation { .. } => ApiError::BusinessRuleViolation(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

/// 获取会话锁
pub(crate) fn lock_session(session: &SharedSession) -> ApiResult<MutexGuard<'_, FormSession>> {
    session
        .lock()
        .map_err(|e| ApiError::InternalError(format!("会话锁获取失败: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityCategory, FormField, RowId};
    use std::time::Duration;

    #[test]
    fn test_remote_logic_uses_remote_message() {
        let err = ApiError::from_remote(
            RemoteError::logic(Some("Sheet is protected".into())),
            "Failed to save entries. Please try again.",
        );
        assert_eq!(err.user_message(), "Sheet is protected");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_remote_logic_falls_back() {
        let err = ApiError::from_remote(
            RemoteError::logic(None),
            "Failed to save entries. Please try again.",
        );
        assert_eq!(err.user_message(), "Failed to save entries. Please try again.");
    }

    #[test]
    fn test_transport_is_retryable() {
        let err: ApiError = RemoteError::Timeout(Duration::from_secs(15)).into();
        assert!(err.is_retryable());
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(err.user_message(), GENERIC_REMOTE_MESSAGE);
    }

    #[test]
    fn test_form_error_conversion() {
        let err: ApiError = FormError::EmptyName(EntityCategory::Partner).into();
        match err {
            ApiError::ValidationFailed(issue) => {
                assert_eq!(issue.message, "Please enter a partner name");
                assert_eq!(issue.field, None::<FormField>);
            }
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }

        let id = RowId::new();
        let err: ApiError = FormError::RowNotFound(id).into();
        assert!(matches!(err, ApiError::NotFound(msg) if msg.contains(&id.to_string())));
    }
}
