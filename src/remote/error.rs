// ==========================================
// TruckFlow 运输台账 - 远程层错误类型
// ==========================================
// 分类: 传输错误（网络/5xx/超时/响应损坏）与业务错误（非成功状态）
// ==========================================

use std::time::Duration;
use thiserror::Error;

/// 远程调用错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("网络请求失败: {0}")]
    Transport(String),

    #[error("远程调用超时: {0:?}")]
    Timeout(Duration),

    #[error("远程服务返回 HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("远程业务错误: {}", .message.as_deref().unwrap_or("未返回原因"))]
    Logic { message: Option<String> },

    #[error("响应解析失败: {0}")]
    Decode(String),
}

impl RemoteError {
    /// 是否为传输层错误（可原样重试）
    pub fn is_transport(&self) -> bool {
        match self {
            RemoteError::Transport(_) | RemoteError::Timeout(_) | RemoteError::Decode(_) => true,
            RemoteError::HttpStatus { status, .. } => *status >= 500,
            RemoteError::Logic { .. } => false,
        }
    }

    /// 远程返回的业务消息（若有）
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            RemoteError::Logic { message } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    pub fn logic(message: Option<String>) -> Self {
        RemoteError::Logic { message }
    }
}

/// Result 类型别名
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(RemoteError::Transport("connection reset".into()).is_transport());
        assert!(RemoteError::Timeout(Duration::from_secs(15)).is_transport());
        assert!(RemoteError::HttpStatus {
            status: 502,
            body: String::new()
        }
        .is_transport());
        assert!(!RemoteError::HttpStatus {
            status: 404,
            body: String::new()
        }
        .is_transport());
        assert!(!RemoteError::logic(Some("sheet locked".into())).is_transport());
    }

    #[test]
    fn test_remote_message_ignores_blank() {
        assert_eq!(
            RemoteError::logic(Some("sheet locked".into())).remote_message(),
            Some("sheet locked")
        );
        assert_eq!(RemoteError::logic(Some("  ".into())).remote_message(), None);
        assert_eq!(RemoteError::logic(None).remote_message(), None);
    }
}
