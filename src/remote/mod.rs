// ==========================================
// TruckFlow 运输台账 - 远程层
// ==========================================
// 职责: 远程接口契约、HTTP 实现、超时约束
// ==========================================

pub mod error;
pub mod http_store;
pub mod store;

use std::future::Future;
use std::time::Duration;

// 重导出核心类型
pub use error::{RemoteError, RemoteResult};
pub use http_store::HttpRemoteStore;
pub use store::{
    BatchReceipt, BatchStatus, CatalogLists, CreateStatus, RemoteStatus, RemoteStore,
};

/// 为远程调用加上时限，超时转换为 RemoteError::Timeout
///
/// 与具体 RemoteStore 实现无关，任何实现都受同一时限约束
pub async fn bounded<T, F>(limit: Duration, call: F) -> RemoteResult<T>
where
    F: Future<Output = RemoteResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Timeout(limit)),
    }
}
