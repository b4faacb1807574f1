// ==========================================
// TruckFlow 运输台账 - 应用层
// ==========================================
// 职责: 组装配置、远程存储与各 API
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
