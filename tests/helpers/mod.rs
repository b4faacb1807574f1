// ==========================================
// 集成测试辅助模块
// ==========================================

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_remote;
