// ==========================================
// 排班生成系统 - 应用层
// ==========================================
// 职责: 组装状态，连接命令入口与 API 层
// ==========================================

pub mod commands;
pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
