// ==========================================
// 排班生成系统 - 配置层
// ==========================================
// 职责: 系统配置管理（求解器命令、超时、缺省天数、角色规则）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, GenerationConfig, SolverConfig};
