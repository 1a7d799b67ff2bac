// ==========================================
// 排班生成系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + 外部求解器进程
// 系统定位: 排班生成与人工调整（人工最终控制权）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排班生成核心
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装与命令入口
pub mod app;

// 命令行定义
pub mod cli;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{RequestType, RunStatus, ShiftKind, SolveOutcome};

// 领域实体
pub use domain::{
    GenerationInput, GenerationReport, GenerationRequest, LeaveRequest, NewStaff, ScheduleWindow,
    ShiftAssignment, SolverResult, Staff, StaffingRequirement,
};

// 引擎
pub use engine::{
    CancellationToken, GenerationError, InProcessSolver, ProcessSolver, ScheduleGenerator, Solver,
    WindowLockRegistry,
};

// API
pub use api::{ApiError, ApiResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "排班生成系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
