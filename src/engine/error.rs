// ==========================================
// 排班生成系统 - 生成流程错误类型
// ==========================================
// 约束: 每个错误都归属一个阶段，错误信息携带诊断原文（stderr / 原始输出 / 状态值）
// ==========================================

use crate::domain::generation::ScheduleWindow;
use crate::domain::types::SolveOutcome;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 生成流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    Input,       // 入参校验（开始日期等）
    Aggregate,   // 读取员工/请假/人手需求
    Solve,       // 调用求解器
    Validate,    // 状态值判定
    Materialize, // 日偏移 -> 日历日期
    Commit,      // 窗口替换
}

impl GenerationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStage::Input => "input",
            GenerationStage::Aggregate => "aggregate",
            GenerationStage::Solve => "solve",
            GenerationStage::Validate => "validate",
            GenerationStage::Materialize => "materialize",
            GenerationStage::Commit => "commit",
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 生成流程错误
#[derive(Error, Debug)]
pub enum GenerationError {
    // ===== 入参 =====
    #[error("开始日期格式错误（应为YYYY-MM-DD）: input={input:?}, {reason}")]
    InvalidStartDate { input: String, reason: String },

    #[error("排班天数超出范围: days={days}, 上限={max}, 开始日期={start}")]
    InvalidHorizon { start: String, days: u32, max: u32 },

    // ===== 聚合 =====
    #[error("读取排班输入失败: {0}")]
    Aggregation(#[source] RepositoryError),

    // ===== 求解器调用 =====
    #[error("求解器启动失败: program={program}, {reason}")]
    SolverLaunch { program: String, reason: String },

    #[error("求解器进程通信失败: {reason}")]
    SolverIo { reason: String },

    #[error("求解器异常退出: exit_code={exit_code:?}, stderr={stderr}")]
    SolverExit { exit_code: Option<i32>, stderr: String },

    #[error("求解器超时: timeout={timeout_secs}s, stderr={stderr}")]
    SolverTimeout { timeout_secs: u64, stderr: String },

    #[error("求解器执行失败: solver={solver}, {reason}")]
    SolverFailed { solver: String, reason: String },

    #[error("求解已取消")]
    SolverCancelled,

    // ===== 序列化 =====
    #[error("求解器输入序列化失败: {0}")]
    RequestEncode(#[source] serde_json::Error),

    #[error("求解器输出解析失败: {reason}, output={raw_output}")]
    ResponseDecode { reason: String, raw_output: String },

    // ===== 结果判定 =====
    #[error("求解器未给出可用解: status={status:?} ({outcome})")]
    RejectedSolution { status: String, outcome: SolveOutcome },

    #[error("求解结果结构无效: {0}")]
    InvalidSchedule(String),

    // ===== 窗口替换 =====
    #[error("排班窗口锁获取失败: {0}")]
    WindowLock(String),

    #[error("既有排班删除失败: {0}")]
    WindowDelete(#[source] RepositoryError),

    #[error("新排班写入失败，窗口已回滚保持原排班: {0}")]
    InsertRolledBack(#[source] RepositoryError),

    #[error("新排班写入失败，窗口 {window} 的旧排班已删除且未写入新排班: {source}")]
    InsertWindowCleared {
        window: ScheduleWindow,
        source: RepositoryError,
    },
}

impl GenerationError {
    /// 错误所属阶段
    pub fn stage(&self) -> GenerationStage {
        match self {
            GenerationError::InvalidStartDate { .. } | GenerationError::InvalidHorizon { .. } => {
                GenerationStage::Input
            }
            GenerationError::Aggregation(_) => GenerationStage::Aggregate,
            GenerationError::SolverLaunch { .. }
            | GenerationError::SolverIo { .. }
            | GenerationError::SolverExit { .. }
            | GenerationError::SolverTimeout { .. }
            | GenerationError::SolverFailed { .. }
            | GenerationError::SolverCancelled
            | GenerationError::RequestEncode(_)
            | GenerationError::ResponseDecode { .. } => GenerationStage::Solve,
            GenerationError::RejectedSolution { .. } => GenerationStage::Validate,
            GenerationError::InvalidSchedule(_) => GenerationStage::Materialize,
            GenerationError::WindowLock(_)
            | GenerationError::WindowDelete(_)
            | GenerationError::InsertRolledBack(_)
            | GenerationError::InsertWindowCleared { .. } => GenerationStage::Commit,
        }
    }

    /// 失败后窗口是否处于“旧排班已删、新排班未写”的部分状态
    pub fn window_cleared(&self) -> bool {
        matches!(self, GenerationError::InsertWindowCleared { .. })
    }

    /// 稳定错误代码（供命令层返回）
    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::InvalidStartDate { .. } => "INVALID_START_DATE",
            GenerationError::InvalidHorizon { .. } => "INVALID_HORIZON",
            GenerationError::Aggregation(_) => "AGGREGATION_READ_FAILED",
            GenerationError::SolverLaunch { .. } => "SOLVER_LAUNCH_FAILED",
            GenerationError::SolverIo { .. } => "SOLVER_IO_FAILED",
            GenerationError::SolverExit { .. } => "SOLVER_EXIT_NONZERO",
            GenerationError::SolverTimeout { .. } => "SOLVER_TIMEOUT",
            GenerationError::SolverFailed { .. } => "SOLVER_FAILED",
            GenerationError::SolverCancelled => "SOLVER_CANCELLED",
            GenerationError::RequestEncode(_) => "REQUEST_ENCODE_FAILED",
            GenerationError::ResponseDecode { .. } => "RESPONSE_DECODE_FAILED",
            GenerationError::RejectedSolution { .. } => "SOLUTION_REJECTED",
            GenerationError::InvalidSchedule(_) => "INVALID_SCHEDULE",
            GenerationError::WindowLock(_) => "WINDOW_LOCK_FAILED",
            GenerationError::WindowDelete(_) => "EXISTING_SCHEDULE_DELETE_FAILED",
            GenerationError::InsertRolledBack(_) => "SCHEDULE_INSERT_FAILED",
            GenerationError::InsertWindowCleared { .. } => "SCHEDULE_WINDOW_CLEARED",
        }
    }
}
