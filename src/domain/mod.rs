// ==========================================
// 排班生成系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod generation;
pub mod shift;
pub mod staff;
pub mod types;

// 重导出核心类型
pub use generation::{
    GenerationInput, GenerationReport, GenerationRequest, RoleConstraint, ScheduleWindow, SolverResult,
    DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS, REQUEST_SCHEMA_VERSION,
};
pub use shift::{ShiftAssignment, ShiftMove};
pub use staff::{LeaveRequest, NewStaff, Staff, StaffingRequirement};
pub use types::{RequestType, RunStatus, ShiftKind, SolveOutcome};
