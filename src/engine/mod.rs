// ==========================================
// 排班生成系统 - 引擎层
// ==========================================
// 职责: 排班生成核心（聚合、求解、判定、物化、窗口替换）
// 红线: Engine 不拼 SQL，只依赖 stores 中的 trait
// ==========================================

pub mod aggregator;
pub mod committer;
pub mod error;
pub mod materializer;
pub mod orchestrator;
pub mod solver;
pub mod stores;
pub mod validator;
pub mod window_lock;

// 重导出核心类型
pub use aggregator::DomainAggregator;
pub use committer::ReplacementCommitter;
pub use error::{GenerationError, GenerationStage};
pub use materializer::ScheduleMaterializer;
pub use orchestrator::ScheduleGenerator;
pub use solver::{CancellationToken, InProcessSolver, ProcessSolver, Solver};
pub use stores::{GenerationStores, LeaveRequestSource, RequirementSource, ShiftStore, StaffSource};
pub use validator::SolutionValidator;
pub use window_lock::{WindowLockGuard, WindowLockRegistry};
