// ==========================================
// 排班生成系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod generation_run_repo;
pub mod leave_request_repo;
pub mod requirement_repo;
pub mod shift_repo;
pub mod staff_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use generation_run_repo::{GenerationRunEntity, GenerationRunRepository};
pub use leave_request_repo::LeaveRequestRepository;
pub use requirement_repo::StaffingRequirementRepository;
pub use shift_repo::{ReplaceError, ReplaceOutcome, ShiftAssignmentRepository};
pub use staff_repo::StaffRepository;

use chrono::NaiveDate;

/// 库内日期统一格式
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// 解析日期列（格式错误转换为 rusqlite 转换错误，不静默兜底）
pub(crate) fn parse_date_column(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// 日期转库内文本
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
