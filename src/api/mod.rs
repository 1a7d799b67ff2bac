// ==========================================
// 排班生成系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令层调用
// ==========================================

pub mod config_api;
pub mod error;
pub mod generation_api;
pub mod leave_request_api;
pub mod requirement_api;
pub mod shift_api;
pub mod staff_api;

// 重导出核心类型
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use generation_api::GenerationApi;
pub use leave_request_api::LeaveRequestApi;
pub use requirement_api::RequirementApi;
pub use shift_api::ShiftApi;
pub use staff_api::StaffApi;

use chrono::NaiveDate;

/// 解析日期字符串（YYYY-MM-DD）
pub(crate) fn parse_date(date_str: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|e| ApiError::InvalidInput(format!("日期格式错误（应为YYYY-MM-DD）: {}, {}", date_str, e)))
}
