// ==========================================
// 排班生成系统 - 命令层
// ==========================================
// 职责: JSON 入参 / JSON 出参，供 CLI 或外部路由层调用
// 约定: 成功返回 JSON 字符串；失败返回 ErrorResponse 的 JSON 字符串
// ==========================================

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error::ApiError;
use crate::app::state::AppState;
use crate::domain::generation::GenerationInput;
use crate::domain::shift::ShiftMove;
use crate::domain::staff::NewStaff;
use crate::engine::CancellationToken;

// ==========================================
// 公共工具：错误映射
// ==========================================

/// 错误响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 失败阶段（仅排班生成）
    pub stage: Option<String>,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

/// 将ApiError转换为JSON字符串
pub fn map_api_error(err: ApiError) -> String {
    let (stage, details) = match &err {
        ApiError::Generation(e) => (
            Some(e.stage().as_str().to_string()),
            Some(json!({ "window_cleared": e.window_cleared() })),
        ),
        _ => (None, None),
    };

    let error_response = ErrorResponse {
        code: err.code().to_string(),
        stage,
        message: err.to_string(),
        details,
    };

    serde_json::to_string(&error_response).unwrap_or_else(|_| err.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("序列化失败: {}", e))
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, String> {
    serde_json::from_str(body)
        .map_err(|e| map_api_error(ApiError::InvalidInput(format!("请求体解析失败: {}", e))))
}

// ==========================================
// 员工
// ==========================================

/// 新建员工，body: {name, is_leader?, hourly_wage?, roles?}
pub fn create_staff(state: &AppState, body: &str) -> Result<String, String> {
    let staff: NewStaff = parse_body(body)?;
    let created = state.staff_api.create_staff(staff).map_err(map_api_error)?;
    to_json(&created)
}

pub fn list_staff(state: &AppState) -> Result<String, String> {
    let list = state.staff_api.list_staff().map_err(map_api_error)?;
    to_json(&list)
}

pub fn delete_staff(state: &AppState, id: i64) -> Result<String, String> {
    state.staff_api.delete_staff(id).map_err(map_api_error)?;
    to_json(&json!({ "message": "已删除" }))
}

// ==========================================
// 请假申请
// ==========================================

pub fn create_leave_request(state: &AppState, staff_id: i64, date: &str) -> Result<String, String> {
    let saved = state
        .leave_request_api
        .create_request(staff_id, date)
        .map_err(map_api_error)?;
    to_json(&saved)
}

pub fn list_leave_requests(state: &AppState) -> Result<String, String> {
    let list = state
        .leave_request_api
        .list_requests()
        .map_err(map_api_error)?;
    to_json(&list)
}

pub fn delete_leave_request(state: &AppState, id: i64) -> Result<String, String> {
    state
        .leave_request_api
        .delete_request(id)
        .map_err(map_api_error)?;
    to_json(&json!({ "message": "已删除" }))
}

// ==========================================
// 人手需求
// ==========================================

pub fn save_requirement(
    state: &AppState,
    date: &str,
    morning_need: i64,
    evening_need: i64,
) -> Result<String, String> {
    let saved = state
        .requirement_api
        .save_requirement(date, morning_need, evening_need)
        .map_err(map_api_error)?;
    to_json(&saved)
}

pub fn list_requirements(state: &AppState) -> Result<String, String> {
    let list = state
        .requirement_api
        .list_requirements()
        .map_err(map_api_error)?;
    to_json(&list)
}

pub fn delete_requirement(state: &AppState, id: i64) -> Result<String, String> {
    state
        .requirement_api
        .delete_requirement(id)
        .map_err(map_api_error)?;
    to_json(&json!({ "message": "已删除" }))
}

// ==========================================
// 排班
// ==========================================

/// 查询排班；start/end 同时提供时按闭区间过滤
pub fn list_shifts(state: &AppState, start: Option<&str>, end: Option<&str>) -> Result<String, String> {
    let list = match (start, end) {
        (Some(start), Some(end)) => state.shift_api.list_shifts_in_range(start, end),
        (None, None) => state.shift_api.list_shifts(),
        _ => Err(ApiError::InvalidInput(
            "start 与 end 必须同时提供".to_string(),
        )),
    }
    .map_err(map_api_error)?;
    to_json(&list)
}

/// 移动排班，body: {date, shift_type?}
pub fn move_shift(state: &AppState, id: i64, body: &str) -> Result<String, String> {
    let change: ShiftMove = parse_body(body)?;
    let updated = state
        .shift_api
        .move_shift(id, change)
        .map_err(map_api_error)?;
    to_json(&updated)
}

pub fn delete_shift(state: &AppState, id: i64) -> Result<String, String> {
    state.shift_api.delete_shift(id).map_err(map_api_error)?;
    to_json(&json!({ "message": "已删除" }))
}

/// 导出排班 CSV（原始字节）
pub fn export_shifts_csv(state: &AppState) -> Result<Vec<u8>, String> {
    state.shift_api.export_csv().map_err(map_api_error)
}

// ==========================================
// 排班生成
// ==========================================

/// 生成排班，body: {start_date, days?, requests?, requirements?, role_constraints?}
pub fn generate_schedule(state: &AppState, body: &str) -> Result<String, String> {
    generate_schedule_with_cancel(state, body, &CancellationToken::new())
}

/// 生成排班（可从其他线程取消）
pub fn generate_schedule_with_cancel(
    state: &AppState,
    body: &str,
    cancel: &CancellationToken,
) -> Result<String, String> {
    let input: GenerationInput = parse_body(body)?;
    let report = state
        .generation_api
        .generate(&input, cancel)
        .map_err(map_api_error)?;

    to_json(&json!({
        "message": "排班已生成并保存",
        "run_id": report.run_id,
        "window_start": report.window_start,
        "window_end": report.window_end,
        "days": report.days,
        "solver_status": report.solver_status,
        "deleted": report.deleted,
        "inserted": report.inserted,
    }))
}

pub fn list_generation_runs(state: &AppState, limit: Option<usize>) -> Result<String, String> {
    let runs = state
        .generation_api
        .list_runs(limit)
        .map_err(map_api_error)?;
    to_json(&runs)
}

// ==========================================
// 配置
// ==========================================

pub fn list_configs(state: &AppState) -> Result<String, String> {
    let configs = state.config_api.list_configs().map_err(map_api_error)?;
    to_json(&configs)
}

pub fn get_config(state: &AppState, key: &str) -> Result<String, String> {
    let value = state.config_api.get_config(key).map_err(map_api_error)?;
    to_json(&json!({ "key": key, "value": value }))
}

pub fn set_config(state: &AppState, key: &str, value: &str) -> Result<String, String> {
    state
        .config_api
        .update_config(key, value)
        .map_err(map_api_error)?;
    to_json(&json!({ "key": key, "value": value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GenerationError;

    #[test]
    fn test_map_api_error_生成错误带阶段() {
        let raw = map_api_error(ApiError::Generation(GenerationError::SolverExit {
            exit_code: Some(1),
            stderr: "ModuleNotFoundError: pulp".to_string(),
        }));
        let resp: ErrorResponse = serde_json::from_str(&raw).unwrap();
        assert_eq!(resp.code, "SOLVER_EXIT_NONZERO");
        assert_eq!(resp.stage.as_deref(), Some("solve"));
        assert!(resp.message.contains("ModuleNotFoundError"));
        assert_eq!(resp.details.unwrap()["window_cleared"], false);
    }

    #[test]
    fn test_map_api_error_普通错误() {
        let raw = map_api_error(ApiError::NotFound("Staff(id=1)不存在".to_string()));
        let resp: ErrorResponse = serde_json::from_str(&raw).unwrap();
        assert_eq!(resp.code, "NOT_FOUND");
        assert!(resp.stage.is_none());
        assert!(resp.details.is_none());
    }
}
