// ==========================================
// 命令层集成测试
// ==========================================
// 测试范围:
// 1. 员工/请假/人手需求 CRUD 与输入校验
// 2. 排班人工调整（移动、删除）
// 3. CSV 导出
// 4. 配置读写
// ==========================================


use serde_json::Value;
use shift_scheduler::app::{commands, AppState};
use std::sync::Arc;
use test_helpers::*;

fn setup() -> (tempfile::NamedTempFile, AppState) {
    let (tmp, db_path) = create_test_db().unwrap();
    let state = AppState::with_solver(db_path, Arc::new(uniform_solver(1))).unwrap();
    (tmp, state)
}

fn parse(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

fn add_staff(state: &AppState, name: &str) -> i64 {
    let body = serde_json::json!({ "name": name, "hourly_wage": 1200, "roles": "Hall" });
    parse(&commands::create_staff(state, &body.to_string()).unwrap())["id"]
        .as_i64()
        .unwrap()
}

// ==========================================
// 员工
// ==========================================

#[test]
fn test_staff_新建与列表() {
    let (_tmp, state) = setup();
    let id = add_staff(&state, "  中村  ");

    let list = parse(&commands::list_staff(&state).unwrap());
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["name"], "中村");
    assert_eq!(list[0]["is_leader"], false);
}

#[test]
fn test_staff_输入校验() {
    let (_tmp, state) = setup();

    let err = commands::create_staff(&state, r#"{"name": "   "}"#).unwrap_err();
    assert_eq!(parse(&err)["code"], "INVALID_INPUT");

    let err = commands::create_staff(&state, r#"{"name": "中村", "hourly_wage": -1}"#).unwrap_err();
    assert_eq!(parse(&err)["code"], "INVALID_INPUT");

    let err = commands::create_staff(&state, "not json").unwrap_err();
    assert_eq!(parse(&err)["code"], "INVALID_INPUT");

    let err = commands::delete_staff(&state, 404).unwrap_err();
    assert_eq!(parse(&err)["code"], "NOT_FOUND");
}

#[test]
fn test_staff_删除级联清理排班() {
    let (_tmp, state) = setup();
    let id = add_staff(&state, "中村");
    commands::create_leave_request(&state, id, "2026-02-02").unwrap();
    commands::generate_schedule(&state, r#"{"start_date": "2026-02-01", "days": 3}"#).unwrap();
    assert_eq!(
        parse(&commands::list_shifts(&state, None, None).unwrap())
            .as_array()
            .unwrap()
            .len(),
        3
    );

    commands::delete_staff(&state, id).unwrap();
    assert!(parse(&commands::list_shifts(&state, None, None).unwrap())
        .as_array()
        .unwrap()
        .is_empty());
    assert!(parse(&commands::list_leave_requests(&state).unwrap())
        .as_array()
        .unwrap()
        .is_empty());
}

// ==========================================
// 请假 / 人手需求
// ==========================================

#[test]
fn test_leave_request_校验() {
    let (_tmp, state) = setup();
    let id = add_staff(&state, "中村");

    let saved = parse(&commands::create_leave_request(&state, id, "2026-02-05").unwrap());
    assert_eq!(saved["type"], "unavailable");
    assert_eq!(saved["date"], "2026-02-05");

    let err = commands::create_leave_request(&state, id, "2026-13-01").unwrap_err();
    assert_eq!(parse(&err)["code"], "INVALID_INPUT");

    let err = commands::create_leave_request(&state, id + 1, "2026-02-05").unwrap_err();
    assert_eq!(parse(&err)["code"], "NOT_FOUND");

    commands::delete_leave_request(&state, saved["id"].as_i64().unwrap()).unwrap();
    assert!(parse(&commands::list_leave_requests(&state).unwrap())
        .as_array()
        .unwrap()
        .is_empty());
}

#[test]
fn test_requirement_同日覆盖() {
    let (_tmp, state) = setup();
    commands::save_requirement(&state, "2026-02-01", 3, 2).unwrap();
    let saved = parse(&commands::save_requirement(&state, "2026-02-01", 1, 4).unwrap());
    assert_eq!(saved["morning_need"], 1);
    assert_eq!(saved["evening_need"], 4);

    let list = parse(&commands::list_requirements(&state).unwrap());
    assert_eq!(list.as_array().unwrap().len(), 1);

    let err = commands::save_requirement(&state, "2026-02-01", -1, 0).unwrap_err();
    assert_eq!(parse(&err)["code"], "INVALID_INPUT");

    commands::delete_requirement(&state, saved["id"].as_i64().unwrap()).unwrap();
    let err = commands::delete_requirement(&state, saved["id"].as_i64().unwrap()).unwrap_err();
    assert_eq!(parse(&err)["code"], "NOT_FOUND");
}

// ==========================================
// 排班人工调整
// ==========================================

#[test]
fn test_shift_移动与删除() {
    let (_tmp, state) = setup();
    add_staff(&state, "中村");
    commands::generate_schedule(&state, r#"{"start_date": "2026-02-01", "days": 2}"#).unwrap();

    let shifts = parse(&commands::list_shifts(&state, Some("2026-02-01"), Some("2026-02-01")).unwrap());
    assert_eq!(shifts.as_array().unwrap().len(), 1);
    let id = shifts[0]["id"].as_i64().unwrap();

    let moved = parse(&commands::move_shift(&state, id, r#"{"date": "2026-02-10"}"#).unwrap());
    assert_eq!(moved["date"], "2026-02-10");
    assert_eq!(moved["shift_type"], 1);

    let changed = parse(
        &commands::move_shift(&state, id, r#"{"date": "2026-02-11", "shift_type": 2}"#).unwrap(),
    );
    assert_eq!(changed["shift_type"], 2);

    let err = commands::move_shift(&state, id, r#"{"date": "2026-02-11", "shift_type": 0}"#)
        .unwrap_err();
    assert_eq!(parse(&err)["code"], "INVALID_INPUT");

    let err = commands::list_shifts(&state, Some("2026-02-05"), Some("2026-02-01")).unwrap_err();
    assert_eq!(parse(&err)["code"], "INVALID_INPUT");

    commands::delete_shift(&state, id).unwrap();
    let err = commands::delete_shift(&state, id).unwrap_err();
    assert_eq!(parse(&err)["code"], "NOT_FOUND");
}

#[test]
fn test_export_csv() {
    let (_tmp, state) = setup();
    add_staff(&state, "中村");
    commands::generate_schedule(&state, r#"{"start_date": "2026-02-01", "days": 2}"#).unwrap();

    let bytes = commands::export_shifts_csv(&state).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "日期,员工,班次,时间");
    assert_eq!(lines[1], "2026-02-01,中村,早班,09:00-18:00");
    assert_eq!(lines[2], "2026-02-02,中村,早班,09:00-18:00");
    assert_eq!(lines.len(), 3);
}

// ==========================================
// 配置 / 运行记录
// ==========================================

#[test]
fn test_config_读写与校验() {
    let (_tmp, state) = setup();

    commands::set_config(&state, "generation.default_days", "7").unwrap();
    let got = parse(&commands::get_config(&state, "generation.default_days").unwrap());
    assert_eq!(got["value"], "7");

    let err = commands::set_config(&state, "solver.args", "engine/main.py").unwrap_err();
    assert_eq!(parse(&err)["code"], "INVALID_INPUT");

    // 缺省天数来自配置
    add_staff(&state, "中村");
    let resp = parse(&commands::generate_schedule(&state, r#"{"start_date": "2026-02-01"}"#).unwrap());
    assert_eq!(resp["days"], 7);
    assert_eq!(resp["window_end"], "2026-02-07");

    let runs = parse(&commands::list_generation_runs(&state, Some(5)).unwrap());
    assert_eq!(runs[0]["status"], "SUCCEEDED");
    assert_eq!(runs[0]["inserted_count"], 7);
}
