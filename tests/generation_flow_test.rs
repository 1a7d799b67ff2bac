// ==========================================
// 排班生成流程集成测试
// ==========================================
// 测试范围:
// 1. 窗口替换: 日期映射、0 不落库、窗口外数据保留
// 2. 幂等: 同一请求重复生成结果一致
// 3. 缺省天数: 删除窗口与日期映射使用同一天数
// 4. 失败不修改: 状态被拒绝、结构无效
// 5. 部分失败: 先删后写的存储写入失败时标记 WINDOW_CLEARED
// ==========================================


use serde_json::Value;
use shift_scheduler::app::{commands, AppState};
use shift_scheduler::config::GenerationConfig;
use shift_scheduler::domain::{GenerationInput, NewStaff, RunStatus, ShiftAssignment};
use shift_scheduler::engine::{
    CancellationToken, GenerationError, GenerationStores, ScheduleGenerator, ShiftStore,
    WindowLockRegistry,
};
use shift_scheduler::repository::error::{RepositoryError, RepositoryResult};
use shift_scheduler::repository::{
    GenerationRunRepository, LeaveRequestRepository, ShiftAssignmentRepository, StaffRepository,
    StaffingRequirementRepository,
};
use std::sync::Arc;
use test_helpers::*;

fn new_staff(name: &str) -> NewStaff {
    NewStaff {
        name: name.to_string(),
        is_leader: false,
        hourly_wage: 1100,
        roles: "Hall".to_string(),
    }
}

// ==========================================
// 窗口替换
// ==========================================

#[test]
fn test_generate_窗口正确性() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_conn(&db_path);
    let staff = StaffRepository::new(conn.clone())
        .insert(&new_staff("山田"))
        .unwrap();

    let state = AppState::with_solver(
        db_path.clone(),
        Arc::new(fixed_solver("OPTIMAL", &[(staff.id, vec![1, 0, 2])])),
    )
    .unwrap();

    let raw = commands::generate_schedule(&state, r#"{"start_date": "2026-02-01", "days": 3}"#)
        .unwrap();
    let resp: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(resp["window_start"], "2026-02-01");
    assert_eq!(resp["window_end"], "2026-02-03");
    assert_eq!(resp["inserted"], 2);
    assert!(resp["run_id"].as_str().is_some());

    assert_eq!(
        shift_keys(&conn),
        vec![
            (staff.id, "2026-02-01".to_string(), 1),
            (staff.id, "2026-02-03".to_string(), 2),
        ]
    );
}

#[test]
fn test_generate_窗口外排班保留_窗口内旧排班清除() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_conn(&db_path);
    let staff = StaffRepository::new(conn.clone())
        .insert(&new_staff("山田"))
        .unwrap();
    ShiftAssignmentRepository::new(conn.clone())
        .batch_insert(&[
            ShiftAssignment::new(staff.id, date("2026-01-31"), 2),
            ShiftAssignment::new(staff.id, date("2026-02-02"), 2),
            ShiftAssignment::new(staff.id, date("2026-02-04"), 1),
        ])
        .unwrap();

    let state = AppState::with_solver(
        db_path.clone(),
        Arc::new(fixed_solver("Feasible", &[(staff.id, vec![1, 0, 0])])),
    )
    .unwrap();
    commands::generate_schedule(&state, r#"{"start_date": "2026-02-01", "days": 3}"#).unwrap();

    assert_eq!(
        shift_keys(&conn),
        vec![
            (staff.id, "2026-01-31".to_string(), 2),
            (staff.id, "2026-02-01".to_string(), 1),
            (staff.id, "2026-02-04".to_string(), 1),
        ]
    );
}

#[test]
fn test_generate_幂等() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_conn(&db_path);
    let repo = StaffRepository::new(conn.clone());
    repo.insert(&new_staff("山田")).unwrap();
    repo.insert(&new_staff("Σοφία")).unwrap();

    let state = AppState::with_solver(db_path.clone(), Arc::new(uniform_solver(2))).unwrap();
    let body = r#"{"start_date": "2026-02-10", "days": 5}"#;

    commands::generate_schedule(&state, body).unwrap();
    let first = shift_keys(&conn);
    commands::generate_schedule(&state, body).unwrap();
    let second = shift_keys(&conn);

    assert_eq!(first.len(), 10);
    assert_eq!(first, second);
}

#[test]
fn test_generate_缺省30天() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_conn(&db_path);
    let staff = StaffRepository::new(conn.clone())
        .insert(&new_staff("山田"))
        .unwrap();
    // 窗口最后一天与窗口外一天各有旧排班
    ShiftAssignmentRepository::new(conn.clone())
        .batch_insert(&[
            ShiftAssignment::new(staff.id, date("2026-03-30"), 2),
            ShiftAssignment::new(staff.id, date("2026-03-31"), 2),
        ])
        .unwrap();

    let state = AppState::with_solver(db_path.clone(), Arc::new(uniform_solver(1))).unwrap();

    for body in [
        r#"{"start_date": "2026-03-01"}"#,
        r#"{"start_date": "2026-03-01", "days": 0}"#,
    ] {
        let resp: Value =
            serde_json::from_str(&commands::generate_schedule(&state, body).unwrap()).unwrap();
        assert_eq!(resp["days"], 30);
        assert_eq!(resp["window_end"], "2026-03-30");
    }

    let keys = shift_keys(&conn);
    assert_eq!(keys.len(), 31);
    assert_eq!(keys.last().unwrap(), &(staff.id, "2026-03-31".to_string(), 2));
    assert!(keys
        .iter()
        .filter(|(_, d, _)| d.as_str() <= "2026-03-30")
        .all(|(_, _, t)| *t == 1));
}

// ==========================================
// 失败不修改已持久化排班
// ==========================================

#[test]
fn test_generate_无可行解不修改排班() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_conn(&db_path);
    let staff = StaffRepository::new(conn.clone())
        .insert(&new_staff("山田"))
        .unwrap();
    ShiftAssignmentRepository::new(conn.clone())
        .batch_insert(&[ShiftAssignment::new(staff.id, date("2026-02-01"), 2)])
        .unwrap();
    let before = shift_keys(&conn);

    let state =
        AppState::with_solver(db_path.clone(), Arc::new(fixed_solver("INFEASIBLE", &[]))).unwrap();
    let err = commands::generate_schedule(&state, r#"{"start_date": "2026-02-01", "days": 3}"#)
        .unwrap_err();

    let resp: Value = serde_json::from_str(&err).unwrap();
    assert_eq!(resp["code"], "SOLUTION_REJECTED");
    assert_eq!(resp["stage"], "validate");
    assert!(resp["message"].as_str().unwrap().contains("INFEASIBLE"));
    assert_eq!(shift_keys(&conn), before);

    let runs = state.generation_api.list_runs(None).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert_eq!(runs[0].failed_stage.as_deref(), Some("validate"));
}

#[test]
fn test_generate_开始日期格式错误() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let state = AppState::with_solver(db_path, Arc::new(uniform_solver(1))).unwrap();

    let err = commands::generate_schedule(&state, r#"{"start_date": "02/01/2026", "days": 3}"#)
        .unwrap_err();
    let resp: Value = serde_json::from_str(&err).unwrap();
    assert_eq!(resp["code"], "INVALID_START_DATE");
    assert_eq!(resp["stage"], "input");

    // 日期解析在运行记录之前，不留下记录
    assert!(state.generation_api.list_runs(None).unwrap().is_empty());
}

#[test]
fn test_generate_天数过大返回错误() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_conn(&db_path);
    let staff = StaffRepository::new(conn.clone())
        .insert(&new_staff("山田"))
        .unwrap();
    ShiftAssignmentRepository::new(conn.clone())
        .batch_insert(&[ShiftAssignment::new(staff.id, date("2026-02-01"), 2)])
        .unwrap();
    let before = shift_keys(&conn);

    let state = AppState::with_solver(db_path, Arc::new(uniform_solver(1))).unwrap();

    for body in [
        r#"{"start_date": "2026-02-01", "days": 4000000000}"#,
        r#"{"start_date": "2026-02-01", "days": 367}"#,
    ] {
        let err = commands::generate_schedule(&state, body).unwrap_err();
        let resp: Value = serde_json::from_str(&err).unwrap();
        assert_eq!(resp["code"], "INVALID_HORIZON", "{}", body);
        assert_eq!(resp["stage"], "input");
    }

    assert_eq!(shift_keys(&conn), before);
    assert!(state.generation_api.list_runs(None).unwrap().is_empty());

    // 上限本身可以生成
    let raw = commands::generate_schedule(&state, r#"{"start_date": "2026-02-01", "days": 366}"#)
        .unwrap();
    let resp: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(resp["inserted"], 366);
}

#[test]
fn test_generate_未知员工不修改排班() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_conn(&db_path);
    let staff = StaffRepository::new(conn.clone())
        .insert(&new_staff("山田"))
        .unwrap();
    ShiftAssignmentRepository::new(conn.clone())
        .batch_insert(&[ShiftAssignment::new(staff.id, date("2026-02-01"), 2)])
        .unwrap();

    let state = AppState::with_solver(
        db_path.clone(),
        Arc::new(fixed_solver("OPTIMAL", &[(staff.id + 100, vec![1, 1, 1])])),
    )
    .unwrap();
    let err = commands::generate_schedule(&state, r#"{"start_date": "2026-02-01", "days": 3}"#)
        .unwrap_err();
    let resp: Value = serde_json::from_str(&err).unwrap();
    assert_eq!(resp["code"], "INVALID_SCHEDULE");
    assert_eq!(shift_keys(&conn).len(), 1);
}

// ==========================================
// 部分失败（先删后写的存储）
// ==========================================

/// 删除走真实仓储、写入必然失败的存储
struct InsertFailingStore {
    inner: ShiftAssignmentRepository,
}

impl ShiftStore for InsertFailingStore {
    fn delete_range(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> RepositoryResult<usize> {
        self.inner.delete_range(start, end)
    }

    fn insert_all(&self, _items: &[ShiftAssignment]) -> RepositoryResult<usize> {
        Err(RepositoryError::DatabaseQueryError("database or disk is full".to_string()))
    }
}

#[test]
fn test_generate_写入失败标记窗口已清空() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_conn(&db_path);
    let staff = StaffRepository::new(conn.clone())
        .insert(&new_staff("山田"))
        .unwrap();
    ShiftAssignmentRepository::new(conn.clone())
        .batch_insert(&[ShiftAssignment::new(staff.id, date("2026-02-02"), 2)])
        .unwrap();

    let run_repo = Arc::new(GenerationRunRepository::new(conn.clone()));
    let generator = ScheduleGenerator::new(
        GenerationStores::new(
            Arc::new(StaffRepository::new(conn.clone())),
            Arc::new(LeaveRequestRepository::new(conn.clone())),
            Arc::new(StaffingRequirementRepository::new(conn.clone())),
            Arc::new(InsertFailingStore {
                inner: ShiftAssignmentRepository::new(conn.clone()),
            }),
        ),
        Arc::new(uniform_solver(1)),
        WindowLockRegistry::new(),
        GenerationConfig::default(),
    )
    .with_run_log(run_repo.clone());

    let err = generator
        .generate(
            &GenerationInput::new("2026-02-01", Some(3)),
            &CancellationToken::new(),
        )
        .unwrap_err();

    assert!(matches!(err, GenerationError::InsertWindowCleared { .. }));
    assert!(err.window_cleared());
    assert!(shift_keys(&conn).is_empty(), "旧排班已被删除");

    let runs = run_repo.list_recent(5).unwrap();
    assert_eq!(runs[0].status, RunStatus::WindowCleared);
    assert_eq!(runs[0].failed_stage.as_deref(), Some("commit"));
}

#[test]
fn test_generate_入参覆盖请假与需求() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared_conn(&db_path);
    let staff = StaffRepository::new(conn.clone())
        .insert(&new_staff("山田"))
        .unwrap();

    let seen = Arc::new(std::sync::Mutex::new(None));
    let captured = seen.clone();
    let solver = shift_scheduler::engine::InProcessSolver::new(
        "capture",
        move |req: &shift_scheduler::domain::GenerationRequest| {
            *captured.lock().unwrap() = Some(req.clone());
            Ok(shift_scheduler::domain::SolverResult {
                status: "OPTIMAL".to_string(),
                schedule: Default::default(),
            })
        },
    );
    let state = AppState::with_solver(db_path, Arc::new(solver)).unwrap();

    let body = format!(
        r#"{{"start_date": "2026-02-01", "days": 2,
            "requests": [{{"staff_id": {id}, "date": "2026-02-02", "type": "unavailable"}}],
            "requirements": [{{"date": "2026-02-01", "morning_need": 2, "evening_need": 1}}],
            "role_constraints": [{{"role": "Hall", "count": 1}}]}}"#,
        id = staff.id
    );
    commands::generate_schedule(&state, &body).unwrap();

    let req = seen.lock().unwrap().clone().unwrap();
    assert_eq!(req.schema_version, 1);
    assert_eq!(req.days, 2);
    assert_eq!(req.staff_list.len(), 1);
    assert_eq!(req.requests.len(), 1);
    assert_eq!(req.requirements[0].morning_need, 2);
    assert_eq!(req.role_constraints[0].role, "Hall");
}
