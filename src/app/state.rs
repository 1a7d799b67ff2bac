// ==========================================
// 排班生成系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{
    ConfigApi, GenerationApi, LeaveRequestApi, RequirementApi, ShiftApi, StaffApi,
};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{GenerationStores, Solver, WindowLockRegistry};
use crate::repository::{
    GenerationRunRepository, LeaveRequestRepository, ShiftAssignmentRepository, StaffRepository,
    StaffingRequirementRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SHIFT_SCHEDULER_DB_PATH";

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接；窗口锁注册表在整个进程内唯一
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    pub staff_api: Arc<StaffApi>,
    pub leave_request_api: Arc<LeaveRequestApi>,
    pub requirement_api: Arc<RequirementApi>,
    pub shift_api: Arc<ShiftApi>,
    pub generation_api: Arc<GenerationApi>,
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 创建新的AppState实例（求解器按配置启动外部进程）
    ///
    /// # 说明
    /// 打开数据库、补齐表结构，并创建所有 Repository 与 API 实例
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::build(db_path, None)
    }

    /// 使用指定求解器创建AppState（进程内求解 / 测试）
    pub fn with_solver(db_path: String, solver: Arc<dyn Solver>) -> Result<Self, String> {
        Self::build(db_path, Some(solver))
    }

    fn build(db_path: String, solver: Option<Arc<dyn Solver>>) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "初始化AppState");

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库表结构初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let staff_repo = Arc::new(StaffRepository::new(conn.clone()));
        let request_repo = Arc::new(LeaveRequestRepository::new(conn.clone()));
        let requirement_repo = Arc::new(StaffingRequirementRepository::new(conn.clone()));
        let shift_repo = Arc::new(ShiftAssignmentRepository::new(conn.clone()));
        let run_repo = Arc::new(GenerationRunRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::new(conn));

        // ==========================================
        // 初始化API层
        // ==========================================
        let stores = GenerationStores::new(
            staff_repo.clone(),
            request_repo.clone(),
            requirement_repo.clone(),
            shift_repo.clone(),
        );
        let mut generation_api = GenerationApi::new(
            config_manager.clone(),
            stores,
            WindowLockRegistry::new(),
            run_repo,
        );
        if let Some(solver) = solver {
            generation_api = generation_api.with_solver(solver);
        }

        Ok(Self {
            db_path,
            staff_api: Arc::new(StaffApi::new(staff_repo.clone())),
            leave_request_api: Arc::new(LeaveRequestApi::new(request_repo, staff_repo.clone())),
            requirement_api: Arc::new(RequirementApi::new(requirement_repo)),
            shift_api: Arc::new(ShiftApi::new(shift_repo, staff_repo)),
            generation_api: Arc::new(generation_api),
            config_api: Arc::new(ConfigApi::new(config_manager)),
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 SHIFT_SCHEDULER_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./shift_scheduler.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("shift-scheduler");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("shift_scheduler.db");
        }
    }

    path.to_string_lossy().to_string()
}
