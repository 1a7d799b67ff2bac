// ==========================================
// 排班生成系统 - 排班生成 API
// ==========================================
// 职责: 每次调用读取最新配置，组装编排器并执行生成
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::generation::{GenerationInput, GenerationReport};
use crate::engine::{
    CancellationToken, GenerationStores, ProcessSolver, ScheduleGenerator, Solver,
    WindowLockRegistry,
};
use crate::repository::{GenerationRunEntity, GenerationRunRepository};

/// 运行记录查询的缺省条数
pub const DEFAULT_RUN_LIST_LIMIT: usize = 20;

pub struct GenerationApi {
    config_manager: Arc<ConfigManager>,
    stores: GenerationStores,
    locks: WindowLockRegistry,
    run_repo: Arc<GenerationRunRepository>,
    solver_override: Option<Arc<dyn Solver>>,
}

impl GenerationApi {
    pub fn new(
        config_manager: Arc<ConfigManager>,
        stores: GenerationStores,
        locks: WindowLockRegistry,
        run_repo: Arc<GenerationRunRepository>,
    ) -> Self {
        Self {
            config_manager,
            stores,
            locks,
            run_repo,
            solver_override: None,
        }
    }

    /// 使用指定求解器代替按配置启动的外部进程
    pub fn with_solver(mut self, solver: Arc<dyn Solver>) -> Self {
        self.solver_override = Some(solver);
        self
    }

    /// 执行排班生成
    pub fn generate(
        &self,
        input: &GenerationInput,
        cancel: &CancellationToken,
    ) -> ApiResult<GenerationReport> {
        let generation_config = self.config_manager.generation_config()?;
        let solver: Arc<dyn Solver> = match &self.solver_override {
            Some(solver) => Arc::clone(solver),
            None => Arc::new(ProcessSolver::new(self.config_manager.solver_config()?)),
        };

        let generator = ScheduleGenerator::new(
            self.stores.clone(),
            solver,
            self.locks.clone(),
            generation_config,
        )
        .with_run_log(Arc::clone(&self.run_repo));

        Ok(generator.generate(input, cancel)?)
    }

    /// 查询最近的生成运行记录
    pub fn list_runs(&self, limit: Option<usize>) -> ApiResult<Vec<GenerationRunEntity>> {
        let limit = limit.unwrap_or(DEFAULT_RUN_LIST_LIMIT);
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
        }
        Ok(self.run_repo.list_recent(limit)?)
    }

    pub fn get_run(&self, run_id: &str) -> ApiResult<GenerationRunEntity> {
        self.run_repo
            .find_by_id(run_id)?
            .ok_or_else(|| ApiError::NotFound(format!("GenerationRun(id={})不存在", run_id)))
    }
}
