// ==========================================
// 排班生成系统 - 生成流程编排器
// ==========================================
// 流程: 解析开始日期 -> 聚合 -> 求解 -> 判定 -> 物化 -> 窗口替换
// 约束:
// - 各阶段同步、单向，不重试
// - 开始日期与天数在求解前确定一次，物化与删除共用同一个 ScheduleWindow
// - 替换之前的任何失败都不修改已持久化排班
// ==========================================

use crate::config::GenerationConfig;
use crate::domain::generation::{
    GenerationInput, GenerationReport, ScheduleWindow, MAX_HORIZON_DAYS,
};
use crate::domain::types::RunStatus;
use crate::engine::aggregator::DomainAggregator;
use crate::engine::committer::ReplacementCommitter;
use crate::engine::error::GenerationError;
use crate::engine::materializer::ScheduleMaterializer;
use crate::engine::solver::{CancellationToken, Solver};
use crate::engine::stores::GenerationStores;
use crate::engine::validator::SolutionValidator;
use crate::engine::window_lock::WindowLockRegistry;
use crate::repository::{GenerationRunEntity, GenerationRunRepository};
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// ScheduleGenerator - 生成流程编排器
// ==========================================
pub struct ScheduleGenerator {
    aggregator: DomainAggregator,
    solver: Arc<dyn Solver>,
    validator: SolutionValidator,
    materializer: ScheduleMaterializer,
    committer: ReplacementCommitter,
    config: GenerationConfig,
    run_log: Option<Arc<GenerationRunRepository>>,
}

impl ScheduleGenerator {
    /// 创建编排器
    ///
    /// # 参数
    /// - stores: 读写端集合
    /// - solver: 求解器实现
    /// - locks: 窗口锁（同一存储的所有编排器应共享同一个注册表）
    /// - config: 缺省天数与角色规则
    pub fn new(
        stores: GenerationStores,
        solver: Arc<dyn Solver>,
        locks: WindowLockRegistry,
        config: GenerationConfig,
    ) -> Self {
        Self {
            aggregator: DomainAggregator::new(stores.staff, stores.requests, stores.requirements),
            solver,
            validator: SolutionValidator::new(),
            materializer: ScheduleMaterializer::new(),
            committer: ReplacementCommitter::new(stores.shifts, locks),
            config,
            run_log: None,
        }
    }

    /// 启用生成运行记录
    pub fn with_run_log(mut self, run_log: Arc<GenerationRunRepository>) -> Self {
        self.run_log = Some(run_log);
        self
    }

    /// 解析开始日期并确定窗口（缺省天数规则只在这里应用）
    pub fn resolve_window(&self, input: &GenerationInput) -> Result<ScheduleWindow, GenerationError> {
        let raw = input.start_date.as_deref().map(str::trim).unwrap_or("");
        if raw.is_empty() {
            return Err(GenerationError::InvalidStartDate {
                input: raw.to_string(),
                reason: "start_date 不能为空".to_string(),
            });
        }

        let start = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
            GenerationError::InvalidStartDate {
                input: raw.to_string(),
                reason: e.to_string(),
            }
        })?;

        ScheduleWindow::new(start, input.days, self.config.default_days).ok_or_else(|| {
            GenerationError::InvalidHorizon {
                start: raw.to_string(),
                days: ScheduleWindow::effective_days(input.days, self.config.default_days),
                max: MAX_HORIZON_DAYS,
            }
        })
    }

    /// 执行一次排班生成
    pub fn generate(
        &self,
        input: &GenerationInput,
        cancel: &CancellationToken,
    ) -> Result<GenerationReport, GenerationError> {
        let window = self.resolve_window(input)?;
        let run_id = Uuid::new_v4().to_string();

        info!(
            run_id = %run_id,
            solver = self.solver.name(),
            start_date = %window.start(),
            days = window.days(),
            "开始排班生成"
        );
        self.record_start(&run_id, &window);

        let result = self.run_stages(&run_id, &window, input, cancel);

        match &result {
            Ok(report) => {
                info!(
                    run_id = %run_id,
                    window = %window,
                    deleted = report.deleted,
                    inserted = report.inserted,
                    "排班生成完成"
                );
                self.record_finish(&run_id, RunStatus::Succeeded, None, None, report.inserted);
            }
            Err(e) => {
                let status = if e.window_cleared() {
                    RunStatus::WindowCleared
                } else {
                    RunStatus::Failed
                };
                warn!(
                    run_id = %run_id,
                    stage = %e.stage(),
                    status = %status,
                    error = %e,
                    "排班生成失败"
                );
                self.record_finish(&run_id, status, Some(e.stage().as_str()), Some(e.to_string().as_str()), 0);
            }
        }

        result
    }

    fn run_stages(
        &self,
        run_id: &str,
        window: &ScheduleWindow,
        input: &GenerationInput,
        cancel: &CancellationToken,
    ) -> Result<GenerationReport, GenerationError> {
        let request = self
            .aggregator
            .assemble(window, input, &self.config.role_constraints)?;
        let roster: HashSet<i64> = request.staff_list.iter().map(|s| s.id).collect();

        let raw = self.solver.solve(&request, cancel)?;
        let (accepted, outcome) = self.validator.validate(raw)?;
        let assignments = self.materializer.materialize(&accepted, window, &roster)?;

        if cancel.is_cancelled() {
            return Err(GenerationError::SolverCancelled);
        }

        let outcome_counts = self.committer.commit(window, &assignments)?;

        Ok(GenerationReport {
            run_id: run_id.to_string(),
            window_start: window.start(),
            window_end: window.end(),
            days: window.days(),
            solver_status: outcome.to_string(),
            deleted: outcome_counts.deleted,
            inserted: outcome_counts.inserted,
        })
    }

    // ==========================================
    // 运行记录（best-effort，失败只告警）
    // ==========================================

    fn record_start(&self, run_id: &str, window: &ScheduleWindow) {
        let Some(run_log) = &self.run_log else {
            return;
        };
        let entity = GenerationRunEntity {
            run_id: run_id.to_string(),
            started_at: Local::now().naive_local(),
            finished_at: None,
            window_start: window.start(),
            window_end: window.end(),
            days: window.days(),
            solver: self.solver.name().to_string(),
            status: RunStatus::Running,
            failed_stage: None,
            message: None,
            inserted_count: 0,
        };
        if let Err(e) = run_log.insert(&entity) {
            warn!(run_id = %run_id, error = %e, "写入生成运行记录失败");
        }
    }

    fn record_finish(
        &self,
        run_id: &str,
        status: RunStatus,
        failed_stage: Option<&str>,
        message: Option<&str>,
        inserted: usize,
    ) {
        let Some(run_log) = &self.run_log else {
            return;
        };
        if let Err(e) = run_log.finish(
            run_id,
            Local::now().naive_local(),
            status,
            failed_stage,
            message,
            inserted,
        ) {
            warn!(run_id = %run_id, error = %e, "更新生成运行记录失败");
        }
    }
}
