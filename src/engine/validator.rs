// ==========================================
// 排班生成系统 - 求解结果判定
// ==========================================
// 规则: 状态值去空白、大小写折叠后归入 {optimal, feasible, infeasible, unknown}
//       只有 optimal / feasible 可继续，其余一律失败并带上原始状态值
// ==========================================

use crate::domain::generation::SolverResult;
use crate::domain::types::SolveOutcome;
use crate::engine::error::GenerationError;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionValidator;

impl SolutionValidator {
    pub fn new() -> Self {
        Self
    }

    /// 判定求解结果
    ///
    /// # 返回
    /// - Ok((result, outcome)): 原样返回结果及归一化后的分类
    /// - Err(RejectedSolution): 无可行解或状态值无法识别
    pub fn validate(
        &self,
        result: SolverResult,
    ) -> Result<(SolverResult, SolveOutcome), GenerationError> {
        let outcome = SolveOutcome::from_token(&result.status);
        if !outcome.is_accepted() {
            warn!(status = %result.status, outcome = %outcome, "求解结果被拒绝");
            return Err(GenerationError::RejectedSolution {
                status: result.status,
                outcome,
            });
        }

        debug!(status = %result.status, outcome = %outcome, "求解结果可用");
        Ok((result, outcome))
    }
}
