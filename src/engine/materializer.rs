// ==========================================
// 排班生成系统 - 排班物化
// ==========================================
// 职责: 将求解器的 staff_id -> [班次编码] 矩阵展开为带日历日期的排班记录
// 规则:
// - 日偏移 i 对应 window.start + i 天（公历日期运算，无时区）
// - 编码 0 表示当天不排班，不产出记录
// 红线: 结构不合法时在任何写入之前失败
// ==========================================

use crate::domain::generation::{ScheduleWindow, SolverResult};
use crate::domain::shift::ShiftAssignment;
use crate::engine::error::GenerationError;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleMaterializer;

impl ScheduleMaterializer {
    pub fn new() -> Self {
        Self
    }

    /// 物化排班
    ///
    /// # 参数
    /// - `result`: 已通过判定的求解结果
    /// - `window`: 与删除窗口相同的排班窗口
    /// - `roster`: 本次生成使用的员工 id 集合
    ///
    /// # 返回
    /// - Err(InvalidSchedule): 序列超出窗口天数、编码为负、或员工不在名册中
    pub fn materialize(
        &self,
        result: &SolverResult,
        window: &ScheduleWindow,
        roster: &HashSet<i64>,
    ) -> Result<Vec<ShiftAssignment>, GenerationError> {
        let horizon = window.days() as usize;
        let mut assignments = Vec::new();

        for (&staff_id, codes) in &result.schedule {
            if !roster.contains(&staff_id) {
                return Err(GenerationError::InvalidSchedule(format!(
                    "员工 {} 不在本次名册中",
                    staff_id
                )));
            }
            if codes.len() > horizon {
                return Err(GenerationError::InvalidSchedule(format!(
                    "员工 {} 的班次序列长度 {} 超过排班天数 {}",
                    staff_id,
                    codes.len(),
                    horizon
                )));
            }

            for (offset, &code) in codes.iter().enumerate() {
                if code == 0 {
                    continue;
                }
                if code < 0 {
                    return Err(GenerationError::InvalidSchedule(format!(
                        "员工 {} 第 {} 天的班次编码无效: {}",
                        staff_id, offset, code
                    )));
                }
                let date = window.date_at(offset).ok_or_else(|| {
                    GenerationError::InvalidSchedule(format!(
                        "员工 {} 第 {} 天超出窗口 {}",
                        staff_id, offset, window
                    ))
                })?;
                assignments.push(ShiftAssignment::new(staff_id, date, code));
            }
        }

        debug!(
            window = %window,
            staff_count = result.schedule.len(),
            assignment_count = assignments.len(),
            "排班物化完成"
        );

        Ok(assignments)
    }
}
