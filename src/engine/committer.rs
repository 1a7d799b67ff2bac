// ==========================================
// 排班生成系统 - 窗口替换提交
// ==========================================
// 职责: 持窗口锁，删除窗口内旧排班并写入新排班
// 失败语义:
// - 删除失败: 未写入，报“既有排班删除失败”
// - 写入失败且已回滚: 窗口保持原排班
// - 写入失败且未回滚: 窗口被清空，error 级别日志 + 独立错误类型
// ==========================================

use crate::domain::generation::ScheduleWindow;
use crate::domain::shift::ShiftAssignment;
use crate::engine::error::GenerationError;
use crate::engine::stores::ShiftStore;
use crate::engine::window_lock::WindowLockRegistry;
use crate::repository::{ReplaceError, ReplaceOutcome};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct ReplacementCommitter {
    store: Arc<dyn ShiftStore>,
    locks: WindowLockRegistry,
}

impl ReplacementCommitter {
    pub fn new(store: Arc<dyn ShiftStore>, locks: WindowLockRegistry) -> Self {
        Self { store, locks }
    }

    /// 替换窗口 [window.start, window.end] 内的排班
    pub fn commit(
        &self,
        window: &ScheduleWindow,
        assignments: &[ShiftAssignment],
    ) -> Result<ReplaceOutcome, GenerationError> {
        let _guard = self.locks.acquire(*window)?;

        match self
            .store
            .replace_range(window.start(), window.end(), assignments)
        {
            Ok(outcome) => {
                info!(
                    window = %window,
                    deleted = outcome.deleted,
                    inserted = outcome.inserted,
                    "排班窗口替换完成"
                );
                Ok(outcome)
            }
            Err(ReplaceError::Delete(source)) => {
                warn!(window = %window, error = %source, "删除窗口内既有排班失败");
                Err(GenerationError::WindowDelete(source))
            }
            Err(ReplaceError::Insert {
                source,
                rolled_back: true,
            }) => {
                warn!(window = %window, error = %source, "写入新排班失败，窗口已回滚");
                Err(GenerationError::InsertRolledBack(source))
            }
            Err(ReplaceError::Insert {
                source,
                rolled_back: false,
            }) => {
                error!(
                    window = %window,
                    pending = assignments.len(),
                    error = %source,
                    "写入新排班失败，窗口内旧排班已删除，当前为空"
                );
                Err(GenerationError::InsertWindowCleared {
                    window: *window,
                    source,
                })
            }
        }
    }
}
