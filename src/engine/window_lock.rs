// ==========================================
// 排班生成系统 - 排班窗口锁
// ==========================================
// 职责: 进程内按日期窗口互斥，日期有交集的两次替换串行执行
// 说明: 不相交的窗口可并行；锁在 guard drop 时释放
// ==========================================

use crate::domain::generation::ScheduleWindow;
use crate::engine::error::GenerationError;
use std::sync::{Arc, Condvar, Mutex};
use tracing::debug;

#[derive(Default)]
struct LockState {
    next_id: u64,
    held: Vec<(u64, ScheduleWindow)>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<LockState>,
    released: Condvar,
}

// ==========================================
// WindowLockRegistry - 窗口锁注册表
// ==========================================
#[derive(Clone, Default)]
pub struct WindowLockRegistry {
    inner: Arc<Inner>,
}

impl WindowLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取窗口锁；与已持有窗口有交集时阻塞等待
    pub fn acquire(&self, window: ScheduleWindow) -> Result<WindowLockGuard, GenerationError> {
        let mut state = self
            .inner
            .state
            .lock()
            .map_err(|e| GenerationError::WindowLock(e.to_string()))?;

        while state.held.iter().any(|(_, held)| held.overlaps(&window)) {
            debug!(window = %window, "等待重叠窗口的替换完成");
            state = self
                .inner
                .released
                .wait(state)
                .map_err(|e| GenerationError::WindowLock(e.to_string()))?;
        }

        state.next_id += 1;
        let id = state.next_id;
        state.held.push((id, window));

        Ok(WindowLockGuard {
            inner: Arc::clone(&self.inner),
            id,
            window,
        })
    }

    /// 当前持有的窗口数
    #[cfg(test)]
    pub(crate) fn held_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .map(|state| state.held.len())
            .unwrap_or(0)
    }
}

/// 窗口锁持有凭证
pub struct WindowLockGuard {
    inner: Arc<Inner>,
    id: u64,
    window: ScheduleWindow,
}

impl Drop for WindowLockGuard {
    fn drop(&mut self) {
        // 中毒时仍需释放，否则等待方永远阻塞
        let mut state = match self.inner.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.held.retain(|(id, _)| *id != self.id);
        drop(state);
        debug!(window = %self.window, "释放窗口锁");
        self.inner.released.notify_all();
    }
}
