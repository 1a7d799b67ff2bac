// ==========================================
// 排班生成系统 - 引擎层数据源/存储 Trait
// ==========================================
// 职责: 定义生成流程所需的读写接口，引擎只依赖 trait
// 说明: SQLite 仓储实现这些 trait；测试可注入内存实现或故障实现
// ==========================================

use crate::domain::shift::ShiftAssignment;
use crate::domain::staff::{LeaveRequest, Staff, StaffingRequirement};
use crate::repository::error::RepositoryResult;
use crate::repository::{
    LeaveRequestRepository, ReplaceError, ReplaceOutcome, ShiftAssignmentRepository,
    StaffRepository, StaffingRequirementRepository,
};
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// 只读数据源
// ==========================================

/// 员工名册来源
pub trait StaffSource: Send + Sync {
    fn list_staff(&self) -> RepositoryResult<Vec<Staff>>;
}

/// 请假申请来源
pub trait LeaveRequestSource: Send + Sync {
    fn list_requests(&self) -> RepositoryResult<Vec<LeaveRequest>>;
}

/// 每日人手需求来源
pub trait RequirementSource: Send + Sync {
    fn list_requirements(&self) -> RepositoryResult<Vec<StaffingRequirement>>;
}

// ==========================================
// 排班存储
// ==========================================

/// 排班存储 Trait
///
/// # 实现说明
/// - `replace_range` 缺省实现为“先删后写”两步，写入失败时窗口已被清空
///   （返回 `rolled_back = false`）
/// - 支持事务的存储应覆盖 `replace_range`，在单个事务内完成替换
pub trait ShiftStore: Send + Sync {
    /// 删除闭区间 [start, end] 内的排班，返回删除条数
    fn delete_range(&self, start: NaiveDate, end: NaiveDate) -> RepositoryResult<usize>;

    /// 批量写入排班，返回写入条数
    fn insert_all(&self, items: &[ShiftAssignment]) -> RepositoryResult<usize>;

    /// 替换窗口内的排班
    fn replace_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        items: &[ShiftAssignment],
    ) -> Result<ReplaceOutcome, ReplaceError> {
        let deleted = self.delete_range(start, end).map_err(ReplaceError::Delete)?;
        let inserted = self
            .insert_all(items)
            .map_err(|source| ReplaceError::Insert {
                source,
                rolled_back: false,
            })?;
        Ok(ReplaceOutcome { deleted, inserted })
    }
}

// ==========================================
// SQLite 仓储适配
// ==========================================

impl StaffSource for StaffRepository {
    fn list_staff(&self) -> RepositoryResult<Vec<Staff>> {
        self.find_all()
    }
}

impl LeaveRequestSource for LeaveRequestRepository {
    fn list_requests(&self) -> RepositoryResult<Vec<LeaveRequest>> {
        self.find_all()
    }
}

impl RequirementSource for StaffingRequirementRepository {
    fn list_requirements(&self) -> RepositoryResult<Vec<StaffingRequirement>> {
        self.find_all()
    }
}

impl ShiftStore for ShiftAssignmentRepository {
    fn delete_range(&self, start: NaiveDate, end: NaiveDate) -> RepositoryResult<usize> {
        ShiftAssignmentRepository::delete_range(self, start, end)
    }

    fn insert_all(&self, items: &[ShiftAssignment]) -> RepositoryResult<usize> {
        self.batch_insert(items)
    }

    fn replace_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        items: &[ShiftAssignment],
    ) -> Result<ReplaceOutcome, ReplaceError> {
        ShiftAssignmentRepository::replace_range(self, start, end, items)
    }
}

// ==========================================
// GenerationStores - 生成流程数据源集合
// ==========================================

/// 生成流程所需的读写端集合（简化依赖注入）
#[derive(Clone)]
pub struct GenerationStores {
    pub staff: Arc<dyn StaffSource>,
    pub requests: Arc<dyn LeaveRequestSource>,
    pub requirements: Arc<dyn RequirementSource>,
    pub shifts: Arc<dyn ShiftStore>,
}

impl GenerationStores {
    pub fn new(
        staff: Arc<dyn StaffSource>,
        requests: Arc<dyn LeaveRequestSource>,
        requirements: Arc<dyn RequirementSource>,
        shifts: Arc<dyn ShiftStore>,
    ) -> Self {
        Self {
            staff,
            requests,
            requirements,
            shifts,
        }
    }
}
