// ==========================================
// 排班生成系统 - 排班领域模型
// ==========================================

use crate::domain::types::ShiftKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ShiftAssignment - 已确定的排班
// ==========================================
// 对齐: shift_assignment 表
// 红线: shift_type 为 0 的记录不得持久化
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftAssignment {
    /// 持久化后分配；物化阶段为 None
    #[serde(default)]
    pub id: Option<i64>,
    pub staff_id: i64,
    pub date: NaiveDate,
    pub shift_type: i64,
}

impl ShiftAssignment {
    /// 创建未持久化的排班
    pub fn new(staff_id: i64, date: NaiveDate, shift_type: i64) -> Self {
        Self {
            id: None,
            staff_id,
            date,
            shift_type,
        }
    }

    pub fn kind(&self) -> ShiftKind {
        ShiftKind::from_code(self.shift_type)
    }

    /// 比较用的业务键（忽略 id）
    #[cfg(test)]
    pub fn business_key(&self) -> (i64, NaiveDate, i64) {
        (self.staff_id, self.date, self.shift_type)
    }
}

/// 人工调整排班的参数（移动日期，可选改班次）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftMove {
    pub date: NaiveDate,
    #[serde(default)]
    pub shift_type: Option<i64>,
}
