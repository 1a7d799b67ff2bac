// ==========================================
// 排班生成系统 - 排班 API
// ==========================================
// 职责: 排班查询、人工调整（移动/删除）、CSV 导出
// 说明: 人工调整与生成流程互不加锁，落在重新生成窗口内的调整会被覆盖
// ==========================================

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::parse_date;
use crate::domain::shift::{ShiftAssignment, ShiftMove};
use crate::repository::{ShiftAssignmentRepository, StaffRepository};

/// UTF-8 BOM（表格软件据此识别编码）
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct ShiftApi {
    shift_repo: Arc<ShiftAssignmentRepository>,
    staff_repo: Arc<StaffRepository>,
}

impl ShiftApi {
    pub fn new(shift_repo: Arc<ShiftAssignmentRepository>, staff_repo: Arc<StaffRepository>) -> Self {
        Self {
            shift_repo,
            staff_repo,
        }
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn list_shifts(&self) -> ApiResult<Vec<ShiftAssignment>> {
        Ok(self.shift_repo.find_all()?)
    }

    /// 查询闭区间 [start, end] 内的排班
    pub fn list_shifts_in_range(&self, start: &str, end: &str) -> ApiResult<Vec<ShiftAssignment>> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(ApiError::InvalidInput(format!(
                "开始日期晚于结束日期: {} > {}",
                start, end
            )));
        }
        Ok(self.shift_repo.find_by_range(start, end)?)
    }

    // ==========================================
    // 人工调整
    // ==========================================

    /// 移动排班日期（可选同时修改班次）
    pub fn move_shift(&self, id: i64, change: ShiftMove) -> ApiResult<ShiftAssignment> {
        if let Some(code) = change.shift_type {
            if code <= 0 {
                return Err(ApiError::InvalidInput(format!(
                    "班次编码必须为正整数: {}",
                    code
                )));
            }
        }

        let updated = self
            .shift_repo
            .update_date(id, change.date, change.shift_type)?;
        info!(shift_id = id, date = %updated.date, shift_type = updated.shift_type, "人工调整排班");
        Ok(updated)
    }

    pub fn delete_shift(&self, id: i64) -> ApiResult<()> {
        self.shift_repo.delete(id)?;
        info!(shift_id = id, "人工删除排班");
        Ok(())
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出全部排班为 CSV（UTF-8 带 BOM）
    ///
    /// 列: 日期, 员工, 班次, 时间
    pub fn export_csv(&self) -> ApiResult<Vec<u8>> {
        let shifts = self.shift_repo.find_all()?;
        let names: HashMap<i64, String> = self
            .staff_repo
            .find_all()?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        let mut buf = UTF8_BOM.to_vec();
        {
            let mut writer = csv::Writer::from_writer(&mut buf);
            writer
                .write_record(["日期", "员工", "班次", "时间"])
                .map_err(|e| ApiError::ExportError(e.to_string()))?;

            for shift in &shifts {
                let kind = shift.kind();
                let date = shift.date.format("%Y-%m-%d").to_string();
                let name = names.get(&shift.staff_id).map(String::as_str).unwrap_or("");
                let label = kind.label();
                writer
                    .write_record([date.as_str(), name, label.as_str(), kind.time_range()])
                    .map_err(|e| ApiError::ExportError(e.to_string()))?;
            }

            writer
                .flush()
                .map_err(|e| ApiError::ExportError(e.to_string()))?;
        }

        info!(rows = shifts.len(), "导出排班 CSV");
        Ok(buf)
    }
}
