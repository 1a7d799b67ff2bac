// ==========================================
// 排班生成系统 - 员工 API
// ==========================================
// 职责: 员工新建、查询、删除（删除级联清理排班与请假）
// ==========================================

use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::staff::{NewStaff, Staff};
use crate::repository::StaffRepository;

pub struct StaffApi {
    staff_repo: Arc<StaffRepository>,
}

impl StaffApi {
    pub fn new(staff_repo: Arc<StaffRepository>) -> Self {
        Self { staff_repo }
    }

    /// 新建员工
    ///
    /// # 返回
    /// - Err(InvalidInput): 姓名为空或时薪为负
    pub fn create_staff(&self, staff: NewStaff) -> ApiResult<Staff> {
        let name = staff.name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("员工姓名不能为空".to_string()));
        }
        if staff.hourly_wage < 0 {
            return Err(ApiError::InvalidInput(format!(
                "时薪不能为负数: {}",
                staff.hourly_wage
            )));
        }

        let normalized = NewStaff {
            name: name.to_string(),
            roles: normalize_roles(&staff.roles),
            ..staff
        };
        let created = self.staff_repo.insert(&normalized)?;
        info!(staff_id = created.id, name = %created.name, "新建员工");
        Ok(created)
    }

    pub fn list_staff(&self) -> ApiResult<Vec<Staff>> {
        Ok(self.staff_repo.find_all()?)
    }

    /// 删除员工
    pub fn delete_staff(&self, id: i64) -> ApiResult<()> {
        self.staff_repo.delete(id)?;
        info!(staff_id = id, "删除员工");
        Ok(())
    }
}

/// 角色标签去空白、去空项，保持逗号分隔
fn normalize_roles(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
