// ==========================================
// 排班生成系统 - 每日人手需求 API
// ==========================================

use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::parse_date;
use crate::domain::staff::StaffingRequirement;
use crate::repository::StaffingRequirementRepository;

pub struct RequirementApi {
    requirement_repo: Arc<StaffingRequirementRepository>,
}

impl RequirementApi {
    pub fn new(requirement_repo: Arc<StaffingRequirementRepository>) -> Self {
        Self { requirement_repo }
    }

    /// 保存某日人手需求（同日覆盖）
    pub fn save_requirement(
        &self,
        date: &str,
        morning_need: i64,
        evening_need: i64,
    ) -> ApiResult<StaffingRequirement> {
        let date = parse_date(date)?;
        if morning_need < 0 || evening_need < 0 {
            return Err(ApiError::InvalidInput(format!(
                "人手需求不能为负数: morning_need={}, evening_need={}",
                morning_need, evening_need
            )));
        }

        let saved = self.requirement_repo.upsert(&StaffingRequirement {
            id: 0,
            date,
            morning_need,
            evening_need,
        })?;
        info!(date = %saved.date, morning_need, evening_need, "保存人手需求");
        Ok(saved)
    }

    pub fn list_requirements(&self) -> ApiResult<Vec<StaffingRequirement>> {
        Ok(self.requirement_repo.find_all()?)
    }

    pub fn delete_requirement(&self, id: i64) -> ApiResult<()> {
        self.requirement_repo.delete(id)?;
        Ok(())
    }
}
