// ==========================================
// 排班生成系统 - 请假申请 API
// ==========================================

use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::parse_date;
use crate::domain::staff::LeaveRequest;
use crate::domain::types::RequestType;
use crate::repository::{LeaveRequestRepository, StaffRepository};

pub struct LeaveRequestApi {
    request_repo: Arc<LeaveRequestRepository>,
    staff_repo: Arc<StaffRepository>,
}

impl LeaveRequestApi {
    pub fn new(request_repo: Arc<LeaveRequestRepository>, staff_repo: Arc<StaffRepository>) -> Self {
        Self {
            request_repo,
            staff_repo,
        }
    }

    /// 登记不可出勤日（类型固定为 unavailable）
    ///
    /// # 返回
    /// - Err(InvalidInput): 日期格式错误
    /// - Err(NotFound): 员工不存在
    pub fn create_request(&self, staff_id: i64, date: &str) -> ApiResult<LeaveRequest> {
        let date = parse_date(date)?;
        if self.staff_repo.find_by_id(staff_id)?.is_none() {
            return Err(ApiError::NotFound(format!("Staff(id={})不存在", staff_id)));
        }

        let saved = self.request_repo.insert(&LeaveRequest {
            id: 0,
            staff_id,
            date,
            request_type: RequestType::Unavailable,
        })?;
        info!(request_id = saved.id, staff_id, date = %saved.date, "登记请假申请");
        Ok(saved)
    }

    pub fn list_requests(&self) -> ApiResult<Vec<LeaveRequest>> {
        Ok(self.request_repo.find_all()?)
    }

    pub fn delete_request(&self, id: i64) -> ApiResult<()> {
        self.request_repo.delete(id)?;
        Ok(())
    }
}
