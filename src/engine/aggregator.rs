// ==========================================
// 排班生成系统 - 输入聚合器
// ==========================================
// 职责: 读取员工名册、请假申请、人手需求，组装成求解器输入
// 红线: 只读；存储错误原样上抛，不做解释
// ==========================================

use crate::domain::generation::{GenerationInput, GenerationRequest, RoleConstraint, ScheduleWindow};
use crate::domain::staff::Staff;
use crate::engine::error::GenerationError;
use crate::engine::stores::{LeaveRequestSource, RequirementSource, StaffSource};
use std::sync::Arc;
use tracing::{debug, warn};

// ==========================================
// DomainAggregator - 输入聚合器
// ==========================================
pub struct DomainAggregator {
    staff: Arc<dyn StaffSource>,
    requests: Arc<dyn LeaveRequestSource>,
    requirements: Arc<dyn RequirementSource>,
}

impl DomainAggregator {
    pub fn new(
        staff: Arc<dyn StaffSource>,
        requests: Arc<dyn LeaveRequestSource>,
        requirements: Arc<dyn RequirementSource>,
    ) -> Self {
        Self {
            staff,
            requests,
            requirements,
        }
    }

    /// 组装求解器输入
    ///
    /// # 参数
    /// - `window`: 已确定的排班窗口（开始日期 + 生效天数）
    /// - `input`: 调用方入参；其中 requests / requirements / role_constraints 若提供则不再读库
    /// - `default_roles`: 入参未提供角色规则时使用的配置值
    ///
    /// # 说明
    /// 员工名册始终从存储读取，保证排班中的 staff_id 均来自同一名册
    pub fn assemble(
        &self,
        window: &ScheduleWindow,
        input: &GenerationInput,
        default_roles: &[RoleConstraint],
    ) -> Result<GenerationRequest, GenerationError> {
        let mut request = GenerationRequest::for_window(window);

        request.staff_list = self
            .staff
            .list_staff()
            .map_err(GenerationError::Aggregation)?;

        request.requests = match &input.requests {
            Some(requests) => requests.clone(),
            None => self
                .requests
                .list_requests()
                .map_err(GenerationError::Aggregation)?,
        };

        request.requirements = match &input.requirements {
            Some(requirements) => requirements.clone(),
            None => self
                .requirements
                .list_requirements()
                .map_err(GenerationError::Aggregation)?,
        };

        request.role_constraints = input
            .role_constraints
            .clone()
            .unwrap_or_else(|| default_roles.to_vec());

        // 规则无法满足时仍交给求解器，由其给出无解结论
        for (role, holders, required) in short_roles(&request.staff_list, &request.role_constraints) {
            warn!(
                role = %role,
                holders = holders,
                required = required,
                "具备该角色的员工少于规则要求人数"
            );
        }

        debug!(
            staff_count = request.staff_list.len(),
            request_count = request.requests.len(),
            requirement_count = request.requirements.len(),
            role_constraint_count = request.role_constraints.len(),
            "求解器输入组装完成"
        );

        Ok(request)
    }
}

/// 名册中具备角色的人数少于规则要求的 (角色, 具备人数, 要求人数)
fn short_roles<'a>(
    staff: &[Staff],
    constraints: &'a [RoleConstraint],
) -> Vec<(&'a str, usize, i64)> {
    constraints
        .iter()
        .filter_map(|c| {
            let holders = staff.iter().filter(|s| s.has_role(&c.role)).count();
            if (holders as i64) < c.count {
                Some((c.role.as_str(), holders, c.count))
            } else {
                None
            }
        })
        .collect()
}
