// ==========================================
// 排班生成系统 - 员工与排班输入领域模型
// ==========================================
// 包含: 员工、请假申请、每日人手需求
// 红线: 不含数据访问逻辑
// ==========================================

use crate::domain::types::RequestType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Staff - 员工
// ==========================================
// 对齐: staff 表 / 求解器输入 staff_list 元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub name: String,      // 显示名（可含非 ASCII 字符）
    pub is_leader: bool,   // 是否为负责人
    pub hourly_wage: i64,  // 时薪
    pub roles: String,     // 角色标签，逗号分隔，例如 "Kitchen,Hall"
}

impl Staff {
    /// 拆分角色标签（去空白、去空项）
    pub fn role_tags(&self) -> Vec<&str> {
        self.roles
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// 是否具备指定角色（负责人标记视同 "Leader" 角色）
    pub fn has_role(&self, role: &str) -> bool {
        if self.is_leader && role.eq_ignore_ascii_case("leader") {
            return true;
        }
        self.role_tags().iter().any(|r| *r == role)
    }
}

/// 新建员工参数（id 由存储分配）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaff {
    pub name: String,
    #[serde(default)]
    pub is_leader: bool,
    #[serde(default)]
    pub hourly_wage: i64,
    #[serde(default)]
    pub roles: String,
}

// ==========================================
// LeaveRequest - 请假申请
// ==========================================
// 对齐: leave_request 表 / 求解器输入 requests 元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    #[serde(default)]
    pub id: i64,
    pub staff_id: i64,
    pub date: NaiveDate,
    #[serde(rename = "type", default = "default_request_type")]
    pub request_type: RequestType,
}

fn default_request_type() -> RequestType {
    RequestType::Unavailable
}

// ==========================================
// StaffingRequirement - 每日人手需求
// ==========================================
// 对齐: staffing_requirement 表（date 唯一）
// 形状: {date, morning_need, evening_need}，版本见 REQUEST_SCHEMA_VERSION
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffingRequirement {
    #[serde(default)]
    pub id: i64,
    pub date: NaiveDate,
    pub morning_need: i64, // 早班最少人数
    pub evening_need: i64, // 晚班最少人数
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(roles: &str, is_leader: bool) -> Staff {
        Staff {
            id: 1,
            name: "佐藤".to_string(),
            is_leader,
            hourly_wage: 1200,
            roles: roles.to_string(),
        }
    }

    #[test]
    fn test_role_tags_拆分() {
        let s = staff(" Kitchen, Hall ,,", false);
        assert_eq!(s.role_tags(), vec!["Kitchen", "Hall"]);
        assert!(s.has_role("Hall"));
        assert!(!s.has_role("Leader"));
    }

    #[test]
    fn test_负责人视同leader角色() {
        let s = staff("", true);
        assert!(s.has_role("Leader"));
    }

    #[test]
    fn test_leave_request_缺省类型() {
        let req: LeaveRequest =
            serde_json::from_str(r#"{"staff_id": 3, "date": "2026-02-10"}"#).unwrap();
        assert_eq!(req.id, 0);
        assert_eq!(req.request_type, RequestType::Unavailable);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["type"], "unavailable");
        assert_eq!(json["date"], "2026-02-10");
    }
}
