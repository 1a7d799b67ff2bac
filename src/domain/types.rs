// ==========================================
// 排班生成系统 - 领域类型定义
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 请假类型 (Request Type)
// ==========================================
// 当前只有“不可出勤”一种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Unavailable, // 不可出勤
}

impl RequestType {
    /// 数据库存储值
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RequestType::Unavailable => "unavailable",
        }
    }

    /// 从数据库值解析；未知值返回 None
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "unavailable" => Some(RequestType::Unavailable),
            _ => None,
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 班次类型 (Shift Kind)
// ==========================================
// 0 = 当天不排班，不会被持久化
// 1 = 早班, 2 = 晚班, 其余正整数为扩展班次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftKind {
    Off,
    Early,
    Late,
    Other(i64),
}

impl ShiftKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ShiftKind::Off,
            1 => ShiftKind::Early,
            2 => ShiftKind::Late,
            n => ShiftKind::Other(n),
        }
    }

    /// 班次显示名（导出用）
    pub fn label(&self) -> String {
        match self {
            ShiftKind::Off => "休息".to_string(),
            ShiftKind::Early => "早班".to_string(),
            ShiftKind::Late => "晚班".to_string(),
            ShiftKind::Other(n) => format!("班次{}", n),
        }
    }

    /// 班次时间段（导出用，扩展班次无固定时间）
    pub fn time_range(&self) -> &'static str {
        match self {
            ShiftKind::Early => "09:00-18:00",
            ShiftKind::Late => "18:00-23:00",
            ShiftKind::Off | ShiftKind::Other(_) => "",
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 求解结果分类 (Solve Outcome)
// ==========================================
// 求解器自报的状态字符串归一化后的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveOutcome {
    Optimal,         // 最优解
    Feasible,        // 可行解
    Infeasible,      // 无可行解
    Unknown(String), // 无法识别（保留原始值）
}

impl SolveOutcome {
    /// 归一化状态字符串（去空白 + 大小写折叠）
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "optimal" => SolveOutcome::Optimal,
            "feasible" => SolveOutcome::Feasible,
            "infeasible" => SolveOutcome::Infeasible,
            _ => SolveOutcome::Unknown(token.to_string()),
        }
    }

    /// 是否存在可用解
    pub fn is_accepted(&self) -> bool {
        matches!(self, SolveOutcome::Optimal | SolveOutcome::Feasible)
    }
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveOutcome::Optimal => write!(f, "OPTIMAL"),
            SolveOutcome::Feasible => write!(f, "FEASIBLE"),
            SolveOutcome::Infeasible => write!(f, "INFEASIBLE"),
            SolveOutcome::Unknown(raw) => write!(f, "UNKNOWN({})", raw),
        }
    }
}

// ==========================================
// 生成运行状态 (Generation Run Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Running,       // 执行中
    Succeeded,     // 成功
    Failed,        // 失败（窗口未变动）
    WindowCleared, // 失败且旧排班已删除、新排班未写入
}

impl RunStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "RUNNING",
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
            RunStatus::WindowCleared => "WINDOW_CLEARED",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "SUCCEEDED" => RunStatus::Succeeded,
            "FAILED" => RunStatus::Failed,
            "WINDOW_CLEARED" => RunStatus::WindowCleared,
            _ => RunStatus::Running,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
