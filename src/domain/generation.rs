// ==========================================
// 排班生成系统 - 生成请求/求解结果领域模型
// ==========================================
// 说明: GenerationRequest / SolverResult 只存在于一次生成调用期间，不持久化
// 对齐: 求解器进程 stdin / stdout 的 JSON 文档（字段名即契约）
// ==========================================

use crate::domain::staff::{LeaveRequest, Staff, StaffingRequirement};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 求解器输入文档版本（requirements 采用 {date, morning_need, evening_need} 形状）
pub const REQUEST_SCHEMA_VERSION: u32 = 1;

/// 未指定或为 0 时使用的排班天数
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// 单次生成允许的最大天数
pub const MAX_HORIZON_DAYS: u32 = 366;

// ==========================================
// RoleConstraint - 角色人数规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleConstraint {
    pub role: String,
    pub count: i64,
}

// ==========================================
// GenerationRequest - 求解器输入
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub schema_version: u32,
    pub staff_list: Vec<Staff>,
    pub requests: Vec<LeaveRequest>,
    #[serde(default)]
    pub role_constraints: Vec<RoleConstraint>,
    pub requirements: Vec<StaffingRequirement>,
    pub days: u32,
    pub start_date: NaiveDate,
}

impl GenerationRequest {
    /// 以窗口为骨架创建空请求，其余字段由聚合器填充
    pub fn for_window(window: &ScheduleWindow) -> Self {
        Self {
            schema_version: REQUEST_SCHEMA_VERSION,
            staff_list: Vec::new(),
            requests: Vec::new(),
            role_constraints: Vec::new(),
            requirements: Vec::new(),
            days: window.days(),
            start_date: window.start(),
        }
    }
}

// ==========================================
// GenerationInput - 生成调用入参
// ==========================================
// 对齐: 生成命令的 JSON body
// requests / requirements / role_constraints 提供时覆盖库内数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationInput {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub requests: Option<Vec<LeaveRequest>>,
    #[serde(default)]
    pub requirements: Option<Vec<StaffingRequirement>>,
    #[serde(default)]
    pub role_constraints: Option<Vec<RoleConstraint>>,
}

impl GenerationInput {
    pub fn new(start_date: impl Into<String>, days: Option<u32>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            days,
            ..Default::default()
        }
    }
}

// ==========================================
// SolverResult - 求解器输出
// ==========================================
// schedule: staff_id -> 每个日偏移一个班次编码（0 = 不排班）
// JSON 对象的键为字符串，反序列化时解析为整数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub status: String,
    #[serde(default)]
    pub schedule: BTreeMap<i64, Vec<i64>>,
}

// ==========================================
// ScheduleWindow - 替换窗口
// ==========================================
// 闭区间 [start, start + days - 1]
// 物化与删除必须使用同一个窗口值，天数缺省规则只在构造时应用一次
// 只能经 new 构造，end 在构造时算好，之后的日期运算不会溢出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ScheduleWindow {
    start: NaiveDate,
    days: u32,
    end: NaiveDate,
}

impl ScheduleWindow {
    /// 创建窗口；days 缺省或为 0 时取 default_days（default_days 本身为 0 时退回 30）
    ///
    /// # 返回
    /// - None: 天数超过 MAX_HORIZON_DAYS，或结束日期超出日历范围
    pub fn new(start: NaiveDate, days: Option<u32>, default_days: u32) -> Option<Self> {
        let days = Self::effective_days(days, default_days);
        if days > MAX_HORIZON_DAYS {
            return None;
        }
        let end = start.checked_add_signed(Duration::days(i64::from(days) - 1))?;
        Some(Self { start, days, end })
    }

    /// 应用缺省规则后的天数
    pub fn effective_days(days: Option<u32>, default_days: u32) -> u32 {
        let fallback = if default_days == 0 {
            DEFAULT_HORIZON_DAYS
        } else {
            default_days
        };
        match days {
            Some(d) if d > 0 => d,
            _ => fallback,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// 窗口最后一天（含）
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 日偏移对应的日历日期；偏移超出窗口时为 None
    pub fn date_at(&self, offset: usize) -> Option<NaiveDate> {
        if offset >= self.days as usize {
            return None;
        }
        self.start.checked_add_signed(Duration::days(offset as i64))
    }

    /// 两个窗口是否有交集
    pub fn overlaps(&self, other: &ScheduleWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl std::fmt::Display for ScheduleWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end())
    }
}

// ==========================================
// GenerationReport - 生成结果摘要
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub days: u32,
    pub solver_status: String,
    pub deleted: usize,
    pub inserted: usize,
}
