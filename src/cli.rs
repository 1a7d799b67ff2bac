// ==========================================
// 排班生成系统 - 命令行定义
// ==========================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// 排班生成系统命令行
#[derive(Parser, Debug)]
#[command(name = "shift-scheduler")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// 数据库文件路径（缺省: SHIFT_SCHEDULER_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// 日志输出为 JSON 格式
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 初始化数据库（建表）
    Init,

    /// 员工管理
    #[command(subcommand)]
    Staff(StaffCommand),

    /// 请假申请管理
    #[command(subcommand)]
    Request(RequestCommand),

    /// 每日人手需求管理
    #[command(subcommand)]
    Requirement(RequirementCommand),

    /// 生成排班并替换窗口内的既有排班
    Generate(GenerateArgs),

    /// 查询最近的生成运行记录
    Runs {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// 排班查询、调整与导出
    #[command(subcommand)]
    Shifts(ShiftsCommand),

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum StaffCommand {
    /// 新建员工
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        leader: bool,
        #[arg(long, default_value_t = 0)]
        wage: i64,
        /// 逗号分隔的角色标签
        #[arg(long, default_value = "")]
        roles: String,
    },
    /// 员工列表
    List,
    /// 删除员工（级联删除其排班与请假）
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// 登记不可出勤日
    Add {
        #[arg(long)]
        staff_id: i64,
        #[arg(long)]
        date: String,
    },
    List,
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum RequirementCommand {
    /// 保存某日人手需求（同日覆盖）
    Set {
        #[arg(long)]
        date: String,
        #[arg(long)]
        morning: i64,
        #[arg(long)]
        evening: i64,
    },
    List,
    Delete { id: i64 },
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// 开始日期 (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// 排班天数（缺省或 0 时取配置 generation.default_days）
    #[arg(long)]
    pub days: Option<u32>,

    /// JSON 请求体文件（命令行参数优先）
    #[arg(long)]
    pub body: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ShiftsCommand {
    /// 排班列表（可按闭区间过滤）
    List {
        #[arg(long, requires = "end")]
        start: Option<String>,
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
    /// 移动排班日期
    Move {
        id: i64,
        #[arg(long)]
        date: String,
        #[arg(long)]
        shift_type: Option<i64>,
    },
    /// 删除排班
    Delete { id: i64 },
    /// 导出 CSV
    Export {
        /// 输出文件（缺省写到标准输出）
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    List,
    Get { key: String },
    Set { key: String, value: String },
}
