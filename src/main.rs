// ==========================================
// 排班生成系统 - 命令行主入口
// ==========================================

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde_json::json;
use std::io::Write;

use shift_scheduler::app::{commands, get_default_db_path, AppState};
use shift_scheduler::cli::{
    Cli, Commands, ConfigCommand, GenerateArgs, RequestCommand, RequirementCommand,
    ShiftsCommand, StaffCommand,
};
use shift_scheduler::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json_logs);

    let db_path = match &cli.db {
        Some(path) => path.to_string_lossy().to_string(),
        None => get_default_db_path(),
    };
    tracing::info!(version = shift_scheduler::VERSION, db_path = %db_path, "{}", shift_scheduler::APP_NAME);

    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;
    run(&state, cli.command)
}

fn run(state: &AppState, command: Commands) -> Result<()> {
    let output = match command {
        Commands::Init => Ok(json!({ "message": "数据库已初始化", "db_path": state.db_path }).to_string()),

        Commands::Staff(cmd) => match cmd {
            StaffCommand::Add {
                name,
                leader,
                wage,
                roles,
            } => {
                let body = json!({
                    "name": name,
                    "is_leader": leader,
                    "hourly_wage": wage,
                    "roles": roles,
                });
                commands::create_staff(state, &body.to_string())
            }
            StaffCommand::List => commands::list_staff(state),
            StaffCommand::Delete { id } => commands::delete_staff(state, id),
        },

        Commands::Request(cmd) => match cmd {
            RequestCommand::Add { staff_id, date } => {
                commands::create_leave_request(state, staff_id, &date)
            }
            RequestCommand::List => commands::list_leave_requests(state),
            RequestCommand::Delete { id } => commands::delete_leave_request(state, id),
        },

        Commands::Requirement(cmd) => match cmd {
            RequirementCommand::Set {
                date,
                morning,
                evening,
            } => commands::save_requirement(state, &date, morning, evening),
            RequirementCommand::List => commands::list_requirements(state),
            RequirementCommand::Delete { id } => commands::delete_requirement(state, id),
        },

        Commands::Generate(args) => {
            let body = generation_body(&args)?;
            commands::generate_schedule(state, &body)
        }

        Commands::Runs { limit } => commands::list_generation_runs(state, limit),

        Commands::Shifts(cmd) => match cmd {
            ShiftsCommand::List { start, end } => {
                commands::list_shifts(state, start.as_deref(), end.as_deref())
            }
            ShiftsCommand::Move {
                id,
                date,
                shift_type,
            } => {
                let body = json!({ "date": date, "shift_type": shift_type });
                commands::move_shift(state, id, &body.to_string())
            }
            ShiftsCommand::Delete { id } => commands::delete_shift(state, id),
            ShiftsCommand::Export { output } => {
                let bytes = commands::export_shifts_csv(state).map_err(|e| anyhow!(e))?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, &bytes)
                            .with_context(|| format!("写入导出文件失败: {}", path.display()))?;
                        println!("{}", json!({ "message": "已导出", "path": path }));
                    }
                    None => std::io::stdout().write_all(&bytes)?,
                }
                return Ok(());
            }
        },

        Commands::Config(cmd) => match cmd {
            ConfigCommand::List => commands::list_configs(state),
            ConfigCommand::Get { key } => commands::get_config(state, &key),
            ConfigCommand::Set { key, value } => commands::set_config(state, &key, &value),
        },
    };

    match output {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(err) => Err(anyhow!(err)),
    }
}

/// 组装生成请求体：先读 --body 文件，再用命令行参数覆盖
fn generation_body(args: &GenerateArgs) -> Result<String> {
    let mut body = match &args.body {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("读取请求体文件失败: {}", path.display()))?;
            serde_json::from_str::<serde_json::Value>(&raw)
                .with_context(|| format!("请求体不是合法 JSON: {}", path.display()))?
        }
        None => json!({}),
    };

    let obj = body
        .as_object_mut()
        .ok_or_else(|| anyhow!("请求体必须是 JSON 对象"))?;
    if let Some(start_date) = &args.start_date {
        obj.insert("start_date".to_string(), json!(start_date));
    }
    if let Some(days) = args.days {
        obj.insert("days".to_string(), json!(days));
    }

    Ok(body.to_string())
}
