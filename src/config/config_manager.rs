// ==========================================
// 排班生成系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::domain::generation::{RoleConstraint, DEFAULT_HORIZON_DAYS};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 求解器进程
    pub const SOLVER_PROGRAM: &str = "solver.program";
    pub const SOLVER_ARGS: &str = "solver.args"; // JSON 数组
    pub const SOLVER_TIMEOUT_SECS: &str = "solver.timeout_secs"; // 0 = 不超时

    // 生成
    pub const DEFAULT_DAYS: &str = "generation.default_days";
    pub const ROLE_CONSTRAINTS: &str = "generation.role_constraints"; // JSON 数组
}

/// 缺省求解器程序
pub const DEFAULT_SOLVER_PROGRAM: &str = "python";
/// 缺省求解器参数
pub const DEFAULT_SOLVER_ARGS: &[&str] = &["engine/main.py"];
/// 缺省求解器超时（秒）
pub const DEFAULT_SOLVER_TIMEOUT_SECS: u64 = 120;

// ==========================================
// SolverConfig - 外部求解器进程配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub program: String,
    pub args: Vec<String>,
    /// None 表示无限等待
    pub timeout: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_SOLVER_PROGRAM.to_string(),
            args: DEFAULT_SOLVER_ARGS.iter().map(|s| s.to_string()).collect(),
            timeout: Some(Duration::from_secs(DEFAULT_SOLVER_TIMEOUT_SECS)),
        }
    }
}

// ==========================================
// GenerationConfig - 生成流程配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub default_days: u32,
    pub role_constraints: Vec<RoleConstraint>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_days: DEFAULT_HORIZON_DAYS,
            role_constraints: Vec::new(),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO config_kv (key, value) VALUES (?1, ?2)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')"#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 全部配置（按键排序）
    pub fn list_all(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn get_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self.get_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    // ===== 求解器配置 =====

    /// 读取求解器进程配置；格式错误的值回退到缺省值并告警
    pub fn solver_config(&self) -> RepositoryResult<SolverConfig> {
        let defaults = SolverConfig::default();

        let program = self.get_or_default(config_keys::SOLVER_PROGRAM, &defaults.program)?;

        let args = match self.get_value(config_keys::SOLVER_ARGS)? {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|_| {
                tracing::warn!(
                    config_key = config_keys::SOLVER_ARGS,
                    raw_value = %raw,
                    "求解器参数配置格式错误（应为 JSON 字符串数组），使用缺省值"
                );
                defaults.args.clone()
            }),
            None => defaults.args.clone(),
        };

        let timeout_secs = match self.get_value(config_keys::SOLVER_TIMEOUT_SECS)? {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                tracing::warn!(
                    config_key = config_keys::SOLVER_TIMEOUT_SECS,
                    raw_value = %raw,
                    "求解器超时配置格式错误，使用缺省值"
                );
                DEFAULT_SOLVER_TIMEOUT_SECS
            }),
            None => DEFAULT_SOLVER_TIMEOUT_SECS,
        };

        Ok(SolverConfig {
            program,
            args,
            timeout: if timeout_secs == 0 {
                None
            } else {
                Some(Duration::from_secs(timeout_secs))
            },
        })
    }

    // ===== 生成配置 =====

    pub fn generation_config(&self) -> RepositoryResult<GenerationConfig> {
        let default_days = match self.get_value(config_keys::DEFAULT_DAYS)? {
            Some(raw) => raw.trim().parse::<u32>().unwrap_or(DEFAULT_HORIZON_DAYS),
            None => DEFAULT_HORIZON_DAYS,
        };

        let role_constraints = match self.get_value(config_keys::ROLE_CONSTRAINTS)? {
            Some(raw) => serde_json::from_str::<Vec<RoleConstraint>>(&raw).unwrap_or_else(|_| {
                tracing::warn!(
                    config_key = config_keys::ROLE_CONSTRAINTS,
                    raw_value = %raw,
                    "角色人数规则配置格式错误，忽略"
                );
                Vec::new()
            }),
            None => Vec::new(),
        };

        Ok(GenerationConfig {
            default_days,
            role_constraints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_缺省配置() {
        let config = setup();
        assert_eq!(config.solver_config().unwrap(), SolverConfig::default());
        assert_eq!(config.generation_config().unwrap(), GenerationConfig::default());
    }

    #[test]
    fn test_覆写配置() {
        let config = setup();
        config.set_value(config_keys::SOLVER_PROGRAM, "python3").unwrap();
        config
            .set_value(config_keys::SOLVER_ARGS, r#"["-X", "utf8", "solver.py"]"#)
            .unwrap();
        config.set_value(config_keys::SOLVER_TIMEOUT_SECS, "0").unwrap();
        config.set_value(config_keys::DEFAULT_DAYS, "14").unwrap();
        config
            .set_value(config_keys::ROLE_CONSTRAINTS, r#"[{"role": "Leader", "count": 1}]"#)
            .unwrap();

        let solver = config.solver_config().unwrap();
        assert_eq!(solver.program, "python3");
        assert_eq!(solver.args, vec!["-X", "utf8", "solver.py"]);
        assert_eq!(solver.timeout, None);

        let generation = config.generation_config().unwrap();
        assert_eq!(generation.default_days, 14);
        assert_eq!(generation.role_constraints[0].role, "Leader");

        assert_eq!(config.list_all().unwrap().len(), 5);
    }

    #[test]
    fn test_格式错误回退缺省值() {
        let config = setup();
        config.set_value(config_keys::SOLVER_ARGS, "solver.py").unwrap();
        config.set_value(config_keys::SOLVER_TIMEOUT_SECS, "abc").unwrap();

        let solver = config.solver_config().unwrap();
        assert_eq!(solver.args, SolverConfig::default().args);
        assert_eq!(
            solver.timeout,
            Some(Duration::from_secs(DEFAULT_SOLVER_TIMEOUT_SECS))
        );
    }
}
