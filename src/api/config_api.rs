// ==========================================
// 排班生成系统 - 配置管理 API
// ==========================================
// 职责: 配置查询、更新（已知键写入前校验格式）
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::config_keys;
use crate::config::ConfigManager;
use crate::domain::generation::{RoleConstraint, MAX_HORIZON_DAYS};

pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询所有配置
    pub fn list_configs(&self) -> ApiResult<BTreeMap<String, String>> {
        Ok(self.config_manager.list_all()?)
    }

    /// 查询单个配置
    pub fn get_config(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.config_manager.get_value(key)?)
    }

    /// 更新配置
    ///
    /// # 返回
    /// - Err(InvalidInput): 键为空，或已知键的值格式错误
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ApiError::InvalidInput("配置键不能为空".to_string()));
        }
        validate_value(key, value)?;

        self.config_manager.set_value(key, value)?;
        info!(config_key = key, value = value, "更新配置");
        Ok(())
    }
}

fn validate_value(key: &str, value: &str) -> ApiResult<()> {
    let invalid = |reason: String| ApiError::InvalidInput(format!("配置 {} 的值无效: {}", key, reason));

    match key {
        config_keys::SOLVER_PROGRAM => {
            if value.trim().is_empty() {
                return Err(invalid("求解器程序不能为空".to_string()));
            }
        }
        config_keys::SOLVER_ARGS => {
            serde_json::from_str::<Vec<String>>(value).map_err(|e| invalid(e.to_string()))?;
        }
        config_keys::SOLVER_TIMEOUT_SECS => {
            value
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        config_keys::DEFAULT_DAYS => {
            let days = value
                .trim()
                .parse::<u32>()
                .map_err(|e| invalid(e.to_string()))?;
            if days == 0 || days > MAX_HORIZON_DAYS {
                return Err(invalid(format!("天数必须在 1..={} 之间", MAX_HORIZON_DAYS)));
            }
        }
        config_keys::ROLE_CONSTRAINTS => {
            serde_json::from_str::<Vec<RoleConstraint>>(value).map_err(|e| invalid(e.to_string()))?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_value() {
        assert!(validate_value(config_keys::SOLVER_ARGS, r#"["solver.py", "--fast"]"#).is_ok());
        assert!(validate_value(config_keys::SOLVER_ARGS, "solver.py").is_err());
        assert!(validate_value(config_keys::SOLVER_TIMEOUT_SECS, "0").is_ok());
        assert!(validate_value(config_keys::SOLVER_TIMEOUT_SECS, "-1").is_err());
        assert!(validate_value(config_keys::DEFAULT_DAYS, "0").is_err());
        assert!(validate_value(config_keys::DEFAULT_DAYS, "366").is_ok());
        assert!(validate_value(config_keys::DEFAULT_DAYS, "367").is_err());
        assert!(validate_value(config_keys::ROLE_CONSTRAINTS, r#"[{"role": "Kitchen", "count": 1}]"#).is_ok());
        assert!(validate_value("ui.theme", "anything").is_ok());
    }
}
