// ==========================================
// 排班生成系统 - 每日人手需求数据仓储
// ==========================================
// 约束: date 唯一，保存即按日期 UPSERT
// ==========================================

use crate::domain::staff::StaffingRequirement;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_date, parse_date_column};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// StaffingRequirementRepository - 人手需求仓储
// ==========================================
pub struct StaffingRequirementRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StaffingRequirementRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按日期 UPSERT（同日已存在则只更新人数）
    ///
    /// # 返回
    /// - Ok(StaffingRequirement): 库内最终记录（含 id）
    pub fn upsert(&self, requirement: &StaffingRequirement) -> RepositoryResult<StaffingRequirement> {
        let conn = self.get_conn()?;
        let date = format_date(requirement.date);

        conn.execute(
            r#"
            INSERT INTO staffing_requirement (date, morning_need, evening_need)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(date) DO UPDATE SET
                morning_need = excluded.morning_need,
                evening_need = excluded.evening_need
            "#,
            params![date, requirement.morning_need, requirement.evening_need],
        )?;

        let saved = conn.query_row(
            "SELECT id, date, morning_need, evening_need FROM staffing_requirement WHERE date = ?1",
            params![date],
            map_requirement_row,
        )?;
        Ok(saved)
    }

    /// 查询全部人手需求（按日期升序）
    pub fn find_all(&self) -> RepositoryResult<Vec<StaffingRequirement>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, date, morning_need, evening_need FROM staffing_requirement ORDER BY date ASC",
        )?;

        let list = stmt
            .query_map([], map_requirement_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(list)
    }

    /// 按 id 删除
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM staffing_requirement WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "StaffingRequirement".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn map_requirement_row(row: &Row<'_>) -> SqliteResult<StaffingRequirement> {
    Ok(StaffingRequirement {
        id: row.get(0)?,
        date: parse_date_column(1, &row.get::<_, String>(1)?)?,
        morning_need: row.get(2)?,
        evening_need: row.get(3)?,
    })
}
