// ==========================================
// 排班生成系统 - 生成运行记录仓储
// ==========================================
// 职责: 记录每次排班生成的窗口、结果与失败阶段（审计追踪）
// 说明: 写入方以 best-effort 方式调用，失败不影响主流程结果
// ==========================================

use crate::domain::types::RunStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_date, parse_date_column};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRunEntity {
    pub run_id: String,
    pub started_at: NaiveDateTime,
    pub finished_at: Option<NaiveDateTime>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub days: u32,
    pub solver: String,
    pub status: RunStatus,
    pub failed_stage: Option<String>,
    pub message: Option<String>,
    pub inserted_count: usize,
}

pub struct GenerationRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GenerationRunRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 记录运行开始
    pub fn insert(&self, run: &GenerationRunEntity) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO generation_run (
                run_id, started_at, finished_at, window_start, window_end, days,
                solver, status, failed_stage, message, inserted_count
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                run.run_id,
                run.started_at.format(TS_FORMAT).to_string(),
                run.finished_at.map(|t| t.format(TS_FORMAT).to_string()),
                format_date(run.window_start),
                format_date(run.window_end),
                run.days,
                run.solver,
                run.status.to_db_str(),
                run.failed_stage,
                run.message,
                run.inserted_count as i64,
            ],
        )?;
        Ok(())
    }

    /// 记录运行结束
    pub fn finish(
        &self,
        run_id: &str,
        finished_at: NaiveDateTime,
        status: RunStatus,
        failed_stage: Option<&str>,
        message: Option<&str>,
        inserted_count: usize,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE generation_run
            SET finished_at = ?2, status = ?3, failed_stage = ?4, message = ?5, inserted_count = ?6
            WHERE run_id = ?1
            "#,
            params![
                run_id,
                finished_at.format(TS_FORMAT).to_string(),
                status.to_db_str(),
                failed_stage,
                message,
                inserted_count as i64,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "GenerationRun".to_string(),
                id: run_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<Option<GenerationRunEntity>> {
        let conn = self.get_conn()?;
        let run = conn
            .query_row(
                r#"
                SELECT run_id, started_at, finished_at, window_start, window_end, days,
                       solver, status, failed_stage, message, inserted_count
                FROM generation_run WHERE run_id = ?1
                "#,
                params![run_id],
                map_run_row,
            )
            .optional()?;
        Ok(run)
    }

    /// 最近的运行记录（开始时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<GenerationRunEntity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, started_at, finished_at, window_start, window_end, days,
                   solver, status, failed_stage, message, inserted_count
            FROM generation_run
            ORDER BY started_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;
        let list = stmt
            .query_map(params![limit as i64], map_run_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(list)
    }
}

fn parse_ts(idx: usize, raw: &str) -> SqliteResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn map_run_row(row: &Row<'_>) -> SqliteResult<GenerationRunEntity> {
    let finished_at = match row.get::<_, Option<String>>(2)? {
        Some(raw) => Some(parse_ts(2, &raw)?),
        None => None,
    };
    Ok(GenerationRunEntity {
        run_id: row.get(0)?,
        started_at: parse_ts(1, &row.get::<_, String>(1)?)?,
        finished_at,
        window_start: parse_date_column(3, &row.get::<_, String>(3)?)?,
        window_end: parse_date_column(4, &row.get::<_, String>(4)?)?,
        days: row.get(5)?,
        solver: row.get(6)?,
        status: RunStatus::from_db_str(&row.get::<_, String>(7)?),
        failed_stage: row.get(8)?,
        message: row.get(9)?,
        inserted_count: row.get::<_, i64>(10)? as usize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_insert_and_finish() {
        let repo = GenerationRunRepository::new(setup_test_db());
        let now = Local::now().naive_local();

        repo.insert(&GenerationRunEntity {
            run_id: "run-1".to_string(),
            started_at: now,
            finished_at: None,
            window_start: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            window_end: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
            days: 3,
            solver: "process".to_string(),
            status: RunStatus::Running,
            failed_stage: None,
            message: None,
            inserted_count: 0,
        })
        .unwrap();

        repo.finish("run-1", now, RunStatus::WindowCleared, Some("commit"), Some("写入失败"), 0)
            .unwrap();

        let run = repo.find_by_id("run-1").unwrap().unwrap();
        assert_eq!(run.status, RunStatus::WindowCleared);
        assert_eq!(run.failed_stage.as_deref(), Some("commit"));
        assert!(run.finished_at.is_some());

        assert_eq!(repo.list_recent(10).unwrap().len(), 1);
        assert!(matches!(
            repo.finish("missing", now, RunStatus::Failed, None, None, 0),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
