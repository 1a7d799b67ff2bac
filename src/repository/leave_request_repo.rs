// ==========================================
// 排班生成系统 - 请假申请数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::staff::LeaveRequest;
use crate::domain::types::RequestType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_date, parse_date_column};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// LeaveRequestRepository - 请假申请仓储
// ==========================================
pub struct LeaveRequestRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LeaveRequestRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增请假申请，返回带 id 的记录
    pub fn insert(&self, request: &LeaveRequest) -> RepositoryResult<LeaveRequest> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO leave_request (staff_id, date, request_type) VALUES (?1, ?2, ?3)",
            params![
                request.staff_id,
                format_date(request.date),
                request.request_type.to_db_str(),
            ],
        )?;

        Ok(LeaveRequest {
            id: conn.last_insert_rowid(),
            ..request.clone()
        })
    }

    /// 查询全部请假申请（按日期、员工排序）
    pub fn find_all(&self) -> RepositoryResult<Vec<LeaveRequest>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, staff_id, date, request_type FROM leave_request ORDER BY date ASC, staff_id ASC",
        )?;

        let list = stmt
            .query_map([], map_request_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(list)
    }

    /// 删除请假申请
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM leave_request WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "LeaveRequest".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn map_request_row(row: &Row<'_>) -> SqliteResult<LeaveRequest> {
    Ok(LeaveRequest {
        id: row.get(0)?,
        staff_id: row.get(1)?,
        date: parse_date_column(2, &row.get::<_, String>(2)?)?,
        request_type: parse_request_type(&row.get::<_, String>(3)?)?,
    })
}

fn parse_request_type(raw: &str) -> SqliteResult<RequestType> {
    RequestType::from_db_str(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("未知的请假类型: {}", raw).into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn setup() -> (Arc<Mutex<Connection>>, i64) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        conn.execute("INSERT INTO staff (name) VALUES ('鈴木')", []).unwrap();
        let staff_id = conn.last_insert_rowid();
        (Arc::new(Mutex::new(conn)), staff_id)
    }

    #[test]
    fn test_insert_find_delete() {
        let (conn, staff_id) = setup();
        let repo = LeaveRequestRepository::new(conn);

        let saved = repo
            .insert(&LeaveRequest {
                id: 0,
                staff_id,
                date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
                request_type: RequestType::Unavailable,
            })
            .unwrap();
        assert!(saved.id > 0);

        let all = repo.find_all().unwrap();
        assert_eq!(all, vec![saved.clone()]);

        repo.delete(saved.id).unwrap();
        assert!(repo.find_all().unwrap().is_empty());
        assert!(matches!(
            repo.delete(saved.id),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_find_all_未知请假类型报错() {
        let (conn, staff_id) = setup();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO leave_request (staff_id, date, request_type) VALUES (?1, '2026-02-10', 'holiday')",
                params![staff_id],
            )
            .unwrap();
        let repo = LeaveRequestRepository::new(conn);

        match repo.find_all().unwrap_err() {
            RepositoryError::FieldValueError { message, .. } => assert!(message.contains("holiday")),
            other => panic!("Expected FieldValueError, got {:?}", other),
        }
    }

    #[test]
    fn test_insert_员工不存在触发外键错误() {
        let (conn, _) = setup();
        let repo = LeaveRequestRepository::new(conn);

        let err = repo
            .insert(&LeaveRequest {
                id: 0,
                staff_id: 404,
                date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
                request_type: RequestType::Unavailable,
            })
            .unwrap_err();
        assert!(matches!(err, RepositoryError::ForeignKeyViolation(_)));
    }
}
