// ==========================================
// 排班生成系统 - 员工数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 删除员工依赖外键级联清理其排班与请假记录（需开启 foreign_keys）
// ==========================================

use crate::domain::staff::{NewStaff, Staff};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// StaffRepository - 员工仓储
// ==========================================
pub struct StaffRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StaffRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建员工
    ///
    /// # 返回
    /// - Ok(Staff): 带存储分配 id 的员工
    pub fn insert(&self, staff: &NewStaff) -> RepositoryResult<Staff> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO staff (name, is_leader, hourly_wage, roles) VALUES (?1, ?2, ?3, ?4)",
            params![
                staff.name,
                if staff.is_leader { 1 } else { 0 },
                staff.hourly_wage,
                staff.roles,
            ],
        )?;

        Ok(Staff {
            id: conn.last_insert_rowid(),
            name: staff.name.clone(),
            is_leader: staff.is_leader,
            hourly_wage: staff.hourly_wage,
            roles: staff.roles.clone(),
        })
    }

    /// 查询全部员工（按 id 升序）
    pub fn find_all(&self) -> RepositoryResult<Vec<Staff>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, is_leader, hourly_wage, roles FROM staff ORDER BY id ASC",
        )?;

        let list = stmt
            .query_map([], map_staff_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(list)
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Staff>> {
        let conn = self.get_conn()?;
        let staff = conn
            .query_row(
                "SELECT id, name, is_leader, hourly_wage, roles FROM staff WHERE id = ?1",
                params![id],
                map_staff_row,
            )
            .optional()?;
        Ok(staff)
    }

    /// 删除员工
    ///
    /// # 返回
    /// - Err(NotFound): 员工不存在
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM staff WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Staff".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn map_staff_row(row: &Row<'_>) -> SqliteResult<Staff> {
    Ok(Staff {
        id: row.get(0)?,
        name: row.get(1)?,
        is_leader: row.get::<_, i64>(2)? != 0,
        hourly_wage: row.get(3)?,
        roles: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn new_staff(name: &str) -> NewStaff {
        NewStaff {
            name: name.to_string(),
            is_leader: false,
            hourly_wage: 1100,
            roles: "Kitchen".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find_all() {
        let repo = StaffRepository::new(setup_test_db());

        let a = repo.insert(&new_staff("田中")).unwrap();
        let b = repo.insert(&new_staff("Müller")).unwrap();
        assert!(b.id > a.id);

        let all = repo.find_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "田中");
        assert_eq!(all[1].name, "Müller");
    }

    #[test]
    fn test_delete_级联删除排班() {
        let conn = setup_test_db();
        let repo = StaffRepository::new(conn.clone());
        let s = repo.insert(&new_staff("田中")).unwrap();

        {
            let c = conn.lock().unwrap();
            c.execute(
                "INSERT INTO shift_assignment (staff_id, date, shift_type) VALUES (?1, '2026-02-01', 1)",
                params![s.id],
            )
            .unwrap();
            c.execute(
                "INSERT INTO leave_request (staff_id, date, request_type) VALUES (?1, '2026-02-02', 'unavailable')",
                params![s.id],
            )
            .unwrap();
        }

        repo.delete(s.id).unwrap();

        let c = conn.lock().unwrap();
        let shifts: i64 = c
            .query_row("SELECT COUNT(*) FROM shift_assignment", [], |r| r.get(0))
            .unwrap();
        let requests: i64 = c
            .query_row("SELECT COUNT(*) FROM leave_request", [], |r| r.get(0))
            .unwrap();
        assert_eq!(shifts, 0);
        assert_eq!(requests, 0);
    }

    #[test]
    fn test_delete_不存在() {
        let repo = StaffRepository::new(setup_test_db());
        let err = repo.delete(99).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
