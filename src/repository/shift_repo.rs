// ==========================================
// 排班生成系统 - 排班数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明:
// - date 存为 YYYY-MM-DD 文本，BETWEEN 即闭区间日期比较
// - replace_range 在单个事务内完成“删除窗口 + 写入新排班”
// ==========================================

use crate::domain::shift::ShiftAssignment;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{format_date, parse_date_column};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row, Transaction};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// 窗口替换结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceOutcome {
    pub deleted: usize,
    pub inserted: usize,
}

/// 窗口替换失败（区分失败发生在哪一步）
#[derive(Error, Debug)]
pub enum ReplaceError {
    /// 删除旧排班失败，新排班未写入
    #[error("删除窗口内既有排班失败: {0}")]
    Delete(#[source] RepositoryError),

    /// 写入新排班失败
    /// - rolled_back = true: 删除已随事务回滚，窗口保持原状
    /// - rolled_back = false: 删除已生效，窗口被清空
    #[error("写入新排班失败 (rolled_back={rolled_back}): {source}")]
    Insert {
        #[source]
        source: RepositoryError,
        rolled_back: bool,
    },
}

// ==========================================
// ShiftAssignmentRepository - 排班仓储
// ==========================================
pub struct ShiftAssignmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShiftAssignmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 查询全部排班（按日期、员工排序）
    pub fn find_all(&self) -> RepositoryResult<Vec<ShiftAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, staff_id, date, shift_type
               FROM shift_assignment
               ORDER BY date ASC, staff_id ASC, id ASC"#,
        )?;

        let list = stmt
            .query_map([], map_shift_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(list)
    }

    /// 查询闭区间 [start, end] 内的排班
    pub fn find_by_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<ShiftAssignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, staff_id, date, shift_type
               FROM shift_assignment
               WHERE date BETWEEN ?1 AND ?2
               ORDER BY date ASC, staff_id ASC, id ASC"#,
        )?;

        let list = stmt
            .query_map(params![format_date(start), format_date(end)], map_shift_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(list)
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ShiftAssignment>> {
        let conn = self.get_conn()?;
        let shift = conn
            .query_row(
                "SELECT id, staff_id, date, shift_type FROM shift_assignment WHERE id = ?1",
                params![id],
                map_shift_row,
            )
            .optional()?;
        Ok(shift)
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 删除闭区间 [start, end] 内的排班，返回删除行数
    pub fn delete_range(&self, start: NaiveDate, end: NaiveDate) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM shift_assignment WHERE date BETWEEN ?1 AND ?2",
            params![format_date(start), format_date(end)],
        )?;
        Ok(rows)
    }

    /// 批量插入排班（事务内完成，任一失败整体回滚）
    pub fn batch_insert(&self, items: &[ShiftAssignment]) -> RepositoryResult<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let count = insert_in_tx(&tx, items)?;
        tx.commit()?;
        Ok(count)
    }

    /// 单事务替换窗口：先删除 [start, end] 内既有排班，再写入新排班
    ///
    /// # 返回
    /// - Err(ReplaceError::Delete): 删除失败，未写入
    /// - Err(ReplaceError::Insert { rolled_back: true }): 写入或提交失败，窗口保持原状
    pub fn replace_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        items: &[ShiftAssignment],
    ) -> Result<ReplaceOutcome, ReplaceError> {
        let mut conn = self.get_conn().map_err(ReplaceError::Delete)?;
        let tx = conn
            .transaction()
            .map_err(|e| ReplaceError::Delete(e.into()))?;

        let deleted = tx
            .execute(
                "DELETE FROM shift_assignment WHERE date BETWEEN ?1 AND ?2",
                params![format_date(start), format_date(end)],
            )
            .map_err(|e| ReplaceError::Delete(e.into()))?;

        // 提前返回时 tx 被 drop，删除随之回滚
        let inserted = insert_in_tx(&tx, items).map_err(|source| ReplaceError::Insert {
            source,
            rolled_back: true,
        })?;

        tx.commit().map_err(|e| ReplaceError::Insert {
            source: e.into(),
            rolled_back: true,
        })?;

        Ok(ReplaceOutcome { deleted, inserted })
    }

    /// 人工调整：移动排班日期（可选同时修改班次）
    pub fn update_date(
        &self,
        id: i64,
        date: NaiveDate,
        shift_type: Option<i64>,
    ) -> RepositoryResult<ShiftAssignment> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"UPDATE shift_assignment
               SET date = ?2, shift_type = COALESCE(?3, shift_type)
               WHERE id = ?1"#,
            params![id, format_date(date), shift_type],
        )?;
        if rows == 0 {
            return Err(not_found(id));
        }

        let updated = conn.query_row(
            "SELECT id, staff_id, date, shift_type FROM shift_assignment WHERE id = ?1",
            params![id],
            map_shift_row,
        )?;
        Ok(updated)
    }

    /// 人工调整：删除单条排班
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM shift_assignment WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn insert_in_tx(tx: &Transaction<'_>, items: &[ShiftAssignment]) -> RepositoryResult<usize> {
    let mut stmt = tx.prepare(
        "INSERT INTO shift_assignment (staff_id, date, shift_type) VALUES (?1, ?2, ?3)",
    )?;
    for item in items {
        stmt.execute(params![item.staff_id, format_date(item.date), item.shift_type])?;
    }
    Ok(items.len())
}

fn not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "ShiftAssignment".to_string(),
        id: id.to_string(),
    }
}

fn map_shift_row(row: &Row<'_>) -> SqliteResult<ShiftAssignment> {
    Ok(ShiftAssignment {
        id: Some(row.get(0)?),
        staff_id: row.get(1)?,
        date: parse_date_column(2, &row.get::<_, String>(2)?)?,
        shift_type: row.get(3)?,
    })
}
