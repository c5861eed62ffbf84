//! 最近场次数据访问层（DAO）
//!
//! `position` 越大越新；列表按 `position DESC` 读取，即最新的在前。

use crate::caddie::session::models::LocalSessionSummary;
use anyhow::{Context, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

/// 本地最多保留的场次数量
pub const STORAGE_LIMIT: usize = 50;

/// 最近场次 DAO（基于 sqlx）
#[derive(Clone)]
pub struct LocalSessionDao {
    db: Pool<Sqlite>,
}

fn row_to_summary(row: SqliteRow) -> LocalSessionSummary {
    let shots: i64 = row.get("shots");
    LocalSessionSummary {
        id: row.get("id"),
        date: row.get("date"),
        mode: row.get("mode"),
        title: row.get("title"),
        shots: u32::try_from(shots).unwrap_or(0),
    }
}

impl LocalSessionDao {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// 读取全部本地场次（最新在前）
    pub async fn get_all(&self) -> Result<Vec<LocalSessionSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, date, mode, title, shots
            FROM local_recent_sessions
            ORDER BY position DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("查询本地场次列表失败")?;

        let sessions: Vec<LocalSessionSummary> = rows.into_iter().map(row_to_summary).collect();
        debug!("[SessionDAO] 获取本地场次列表，共 {} 条", sessions.len());
        Ok(sessions)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<LocalSessionSummary>> {
        let row = sqlx::query(
            "SELECT id, date, mode, title, shots FROM local_recent_sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("查询本地场次失败: {}", id))?;
        Ok(row.map(row_to_summary))
    }

    /// 插入到列表最前面（同 ID 旧记录先删除），超出上限的旧记录被裁掉
    pub async fn push_front(&self, summary: &LocalSessionSummary) -> Result<()> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;

        sqlx::query("DELETE FROM local_recent_sessions WHERE id = ?")
            .bind(&summary.id)
            .execute(&mut *tx)
            .await
            .context("删除重复场次失败")?;

        let top: i64 = sqlx::query("SELECT COALESCE(MAX(position), 0) AS top FROM local_recent_sessions")
            .fetch_one(&mut *tx)
            .await
            .context("查询场次位置失败")?
            .get("top");

        sqlx::query(
            r#"
            INSERT INTO local_recent_sessions (id, date, mode, title, shots, position)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&summary.id)
        .bind(&summary.date)
        .bind(&summary.mode)
        .bind(&summary.title)
        .bind(i64::from(summary.shots))
        .bind(top + 1)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("写入本地场次失败: {}", summary.id))?;

        sqlx::query(
            r#"
            DELETE FROM local_recent_sessions
            WHERE id NOT IN (
                SELECT id FROM local_recent_sessions ORDER BY position DESC LIMIT ?
            )
            "#,
        )
        .bind(STORAGE_LIMIT as i64)
        .execute(&mut *tx)
        .await
        .context("裁剪本地场次失败")?;

        tx.commit().await.context("提交事务失败")?;
        debug!("[SessionDAO] 场次已置顶: {}", summary.id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_recent_sessions WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .with_context(|| format!("删除本地场次失败: {}", id))?;
        Ok(())
    }

    /// 用给定列表整体替换本地场次（保持给定顺序，最多保留前 50 条）
    pub async fn replace_all(&self, sessions: &[LocalSessionSummary]) -> Result<()> {
        let kept = &sessions[..sessions.len().min(STORAGE_LIMIT)];
        let mut tx = self.db.begin().await.context("开启事务失败")?;

        sqlx::query("DELETE FROM local_recent_sessions")
            .execute(&mut *tx)
            .await
            .context("清空本地场次失败")?;

        for (i, s) in kept.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT OR REPLACE INTO local_recent_sessions (id, date, mode, title, shots, position)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&s.id)
            .bind(&s.date)
            .bind(&s.mode)
            .bind(&s.title)
            .bind(i64::from(s.shots))
            .bind((kept.len() - i) as i64)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("写入本地场次失败: {}", s.id))?;
        }

        tx.commit().await.context("提交事务失败")?;
        debug!("[SessionDAO] 本地场次已替换，共 {} 条", kept.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caddie::db::create_sqlite_pool_with_migration;

    fn summary(id: &str) -> LocalSessionSummary {
        LocalSessionSummary {
            id: id.to_string(),
            date: "2026-01-01T00:00:00.000Z".to_string(),
            mode: "free".to_string(),
            title: None,
            shots: 1,
        }
    }

    async fn dao() -> LocalSessionDao {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        LocalSessionDao::new(pool)
    }

    #[tokio::test]
    async fn push_front_dedupes_and_caps_at_fifty() {
        let dao = dao().await;
        for i in 0..60 {
            dao.push_front(&summary(&format!("s{}", i))).await.unwrap();
        }
        dao.push_front(&summary("s30")).await.unwrap();

        let all = dao.get_all().await.unwrap();
        assert_eq!(all.len(), STORAGE_LIMIT);
        assert_eq!(all[0].id, "s30");
        assert_eq!(all[1].id, "s59");
        assert_eq!(all.iter().filter(|s| s.id == "s30").count(), 1);
        assert!(dao.get_by_id("s5").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_all_keeps_order_and_delete_removes() {
        let dao = dao().await;
        dao.push_front(&summary("old")).await.unwrap();
        dao.replace_all(&[summary("a"), summary("b"), summary("c")])
            .await
            .unwrap();

        let ids: Vec<String> = dao.get_all().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        dao.delete("b").await.unwrap();
        let ids: Vec<String> = dao.get_all().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
