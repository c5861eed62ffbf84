//! 本地键值数据访问层（DAO）
//!
//! 对应浏览器端的 localStorage：token、主题、球杆选择、一次性场次 ID 等都存放在
//! `local_kv` 表中。

use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

/// 键值 DAO（基于 sqlx）
#[derive(Clone)]
pub struct LocalKvDao {
    db: Pool<Sqlite>,
}

impl LocalKvDao {
    /// 创建新的键值 DAO
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// 读取键值
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM local_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await
            .with_context(|| format!("读取本地键值失败: {}", key))?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    /// 写入键值（已存在则覆盖）
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_kv (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await
        .with_context(|| format!("写入本地键值失败: {}", key))?;

        debug!("[KvDAO] 写入键: {}", key);
        Ok(())
    }

    /// 删除键值
    pub async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM local_kv WHERE key = ?")
            .bind(key)
            .execute(&self.db)
            .await
            .with_context(|| format!("删除本地键值失败: {}", key))?;
        Ok(())
    }

    /// 读取并删除键值（一次性消费语义）
    pub async fn take(&self, key: &str) -> Result<Option<String>> {
        let mut tx = self.db.begin().await.context("开启事务失败")?;

        let row = sqlx::query("SELECT value FROM local_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await
            .with_context(|| format!("读取本地键值失败: {}", key))?;

        if row.is_some() {
            sqlx::query("DELETE FROM local_kv WHERE key = ?")
                .bind(key)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("删除本地键值失败: {}", key))?;
        }

        tx.commit().await.context("提交事务失败")?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }
}
