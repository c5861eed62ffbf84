//! 最近场次服务
//!
//! 本地列表是服务端场次的有界缓存（最多 50 条）。新建场次时先乐观写入本地，
//! 之后由 [`RecentSessions::refresh`] 用服务端列表覆盖。

use crate::caddie::kv::{keys, LocalKvDao};
use crate::caddie::session::api::SessionApi;
use crate::caddie::session::dao::{LocalSessionDao, STORAGE_LIMIT};
use crate::caddie::session::listener::SessionListener;
use crate::caddie::session::models::LocalSessionSummary;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 服务端列表请求的条数
pub const API_LIMIT: u32 = 50;

/// 最近场次服务
#[derive(Clone)]
pub struct RecentSessions {
    api: SessionApi,
    dao: LocalSessionDao,
    kv: LocalKvDao,
    listener: Arc<dyn SessionListener>,
}

impl RecentSessions {
    pub fn new(
        api: SessionApi,
        dao: LocalSessionDao,
        kv: LocalKvDao,
        listener: Arc<dyn SessionListener>,
    ) -> Self {
        Self {
            api,
            dao,
            kv,
            listener,
        }
    }

    /// 本地保存的场次（最新在前）
    pub async fn stored_sessions(&self) -> Result<Vec<LocalSessionSummary>> {
        self.dao.get_all().await
    }

    /// 乐观插入：去重后置顶，超过上限的旧记录被丢弃
    pub async fn add_session(&self, summary: &LocalSessionSummary) -> Result<()> {
        self.dao.push_front(summary).await?;
        info!("[RecentSessions] ➕ 本地场次已添加: {}", summary.id);
        self.notify_changed().await;
        Ok(())
    }

    pub async fn remove_session(&self, id: &str) -> Result<()> {
        self.dao.delete(id).await?;
        info!("[RecentSessions] ➖ 本地场次已移除: {}", id);
        self.notify_changed().await;
        Ok(())
    }

    /// 从服务端拉取最近场次并覆盖本地列表
    ///
    /// 请求失败时返回本地已保存的列表，不向上抛出网络错误。
    pub async fn refresh(&self) -> Result<Vec<LocalSessionSummary>> {
        match self.api.list(Some(API_LIMIT), None).await {
            Ok(remote) => {
                let mapped: Vec<LocalSessionSummary> = remote
                    .iter()
                    .take(STORAGE_LIMIT)
                    .map(LocalSessionSummary::from)
                    .collect();
                self.dao.replace_all(&mapped).await?;
                info!("[RecentSessions] 🔄 已同步服务端场次，共 {} 条", mapped.len());
                self.notify_changed().await;
                Ok(mapped)
            }
            Err(e) => {
                warn!("[RecentSessions] 同步服务端场次失败，使用本地列表: {:?}", e);
                self.dao.get_all().await
            }
        }
    }

    /// 窗口重新获得焦点时刷新
    pub async fn on_focus(&self) -> Result<Vec<LocalSessionSummary>> {
        debug!("[RecentSessions] 窗口获得焦点，刷新场次");
        self.refresh().await
    }

    pub async fn session_by_id(&self, id: &str) -> Result<Option<LocalSessionSummary>> {
        self.dao.get_by_id(id).await
    }

    /// 记录刚创建的场次 ID，供统计页读取一次
    pub async fn set_last_session_id(&self, id: &str) -> Result<()> {
        self.kv.set(keys::LAST_SESSION, id).await
    }

    /// 读取并清除上次创建的场次 ID（一次性）
    pub async fn take_last_session_id(&self) -> Result<Option<String>> {
        let id = self.kv.take(keys::LAST_SESSION).await?;
        Ok(id.filter(|s| !s.is_empty()))
    }

    async fn notify_changed(&self) {
        match self.dao.get_all().await {
            Ok(list) => match serde_json::to_string(&list) {
                Ok(json) => self.listener.on_recent_sessions_changed(json).await,
                Err(e) => warn!("[RecentSessions] 序列化场次列表失败: {:?}", e),
            },
            Err(e) => warn!("[RecentSessions] 读取场次列表失败，跳过通知: {:?}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caddie::api::ApiClient;
    use crate::caddie::auth::{AuthApi, EmptyAuthListener};
    use crate::caddie::db::create_sqlite_pool_with_migration;
    use crate::caddie::fetch::AuthFetch;
    use crate::caddie::session::listener::EmptySessionListener;
    use crate::caddie::token::TokenStore;

    /// 指向不可达地址的服务，所有网络请求都会失败
    async fn offline_service() -> RecentSessions {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        let kv = LocalKvDao::new(pool.clone());
        let base = "http://127.0.0.1:9".to_string();
        let client = reqwest::Client::new();
        let auth = Arc::new(AuthApi::new(
            client.clone(),
            base.clone(),
            TokenStore::new(kv.clone()),
            Arc::new(EmptyAuthListener),
            "/login".to_string(),
        ));
        let fetch = Arc::new(AuthFetch::new(client, base, auth, Arc::new(EmptyAuthListener)));
        RecentSessions::new(
            SessionApi::new(ApiClient::new(fetch)),
            LocalSessionDao::new(pool),
            kv,
            Arc::new(EmptySessionListener),
        )
    }

    fn summary(id: &str) -> LocalSessionSummary {
        LocalSessionSummary {
            id: id.to_string(),
            date: "2026-02-02T08:00:00.000Z".to_string(),
            mode: "long".to_string(),
            title: Some("Driver • Long session".to_string()),
            shots: 3,
        }
    }

    #[tokio::test]
    async fn last_session_id_is_single_use() {
        let svc = offline_service().await;
        assert_eq!(svc.take_last_session_id().await.unwrap(), None);

        svc.set_last_session_id("s-42").await.unwrap();
        assert_eq!(svc.take_last_session_id().await.unwrap().as_deref(), Some("s-42"));
        assert_eq!(svc.take_last_session_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn refresh_failure_falls_back_to_stored_list() {
        let svc = offline_service().await;
        svc.add_session(&summary("a")).await.unwrap();
        svc.add_session(&summary("b")).await.unwrap();

        let list = svc.refresh().await.unwrap();
        let ids: Vec<&str> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn add_then_remove_round_trips_through_lookup() {
        let svc = offline_service().await;
        svc.add_session(&summary("x")).await.unwrap();
        let found = svc.session_by_id("x").await.unwrap().unwrap();
        assert_eq!(found.title.as_deref(), Some("Driver • Long session"));

        svc.remove_session("x").await.unwrap();
        assert!(svc.session_by_id("x").await.unwrap().is_none());
        assert!(svc.stored_sessions().await.unwrap().is_empty());
    }
}
