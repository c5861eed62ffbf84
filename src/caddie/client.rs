//! RangeCaddie 客户端
//!
//! 组合根：根据 [`ClientConfig`] 创建数据库、认证、请求、缓存和各业务服务。

use crate::caddie::api::ApiClient;
use crate::caddie::auth::{AuthApi, AuthListener, EmptyAuthListener};
use crate::caddie::club::ClubSelection;
use crate::caddie::db::create_sqlite_pool_with_migration;
use crate::caddie::fetch::AuthFetch;
use crate::caddie::flow::{ClientFlowBackend, SessionFlow};
use crate::caddie::kv::LocalKvDao;
use crate::caddie::query::{QueryCache, RemoteData};
use crate::caddie::session::{
    EmptySessionListener, LocalSessionDao, RecentSessions, SessionApi, SessionListener,
};
use crate::caddie::shell::{check_first_visit, guard_route, GuardDecision, ThemeStore};
use crate::caddie::stats::StatsLoader;
use crate::caddie::token::TokenStore;
use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::info;

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// HTTP API 基础地址
    pub api_base_url: String,
    /// 本地 SQLite 数据库 URL
    ///
    /// 例如：`sqlite://rangecaddie.db?mode=rwc`
    pub db_url: String,
    /// 需要重新登录时跳转的路由
    pub sign_in_route: String,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            db_url: "sqlite://rangecaddie.db?mode=rwc".to_string(),
            sign_in_route: "/login".to_string(),
        }
    }

    /// 默认配置，并用环境变量 `RANGECADDIE_API_URL` / `RANGECADDIE_DB_URL` 覆盖
    pub fn from_env() -> Self {
        let mut config = Self::new();
        if let Ok(url) = std::env::var("RANGECADDIE_API_URL") {
            config = config.with_api_base_url(&url);
        }
        if let Ok(db_url) = std::env::var("RANGECADDIE_DB_URL") {
            if !db_url.is_empty() {
                config.db_url = db_url;
            }
        }
        config
    }

    /// 设置 API 地址（去掉末尾的 `/`，空值忽略）
    pub fn with_api_base_url(mut self, url: &str) -> Self {
        let url = url.trim().trim_end_matches('/');
        if !url.is_empty() {
            self.api_base_url = url.to_string();
        }
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// RangeCaddie 客户端
#[derive(Clone)]
pub struct RangeCaddieClient {
    config: ClientConfig,
    db: Pool<Sqlite>,
    kv: LocalKvDao,
    auth: Arc<AuthApi>,
    api: ApiClient,
    remote: RemoteData,
    recent: RecentSessions,
    theme: ThemeStore,
}

impl RangeCaddieClient {
    /// 使用空监听器创建客户端
    pub async fn new(config: ClientConfig) -> Result<Self> {
        Self::with_listeners(
            config,
            Arc::new(EmptyAuthListener),
            Arc::new(EmptySessionListener),
        )
        .await
    }

    /// 创建客户端并注册认证、场次监听器
    pub async fn with_listeners(
        config: ClientConfig,
        auth_listener: Arc<dyn AuthListener>,
        session_listener: Arc<dyn SessionListener>,
    ) -> Result<Self> {
        let db = create_sqlite_pool_with_migration(&config.db_url)
            .await
            .context("初始化本地数据库失败")?;
        let kv = LocalKvDao::new(db.clone());
        let http = reqwest::Client::new();

        let auth = Arc::new(AuthApi::new(
            http.clone(),
            config.api_base_url.clone(),
            TokenStore::new(kv.clone()),
            auth_listener.clone(),
            config.sign_in_route.clone(),
        ));
        let fetch = Arc::new(AuthFetch::new(
            http,
            config.api_base_url.clone(),
            auth.clone(),
            auth_listener,
        ));
        let api = ApiClient::new(fetch);
        let remote = RemoteData::new(api.clone(), Arc::new(QueryCache::new()));
        let recent = RecentSessions::new(
            SessionApi::new(api.clone()),
            LocalSessionDao::new(db.clone()),
            kv.clone(),
            session_listener,
        );
        let theme = ThemeStore::new(kv.clone());

        info!(
            "[Client] ✅ 客户端已初始化: api={}, db={}",
            config.api_base_url, config.db_url
        );
        Ok(Self {
            config,
            db,
            kv,
            auth,
            api,
            remote,
            recent,
            theme,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn db(&self) -> &Pool<Sqlite> {
        &self.db
    }

    pub fn kv(&self) -> &LocalKvDao {
        &self.kv
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn tokens(&self) -> &TokenStore {
        self.auth.tokens()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn remote(&self) -> &RemoteData {
        &self.remote
    }

    pub fn recent_sessions(&self) -> &RecentSessions {
        &self.recent
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    /// 是否已登录（本地有 access token）
    pub async fn is_signed_in(&self) -> Result<bool> {
        Ok(self.tokens().access_token().await?.is_some())
    }

    /// 退出登录并清空查询缓存
    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await?;
        self.remote.cache().clear().await;
        Ok(())
    }

    /// 开始一个新的记录向导
    pub fn new_flow(&self) -> SessionFlow<ClientFlowBackend> {
        SessionFlow::new(ClientFlowBackend::new(
            self.remote.clone(),
            self.recent.clone(),
        ))
    }

    pub fn stats(&self) -> StatsLoader {
        StatsLoader::new(self.remote.clone(), self.recent.clone())
    }

    /// 加载已保存的球杆选择
    pub async fn club_selection(&self) -> Result<ClubSelection> {
        ClubSelection::load(self.kv.clone()).await
    }

    /// 检查访问路径是否需要登录
    pub async fn guard(&self, pathname: &str, query: &str) -> Result<GuardDecision> {
        Ok(guard_route(pathname, query, self.is_signed_in().await?))
    }

    pub async fn is_first_visit(&self) -> Result<bool> {
        check_first_visit(&self.kv).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caddie::enums::{PuttBreak, PuttSpeed};
    use crate::caddie::flow::{FlowStep, ShotDraft};
    use crate::caddie::session::{LocalSessionSummary, SessionMode};

    async fn client() -> RangeCaddieClient {
        let config = ClientConfig {
            db_url: "sqlite::memory:".to_string(),
            ..ClientConfig::new()
        }
        .with_api_base_url("http://127.0.0.1:9/");
        RangeCaddieClient::new(config).await.unwrap()
    }

    #[test]
    fn api_url_trailing_slash_is_stripped() {
        let config = ClientConfig::new().with_api_base_url("https://api.example.com/");
        assert_eq!(config.api_base_url, "https://api.example.com");
        let config = ClientConfig::new().with_api_base_url("");
        assert_eq!(config.api_base_url, "http://localhost:3000");
    }

    #[tokio::test]
    async fn guard_follows_stored_token() {
        let client = client().await;
        assert_eq!(client.config().api_base_url, "http://127.0.0.1:9");
        assert!(!client.is_signed_in().await.unwrap());
        assert!(matches!(
            client.guard("/new", "").await.unwrap(),
            GuardDecision::Redirect(_)
        ));
        assert_eq!(client.guard("/login", "").await.unwrap(), GuardDecision::Allow);
    }

    #[tokio::test]
    async fn offline_putting_flow_still_records_a_local_session() {
        let client = client().await;
        let mut flow = client.new_flow();
        flow.select_mode(SessionMode::Putting);
        flow.next().await;
        // 离线时创建场次失败，向导仍停留在 Pre 并可继续
        assert!(flow.error().is_some());
        assert!(flow.session_id().is_none());

        if let Some(ShotDraft::Putting(d)) = flow.draft_mut() {
            d.distance = "8".to_string();
            d.break_intent = Some(PuttBreak::Left);
            d.speed_intent = Some(PuttSpeed::Firm);
            d.made = Some(true);
        }
        for _ in 0..7 {
            flow.next().await;
        }
        assert_eq!(flow.step(), FlowStep::Finish);

        let route = flow.finish_session().await.unwrap();
        assert!(route.starts_with("/?tab=stats&session=s"));
        let stored: Vec<LocalSessionSummary> =
            client.recent_sessions().stored_sessions().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].mode, "putting");
        assert_eq!(stored[0].shots, 1);
        assert_eq!(
            client.recent_sessions().take_last_session_id().await.unwrap(),
            Some(stored[0].id.clone())
        );
    }

    #[tokio::test]
    async fn first_visit_is_reported_once() {
        let client = client().await;
        assert!(client.is_first_visit().await.unwrap());
        assert!(!client.is_first_visit().await.unwrap());
    }
}
