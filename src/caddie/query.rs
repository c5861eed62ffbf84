//! 远程数据查询与变更
//!
//! 查询结果按 [`QueryKey`] 缓存在 [`QueryCache`] 中；变更成功后按键前缀失效相关缓存，
//! 下一次查询重新请求服务端。变更失败时缓存保持不变（不做乐观更新）。

use crate::caddie::api::ApiClient;
use crate::caddie::auth::UserProfile;
use crate::caddie::club::{Club, ClubApi, ClubInput, ClubTypeInfo};
use crate::caddie::metrics::types::ALL_CLUBS;
use crate::caddie::metrics::{MetricsApi, OverviewMetrics, OverviewParams, SessionSummary, SummaryOptions};
use crate::caddie::session::{Session, SessionApi};
use crate::caddie::shot::{PostShotInput, PreShotInput, Shot, ShotApi};
use crate::caddie::types::OkResp;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// 查询键（由若干段组成，失效时按前缀匹配）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn sessions(limit: Option<u32>, cursor: Option<&str>) -> Self {
        Self::new([
            "sessions".to_string(),
            limit.map(|l| l.to_string()).unwrap_or_default(),
            cursor.unwrap_or_default().to_string(),
        ])
    }

    pub fn session(id: &str) -> Self {
        Self::new(["session", id])
    }

    pub fn session_summary(id: &str, opts: &SummaryOptions) -> Self {
        Self::new([
            "session-summary".to_string(),
            id.to_string(),
            opts.club.clone().unwrap_or_else(|| ALL_CLUBS.to_string()),
            opts.include_shots.to_string(),
            opts.limit_shots.unwrap_or(0).to_string(),
        ])
    }

    pub fn overview(params: &OverviewParams) -> Self {
        Self::new([
            "overview".to_string(),
            params.since.clone().unwrap_or_else(|| "default".to_string()),
            params.club.clone().unwrap_or_else(|| ALL_CLUBS.to_string()),
            params.include_shots.to_string(),
            params.limit_shots.unwrap_or(0).to_string(),
        ])
    }

    pub fn clubs() -> Self {
        Self::new(["clubs"])
    }

    pub fn club_types() -> Self {
        Self::new(["club-types"])
    }

    pub fn me() -> Self {
        Self::new(["me"])
    }

    /// 以下为失效前缀
    pub fn all_sessions() -> Self {
        Self::new(["sessions"])
    }

    pub fn any_session_summary(id: &str) -> Self {
        Self::new(["session-summary", id])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// 查询缓存（键 -> JSON），后写覆盖先写
#[derive(Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<QueryKey, serde_json::Value>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let entries = self.entries.lock().await;
        let value = entries.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub async fn put<T: Serialize>(&self, key: QueryKey, value: &T) -> Result<()> {
        let json = serde_json::to_value(value).context("序列化缓存数据失败")?;
        self.entries.lock().await.insert(key, json);
        Ok(())
    }

    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.entries.lock().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// 删除所有以 `prefix` 开头的缓存项，返回删除数量
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - entries.len();
        debug!("[QueryCache] 失效 {}，删除 {} 项", prefix, removed);
        removed
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

/// 带缓存的远程数据访问
#[derive(Clone)]
pub struct RemoteData {
    api: ApiClient,
    cache: Arc<QueryCache>,
    sessions: SessionApi,
    shots: ShotApi,
    clubs: ClubApi,
    metrics: MetricsApi,
}

impl RemoteData {
    pub fn new(api: ApiClient, cache: Arc<QueryCache>) -> Self {
        Self {
            sessions: SessionApi::new(api.clone()),
            shots: ShotApi::new(api.clone()),
            clubs: ClubApi::new(api.clone()),
            metrics: MetricsApi::new(api.clone()),
            api,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn session_api(&self) -> &SessionApi {
        &self.sessions
    }

    /// 命中缓存直接返回，否则请求并写入缓存（失败不写缓存）
    async fn cached<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.cache.get::<T>(&key).await {
            debug!("[Query] 命中缓存: {}", key);
            return Ok(hit);
        }
        let value = fetch().await?;
        self.cache.put(key, &value).await?;
        Ok(value)
    }

    pub async fn sessions(&self, limit: Option<u32>, cursor: Option<&str>) -> Result<Vec<Session>> {
        self.cached(QueryKey::sessions(limit, cursor), || {
            self.sessions.list(limit, cursor)
        })
        .await
    }

    /// 场次 ID 为空时查询被禁用，返回 `None`
    pub async fn session(&self, id: &str) -> Result<Option<Session>> {
        if id.is_empty() {
            return Ok(None);
        }
        self.cached(QueryKey::session(id), || self.sessions.get(id))
            .await
            .map(Some)
    }

    /// 没有场次 ID 时查询被禁用，不发请求
    pub async fn session_summary(
        &self,
        id: Option<&str>,
        opts: &SummaryOptions,
    ) -> Result<Option<SessionSummary>> {
        let Some(id) = id.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        self.cached(QueryKey::session_summary(id, opts), || {
            self.metrics.session_summary(id, opts)
        })
        .await
        .map(Some)
    }

    pub async fn overview(&self, params: &OverviewParams) -> Result<OverviewMetrics> {
        self.cached(QueryKey::overview(params), || self.metrics.overview(params))
            .await
    }

    pub async fn clubs(&self) -> Result<Vec<Club>> {
        self.cached(QueryKey::clubs(), || self.clubs.list()).await
    }

    pub async fn club_types(&self) -> Result<Vec<ClubTypeInfo>> {
        self.cached(QueryKey::club_types(), || self.clubs.types()).await
    }

    /// 当前用户（`GET /auth/profile`）
    pub async fn profile(&self) -> Result<UserProfile> {
        self.cached(QueryKey::me(), || self.api.get("/auth/profile"))
            .await
    }

    // ---- 变更 ----

    pub async fn create_session(&self) -> Result<Session> {
        let session = self.sessions.create().await?;
        self.cache.invalidate(&QueryKey::all_sessions()).await;
        Ok(session)
    }

    pub async fn delete_session(&self, id: &str) -> Result<OkResp> {
        let resp = self.sessions.delete(id).await?;
        self.cache.invalidate(&QueryKey::all_sessions()).await;
        Ok(resp)
    }

    pub async fn create_pre_shot(&self, session_id: &str, body: &PreShotInput) -> Result<Shot> {
        let shot = self.shots.create_pre_shot(session_id, body).await?;
        self.invalidate_session(Some(session_id)).await;
        Ok(shot)
    }

    /// 失效范围由调用方传入的场次 ID 决定（不从返回的击球推导）
    pub async fn submit_post_shot(
        &self,
        shot_id: &str,
        body: &PostShotInput,
        session_id: Option<&str>,
    ) -> Result<Shot> {
        let shot = self.shots.submit_post_shot(shot_id, body).await?;
        self.invalidate_session(session_id).await;
        Ok(shot)
    }

    pub async fn delete_shot(&self, shot_id: &str, session_id: Option<&str>) -> Result<OkResp> {
        let resp = self.shots.delete(shot_id).await?;
        self.invalidate_session(session_id).await;
        Ok(resp)
    }

    pub async fn create_club(&self, body: &ClubInput) -> Result<Club> {
        let club = self.clubs.create(body).await?;
        self.cache.invalidate(&QueryKey::clubs()).await;
        Ok(club)
    }

    pub async fn update_club(&self, id: &str, body: &ClubInput) -> Result<Club> {
        let club = self.clubs.update(id, body).await?;
        self.cache.invalidate(&QueryKey::clubs()).await;
        Ok(club)
    }

    pub async fn delete_club(&self, id: &str) -> Result<OkResp> {
        let resp = self.clubs.delete(id).await?;
        self.cache.invalidate(&QueryKey::clubs()).await;
        Ok(resp)
    }

    async fn invalidate_session(&self, session_id: Option<&str>) {
        let Some(sid) = session_id.filter(|s| !s.is_empty()) else {
            return;
        };
        self.cache.invalidate(&QueryKey::session(sid)).await;
        self.cache
            .invalidate(&QueryKey::any_session_summary(sid))
            .await;
        info!("[Query] ♻️ 场次 {} 的缓存已失效", sid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalidate_removes_exactly_prefixed_entries() {
        let cache = QueryCache::new();
        cache.put(QueryKey::sessions(Some(50), None), &1).await.unwrap();
        cache.put(QueryKey::sessions(None, None), &2).await.unwrap();
        cache.put(QueryKey::session("s1"), &3).await.unwrap();
        let opts = SummaryOptions::default();
        cache
            .put(QueryKey::session_summary("s1", &opts), &4)
            .await
            .unwrap();
        cache
            .put(QueryKey::session_summary("s2", &opts), &5)
            .await
            .unwrap();

        assert_eq!(cache.invalidate(&QueryKey::all_sessions()).await, 2);
        assert_eq!(cache.invalidate(&QueryKey::any_session_summary("s1")).await, 1);
        assert_eq!(cache.len().await, 2);
        assert!(cache.contains(&QueryKey::session("s1")).await);
        assert!(cache.contains(&QueryKey::session_summary("s2", &opts)).await);
    }

    #[test]
    fn prefix_match_is_segment_wise() {
        let key = QueryKey::new(["session-summary", "s10", "ALL"]);
        assert!(key.starts_with(&QueryKey::new(["session-summary", "s10"])));
        assert!(!key.starts_with(&QueryKey::new(["session-summary", "s1"])));
        assert!(!QueryKey::session("s1").starts_with(&QueryKey::new(["session-summary"])));
    }

    #[test]
    fn keys_default_club_and_since() {
        let key = QueryKey::overview(&OverviewParams::default());
        assert_eq!(key.segments(), &["overview", "default", "ALL", "false", "0"]);
        assert_eq!(QueryKey::me().to_string(), "[me]");
    }

    #[tokio::test]
    async fn cache_get_round_trips_typed_values() {
        let cache = QueryCache::new();
        cache
            .put(QueryKey::club_types(), &vec!["DRIVER".to_string()])
            .await
            .unwrap();
        let hit: Option<Vec<String>> = cache.get(&QueryKey::club_types()).await;
        assert_eq!(hit, Some(vec!["DRIVER".to_string()]));
        let miss: Option<Vec<String>> = cache.get(&QueryKey::clubs()).await;
        assert!(miss.is_none());
    }
}
