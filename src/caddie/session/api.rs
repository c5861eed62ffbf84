//! 场次 HTTP API 客户端

use crate::caddie::api::ApiClient;
use crate::caddie::session::models::Session;
use crate::caddie::types::{api_path, path_with_query, OkResp};
use anyhow::Result;
use tracing::{debug, info};

/// 场次相关的 HTTP API 客户端
#[derive(Clone)]
pub struct SessionApi {
    api: ApiClient,
}

impl SessionApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `GET /sessions?limit=&cursor=`
    pub async fn list(&self, limit: Option<u32>, cursor: Option<&str>) -> Result<Vec<Session>> {
        let mut pairs = Vec::new();
        if let Some(limit) = limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
            pairs.push(("cursor", cursor.to_string()));
        }
        let sessions: Vec<Session> = self.api.get(&path_with_query("/sessions", &pairs)).await?;
        debug!("[SessionAPI] 获取场次列表，共 {} 条", sessions.len());
        Ok(sessions)
    }

    pub async fn get(&self, id: &str) -> Result<Session> {
        self.api.get(&api_path(&["sessions", id])).await
    }

    /// 创建新场次（无请求体）
    pub async fn create(&self) -> Result<Session> {
        let session: Session = self.api.post_empty("/sessions").await?;
        info!("[SessionAPI] ✅ 场次已创建: {}", session.id);
        Ok(session)
    }

    pub async fn delete(&self, id: &str) -> Result<OkResp> {
        let resp: Option<OkResp> = self.api.del(&api_path(&["sessions", id])).await?;
        info!("[SessionAPI] 🗑️ 场次已删除: {}", id);
        Ok(resp.unwrap_or(OkResp { ok: true }))
    }
}
