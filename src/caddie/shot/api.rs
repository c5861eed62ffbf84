//! 击球 HTTP API 客户端

use crate::caddie::api::ApiClient;
use crate::caddie::shot::models::{PostShotInput, PreShotInput, Shot};
use crate::caddie::types::{api_path, OkResp};
use anyhow::Result;
use tracing::info;

#[derive(Clone)]
pub struct ShotApi {
    api: ApiClient,
}

impl ShotApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// 记录击球前意图，返回带 ID 的击球记录
    pub async fn create_pre_shot(&self, session_id: &str, body: &PreShotInput) -> Result<Shot> {
        let shot: Shot = self
            .api
            .post(&api_path(&["sessions", session_id, "shots", "pre"]), body)
            .await?;
        info!("[ShotAPI] 🎯 击球前意图已记录: 场次 {}, 击球 {}", session_id, shot.id);
        Ok(shot)
    }

    /// 创建或更新击球结果
    pub async fn submit_post_shot(&self, shot_id: &str, body: &PostShotInput) -> Result<Shot> {
        let shot: Shot = self.api.post(&api_path(&["shots", shot_id, "post"]), body).await?;
        info!("[ShotAPI] ⛳ 击球结果已提交: {}", shot_id);
        Ok(shot)
    }

    pub async fn delete(&self, shot_id: &str) -> Result<OkResp> {
        let resp: Option<OkResp> = self.api.del(&api_path(&["shots", shot_id])).await?;
        Ok(resp.unwrap_or(OkResp { ok: true }))
    }
}
