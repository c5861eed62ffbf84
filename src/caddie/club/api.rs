//! 球杆 HTTP API 客户端

use crate::caddie::api::ApiClient;
use crate::caddie::club::models::{Club, ClubInput, ClubTypeInfo};
use crate::caddie::types::{api_path, OkResp};
use anyhow::Result;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ClubApi {
    api: ApiClient,
}

impl ClubApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Club>> {
        let clubs: Vec<Club> = self.api.get("/clubs").await?;
        debug!("[ClubAPI] 获取球杆列表，共 {} 支", clubs.len());
        Ok(clubs)
    }

    pub async fn types(&self) -> Result<Vec<ClubTypeInfo>> {
        self.api.get("/clubs/types").await
    }

    pub async fn create(&self, body: &ClubInput) -> Result<Club> {
        let club: Club = self.api.post("/clubs", body).await?;
        info!("[ClubAPI] ✅ 球杆已创建: {} ({})", club.name, club.id);
        Ok(club)
    }

    pub async fn update(&self, id: &str, body: &ClubInput) -> Result<Club> {
        let club: Club = self.api.patch(&api_path(&["clubs", id]), body).await?;
        info!("[ClubAPI] ✏️ 球杆已更新: {}", id);
        Ok(club)
    }

    pub async fn delete(&self, id: &str) -> Result<OkResp> {
        let resp: Option<OkResp> = self.api.del(&api_path(&["clubs", id])).await?;
        info!("[ClubAPI] 🗑️ 球杆已删除: {}", id);
        Ok(resp.unwrap_or(OkResp { ok: true }))
    }
}
