//! 向导依赖的远程与本地操作

use crate::caddie::query::RemoteData;
use crate::caddie::session::{LocalSessionSummary, RecentSessions, Session};
use crate::caddie::shot::{PostShotInput, PreShotInput, Shot};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FlowBackend: Send + Sync {
    async fn create_session(&self) -> Result<Session>;

    async fn create_pre_shot(&self, session_id: &str, body: &PreShotInput) -> Result<Shot>;

    async fn submit_post_shot(
        &self,
        shot_id: &str,
        body: &PostShotInput,
        session_id: Option<&str>,
    ) -> Result<Shot>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// 保存本地场次摘要，并记为最近创建的场次
    async fn remember_session(&self, summary: &LocalSessionSummary) -> Result<()>;

    /// 删除本地场次摘要
    async fn forget_session(&self, session_id: &str) -> Result<()>;
}

/// 基于 [`RemoteData`] 与 [`RecentSessions`] 的默认实现
#[derive(Clone)]
pub struct ClientFlowBackend {
    remote: RemoteData,
    recent: RecentSessions,
}

impl ClientFlowBackend {
    pub fn new(remote: RemoteData, recent: RecentSessions) -> Self {
        Self { remote, recent }
    }
}

#[async_trait]
impl FlowBackend for ClientFlowBackend {
    async fn create_session(&self) -> Result<Session> {
        self.remote.create_session().await
    }

    async fn create_pre_shot(&self, session_id: &str, body: &PreShotInput) -> Result<Shot> {
        self.remote.create_pre_shot(session_id, body).await
    }

    async fn submit_post_shot(
        &self,
        shot_id: &str,
        body: &PostShotInput,
        session_id: Option<&str>,
    ) -> Result<Shot> {
        self.remote.submit_post_shot(shot_id, body, session_id).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.remote.delete_session(session_id).await?;
        Ok(())
    }

    async fn remember_session(&self, summary: &LocalSessionSummary) -> Result<()> {
        self.recent.add_session(summary).await?;
        self.recent.set_last_session_id(&summary.id).await
    }

    async fn forget_session(&self, session_id: &str) -> Result<()> {
        self.recent.remove_session(session_id).await
    }
}
