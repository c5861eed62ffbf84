//! 新建场次向导状态机
//!
//! 约束：
//! - 首次进入 `Pre` 时只创建一次场次；创建失败会解除保护，之后再次进入 `Pre` 时重试
//! - 击球 ID 只在击球前意图保存成功后设置，提交结果必须持有击球 ID
//! - 网络步骤期间 `busy` 为真，失败记录到 `error()`，状态不前进，不自动重试
//! - 推杆模式不发起任何击球相关的网络请求

use crate::caddie::flow::backend::FlowBackend;
use crate::caddie::flow::finish::FinishView;
use crate::caddie::flow::models::ShotDraft;
use crate::caddie::flow::state::{FlowKey, FlowStep};
use crate::caddie::serialization::{now_millis, now_rfc3339};
use crate::caddie::session::{LocalSessionSummary, SessionMode};
use crate::caddie::shot::PreShotInput;
use crate::caddie::types::error_message;
use tracing::{debug, error, info, warn};

const CREATE_SESSION_FAILED: &str = "Failed to create session";
const PRE_SHOT_FAILED: &str = "Failed to save pre-shot";
const POST_SHOT_FAILED: &str = "Failed to save post-shot";
const DELETE_SESSION_FAILED: &str = "Failed to delete session";
const FINISH_FAILED: &str = "Failed to save session";
const NO_SHOT: &str = "No shot to update";

/// 新建场次向导
pub struct SessionFlow<B: FlowBackend> {
    backend: B,
    step: FlowStep,
    mode: Option<SessionMode>,
    draft: Option<ShotDraft>,
    pre_index: usize,
    post_index: usize,
    session_id: Option<String>,
    shot_id: Option<String>,
    /// 进入 `Pre` 时的建场保护
    session_requested: bool,
    busy: bool,
    error: Option<String>,
    confirm_open: bool,
    closed: bool,
    shots_recorded: u32,
}

impl<B: FlowBackend> SessionFlow<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            step: FlowStep::Mode,
            mode: None,
            draft: None,
            pre_index: 0,
            post_index: 0,
            session_id: None,
            shot_id: None,
            session_requested: false,
            busy: false,
            error: None,
            confirm_open: false,
            closed: false,
            shots_recorded: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn pre_index(&self) -> usize {
        self.pre_index
    }

    pub fn post_index(&self) -> usize {
        self.post_index
    }

    pub fn mode(&self) -> Option<SessionMode> {
        self.mode
    }

    pub fn draft(&self) -> Option<&ShotDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ShotDraft> {
        self.draft.as_mut()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn shot_id(&self) -> Option<&str> {
        self.shot_id.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_confirm_open(&self) -> bool {
        self.confirm_open
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn shots_recorded(&self) -> u32 {
        self.shots_recorded
    }

    /// 当前子步骤标题
    pub fn step_title(&self) -> Option<&'static str> {
        let draft = self.draft.as_ref()?;
        match self.step {
            FlowStep::Pre => draft.pre_step_title(self.pre_index),
            FlowStep::Post => draft.post_step_title(self.post_index),
            _ => None,
        }
    }

    /// 选择模式（仅在 `Mode` 步骤有效），切换模式时重建草稿
    pub fn select_mode(&mut self, mode: SessionMode) {
        if self.step != FlowStep::Mode || self.closed {
            return;
        }
        if self.mode != Some(mode) || self.draft.is_none() {
            self.draft = Some(ShotDraft::for_mode(mode));
        }
        self.mode = Some(mode);
        debug!("[Flow] 选择模式: {}", mode);
    }

    /// 当前子步骤的必填字段是否已填写
    pub fn can_advance(&self) -> bool {
        match (self.step, self.draft.as_ref()) {
            (FlowStep::Mode, _) => self.mode.is_some(),
            (FlowStep::Pre, Some(d)) => d.pre_filled(self.pre_index),
            (FlowStep::Post, Some(d)) => d.post_filled(self.post_index),
            _ => false,
        }
    }

    /// 下一步；不满足条件或正忙时不做任何事
    pub async fn next(&mut self) {
        if self.busy || self.closed || !self.can_advance() {
            return;
        }
        let Some((pre_count, post_count)) = self
            .draft
            .as_ref()
            .map(|d| (d.pre_step_count(), d.post_step_count()))
        else {
            return;
        };

        match self.step {
            FlowStep::Mode => {
                self.pre_index = 0;
                self.enter_pre().await;
            }
            FlowStep::Pre if self.pre_index + 1 < pre_count => self.pre_index += 1,
            FlowStep::Pre => self.complete_pre().await,
            FlowStep::Post if self.post_index + 1 < post_count => self.post_index += 1,
            FlowStep::Post => self.complete_post().await,
            FlowStep::Finish => {}
        }
    }

    /// 上一步（`Mode`、`Finish` 或忙碌时无效）
    pub async fn back(&mut self) {
        if self.busy || self.closed {
            return;
        }
        match self.step {
            FlowStep::Post if self.post_index > 0 => self.post_index -= 1,
            FlowStep::Post => self.enter_pre().await,
            FlowStep::Pre if self.pre_index > 0 => self.pre_index -= 1,
            FlowStep::Pre => self.step = FlowStep::Mode,
            FlowStep::Mode | FlowStep::Finish => {}
        }
    }

    /// 完成页：再记录一球
    pub async fn add_another_shot(&mut self) {
        if self.step != FlowStep::Finish || self.busy || self.closed {
            return;
        }
        if let Some(draft) = self.draft.as_mut() {
            draft.reset_for_another_shot();
        }
        self.shot_id = None;
        self.pre_index = 0;
        self.post_index = 0;
        self.error = None;
        info!("[Flow] ➕ 再记录一球，场次: {:?}", self.session_id);
        self.enter_pre().await;
    }

    /// 完成页：结束场次，保存本地摘要并返回统计页路由
    pub async fn finish_session(&mut self) -> Option<String> {
        if self.step != FlowStep::Finish || self.busy || self.closed {
            return None;
        }
        let summary = self.build_summary();

        self.busy = true;
        let result = self.backend.remember_session(&summary).await;
        self.busy = false;

        match result {
            Ok(()) => {
                self.closed = true;
                info!("[Flow] ✅ 场次结束: {} ({} 球)", summary.id, summary.shots);
                Some(stats_route(&summary.id))
            }
            Err(e) => {
                error!("[Flow] 保存本地场次失败: {:?}", e);
                self.error = Some(error_message(&e, FINISH_FAILED));
                None
            }
        }
    }

    /// 打开取消确认
    pub fn request_cancel(&mut self) {
        if !self.closed {
            self.confirm_open = true;
        }
    }

    pub fn dismiss_cancel(&mut self) {
        self.confirm_open = false;
    }

    /// 确认取消：关闭确认并取消场次
    pub async fn confirm_cancel(&mut self) {
        self.confirm_open = false;
        self.cancel_session().await;
    }

    /// 取消场次：只要已有场次 ID 就删除远程场次和本地摘要，然后关闭
    ///
    /// 删除失败时记录错误并保持向导打开。
    pub async fn cancel_session(&mut self) {
        if self.closed || self.busy {
            return;
        }
        let Some(session_id) = self.session_id.clone() else {
            self.closed = true;
            debug!("[Flow] 没有场次，直接关闭");
            return;
        };

        self.busy = true;
        self.error = None;
        let result = self.backend.delete_session(&session_id).await;
        self.busy = false;

        match result {
            Ok(()) => {
                if let Err(e) = self.backend.forget_session(&session_id).await {
                    warn!("[Flow] 删除本地场次摘要失败: {:?}", e);
                }
                self.closed = true;
                info!("[Flow] 🗑️ 场次已取消: {}", session_id);
            }
            Err(e) => {
                error!("[Flow] 删除场次失败: {:?}", e);
                self.error = Some(error_message(&e, DELETE_SESSION_FAILED));
            }
        }
    }

    /// Escape：确认框打开时只关闭确认框，否则直接取消场次
    pub async fn handle_key(&mut self, key: FlowKey) {
        match key {
            FlowKey::Escape if self.confirm_open => self.confirm_open = false,
            FlowKey::Escape => self.cancel_session().await,
        }
    }

    /// 完成页展示数据（仅 `Finish` 步骤）
    pub fn finish_view(&self) -> Option<FinishView> {
        if self.step != FlowStep::Finish {
            return None;
        }
        self.draft.as_ref().map(FinishView::from_draft)
    }

    /// 进入 `Pre`；建场保护未设置时创建场次
    async fn enter_pre(&mut self) {
        self.step = FlowStep::Pre;
        if self.session_requested {
            return;
        }
        self.session_requested = true;
        self.busy = true;
        self.error = None;
        let result = self.backend.create_session().await;
        self.busy = false;

        match result {
            Ok(session) => {
                info!("[Flow] 🆕 场次已创建: {}", session.id);
                self.session_id = Some(session.id);
            }
            Err(e) => {
                error!("[Flow] 创建场次失败: {:?}", e);
                self.error = Some(error_message(&e, CREATE_SESSION_FAILED));
                self.session_requested = false;
            }
        }
    }

    async fn complete_pre(&mut self) {
        let body = match self.draft.as_ref() {
            Some(ShotDraft::Range(d)) => d.to_pre_shot_input(),
            Some(ShotDraft::Putting(_)) => {
                debug!("[Flow] 推杆模式不保存击球前意图");
                self.enter_post();
                return;
            }
            None => return,
        };

        self.busy = true;
        self.error = None;
        let result = self.save_pre_shot(&body).await;
        self.busy = false;

        match result {
            Ok(shot_id) => {
                info!("[Flow] 🎯 击球前意图已保存: {}", shot_id);
                self.shot_id = Some(shot_id);
                self.enter_post();
            }
            Err(e) => {
                error!("[Flow] 保存击球前意图失败: {:?}", e);
                self.error = Some(error_message(&e, PRE_SHOT_FAILED));
            }
        }
    }

    /// 没有场次时先补建场次，再保存击球前意图
    async fn save_pre_shot(&mut self, body: &PreShotInput) -> anyhow::Result<String> {
        let session_id = match self.session_id.clone() {
            Some(id) => id,
            None => {
                let session = self.backend.create_session().await?;
                self.session_requested = true;
                self.session_id = Some(session.id.clone());
                session.id
            }
        };
        let shot = self.backend.create_pre_shot(&session_id, body).await?;
        Ok(shot.id)
    }

    fn enter_post(&mut self) {
        self.step = FlowStep::Post;
        self.pre_index = 0;
        self.post_index = 0;
    }

    async fn complete_post(&mut self) {
        let body = match self.draft.as_ref() {
            Some(ShotDraft::Range(d)) => d.to_post_shot_input(),
            Some(ShotDraft::Putting(_)) => {
                debug!("[Flow] 推杆模式不提交击球结果");
                self.enter_finish();
                return;
            }
            None => return,
        };
        let Some(shot_id) = self.shot_id.clone() else {
            warn!("[Flow] 没有击球 ID，拒绝提交结果");
            self.error = Some(NO_SHOT.to_string());
            return;
        };

        self.busy = true;
        self.error = None;
        let result = self
            .backend
            .submit_post_shot(&shot_id, &body, self.session_id.as_deref())
            .await;
        self.busy = false;

        match result {
            Ok(_) => {
                info!("[Flow] ⛳ 击球结果已保存: {}", shot_id);
                self.enter_finish();
            }
            Err(e) => {
                error!("[Flow] 保存击球结果失败: {:?}", e);
                self.error = Some(error_message(&e, POST_SHOT_FAILED));
            }
        }
    }

    fn enter_finish(&mut self) {
        self.step = FlowStep::Finish;
        self.post_index = 0;
        self.shots_recorded += 1;
    }

    fn build_summary(&self) -> LocalSessionSummary {
        let id = self
            .session_id
            .clone()
            .unwrap_or_else(|| format!("s{}", now_millis()));
        let base_title = self
            .mode
            .map(|m| m.session_title())
            .unwrap_or_else(|| "Range session".to_string());
        let title = match self.draft.as_ref().and_then(ShotDraft::club) {
            Some(club) => format!("{} • {}", club.label(), base_title),
            None => base_title,
        };
        LocalSessionSummary {
            id,
            date: now_rfc3339(),
            mode: self.mode.unwrap_or_default().local_code().to_string(),
            title: Some(title),
            shots: self.shots_recorded,
        }
    }
}

/// 统计页路由
pub fn stats_route(session_id: &str) -> String {
    let Ok(mut url) = reqwest::Url::parse("http://localhost/") else {
        return format!("/?tab=stats&session={}", session_id);
    };
    url.query_pairs_mut()
        .append_pair("tab", "stats")
        .append_pair("session", session_id);
    format!("/?{}", url.query().unwrap_or_default())
}
