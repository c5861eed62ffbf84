//! 带认证的 HTTP 请求
//!
//! 每个请求自动附带 `Authorization: Bearer <access token>`。收到 401 时最多执行
//! 一次“刷新 token 后重试”，流程建模为显式状态机 [`FetchState`]：
//!
//! ```text
//! Authorized --401--> Refreshing --ok--> Retried (终态，返回重试结果)
//!                              \--err--> Failed  (终态，清除凭据，返回原 401 响应)
//! ```

use crate::caddie::auth::{resolve_url, AuthApi, AuthListener};
use crate::caddie::token::TokenStore;
use crate::caddie::types::ApiRequest;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// 单次请求的认证状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// 使用当前 access token 发起首次请求
    Authorized,
    /// 首次请求返回 401，正在刷新 token
    Refreshing,
    /// 刷新成功，使用新 token 重试一次
    Retried,
    /// 刷新失败，凭据已清除
    Failed,
}

/// 带认证拦截的 HTTP 客户端
pub struct AuthFetch {
    client: reqwest::Client,
    api_base_url: String,
    auth: Arc<AuthApi>,
    listener: Arc<dyn AuthListener>,
}

impl AuthFetch {
    pub fn new(
        client: reqwest::Client,
        api_base_url: String,
        auth: Arc<AuthApi>,
        listener: Arc<dyn AuthListener>,
    ) -> Self {
        Self {
            client,
            api_base_url,
            auth,
            listener,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        self.auth.tokens()
    }

    /// 发送请求，遵循单次刷新重试协议
    ///
    /// 返回最终的 HTTP 响应（可能仍是 401），传输层错误以 `Err` 返回。
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let operation_id = Uuid::new_v4().to_string();
        let url = resolve_url(&self.api_base_url, &request.path);
        debug!(
            "[Fetch] {} {} 操作ID: {}",
            request.method, url, operation_id
        );

        let mut state = FetchState::Authorized;
        let mut unauthorized: Option<reqwest::Response> = None;

        loop {
            match state {
                FetchState::Authorized => {
                    let response = self.send_once(request, &url, &operation_id).await?;
                    if response.status() != reqwest::StatusCode::UNAUTHORIZED {
                        return Ok(response);
                    }
                    warn!("[Fetch] {} 返回 401，尝试刷新 token", url);
                    unauthorized = Some(response);
                    state = FetchState::Refreshing;
                }
                FetchState::Refreshing => match self.auth.refresh_token().await {
                    Ok(()) => state = FetchState::Retried,
                    Err(e) => {
                        error!("[Fetch] 刷新 token 失败: {:?}", e);
                        state = FetchState::Failed;
                    }
                },
                FetchState::Retried => {
                    info!("[Fetch] 使用新 token 重试: {}", url);
                    // 重试结果无论是什么都直接返回，不会再次刷新
                    return self.send_once(request, &url, &operation_id).await;
                }
                FetchState::Failed => {
                    self.tokens().clear().await?;
                    self.listener
                        .on_sign_in_required(self.auth.sign_in_route().to_string())
                        .await;
                    return unauthorized
                        .take()
                        .ok_or_else(|| anyhow::anyhow!("缺少原始 401 响应"));
                }
            }
        }
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        url: &str,
        operation_id: &str,
    ) -> Result<reqwest::Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header("X-Request-ID", operation_id);

        if let Some(access) = self.tokens().access_token().await? {
            builder = builder.bearer_auth(access);
        }
        // 仅在有请求体时设置 Content-Type
        if let Some(body) = &request.body {
            builder = builder
                .header("Content-Type", "application/json")
                .json(body);
        }

        builder
            .send()
            .await
            .with_context(|| format!("请求失败: {} {}", request.method, url))
    }
}
