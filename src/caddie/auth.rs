//! 认证接口：登录、注册、刷新 token、Google 登录地址、退出登录
//!
//! 这些接口不经过 [`AuthFetch`](crate::caddie::fetch::AuthFetch)，直接使用裸 HTTP 客户端。

use crate::caddie::token::{TokenStore, Tokens};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// 认证状态监听器（取代浏览器端的页面跳转）
#[async_trait]
pub trait AuthListener: Send + Sync {
    /// 需要重新登录（刷新失败或主动退出），参数为登录页路由
    async fn on_sign_in_required(&self, route: String);
}

/// 默认空实现（无操作）
pub struct EmptyAuthListener;

#[async_trait]
impl AuthListener for EmptyAuthListener {
    async fn on_sign_in_required(&self, _route: String) {}
}

#[derive(Debug, Serialize)]
struct CredentialsReq<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshReq<'a> {
    user_id: &'a str,
    refresh_token: &'a str,
}

/// 当前登录用户信息（`GET /auth/profile`）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

/// 拼接完整 URL：绝对地址原样返回，相对路径补齐前导 `/` 后加上基础地址
pub fn resolve_url(api_base_url: &str, path: &str) -> String {
    let lower = path.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{}{}", api_base_url, path)
    } else {
        format!("{}/{}", api_base_url, path)
    }
}

/// 认证相关的 HTTP API 客户端
pub struct AuthApi {
    client: reqwest::Client,
    api_base_url: String,
    tokens: TokenStore,
    listener: Arc<dyn AuthListener>,
    sign_in_route: String,
}

impl AuthApi {
    pub fn new(
        client: reqwest::Client,
        api_base_url: String,
        tokens: TokenStore,
        listener: Arc<dyn AuthListener>,
        sign_in_route: String,
    ) -> Self {
        Self {
            client,
            api_base_url,
            tokens,
            listener,
            sign_in_route,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn sign_in_route(&self) -> &str {
        &self.sign_in_route
    }

    /// 邮箱密码登录，成功后保存 token
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        info!("[Auth] 🔐 正在登录: {}", email);
        let tokens = self
            .post_for_tokens("/auth/login", &CredentialsReq { email, password }, "Login failed")
            .await?;
        self.tokens.set_tokens(&tokens).await?;
        info!("[Auth] ✅ 登录成功");
        Ok(())
    }

    /// 注册新账号，成功后保存 token
    pub async fn signup(&self, email: &str, password: &str) -> Result<()> {
        info!("[Auth] 📝 正在注册: {}", email);
        let tokens = self
            .post_for_tokens("/auth/signup", &CredentialsReq { email, password }, "Signup failed")
            .await?;
        self.tokens.set_tokens(&tokens).await?;
        info!("[Auth] ✅ 注册成功");
        Ok(())
    }

    /// 使用本地保存的 refresh token 和用户 ID 换取新 token
    pub async fn refresh_token(&self) -> Result<()> {
        let refresh_token = self.tokens.refresh_token().await?;
        let user_id = self.tokens.user_id().await?;
        let (Some(refresh_token), Some(user_id)) = (refresh_token, user_id) else {
            return Err(anyhow::anyhow!("Missing refresh credentials"));
        };

        debug!("[Auth] 🔄 刷新 token，用户ID: {}", user_id);
        let tokens = self
            .post_for_tokens(
                "/auth/refresh",
                &RefreshReq {
                    user_id: &user_id,
                    refresh_token: &refresh_token,
                },
                "Refresh failed",
            )
            .await?;
        self.tokens.set_tokens(&tokens).await?;
        info!("[Auth] ✅ token 刷新成功");
        Ok(())
    }

    /// 清除凭据并通知跳转到登录页
    pub async fn logout(&self) -> Result<()> {
        self.tokens.clear().await?;
        info!("[Auth] 👋 已退出登录");
        self.listener
            .on_sign_in_required(self.sign_in_route.clone())
            .await;
        Ok(())
    }

    /// 后端 Google OAuth 入口地址
    pub fn google_auth_url(&self) -> String {
        resolve_url(&self.api_base_url, "/auth/google")
    }

    async fn post_for_tokens<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        default_error: &str,
    ) -> Result<Tokens> {
        let url = resolve_url(&self.api_base_url, path);
        debug!("[Auth]   请求URL: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .context("请求失败")?;

        let status = response.status();
        let text = response.text().await.context("读取响应失败")?;

        if !status.is_success() {
            error!("[Auth] {} 请求失败，HTTP状态: {}, 响应: {}", path, status, text);
            // 响应体可能是 JSON（取 message）也可能是纯文本
            let message = match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(serde_json::Value::String(s)) => s,
                Ok(json) => json
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or(default_error)
                    .to_string(),
                Err(_) if !text.trim().is_empty() => text,
                Err(_) => default_error.to_string(),
            };
            return Err(anyhow::anyhow!(message));
        }

        serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("解析 token 响应失败: {}，原始响应: {}", e, text))
    }
}
