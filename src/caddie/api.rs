//! 统一 API 客户端
//!
//! - 通过 [`AuthFetch`] 附带 Bearer token 并处理刷新
//! - 成功响应反序列化为 `T`，失败统一转换为 [`ApiError`](crate::caddie::types::ApiError)

use crate::caddie::fetch::AuthFetch;
use crate::caddie::types::{handle_http_response, ApiRequest};
use anyhow::{Context, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// 带类型的 REST 客户端（get/post/patch/delete）
#[derive(Clone)]
pub struct ApiClient {
    fetch: Arc<AuthFetch>,
}

impl ApiClient {
    pub fn new(fetch: Arc<AuthFetch>) -> Self {
        Self { fetch }
    }

    pub fn fetch(&self) -> &AuthFetch {
        &self.fetch
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(ApiRequest::new(Method::GET, path)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).context("序列化请求体失败")?;
        self.call(ApiRequest::new(Method::POST, path).with_body(body))
            .await
    }

    /// 不带请求体的 POST
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(ApiRequest::new(Method::POST, path)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body).context("序列化请求体失败")?;
        self.call(ApiRequest::new(Method::PATCH, path).with_body(body))
            .await
    }

    pub async fn del<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.call(ApiRequest::new(Method::DELETE, path)).await
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let operation = format!("{} {}", request.method, request.path);
        let response = self.fetch.send(&request).await?;
        handle_http_response(response, &operation).await
    }
}
