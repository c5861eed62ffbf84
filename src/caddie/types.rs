use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error};

/// 请求失败时的默认错误信息
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

/// 统一的 API 错误结构（对应服务端 `{status, message, details?}`）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// 根据 HTTP 状态和原始响应体构造错误
    ///
    /// 响应体是 JSON 时取 `message` 字段，整个 JSON 作为 details；
    /// 否则使用默认信息，非空的原始文本（如网关的 HTML 错误页）保留在 details 中。
    pub fn from_body(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(json) => {
                let message = json
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or(DEFAULT_ERROR_MESSAGE)
                    .to_string();
                Self {
                    status,
                    message,
                    details: Some(json),
                }
            }
            Err(_) => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                Self {
                    status,
                    message: DEFAULT_ERROR_MESSAGE.to_string(),
                    details: (!text.is_empty()).then(|| serde_json::Value::String(text)),
                }
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

/// 从任意错误中提取可展示给用户的信息
///
/// 服务端结构化错误返回其 message，其它错误返回 `default`。
pub fn error_message(err: &anyhow::Error, default: &str) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) => api_err.message.clone(),
        None => default.to_string(),
    }
}

/// 删除类接口的通用响应
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OkResp {
    #[serde(default)]
    pub ok: bool,
}

/// 一次 API 调用的描述（可重复构建，用于 401 后的重试）
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: reqwest::Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: reqwest::Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// 为相对路径追加 URL 编码后的查询参数，参数为空时原样返回
pub fn path_with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let Ok(mut url) = reqwest::Url::parse("http://localhost/") else {
        return path.to_string();
    };
    url.query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
    format!("{}?{}", path, url.query().unwrap_or_default())
}

/// 由路径段拼出相对路径，每段单独做 URL 编码
///
/// 例如 `api_path(&["sessions", "a/b"])` 得到 `/sessions/a%2Fb`。
pub fn api_path(segments: &[&str]) -> String {
    let Ok(mut url) = reqwest::Url::parse("http://localhost/") else {
        return format!("/{}", segments.join("/"));
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_string()
}

/// 通用 HTTP 响应处理函数：2xx 反序列化为 `T`，否则转换为 `ApiError`
///
/// 204 或空响应体按 JSON `null` 反序列化（适用于 `()`、`Option<T>` 等）。
pub async fn handle_http_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> anyhow::Result<T> {
    use anyhow::Context;

    let status = response.status();

    // 读取 body bytes（只能读取一次）
    let body_bytes = response.bytes().await.context("读取响应 body 失败")?;
    let body_str = String::from_utf8_lossy(&body_bytes);
    debug!("[HTTP] {}响应 Body: {}", operation_name, body_str);

    if !status.is_success() {
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        return Err(ApiError::from_body(status.as_u16(), &body_bytes).into());
    }
    debug!("[HTTP] {}请求成功，HTTP状态: {}", operation_name, status);

    if status == reqwest::StatusCode::NO_CONTENT || body_bytes.is_empty() {
        return serde_json::from_value(serde_json::Value::Null)
            .map_err(|e| anyhow::anyhow!("{}响应为空，无法反序列化: {:?}", operation_name, e));
    }

    serde_json::from_slice(&body_bytes).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}\n原始响应: {}",
            operation_name, e, body_str
        );
        anyhow::anyhow!("反序列化响应失败: {:?}", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_reads_structured_message() {
        let err = ApiError::from_body(409, br#"{"status":409,"message":"Session closed"}"#);
        assert_eq!(err.status, 409);
        assert_eq!(err.message, "Session closed");
        assert!(err.details.is_some());
    }

    #[test]
    fn api_error_falls_back_to_text_then_default() {
        let err = ApiError::from_body(502, b"  Bad Gateway\n");
        assert_eq!(err.message, DEFAULT_ERROR_MESSAGE);
        assert_eq!(
            err.details,
            Some(serde_json::Value::String("Bad Gateway".to_string()))
        );

        let err = ApiError::from_body(500, b"");
        assert_eq!(err.message, DEFAULT_ERROR_MESSAGE);
        assert!(err.details.is_none());

        let err = ApiError::from_body(400, br#"{"error":"x"}"#);
        assert_eq!(err.message, DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn html_gateway_page_is_not_shown_as_message() {
        let page = b"<html><body><h1>502 Bad Gateway</h1></body></html>";
        let err: anyhow::Error = ApiError::from_body(502, page).into();
        assert_eq!(error_message(&err, "Failed"), DEFAULT_ERROR_MESSAGE);
        let api = err.downcast_ref::<ApiError>().unwrap();
        assert_eq!(api.status, 502);
        assert_eq!(
            api.details.as_ref().and_then(|d| d.as_str()),
            Some("<html><body><h1>502 Bad Gateway</h1></body></html>")
        );
    }

    #[test]
    fn path_segments_are_encoded_one_by_one() {
        assert_eq!(api_path(&["sessions", "s1", "summary"]), "/sessions/s1/summary");
        assert_eq!(api_path(&["sessions", "a/b?c#d"]), "/sessions/a%2Fb%3Fc%23d");
        assert_eq!(api_path(&["clubs", "7 iron"]), "/clubs/7%20iron");
        assert!(!api_path(&["shots", "..", "post"]).contains("/../"));
    }

    #[test]
    fn query_pairs_are_encoded_and_optional() {
        assert_eq!(path_with_query("/clubs", &[]), "/clubs");
        assert_eq!(
            path_with_query(
                "/metrics/overview",
                &[("since", "2026-01-01".into()), ("club", "7 iron".into())]
            ),
            "/metrics/overview?since=2026-01-01&club=7+iron"
        );
    }

    #[test]
    fn error_message_uses_default_for_non_api_errors() {
        let api: anyhow::Error = ApiError::from_body(400, br#"{"message":"Club required"}"#).into();
        assert_eq!(error_message(&api, "Failed"), "Club required");

        let other = anyhow::anyhow!("connection reset");
        assert_eq!(error_message(&other, "Failed"), "Failed");
    }
}
