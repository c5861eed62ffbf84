use serde::{Deserialize, Deserializer};

/// 反序列化数组字段，处理 null 值
pub(crate) fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 从 JWT 的 payload 中解析用户 ID（优先 `userId`，其次 `sub`）
///
/// 不校验签名，仅用于本地缓存当前用户。格式不合法时返回 `None`。
pub fn extract_user_id(jwt: &str) -> Option<String> {
    use base64::Engine;

    let parts: Vec<&str> = jwt.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let payload = parts[1].trim_end_matches('=');
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .ok()?;
    let json: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    json.get("userId")
        .filter(|v| !v.is_null())
        .or_else(|| json.get("sub"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// 当前 UTC 时间（RFC 3339，毫秒精度）
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// 当前 UTC 毫秒时间戳
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn jwt_with(payload: serde_json::Value) -> String {
        let body = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&payload).unwrap());
        format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", body)
    }

    #[test]
    fn user_id_prefers_user_id_claim() {
        let token = jwt_with(serde_json::json!({ "userId": "u-1", "sub": "s-1" }));
        assert_eq!(extract_user_id(&token).as_deref(), Some("u-1"));
    }

    #[test]
    fn user_id_falls_back_to_sub() {
        let token = jwt_with(serde_json::json!({ "sub": "s-1" }));
        assert_eq!(extract_user_id(&token).as_deref(), Some("s-1"));
    }

    #[test]
    fn malformed_tokens_yield_none() {
        assert_eq!(extract_user_id("not-a-jwt"), None);
        assert_eq!(extract_user_id("a.%%%.c"), None);
        let numeric = jwt_with(serde_json::json!({ "userId": 42 }));
        assert_eq!(extract_user_id(&numeric), None);
    }
}
