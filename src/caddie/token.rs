//! Token 存储：access/refresh token 以及从 JWT 中解析出的用户 ID

use crate::caddie::kv::{keys, LocalKvDao};
use crate::caddie::serialization::extract_user_id;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// 登录、注册、刷新接口返回的 token 对
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token 存储（键值表的薄封装）
#[derive(Clone)]
pub struct TokenStore {
    kv: LocalKvDao,
}

impl TokenStore {
    pub fn new(kv: LocalKvDao) -> Self {
        Self { kv }
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        self.kv.get(keys::ACCESS_TOKEN).await
    }

    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.kv.get(keys::REFRESH_TOKEN).await
    }

    pub async fn user_id(&self) -> Result<Option<String>> {
        self.kv.get(keys::USER_ID).await
    }

    /// 保存 token，并在能解析时同步更新用户 ID
    pub async fn set_tokens(&self, tokens: &Tokens) -> Result<()> {
        self.kv.set(keys::ACCESS_TOKEN, &tokens.access_token).await?;
        self.kv.set(keys::REFRESH_TOKEN, &tokens.refresh_token).await?;
        match extract_user_id(&tokens.access_token) {
            Some(user_id) => {
                debug!("[TokenStore] 从 access token 解析到用户ID: {}", user_id);
                self.kv.set(keys::USER_ID, &user_id).await?;
            }
            None => warn!("[TokenStore] access token 中没有可用的用户ID，保留原值"),
        }
        Ok(())
    }

    /// 清除全部凭据
    pub async fn clear(&self) -> Result<()> {
        self.kv.remove(keys::ACCESS_TOKEN).await?;
        self.kv.remove(keys::REFRESH_TOKEN).await?;
        self.kv.remove(keys::USER_ID).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caddie::db::create_sqlite_pool_with_migration;
    use base64::Engine;

    #[tokio::test]
    async fn set_tokens_derives_user_id_and_clear_removes_all() {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        let store = TokenStore::new(LocalKvDao::new(pool));

        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(br#"{"userId":"golfer-7"}"#);
        let tokens = Tokens {
            access_token: format!("h.{}.s", payload),
            refresh_token: "r-1".to_string(),
        };
        store.set_tokens(&tokens).await.unwrap();

        assert_eq!(store.user_id().await.unwrap().as_deref(), Some("golfer-7"));
        assert_eq!(store.refresh_token().await.unwrap().as_deref(), Some("r-1"));

        store.clear().await.unwrap();
        assert_eq!(store.access_token().await.unwrap(), None);
        assert_eq!(store.refresh_token().await.unwrap(), None);
        assert_eq!(store.user_id().await.unwrap(), None);
    }
}
