use serde::{Deserialize, Serialize};

/// 服务端球杆
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Club {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub club_type: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// 服务端球杆类型（`GET /clubs/types`）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClubTypeInfo {
    pub id: String,
    pub label: String,
    pub code: String,
}

/// 创建/更新球杆的请求体（部分字段）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClubInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub club_type: Option<String>,
}
