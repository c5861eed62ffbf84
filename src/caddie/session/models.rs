//! 场次相关数据模型

use crate::caddie::serialization::now_rfc3339;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 练习模式
///
/// 服务端使用大写编码（`FREE`/`SHORT`/`LONG`/`PUTTING`），本地摘要使用小写编码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionMode {
    #[default]
    Free,
    Short,
    Long,
    Putting,
}

impl SessionMode {
    pub const ALL: [SessionMode; 4] = [
        SessionMode::Free,
        SessionMode::Long,
        SessionMode::Short,
        SessionMode::Putting,
    ];

    /// 本地编码（`free`/`short`/`long`/`putting`）
    pub fn local_code(&self) -> &'static str {
        match self {
            SessionMode::Free => "free",
            SessionMode::Short => "short",
            SessionMode::Long => "long",
            SessionMode::Putting => "putting",
        }
    }

    /// 选择界面上的名称
    pub fn label(&self) -> &'static str {
        match self {
            SessionMode::Free => "Free session",
            SessionMode::Long => "Long game",
            SessionMode::Short => "Short game",
            SessionMode::Putting => "Putting",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SessionMode::Free => "No specific focus",
            SessionMode::Long => "≥ 150 yards",
            SessionMode::Short => "< 150 yards",
            SessionMode::Putting => "Greens work",
        }
    }

    /// 场次标题，例如 `Short session`
    pub fn session_title(&self) -> String {
        let code = self.local_code();
        let mut chars = code.chars();
        match chars.next() {
            Some(first) => format!("{}{} session", first.to_ascii_uppercase(), chars.as_str()),
            None => "Range session".to_string(),
        }
    }

    pub fn is_putting(&self) -> bool {
        matches!(self, SessionMode::Putting)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.local_code())
    }
}

impl FromStr for SessionMode {
    type Err = String;

    /// 同时接受本地编码和服务端编码
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(SessionMode::Free),
            "short" => Ok(SessionMode::Short),
            "long" => Ok(SessionMode::Long),
            "putting" => Ok(SessionMode::Putting),
            _ => Err(format!("unknown session mode: {}", s)),
        }
    }
}

/// 场次击球计数（`_count`）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionCount {
    #[serde(default)]
    pub shots: u32,
}

/// 服务端场次
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    /// 未知或缺失的模式按 `None` 处理
    #[serde(default, deserialize_with = "deserialize_lenient_mode")]
    pub mode: Option<SessionMode>,
    #[serde(rename = "_count", default)]
    pub count: Option<SessionCount>,
}

fn deserialize_lenient_mode<'de, D>(deserializer: D) -> Result<Option<SessionMode>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// 本地保存的场次摘要（最近场次列表的元素）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalSessionSummary {
    pub id: String,
    /// RFC 3339 时间
    pub date: String,
    /// 本地编码：`free`/`short`/`long`/`putting`
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub shots: u32,
}

impl From<&Session> for LocalSessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            date: session.created_at.clone().unwrap_or_else(now_rfc3339),
            mode: session.mode.unwrap_or_default().local_code().to_string(),
            title: None,
            shots: session.count.as_ref().map(|c| c.shots).unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_session_maps_to_local_summary() {
        let session: Session = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "createdAt": "2026-03-01T10:00:00.000Z",
            "mode": "PUTTING",
            "_count": { "shots": 12 }
        }))
        .unwrap();
        let summary = LocalSessionSummary::from(&session);
        assert_eq!(summary.mode, "putting");
        assert_eq!(summary.shots, 12);
        assert_eq!(summary.date, "2026-03-01T10:00:00.000Z");
    }

    #[test]
    fn unknown_or_missing_mode_becomes_free() {
        for mode in [serde_json::json!(null), serde_json::json!("WEIRD")] {
            let session: Session =
                serde_json::from_value(serde_json::json!({ "id": "s2", "mode": mode })).unwrap();
            let summary = LocalSessionSummary::from(&session);
            assert_eq!(summary.mode, "free");
            assert_eq!(summary.shots, 0);
            assert!(!summary.date.is_empty());
        }
    }

    #[test]
    fn session_titles_capitalize_the_mode() {
        assert_eq!(SessionMode::Short.session_title(), "Short session");
        assert_eq!(SessionMode::Putting.session_title(), "Putting session");
    }
}
