use crate::caddie::enums::{
    DispersionBand, DispersionDirection, DistanceBand, ShotFlight, SwingPath, Trajectory,
};
use serde::{Deserialize, Serialize};

/// 球位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lie {
    Tee,
    Fairway,
    FirstCut,
    Rough,
    Bunker,
    Hardpan,
    Uphill,
    Downhill,
    Sidehill,
}

/// 击球前意图（`POST /sessions/:id/shots/pre`），未设置的字段不序列化
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreShotInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_code: Option<String>,
    /// 目标距离区间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<DistanceBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lie: Option<Lie>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intended_flight: Option<ShotFlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intended_trajectory: Option<Trajectory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intended_dispersion: Option<DispersionBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intended_swing_path: Option<SwingPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aim_offset: Option<f64>,
}

/// 击球后结果（`POST /shots/:id/post`），未设置的字段不序列化
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostShotInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_flight: Option<ShotFlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trajectory: Option<Trajectory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_trajectory: Option<Trajectory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_band: Option<DistanceBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispersion_band: Option<DispersionBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispersion_direction: Option<DispersionDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lateral: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swing_path: Option<SwingPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// 服务端结果枚举
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_enum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// 服务端击球记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shot {
    pub id: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub pre_shot: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub post_shot: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let body = PreShotInput {
            club: Some("IRON7".to_string()),
            target: "Y140_150".parse().ok(),
            intended_swing_path: Some(SwingPath::InToOut),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "club": "IRON7",
                "target": "Y140_150",
                "intendedSwingPath": "IN-TO-OUT"
            })
        );
        assert_eq!(
            serde_json::to_value(PostShotInput::default()).unwrap(),
            serde_json::json!({})
        );
    }
}
