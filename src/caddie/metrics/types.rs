//! 统计接口的请求参数与响应结构

use crate::caddie::serialization::deserialize_vec_or_null;
use serde::{Deserialize, Serialize};

/// 全部球杆（不按球杆过滤）
pub const ALL_CLUBS: &str = "ALL";

/// 意图与实际的组合计数（球路或弹道）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntendedActualPair {
    #[serde(default)]
    pub intended: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AvgAggregates {
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub dispersion: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryAggregates {
    #[serde(rename = "_avg", default)]
    pub avg: AvgAggregates,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClubCount {
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScatterPoint {
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub lateral: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactCount {
    #[serde(rename = "type")]
    pub contact_type: String,
    #[serde(default)]
    pub count: u32,
}

/// 单场汇总中的击球明细
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryShot {
    pub shot_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub intended_flight: Option<String>,
    #[serde(default)]
    pub actual_flight: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub lateral: Option<f64>,
    #[serde(default)]
    pub trajectory: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

/// 单场汇总（`GET /sessions/:id/summary`）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub pairs: Vec<IntendedActualPair>,
    #[serde(default)]
    pub aggregates: SummaryAggregates,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub by_club: Vec<ClubCount>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub scatter: Vec<ScatterPoint>,
    #[serde(default)]
    pub trajectory_pairs: Option<Vec<IntendedActualPair>>,
    #[serde(default)]
    pub contact: Option<Vec<ContactCount>>,
    #[serde(default)]
    pub shots: Option<Vec<SummaryShot>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSession {
    pub id: String,
    pub date: String,
    #[serde(default)]
    pub match_rate: f64,
    #[serde(default)]
    pub avg_dispersion: f64,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub shots: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GappingEntry {
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub avg_carry: Option<f64>,
    #[serde(default)]
    pub stdev: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PracticeDay {
    pub date: String,
    #[serde(default)]
    pub shots: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissTrendPoint {
    pub date: String,
    #[serde(default)]
    pub left: u32,
    #[serde(default)]
    pub right: u32,
    #[serde(default)]
    pub short: u32,
    #[serde(default)]
    pub long: u32,
    #[serde(default)]
    pub other: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverviewShot {
    pub date: String,
    pub session_id: String,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub intended_flight: Option<String>,
    #[serde(default)]
    pub actual_flight: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub lateral: Option<f64>,
}

/// 总览指标（`GET /metrics/overview`）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverviewMetrics {
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub sessions: Vec<OverviewSession>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub gapping: Vec<GappingEntry>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub practice_calendar: Vec<PracticeDay>,
    #[serde(default, deserialize_with = "deserialize_vec_or_null")]
    pub miss_trend: Vec<MissTrendPoint>,
    #[serde(default)]
    pub shots: Option<Vec<OverviewShot>>,
}

fn club_filter(club: Option<&str>) -> Option<&str> {
    club.filter(|c| !c.is_empty() && *c != ALL_CLUBS)
}

/// 总览查询参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewParams {
    pub since: Option<String>,
    pub club: Option<String>,
    pub include_shots: bool,
    pub limit_shots: Option<u32>,
}

impl OverviewParams {
    /// 查询字符串参数（`club=ALL` 不发送）
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(since) = self.since.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("since", since.to_string()));
        }
        if let Some(club) = club_filter(self.club.as_deref()) {
            pairs.push(("club", club.to_string()));
        }
        if self.include_shots {
            pairs.push(("includeShots", "true".to_string()));
        }
        if let Some(limit) = self.limit_shots.filter(|l| *l > 0) {
            pairs.push(("limitShots", limit.to_string()));
        }
        pairs
    }
}

/// 单场汇总查询参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryOptions {
    pub club: Option<String>,
    pub include_shots: bool,
    pub limit_shots: Option<u32>,
}

impl SummaryOptions {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(club) = club_filter(self.club.as_deref()) {
            pairs.push(("club", club.to_string()));
        }
        if self.include_shots {
            pairs.push(("includeShots", "true".to_string()));
        }
        if let Some(limit) = self.limit_shots.filter(|l| *l > 0) {
            pairs.push(("limitShots", limit.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_tolerates_null_arrays_and_missing_optionals() {
        let summary: SessionSummary = serde_json::from_value(serde_json::json!({
            "pairs": null,
            "aggregates": { "_avg": { "distance": 142.5, "dispersion": null } },
            "byClub": [{ "club": "IRON7", "count": 4 }],
            "scatter": []
        }))
        .unwrap();
        assert!(summary.pairs.is_empty());
        assert_eq!(summary.aggregates.avg.distance, Some(142.5));
        assert_eq!(summary.by_club[0].club.as_deref(), Some("IRON7"));
        assert!(summary.shots.is_none());
    }

    #[test]
    fn all_clubs_filter_is_not_sent() {
        let params = OverviewParams {
            club: Some(ALL_CLUBS.to_string()),
            include_shots: true,
            limit_shots: Some(0),
            ..Default::default()
        };
        assert_eq!(params.query_pairs(), vec![("includeShots", "true".to_string())]);

        let opts = SummaryOptions {
            club: Some("DRIVER".to_string()),
            include_shots: false,
            limit_shots: Some(1000),
        };
        assert_eq!(
            opts.query_pairs(),
            vec![("club", "DRIVER".to_string()), ("limitShots", "1000".to_string())]
        );
    }
}
