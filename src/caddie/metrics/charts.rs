//! 图表数据准备
//!
//! 只负责把接口数据整理成图表序列，不涉及渲染。

use crate::caddie::enums::Trajectory;
use crate::caddie::metrics::types::{
    ContactCount, GappingEntry, IntendedActualPair, OverviewSession, PracticeDay, ScatterPoint,
    SummaryShot,
};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const UNKNOWN: &str = "UNKNOWN";
const ROLLING_WINDOW: usize = 3;

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchRatePoint {
    pub date: String,
    pub match_rate_percent: f64,
    pub rolling_avg: f64,
}

/// 命中率走势：百分比保留一位小数，附带最近 3 个场次的滚动平均
pub fn match_rate_series(sessions: &[OverviewSession]) -> Vec<MatchRatePoint> {
    let percents: Vec<f64> = sessions
        .iter()
        .map(|s| (s.match_rate * 1000.0).round() / 10.0)
        .collect();

    sessions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let start = i.saturating_sub(ROLLING_WINDOW - 1);
            let window = &percents[start..=i];
            let rolling = window.iter().sum::<f64>() / window.len() as f64;
            MatchRatePoint {
                date: s.date.clone(),
                match_rate_percent: percents[i],
                rolling_avg: round1(rolling),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GappingBar {
    pub club: String,
    pub avg_carry: f64,
    pub stdev: f64,
    pub error_top: f64,
    pub error_bottom: f64,
}

/// 球杆距离间隔：去掉没有平均距离的球杆，按平均距离升序，误差线下界不低于 0
pub fn gapping_series(entries: &[GappingEntry]) -> Vec<GappingBar> {
    let mut bars: Vec<GappingBar> = entries
        .iter()
        .filter_map(|e| {
            let avg = e.avg_carry?;
            let stdev = e.stdev.unwrap_or(0.0);
            Some(GappingBar {
                club: e.club.clone().unwrap_or_default(),
                avg_carry: avg,
                stdev,
                error_top: avg + stdev,
                error_bottom: (avg - stdev).max(0.0),
            })
        })
        .collect();
    bars.sort_by(|a, b| a.avg_carry.total_cmp(&b.avg_carry));
    bars
}

/// ISO 周编号，例如 `2026-W03`
pub fn iso_week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeeklyVolume {
    pub week: String,
    pub shots: u32,
}

/// 按 ISO 周汇总练习量；无法解析的日期被跳过
pub fn practice_volume_by_week(days: &[PracticeDay]) -> Vec<WeeklyVolume> {
    let mut buckets: BTreeMap<String, u32> = BTreeMap::new();
    for day in days {
        let Ok(date) = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d") else {
            continue;
        };
        *buckets.entry(iso_week_key(date)).or_insert(0) += day.shots;
    }
    buckets
        .into_iter()
        .map(|(week, shots)| WeeklyVolume { week, shots })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrajectoryCount {
    pub trajectory: Trajectory,
    pub label: String,
    pub count: u32,
}

/// 实际弹道分布，固定为 LOW/MEDIUM/HIGH 三项；无法识别的弹道不计入
pub fn trajectory_counts(pairs: &[IntendedActualPair]) -> Vec<TrajectoryCount> {
    Trajectory::ALL
        .iter()
        .map(|t| {
            let count = pairs
                .iter()
                .filter(|p| {
                    p.actual
                        .as_deref()
                        .is_some_and(|a| a.eq_ignore_ascii_case(t.code()))
                })
                .map(|p| p.count)
                .sum();
            TrajectoryCount {
                trajectory: *t,
                label: t.label(),
                count,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IntentionRow {
    /// 意图球路；未知时为 `Unknown`
    pub intended: String,
    /// 实际球路 -> 次数（包含所有列，缺失为 0）
    pub counts: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentionMatrix {
    /// 列（实际球路，排序后；未知为 `UNKNOWN`）
    pub actual_keys: Vec<String>,
    pub rows: Vec<IntentionRow>,
}

/// 意图球路 × 实际球路 的堆叠矩阵
pub fn intention_result_matrix(pairs: &[IntendedActualPair]) -> IntentionMatrix {
    let mut by_intended: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
    let mut actual_keys: BTreeSet<String> = BTreeSet::new();

    for pair in pairs {
        let intended = pair.intended.clone().unwrap_or_else(|| UNKNOWN.to_string());
        let actual = pair.actual.clone().unwrap_or_else(|| UNKNOWN.to_string());
        actual_keys.insert(actual.clone());
        *by_intended
            .entry(intended)
            .or_default()
            .entry(actual)
            .or_insert(0) += pair.count;
    }

    let rows = by_intended
        .into_iter()
        .map(|(intended, bucket)| IntentionRow {
            intended: if intended == UNKNOWN {
                "Unknown".to_string()
            } else {
                intended
            },
            counts: actual_keys
                .iter()
                .map(|k| (k.clone(), bucket.get(k).copied().unwrap_or(0)))
                .collect(),
        })
        .collect();

    IntentionMatrix {
        actual_keys: actual_keys.into_iter().collect(),
        rows,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DispersionPoint {
    /// 横向偏差（码）
    pub x: f64,
    /// 落点距离（码）
    pub y: f64,
    pub club: Option<String>,
    pub intended_flight: Option<String>,
    pub actual_flight: Option<String>,
}

/// 散布点：有击球明细时使用明细（带球杆和球路），否则使用汇总散点
pub fn dispersion_points(scatter: &[ScatterPoint], shots: Option<&[SummaryShot]>) -> Vec<DispersionPoint> {
    if let Some(shots) = shots.filter(|s| !s.is_empty()) {
        return shots
            .iter()
            .filter_map(|s| {
                Some(DispersionPoint {
                    x: s.lateral?,
                    y: s.distance?,
                    club: s.club.clone(),
                    intended_flight: s.intended_flight.clone(),
                    actual_flight: s.actual_flight.clone(),
                })
            })
            .collect();
    }
    scatter
        .iter()
        .filter_map(|p| {
            Some(DispersionPoint {
                x: p.lateral?,
                y: p.distance?,
                club: None,
                intended_flight: None,
                actual_flight: None,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContactSlice {
    pub contact_type: String,
    pub count: u32,
    /// 占比（百分比，一位小数）
    pub percent: f64,
}

/// 击球质量占比
pub fn contact_breakdown(contact: &[ContactCount]) -> Vec<ContactSlice> {
    let total = contact.iter().map(|c| c.count).sum::<u32>().max(1);
    contact
        .iter()
        .map(|c| ContactSlice {
            contact_type: c.contact_type.clone(),
            count: c.count,
            percent: round1(c.count as f64 * 100.0 / total as f64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(date: &str, rate: f64) -> OverviewSession {
        OverviewSession {
            id: date.to_string(),
            date: date.to_string(),
            match_rate: rate,
            avg_dispersion: 0.0,
            mode: None,
            shots: 10,
        }
    }

    fn pair(intended: Option<&str>, actual: Option<&str>, count: u32) -> IntendedActualPair {
        IntendedActualPair {
            intended: intended.map(str::to_string),
            actual: actual.map(str::to_string),
            count,
        }
    }

    #[test]
    fn match_rate_uses_trailing_three_session_average() {
        let series = match_rate_series(&[
            session("d1", 0.5),
            session("d2", 0.25),
            session("d3", 0.1234),
            session("d4", 1.0),
        ]);
        let percents: Vec<f64> = series.iter().map(|p| p.match_rate_percent).collect();
        assert_eq!(percents, vec![50.0, 25.0, 12.3, 100.0]);
        assert_eq!(series[0].rolling_avg, 50.0);
        assert_eq!(series[1].rolling_avg, 37.5);
        assert_eq!(series[2].rolling_avg, 29.1);
        assert_eq!(series[3].rolling_avg, 45.8);
    }

    #[test]
    fn gapping_sorted_by_carry_with_clamped_error_bars() {
        let bars = gapping_series(&[
            GappingEntry { club: Some("DRIVER".into()), avg_carry: Some(230.0), stdev: Some(12.0) },
            GappingEntry { club: Some("LW".into()), avg_carry: Some(5.0), stdev: Some(8.0) },
            GappingEntry { club: Some("IRON9".into()), avg_carry: None, stdev: Some(3.0) },
        ]);
        let clubs: Vec<&str> = bars.iter().map(|b| b.club.as_str()).collect();
        assert_eq!(clubs, vec!["LW", "DRIVER"]);
        assert_eq!(bars[0].error_bottom, 0.0);
        assert_eq!(bars[1].error_top, 242.0);
    }

    #[test]
    fn practice_volume_groups_by_iso_week() {
        let days = vec![
            PracticeDay { date: "2026-01-01".into(), shots: 10 },
            PracticeDay { date: "2026-01-04".into(), shots: 5 },
            PracticeDay { date: "2026-01-05".into(), shots: 7 },
            PracticeDay { date: "2024-12-30".into(), shots: 1 },
            PracticeDay { date: "not a date".into(), shots: 99 },
        ];
        let weeks = practice_volume_by_week(&days);
        assert_eq!(
            weeks,
            vec![
                WeeklyVolume { week: "2025-W01".into(), shots: 1 },
                WeeklyVolume { week: "2026-W01".into(), shots: 15 },
                WeeklyVolume { week: "2026-W02".into(), shots: 7 },
            ]
        );
    }

    #[test]
    fn trajectory_counts_only_known_buckets() {
        let counts = trajectory_counts(&[
            pair(Some("LOW"), Some("high"), 2),
            pair(None, Some("HIGH"), 3),
            pair(None, Some("SKY"), 9),
            pair(None, None, 4),
        ]);
        let values: Vec<u32> = counts.iter().map(|c| c.count).collect();
        assert_eq!(values, vec![0, 0, 5]);
        assert_eq!(counts[2].label, "High");
    }

    #[test]
    fn intention_matrix_fills_missing_cells_with_zero() {
        let matrix = intention_result_matrix(&[
            pair(Some("DRAW"), Some("HOOK"), 2),
            pair(Some("DRAW"), Some("DRAW"), 3),
            pair(None, Some("FADE"), 1),
            pair(Some("DRAW"), Some("HOOK"), 1),
        ]);
        assert_eq!(matrix.actual_keys, vec!["DRAW", "FADE", "HOOK"]);
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].intended, "DRAW");
        assert_eq!(matrix.rows[0].counts["HOOK"], 3);
        assert_eq!(matrix.rows[0].counts["FADE"], 0);
        assert_eq!(matrix.rows[1].intended, "Unknown");
    }

    #[test]
    fn dispersion_prefers_shot_detail_and_skips_incomplete_points() {
        let scatter = vec![ScatterPoint { distance: Some(100.0), lateral: Some(-3.0) }];
        let shots = vec![
            SummaryShot {
                shot_id: "a".into(),
                created_at: None,
                club: Some("IRON8".into()),
                intended_flight: Some("DRAW".into()),
                actual_flight: Some("PUSH".into()),
                distance: Some(140.0),
                lateral: Some(6.5),
                trajectory: None,
                contact: None,
            },
            SummaryShot {
                shot_id: "b".into(),
                created_at: None,
                club: None,
                intended_flight: None,
                actual_flight: None,
                distance: None,
                lateral: Some(1.0),
                trajectory: None,
                contact: None,
            },
        ];
        let points = dispersion_points(&scatter, Some(shots.as_slice()));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].club.as_deref(), Some("IRON8"));

        let points = dispersion_points(&scatter, Some(&[][..]));
        assert_eq!(points[0].x, -3.0);
    }

    #[test]
    fn contact_percentages_have_one_decimal() {
        let slices = contact_breakdown(&[
            ContactCount { contact_type: "PURE".into(), count: 2 },
            ContactCount { contact_type: "FAT".into(), count: 1 },
        ]);
        assert_eq!(slices[0].percent, 66.7);
        assert_eq!(slices[1].percent, 33.3);
        assert!(contact_breakdown(&[]).is_empty());
    }
}
