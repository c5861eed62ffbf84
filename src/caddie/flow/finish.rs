//! 完成页展示：意图与结果的对比

use crate::caddie::enums::{
    band_delta, dispersion_band_label, distance_band_label, format_delta, DeltaTone,
    DISPERSION_PREFIX, DISTANCE_PREFIX,
};
use crate::caddie::flow::models::{RangeDraft, ShotDraft};
use serde::Serialize;

/// 推杆模式完成页提示
pub const PUTTING_NOTICE: &str =
    "We’re still building the full Putting workflow. You can explore the flow, but saving is disabled for now.";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightRow {
    pub intended: Option<String>,
    pub actual: Option<String>,
    /// 两者都有时是否一致
    pub matched: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeltaRow {
    pub intended: Option<String>,
    pub actual: Option<String>,
    pub delta: Option<i32>,
    pub delta_text: Option<String>,
    pub tone: Option<DeltaTone>,
}

impl DeltaRow {
    fn new(intended: Option<String>, actual: Option<String>, delta: Option<i32>) -> Self {
        Self {
            intended,
            actual,
            delta,
            delta_text: delta.map(format_delta),
            tone: delta.map(DeltaTone::classify),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RangeFinishView {
    pub club_label: Option<String>,
    pub flight: FlightRow,
    pub distance: DeltaRow,
    pub dispersion: DeltaRow,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FinishView {
    Range(RangeFinishView),
    PuttingNotice { message: String },
}

impl FinishView {
    pub fn from_draft(draft: &ShotDraft) -> Self {
        match draft {
            ShotDraft::Range(d) => FinishView::Range(range_view(d)),
            ShotDraft::Putting(_) => FinishView::PuttingNotice {
                message: PUTTING_NOTICE.to_string(),
            },
        }
    }
}

fn range_view(d: &RangeDraft) -> RangeFinishView {
    let intended_distance = d.intended_distance.map(|b| b.token());
    let actual_distance = d.actual_distance.map(|b| b.token());
    let intended_dispersion = d.intended_dispersion.map(|b| b.token());
    let actual_dispersion = d.actual_dispersion.map(|b| b.token());

    RangeFinishView {
        club_label: d.club.map(|c| c.label()),
        flight: FlightRow {
            intended: d.intended_flight.map(|f| f.label()),
            actual: d.actual_flight.map(|f| f.label()),
            matched: match (d.intended_flight, d.actual_flight) {
                (Some(i), Some(a)) => Some(i == a),
                _ => None,
            },
        },
        distance: DeltaRow::new(
            intended_distance.as_deref().map(distance_band_label),
            actual_distance.as_deref().map(distance_band_label),
            band_delta(
                intended_distance.as_deref(),
                actual_distance.as_deref(),
                DISTANCE_PREFIX,
            ),
        ),
        dispersion: DeltaRow::new(
            intended_dispersion.as_deref().map(dispersion_band_label),
            actual_dispersion.as_deref().map(dispersion_band_label),
            band_delta(
                intended_dispersion.as_deref(),
                actual_dispersion.as_deref(),
                DISPERSION_PREFIX,
            ),
        ),
    }
}
