//! 向导中的击球草稿
//!
//! 练习场模式与推杆模式的字段集合完全不同，用 [`ShotDraft`] 区分，选择模式时创建对应变体。

use crate::caddie::enums::{
    ClubType, DispersionBand, DispersionDirection, DistanceBand, MissSide, PuttBreak, PuttSpeed,
    ShotFlight, ShotResult, SwingPath, Trajectory,
};
use crate::caddie::session::SessionMode;
use crate::caddie::shot::{PostShotInput, PreShotInput};

pub const RANGE_PRE_STEPS: usize = 6;
pub const RANGE_POST_STEPS: usize = 7;
pub const PUTTING_PRE_STEPS: usize = 3;
pub const PUTTING_POST_STEPS: usize = 4;

const RANGE_PRE_TITLES: [&str; RANGE_PRE_STEPS] = [
    "Club",
    "Target Distance",
    "Intended Flight",
    "Intended Dispersion",
    "Intended Trajectory",
    "Intended Swing Path",
];
const RANGE_POST_TITLES: [&str; RANGE_POST_STEPS] = [
    "Distance",
    "Dispersion",
    "Actual Flight",
    "Actual Trajectory",
    "Actual Swing Path",
    "Result",
    "Notes",
];
const PUTTING_PRE_TITLES: [&str; PUTTING_PRE_STEPS] = ["Putt Distance", "Break", "Speed"];
const PUTTING_POST_TITLES: [&str; PUTTING_POST_STEPS] = ["Made?", "Miss Side", "Miss Distance", "Notes"];

/// 练习场击球草稿
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeDraft {
    pub club: Option<ClubType>,
    pub intended_distance: Option<DistanceBand>,
    pub intended_flight: Option<ShotFlight>,
    pub intended_dispersion: Option<DispersionBand>,
    pub intended_trajectory: Option<Trajectory>,
    pub intended_swing_path: Option<SwingPath>,

    pub actual_distance: Option<DistanceBand>,
    pub actual_dispersion: Option<DispersionBand>,
    pub dispersion_direction: DispersionDirection,
    pub actual_flight: Option<ShotFlight>,
    pub actual_trajectory: Option<Trajectory>,
    pub actual_swing_path: Option<SwingPath>,
    /// 击球质量标签或自由文本
    pub result_tag: Option<String>,
    pub note: String,
}

impl RangeDraft {
    fn pre_filled(&self, index: usize) -> bool {
        match index {
            0 => self.club.is_some(),
            1 => self.intended_distance.is_some(),
            2 => self.intended_flight.is_some(),
            3 => self.intended_dispersion.is_some(),
            4 => self.intended_trajectory.is_some(),
            5 => self.intended_swing_path.is_some(),
            _ => false,
        }
    }

    fn post_filled(&self, index: usize) -> bool {
        match index {
            0 => self.actual_distance.is_some(),
            1 => self.actual_dispersion.is_some(),
            2 => self.actual_flight.is_some(),
            3 => self.actual_trajectory.is_some(),
            4 => self.actual_swing_path.is_some(),
            // 结果和备注可跳过
            5 | 6 => true,
            _ => false,
        }
    }

    pub fn to_pre_shot_input(&self) -> PreShotInput {
        PreShotInput {
            club: self.club.map(|c| c.code().to_string()),
            target: self.intended_distance,
            intended_flight: self.intended_flight,
            intended_trajectory: self.intended_trajectory,
            intended_dispersion: self.intended_dispersion,
            intended_swing_path: self.intended_swing_path,
            ..Default::default()
        }
    }

    /// 构建击球结果请求体
    ///
    /// 结果标签能识别为击球质量时写入 `contact`/`resultEnum`，否则作为自由文本写入 `result`。
    pub fn to_post_shot_input(&self) -> PostShotInput {
        let mut body = PostShotInput {
            actual_flight: self.actual_flight,
            trajectory: self.actual_trajectory,
            actual_trajectory: self.actual_trajectory,
            distance_band: self.actual_distance,
            dispersion_band: self.actual_dispersion,
            dispersion_direction: Some(self.dispersion_direction),
            swing_path: self.actual_swing_path,
            ..Default::default()
        };
        if let Some(tag) = self.result_tag.as_deref().filter(|t| !t.is_empty()) {
            match tag.parse::<ShotResult>() {
                Ok(result) => {
                    body.contact = Some(result.contact_code());
                    body.result_enum = result.result_enum().map(str::to_string);
                }
                Err(_) => body.result = Some(tag.to_string()),
            }
        }
        if !self.note.is_empty() {
            body.note = Some(self.note.clone());
        }
        body
    }

    /// 保留击球前意图，清空击球结果
    fn reset_post(&mut self) {
        self.actual_distance = None;
        self.actual_dispersion = None;
        self.dispersion_direction = DispersionDirection::Center;
        self.actual_flight = None;
        self.actual_trajectory = None;
        self.actual_swing_path = None;
        self.result_tag = None;
        self.note.clear();
    }
}

/// 推杆草稿（结果目前不提交到服务端）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PuttingDraft {
    pub distance: String,
    pub break_intent: Option<PuttBreak>,
    pub speed_intent: Option<PuttSpeed>,
    pub made: Option<bool>,
    pub miss_side: Option<MissSide>,
    pub miss_distance: String,
    pub note: String,
}

impl PuttingDraft {
    fn pre_filled(&self, index: usize) -> bool {
        match index {
            0 => !self.distance.trim().is_empty(),
            1 => self.break_intent.is_some(),
            2 => self.speed_intent.is_some(),
            _ => false,
        }
    }

    fn post_filled(&self, index: usize) -> bool {
        let holed = self.made == Some(true);
        match index {
            0 => self.made.is_some(),
            1 => holed || self.miss_side.is_some(),
            2 => holed || !self.miss_distance.trim().is_empty(),
            3 => true,
            _ => false,
        }
    }
}

/// 按模式区分的击球草稿
#[derive(Debug, Clone, PartialEq)]
pub enum ShotDraft {
    Range(RangeDraft),
    Putting(PuttingDraft),
}

impl ShotDraft {
    pub fn for_mode(mode: SessionMode) -> Self {
        if mode.is_putting() {
            ShotDraft::Putting(PuttingDraft::default())
        } else {
            ShotDraft::Range(RangeDraft::default())
        }
    }

    pub fn is_putting(&self) -> bool {
        matches!(self, ShotDraft::Putting(_))
    }

    pub fn pre_step_count(&self) -> usize {
        match self {
            ShotDraft::Range(_) => RANGE_PRE_STEPS,
            ShotDraft::Putting(_) => PUTTING_PRE_STEPS,
        }
    }

    pub fn post_step_count(&self) -> usize {
        match self {
            ShotDraft::Range(_) => RANGE_POST_STEPS,
            ShotDraft::Putting(_) => PUTTING_POST_STEPS,
        }
    }

    pub fn pre_step_title(&self, index: usize) -> Option<&'static str> {
        match self {
            ShotDraft::Range(_) => RANGE_PRE_TITLES.get(index).copied(),
            ShotDraft::Putting(_) => PUTTING_PRE_TITLES.get(index).copied(),
        }
    }

    pub fn post_step_title(&self, index: usize) -> Option<&'static str> {
        match self {
            ShotDraft::Range(_) => RANGE_POST_TITLES.get(index).copied(),
            ShotDraft::Putting(_) => PUTTING_POST_TITLES.get(index).copied(),
        }
    }

    /// 当前击球前子步骤的必填字段是否已填写
    pub fn pre_filled(&self, index: usize) -> bool {
        match self {
            ShotDraft::Range(d) => d.pre_filled(index),
            ShotDraft::Putting(d) => d.pre_filled(index),
        }
    }

    pub fn post_filled(&self, index: usize) -> bool {
        match self {
            ShotDraft::Range(d) => d.post_filled(index),
            ShotDraft::Putting(d) => d.post_filled(index),
        }
    }

    pub fn club(&self) -> Option<ClubType> {
        match self {
            ShotDraft::Range(d) => d.club,
            ShotDraft::Putting(_) => None,
        }
    }

    /// 再打一球前的重置
    pub fn reset_for_another_shot(&mut self) {
        match self {
            ShotDraft::Range(d) => d.reset_post(),
            ShotDraft::Putting(d) => *d = PuttingDraft::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_range() -> RangeDraft {
        RangeDraft {
            club: Some(ClubType::Iron7),
            intended_distance: "Y140_150".parse().ok(),
            intended_flight: Some(ShotFlight::Draw),
            intended_dispersion: "D0_10".parse().ok(),
            intended_trajectory: Some(Trajectory::Medium),
            intended_swing_path: Some(SwingPath::InToOut),
            actual_distance: "Y130_140".parse().ok(),
            actual_dispersion: "D10_20".parse().ok(),
            dispersion_direction: DispersionDirection::Left,
            actual_flight: Some(ShotFlight::Hook),
            actual_trajectory: Some(Trajectory::Low),
            actual_swing_path: Some(SwingPath::InToOut),
            result_tag: Some("Fat".to_string()),
            note: "ball above feet".to_string(),
        }
    }

    #[test]
    fn post_body_maps_result_tag_and_duplicates_trajectory() {
        let body = filled_range().to_post_shot_input();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "actualFlight": "HOOK",
                "trajectory": "LOW",
                "actualTrajectory": "LOW",
                "distanceBand": "Y130_140",
                "dispersionBand": "D10_20",
                "dispersionDirection": "LEFT",
                "swingPath": "IN-TO-OUT",
                "contact": "FAT",
                "resultEnum": "CHUNK",
                "note": "ball above feet"
            })
        );
    }

    #[test]
    fn unrecognized_result_tag_is_sent_as_free_text() {
        let mut draft = filled_range();
        draft.result_tag = Some("Toe".to_string());
        let body = draft.to_post_shot_input();
        assert_eq!(body.contact.as_deref(), Some("TOE"));
        assert_eq!(body.result_enum, None);

        draft.result_tag = Some("shank".to_string());
        let body = draft.to_post_shot_input();
        assert_eq!(body.contact, None);
        assert_eq!(body.result.as_deref(), Some("shank"));
    }

    #[test]
    fn pre_body_carries_all_intentions() {
        let body = filled_range().to_pre_shot_input();
        assert_eq!(body.club.as_deref(), Some("IRON7"));
        assert_eq!(body.target.map(|b| b.token()).as_deref(), Some("Y140_150"));
        assert_eq!(body.intended_swing_path, Some(SwingPath::InToOut));
    }

    #[test]
    fn putting_miss_fields_required_only_when_missed() {
        let mut draft = ShotDraft::for_mode(SessionMode::Putting);
        assert!(!draft.post_filled(0));
        if let ShotDraft::Putting(p) = &mut draft {
            p.made = Some(true);
        }
        assert!(draft.post_filled(1) && draft.post_filled(2));
        if let ShotDraft::Putting(p) = &mut draft {
            p.made = Some(false);
        }
        assert!(!draft.post_filled(1));
        assert!(!draft.post_filled(2));
        assert!(draft.post_filled(3));
    }

    #[test]
    fn reset_keeps_range_intentions_and_clears_putting() {
        let mut draft = ShotDraft::Range(filled_range());
        draft.reset_for_another_shot();
        let ShotDraft::Range(d) = &draft else {
            panic!("expected range draft");
        };
        assert_eq!(d.club, Some(ClubType::Iron7));
        assert!(d.actual_distance.is_none());
        assert_eq!(d.dispersion_direction, DispersionDirection::Center);
        assert!(d.note.is_empty());

        let mut putt = ShotDraft::Putting(PuttingDraft {
            distance: "12".into(),
            made: Some(false),
            ..Default::default()
        });
        putt.reset_for_another_shot();
        assert_eq!(putt, ShotDraft::Putting(PuttingDraft::default()));
    }
}
