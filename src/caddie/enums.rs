//! 与服务端保持一致的枚举（球杆、距离/散布区间、球路、弹道、挥杆路径等）
//!
//! 距离和散布使用“区间 token”编码，例如 `Y100_110`、`D10_20`：前缀字母后跟下界，
//! 可选的 `_` 后跟上界。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 偏差绝对值不超过此值视为理想
pub const FAVORABLE_DELTA: i32 = 5;
/// 偏差绝对值达到此值视为不理想
pub const UNFAVORABLE_DELTA: i32 = 20;

pub const DISTANCE_PREFIX: char = 'Y';
pub const DISPERSION_PREFIX: char = 'D';

/// 解析区间 token，返回 `(下界, 上界)`；格式为 `<prefix><a>[_<b>]`
pub fn parse_band(token: &str, prefix: char) -> Option<(u32, Option<u32>)> {
    let rest = token.strip_prefix(prefix)?;
    let (a, b) = match rest.split_once('_') {
        Some((a, b)) => (a, b),
        None => (rest, ""),
    };
    if a.is_empty() || !a.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !b.bytes().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let lo = a.parse().ok()?;
    let hi = if b.is_empty() { None } else { Some(b.parse().ok()?) };
    Some((lo, hi))
}

/// 区间中点：范围取两端平均值，单值区间取该值
pub fn band_midpoint(token: &str, prefix: char) -> Option<f64> {
    let (lo, hi) = parse_band(token, prefix)?;
    Some(match hi {
        Some(hi) => (lo as f64 + hi as f64) / 2.0,
        None => lo as f64,
    })
}

/// 实际与意图的中点差（取整到整数码数，.5 向正方向进位），任一缺失或不可解析时为 `None`
pub fn band_delta(intended: Option<&str>, actual: Option<&str>, prefix: char) -> Option<i32> {
    let pm = band_midpoint(intended?, prefix)?;
    let am = band_midpoint(actual?, prefix)?;
    Some((am - pm + 0.5).floor() as i32)
}

fn band_range_label(token: &str, prefix: char) -> String {
    match parse_band(token, prefix) {
        Some((lo, Some(hi))) => format!("{}-{} yd", lo, hi),
        Some((lo, None)) => format!("{}+ yd", lo),
        None => token.to_string(),
    }
}

/// 距离区间展示文本，例如 `100-110 yd`
pub fn distance_band_label(token: &str) -> String {
    band_range_label(token, DISTANCE_PREFIX)
}

/// 散布区间展示文本，例如 `± 10-20 yd`
pub fn dispersion_band_label(token: &str) -> String {
    if parse_band(token, DISPERSION_PREFIX).is_none() {
        return token.to_string();
    }
    format!("± {}", band_range_label(token, DISPERSION_PREFIX))
}

/// 偏差的颜色分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaTone {
    Favorable,
    Neutral,
    Unfavorable,
}

impl DeltaTone {
    pub fn classify(delta: i32) -> Self {
        let abs = delta.abs();
        if abs >= UNFAVORABLE_DELTA {
            DeltaTone::Unfavorable
        } else if abs <= FAVORABLE_DELTA {
            DeltaTone::Favorable
        } else {
            DeltaTone::Neutral
        }
    }
}

/// 带符号的偏差文本，例如 `+20 yd`
pub fn format_delta(delta: i32) -> String {
    if delta >= 0 {
        format!("+{} yd", delta)
    } else {
        format!("{} yd", delta)
    }
}

/// 距离区间（`Y10_20` 到 `Y390_400`，步长 10 码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistanceBand(u16);

impl DistanceBand {
    pub const MIN: u16 = 10;
    pub const MAX: u16 = 390;

    /// 全部区间（升序）
    pub fn all() -> impl Iterator<Item = DistanceBand> {
        (Self::MIN..=Self::MAX).step_by(10).map(DistanceBand)
    }

    /// 下界为 `lower` 的区间
    pub fn from_lower(lower: u16) -> Option<Self> {
        (lower % 10 == 0 && (Self::MIN..=Self::MAX).contains(&lower)).then_some(Self(lower))
    }

    pub fn lower(&self) -> u16 {
        self.0
    }

    pub fn upper(&self) -> u16 {
        self.0 + 10
    }

    pub fn token(&self) -> String {
        format!("Y{}_{}", self.lower(), self.upper())
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower() as f64 + self.upper() as f64) / 2.0
    }

    pub fn label(&self) -> String {
        distance_band_label(&self.token())
    }
}

impl fmt::Display for DistanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl FromStr for DistanceBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let band = parse_band(s, DISTANCE_PREFIX)
            .and_then(|(lo, _)| u16::try_from(lo).ok())
            .and_then(Self::from_lower)
            .filter(|b| b.token() == s);
        band.ok_or_else(|| format!("unknown distance band: {}", s))
    }
}

impl TryFrom<String> for DistanceBand {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DistanceBand> for String {
    fn from(value: DistanceBand) -> Self {
        value.token()
    }
}

/// 散布区间（`D0_10` 到 `D90_100`，步长 10 码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DispersionBand(u16);

impl DispersionBand {
    pub const MIN: u16 = 0;
    pub const MAX: u16 = 90;

    pub fn all() -> impl Iterator<Item = DispersionBand> {
        (Self::MIN..=Self::MAX).step_by(10).map(DispersionBand)
    }

    pub fn from_lower(lower: u16) -> Option<Self> {
        (lower % 10 == 0 && lower <= Self::MAX).then_some(Self(lower))
    }

    pub fn lower(&self) -> u16 {
        self.0
    }

    pub fn upper(&self) -> u16 {
        self.0 + 10
    }

    pub fn token(&self) -> String {
        format!("D{}_{}", self.lower(), self.upper())
    }

    pub fn midpoint(&self) -> f64 {
        (self.lower() as f64 + self.upper() as f64) / 2.0
    }

    pub fn label(&self) -> String {
        dispersion_band_label(&self.token())
    }
}

impl fmt::Display for DispersionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl FromStr for DispersionBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let band = parse_band(s, DISPERSION_PREFIX)
            .and_then(|(lo, _)| u16::try_from(lo).ok())
            .and_then(Self::from_lower)
            .filter(|b| b.token() == s);
        band.ok_or_else(|| format!("unknown dispersion band: {}", s))
    }
}

impl TryFrom<String> for DispersionBand {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DispersionBand> for String {
    fn from(value: DispersionBand) -> Self {
        value.token()
    }
}

/// 球杆类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClubType {
    Driver,
    MiniDriver,
    Wood3,
    Wood5,
    Wood7,
    Wood9,
    Wood11,
    Wood13,
    Wood15,
    Hybrid2,
    Hybrid3,
    Hybrid4,
    Hybrid5,
    Hybrid6,
    Hybrid7,
    Iron1,
    Iron2,
    Iron3,
    Iron4,
    Iron5,
    Iron6,
    Iron7,
    Iron8,
    Iron9,
    Pw,
    Gw,
    Sw,
    Lw,
    Putter,
}

impl ClubType {
    pub const ALL: [ClubType; 29] = [
        ClubType::Driver,
        ClubType::MiniDriver,
        ClubType::Wood3,
        ClubType::Wood5,
        ClubType::Wood7,
        ClubType::Wood9,
        ClubType::Wood11,
        ClubType::Wood13,
        ClubType::Wood15,
        ClubType::Hybrid2,
        ClubType::Hybrid3,
        ClubType::Hybrid4,
        ClubType::Hybrid5,
        ClubType::Hybrid6,
        ClubType::Hybrid7,
        ClubType::Iron1,
        ClubType::Iron2,
        ClubType::Iron3,
        ClubType::Iron4,
        ClubType::Iron5,
        ClubType::Iron6,
        ClubType::Iron7,
        ClubType::Iron8,
        ClubType::Iron9,
        ClubType::Pw,
        ClubType::Gw,
        ClubType::Sw,
        ClubType::Lw,
        ClubType::Putter,
    ];

    /// 服务端编码，例如 `IRON7`
    pub fn code(&self) -> &'static str {
        match self {
            ClubType::Driver => "DRIVER",
            ClubType::MiniDriver => "MINI_DRIVER",
            ClubType::Wood3 => "WOOD3",
            ClubType::Wood5 => "WOOD5",
            ClubType::Wood7 => "WOOD7",
            ClubType::Wood9 => "WOOD9",
            ClubType::Wood11 => "WOOD11",
            ClubType::Wood13 => "WOOD13",
            ClubType::Wood15 => "WOOD15",
            ClubType::Hybrid2 => "HYBRID2",
            ClubType::Hybrid3 => "HYBRID3",
            ClubType::Hybrid4 => "HYBRID4",
            ClubType::Hybrid5 => "HYBRID5",
            ClubType::Hybrid6 => "HYBRID6",
            ClubType::Hybrid7 => "HYBRID7",
            ClubType::Iron1 => "IRON1",
            ClubType::Iron2 => "IRON2",
            ClubType::Iron3 => "IRON3",
            ClubType::Iron4 => "IRON4",
            ClubType::Iron5 => "IRON5",
            ClubType::Iron6 => "IRON6",
            ClubType::Iron7 => "IRON7",
            ClubType::Iron8 => "IRON8",
            ClubType::Iron9 => "IRON9",
            ClubType::Pw => "PW",
            ClubType::Gw => "GW",
            ClubType::Sw => "SW",
            ClubType::Lw => "LW",
            ClubType::Putter => "PUTTER",
        }
    }

    /// 展示名称，例如 `7 iron`、`3 wood`、`PW`
    pub fn label(&self) -> String {
        let code = self.code();
        match self {
            ClubType::Driver => "Driver".to_string(),
            ClubType::MiniDriver => "Mini driver".to_string(),
            ClubType::Putter => "Putter".to_string(),
            ClubType::Pw | ClubType::Gw | ClubType::Sw | ClubType::Lw => code.to_string(),
            _ => {
                for (prefix, kind) in [("IRON", "iron"), ("WOOD", "wood"), ("HYBRID", "hybrid")] {
                    if let Some(n) = code.strip_prefix(prefix) {
                        return format!("{} {}", n, kind);
                    }
                }
                code.replace('_', " ").to_lowercase()
            }
        }
    }
}

impl fmt::Display for ClubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ClubType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClubType::ALL
            .iter()
            .copied()
            .find(|c| c.code() == s)
            .ok_or_else(|| format!("unknown club type: {}", s))
    }
}

/// 球路
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShotFlight {
    Straight,
    Draw,
    Fade,
    Hook,
    Slice,
    Push,
    Pull,
}

impl ShotFlight {
    pub const ALL: [ShotFlight; 7] = [
        ShotFlight::Straight,
        ShotFlight::Draw,
        ShotFlight::Fade,
        ShotFlight::Hook,
        ShotFlight::Slice,
        ShotFlight::Push,
        ShotFlight::Pull,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ShotFlight::Straight => "STRAIGHT",
            ShotFlight::Draw => "DRAW",
            ShotFlight::Fade => "FADE",
            ShotFlight::Hook => "HOOK",
            ShotFlight::Slice => "SLICE",
            ShotFlight::Push => "PUSH",
            ShotFlight::Pull => "PULL",
        }
    }

    pub fn label(&self) -> String {
        capitalize(self.code())
    }
}

impl FromStr for ShotFlight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        ShotFlight::ALL
            .iter()
            .copied()
            .find(|f| f.code() == upper)
            .ok_or_else(|| format!("unknown shot flight: {}", s))
    }
}

/// 弹道高度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trajectory {
    Low,
    Medium,
    High,
}

impl Trajectory {
    pub const ALL: [Trajectory; 3] = [Trajectory::Low, Trajectory::Medium, Trajectory::High];

    pub fn code(&self) -> &'static str {
        match self {
            Trajectory::Low => "LOW",
            Trajectory::Medium => "MEDIUM",
            Trajectory::High => "HIGH",
        }
    }

    pub fn label(&self) -> String {
        capitalize(self.code())
    }
}

impl FromStr for Trajectory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Trajectory::ALL
            .iter()
            .copied()
            .find(|t| t.code() == upper)
            .ok_or_else(|| format!("unknown trajectory: {}", s))
    }
}

/// 挥杆路径（服务端编码为 `NEUTRAL` / `OUT-TO-IN` / `IN-TO-OUT`）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwingPath {
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "OUT-TO-IN")]
    OutToIn,
    #[serde(rename = "IN-TO-OUT")]
    InToOut,
}

impl SwingPath {
    pub const ALL: [SwingPath; 3] = [SwingPath::Neutral, SwingPath::OutToIn, SwingPath::InToOut];

    pub fn code(&self) -> &'static str {
        match self {
            SwingPath::Neutral => "NEUTRAL",
            SwingPath::OutToIn => "OUT-TO-IN",
            SwingPath::InToOut => "IN-TO-OUT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SwingPath::Neutral => "Neutral",
            SwingPath::OutToIn => "Out-to-in",
            SwingPath::InToOut => "In-to-out",
        }
    }
}

impl FromStr for SwingPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        SwingPath::ALL
            .iter()
            .copied()
            .find(|p| p.code() == upper)
            .ok_or_else(|| format!("unknown swing path: {}", s))
    }
}

/// 散布方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispersionDirection {
    Left,
    #[default]
    Center,
    Right,
}

impl DispersionDirection {
    pub fn label(&self) -> &'static str {
        match self {
            DispersionDirection::Left => "Left",
            DispersionDirection::Center => "Center",
            DispersionDirection::Right => "Right",
        }
    }
}

impl FromStr for DispersionDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LEFT" => Ok(DispersionDirection::Left),
            "CENTER" => Ok(DispersionDirection::Center),
            "RIGHT" => Ok(DispersionDirection::Right),
            _ => Err(format!("unknown dispersion direction: {}", s)),
        }
    }
}

/// 击球结果标签（击球质量）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShotResult {
    Thin,
    Fat,
    Pure,
    Toe,
    Heel,
}

impl ShotResult {
    pub const ALL: [ShotResult; 5] = [
        ShotResult::Thin,
        ShotResult::Fat,
        ShotResult::Pure,
        ShotResult::Toe,
        ShotResult::Heel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShotResult::Thin => "Thin",
            ShotResult::Fat => "Fat",
            ShotResult::Pure => "Pure",
            ShotResult::Toe => "Toe",
            ShotResult::Heel => "Heel",
        }
    }

    /// 服务端 `contact` 字段取值
    pub fn contact_code(&self) -> String {
        self.label().to_ascii_uppercase()
    }

    /// 服务端 `resultEnum` 字段取值
    ///
    /// 服务端结果枚举与前端词汇并不一致：`Fat` 对应 `CHUNK`，`Toe`/`Heel` 没有对应值。
    pub fn result_enum(&self) -> Option<&'static str> {
        match self {
            ShotResult::Thin => Some("THIN"),
            ShotResult::Pure => Some("PURE"),
            ShotResult::Fat => Some("CHUNK"),
            ShotResult::Toe | ShotResult::Heel => None,
        }
    }
}

impl FromStr for ShotResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShotResult::ALL
            .iter()
            .copied()
            .find(|r| r.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown shot result: {}", s))
    }
}

/// 推杆线路意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuttBreak {
    Left,
    Right,
    Straight,
}

impl FromStr for PuttBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(PuttBreak::Left),
            "right" => Ok(PuttBreak::Right),
            "straight" => Ok(PuttBreak::Straight),
            _ => Err(format!("unknown putt break: {}", s)),
        }
    }
}

/// 推杆速度意图
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuttSpeed {
    #[serde(rename = "Die-in")]
    DieIn,
    Firm,
}

impl FromStr for PuttSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "die-in" | "diein" => Ok(PuttSpeed::DieIn),
            "firm" => Ok(PuttSpeed::Firm),
            _ => Err(format!("unknown putt speed: {}", s)),
        }
    }
}

/// 推杆未进时的偏差方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissSide {
    Short,
    Long,
    Left,
    Right,
    High,
    Low,
}

impl FromStr for MissSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" => Ok(MissSide::Short),
            "long" => Ok(MissSide::Long),
            "left" => Ok(MissSide::Left),
            "right" => Ok(MissSide::Right),
            "high" => Ok(MissSide::High),
            "low" => Ok(MissSide::Low),
            _ => Err(format!("unknown miss side: {}", s)),
        }
    }
}

/// `STRAIGHT` -> `Straight`
fn capitalize(code: &str) -> String {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
