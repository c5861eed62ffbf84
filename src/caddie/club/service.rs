//! 用户的球杆选择（球包里实际有的球杆类型）
//!
//! 持久化在本地键值 `rc_clubs` 中（JSON 数组）。没有保存过或保存内容无效时使用全部球杆类型。

use crate::caddie::enums::ClubType;
use crate::caddie::kv::{keys, LocalKvDao};
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

/// 清洗保存的球杆列表：丢弃未知编码和重复项，结果为空时视为没有选择
pub fn sanitize_clubs(input: &serde_json::Value) -> Option<Vec<ClubType>> {
    let items = input.as_array()?;
    let mut clubs: Vec<ClubType> = Vec::new();
    for item in items {
        let Some(club) = item.as_str().and_then(|s| s.parse::<ClubType>().ok()) else {
            continue;
        };
        if !clubs.contains(&club) {
            clubs.push(club);
        }
    }
    (!clubs.is_empty()).then_some(clubs)
}

/// 球杆选择状态（加载、修改、保存、恢复默认）
pub struct ClubSelection {
    kv: LocalKvDao,
    clubs: Vec<ClubType>,
}

impl ClubSelection {
    /// 读取已保存的选择，没有时使用默认全集
    pub async fn load(kv: LocalKvDao) -> Result<Self> {
        let clubs = Self::load_saved(&kv).await?.unwrap_or_else(|| ClubType::ALL.to_vec());
        debug!("[ClubSelection] 当前球杆选择: {} 支", clubs.len());
        Ok(Self { kv, clubs })
    }

    /// 读取已保存的选择；未保存或内容无效时返回 `None`
    pub async fn load_saved(kv: &LocalKvDao) -> Result<Option<Vec<ClubType>>> {
        let Some(raw) = kv.get(keys::CLUBS).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => Ok(sanitize_clubs(&value)),
            Err(e) => {
                warn!("[ClubSelection] 保存的球杆选择无法解析，忽略: {:?}", e);
                Ok(None)
            }
        }
    }

    pub fn clubs(&self) -> &[ClubType] {
        &self.clubs
    }

    pub fn set_clubs(&mut self, clubs: Vec<ClubType>) {
        self.clubs = clubs;
    }

    pub async fn save(&self) -> Result<()> {
        let json = serde_json::to_string(&self.clubs).context("序列化球杆选择失败")?;
        self.kv.set(keys::CLUBS, &json).await?;
        info!("[ClubSelection] 💾 球杆选择已保存: {} 支", self.clubs.len());
        Ok(())
    }

    /// 恢复为全部球杆类型（需调用 [`save`](Self::save) 才会持久化）
    pub fn reset_to_default(&mut self) {
        self.clubs = ClubType::ALL.to_vec();
    }

    /// 练习场模式下可选的球杆：去掉推杆，一号木放在最前
    pub fn range_options(&self) -> Vec<ClubType> {
        let mut options: Vec<ClubType> = self
            .clubs
            .iter()
            .copied()
            .filter(|c| *c != ClubType::Putter)
            .collect();
        if let Some(idx) = options.iter().position(|c| *c == ClubType::Driver) {
            let driver = options.remove(idx);
            options.insert(0, driver);
        }
        options
    }
}
