//! 本地持久化键值存储

pub mod dao;

pub use dao::LocalKvDao;

/// 本地存储使用的键名
pub mod keys {
    pub const ACCESS_TOKEN: &str = "rc_access";
    pub const REFRESH_TOKEN: &str = "rc_refresh";
    pub const USER_ID: &str = "rc_user";
    pub const THEME: &str = "rc_theme";
    pub const LAST_SESSION: &str = "rc_last_session";
    pub const CLUBS: &str = "rc_clubs";
    pub const SEEN: &str = "rc_seen";
}
