//! 应用外壳：底部标签、URL 查询参数、登录守卫、主题、首次访问标记

use crate::caddie::kv::{keys, LocalKvDao};
use crate::caddie::metrics::types::ALL_CLUBS;
use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// 底部导航标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Stats,
    Profile,
    /// 新建场次（打开向导，而不是切换查询参数）
    New,
}

impl Tab {
    /// 解析 `tab` 参数，未知值回退为 `Home`
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("stats") => Tab::Stats,
            Some("profile") => Tab::Profile,
            _ => Tab::Home,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Home => "home",
            Tab::Stats => "stats",
            Tab::Profile => "profile",
            Tab::New => "new",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个查询参数的更新方式；未出现在更新列表中的参数保持不变
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryUpdate {
    Set(String),
    Remove,
}

fn base_url() -> Option<reqwest::Url> {
    reqwest::Url::parse("http://localhost/").ok()
}

/// URL 查询参数（保持原有顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    pairs: Vec<(String, String)>,
}

impl QueryState {
    /// 解析查询字符串（可带前导 `?`）
    pub fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let Some(mut url) = base_url() else {
            return Self::default();
        };
        url.set_query(Some(query));
        Self {
            pairs: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn tab(&self) -> Tab {
        Tab::from_param(self.get("tab"))
    }

    pub fn session(&self) -> Option<&str> {
        self.get("session")
    }

    /// 球杆过滤，默认 `ALL`
    pub fn club(&self) -> &str {
        self.get("club").unwrap_or(ALL_CLUBS)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.pairs[first].1 = value.to_string();
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// 批量更新并返回新的查询状态
    pub fn updated(&self, updates: &[(&str, QueryUpdate)]) -> Self {
        let mut next = self.clone();
        for (key, update) in updates {
            match update {
                QueryUpdate::Set(value) => next.set(key, value),
                QueryUpdate::Remove => next.remove(key),
            }
        }
        next
    }

    pub fn to_query_string(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }
        let Some(mut url) = base_url() else {
            return String::new();
        };
        url.query_pairs_mut()
            .extend_pairs(self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        url.query().unwrap_or_default().to_string()
    }

    /// 带路径的完整地址，无参数时只返回路径
    pub fn href(&self, pathname: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            pathname.to_string()
        } else {
            format!("{}?{}", pathname, query)
        }
    }
}

/// 标签切换的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// 跳转到其他页面
    Push(String),
    /// 原地替换查询参数
    Replace(QueryState),
}

/// 切换标签：统计页保留已选场次，其他标签清除场次参数，新建则打开向导
pub fn change_tab(current: &QueryState, next: Tab) -> Navigation {
    if next == Tab::New {
        return Navigation::Push("/new".to_string());
    }
    let mut updates = vec![("tab", QueryUpdate::Set(next.as_str().to_string()))];
    match (next, current.session()) {
        (Tab::Stats, Some(session)) => updates.push(("session", QueryUpdate::Set(session.to_string()))),
        (Tab::Stats, None) => {}
        _ => updates.push(("session", QueryUpdate::Remove)),
    }
    Navigation::Replace(current.updated(&updates))
}

/// 统计页选择场次（空值清除选择）
pub fn select_session(current: &QueryState, raw: Option<&str>) -> QueryState {
    let session = match raw.filter(|s| !s.is_empty()) {
        Some(id) => QueryUpdate::Set(id.to_string()),
        None => QueryUpdate::Remove,
    };
    current.updated(&[
        ("tab", QueryUpdate::Set(Tab::Stats.as_str().to_string())),
        ("session", session),
    ])
}

/// 统计页选择球杆（`ALL` 清除过滤）
pub fn select_club(current: &QueryState, club: &str) -> QueryState {
    let update = if club == ALL_CLUBS {
        QueryUpdate::Remove
    } else {
        QueryUpdate::Set(club.to_string())
    };
    current.updated(&[
        ("tab", QueryUpdate::Set(Tab::Stats.as_str().to_string())),
        ("club", update),
    ])
}

/// 无需登录即可访问的路径前缀
pub const PUBLIC_PREFIXES: [&str; 2] = ["/login", "/signup"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// 登录守卫：公开路径放行；其他路径没有 access token 时重定向到登录页并带上 `next`
pub fn guard_route(pathname: &str, query: &str, has_access_token: bool) -> GuardDecision {
    let pathname = if pathname.is_empty() { "/" } else { pathname };
    if PUBLIC_PREFIXES.iter().any(|p| pathname.starts_with(p)) || has_access_token {
        return GuardDecision::Allow;
    }
    let query = query.trim_start_matches('?');
    let next = if query.is_empty() {
        pathname.to_string()
    } else {
        format!("{}?{}", pathname, query)
    };
    let mut login = QueryState::default();
    login.set("next", &next);
    debug!("[Guard] 未登录，重定向: {}", next);
    GuardDecision::Redirect(login.href("/login"))
}

/// 登录成功后的跳转地址
pub fn post_login_target(query: &QueryState) -> String {
    query
        .get("next")
        .filter(|n| !n.is_empty())
        .unwrap_or("/")
        .to_string()
}

/// 主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// 是否使用暗色（`System` 跟随系统偏好）
    pub fn is_dark(&self, system_prefers_dark: bool) -> bool {
        match self {
            Theme::Dark => true,
            Theme::Light => false,
            Theme::System => system_prefers_dark,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(format!("unknown theme: {}", s)),
        }
    }
}

/// 主题偏好存储（`rc_theme`）
#[derive(Clone)]
pub struct ThemeStore {
    kv: LocalKvDao,
}

impl ThemeStore {
    pub fn new(kv: LocalKvDao) -> Self {
        Self { kv }
    }

    /// 未保存或无法识别时为 `System`
    pub async fn theme(&self) -> Result<Theme> {
        let raw = self.kv.get(keys::THEME).await?;
        Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.kv.set(keys::THEME, theme.as_str()).await?;
        info!("[Theme] 🎨 主题已切换: {}", theme.as_str());
        Ok(())
    }

    /// 系统配色变化时，仅在跟随系统的情况下需要重新应用
    pub async fn follows_system(&self) -> Result<bool> {
        Ok(self.theme().await? == Theme::System)
    }
}

/// 首次访问检查：首次返回 `true` 并写入标记，之后都返回 `false`
pub async fn check_first_visit(kv: &LocalKvDao) -> Result<bool> {
    if kv.get(keys::SEEN).await?.is_some() {
        return Ok(false);
    }
    kv.set(keys::SEEN, "1").await?;
    info!("[Shell] 👋 首次访问");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caddie::db::create_sqlite_pool_with_migration;

    async fn kv() -> LocalKvDao {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        LocalKvDao::new(pool)
    }

    #[test]
    fn unknown_tab_falls_back_to_home() {
        assert_eq!(QueryState::parse("tab=weird").tab(), Tab::Home);
        assert_eq!(QueryState::parse("?tab=stats").tab(), Tab::Stats);
        assert_eq!(QueryState::parse("").tab(), Tab::Home);
        assert_eq!(QueryState::parse("").club(), "ALL");
    }

    #[test]
    fn update_sets_removes_and_preserves() {
        let state = QueryState::parse("tab=stats&session=s1&club=DRIVER&x=1");
        let next = state.updated(&[
            ("session", QueryUpdate::Remove),
            ("club", QueryUpdate::Set("IRON7".to_string())),
        ]);
        assert_eq!(next.to_query_string(), "tab=stats&club=IRON7&x=1");
        assert_eq!(next.href("/"), "/?tab=stats&club=IRON7&x=1");
        assert_eq!(QueryState::default().href("/"), "/");
    }

    #[test]
    fn set_collapses_duplicate_keys() {
        let mut state = QueryState::parse("a=1&b=2&a=3");
        state.set("a", "9");
        assert_eq!(state.to_query_string(), "a=9&b=2");
    }

    #[test]
    fn tab_change_keeps_session_only_for_stats() {
        let state = QueryState::parse("tab=stats&session=s1");
        match change_tab(&state, Tab::Home) {
            Navigation::Replace(q) => assert_eq!(q.to_query_string(), "tab=home"),
            other => panic!("unexpected {:?}", other),
        }
        match change_tab(&QueryState::parse("tab=home&session=s1"), Tab::Stats) {
            Navigation::Replace(q) => assert_eq!(q.session(), Some("s1")),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            change_tab(&state, Tab::New),
            Navigation::Push("/new".to_string())
        );
    }

    #[test]
    fn stats_selection_helpers() {
        let state = QueryState::parse("tab=stats&session=s1&club=DRIVER");
        assert_eq!(select_club(&state, "ALL").get("club"), None);
        assert_eq!(select_session(&state, Some("")).session(), None);
        assert_eq!(select_session(&state, Some("s2")).session(), Some("s2"));
    }

    #[test]
    fn guard_redirects_private_paths_without_token() {
        assert_eq!(guard_route("/login", "", false), GuardDecision::Allow);
        assert_eq!(guard_route("/signup/verify", "", false), GuardDecision::Allow);
        assert_eq!(guard_route("/", "tab=stats", true), GuardDecision::Allow);
        assert_eq!(
            guard_route("/", "tab=stats&session=s1", false),
            GuardDecision::Redirect("/login?next=%2F%3Ftab%3Dstats%26session%3Ds1".to_string())
        );
        assert_eq!(
            guard_route("/new", "", false),
            GuardDecision::Redirect("/login?next=%2Fnew".to_string())
        );
        let login = QueryState::parse("next=%2Fnew");
        assert_eq!(post_login_target(&login), "/new");
        assert_eq!(post_login_target(&QueryState::default()), "/");
    }

    #[test]
    fn system_theme_follows_preference() {
        assert!(Theme::System.is_dark(true));
        assert!(!Theme::System.is_dark(false));
        assert!(Theme::Dark.is_dark(false));
    }

    #[tokio::test]
    async fn theme_defaults_to_system_and_persists() {
        let store = ThemeStore::new(kv().await);
        assert_eq!(store.theme().await.unwrap(), Theme::System);
        store.set_theme(Theme::Dark).await.unwrap();
        assert_eq!(store.theme().await.unwrap(), Theme::Dark);
        assert!(!store.follows_system().await.unwrap());
    }

    #[tokio::test]
    async fn first_visit_flag_is_set_once() {
        let kv = kv().await;
        assert!(check_first_visit(&kv).await.unwrap());
        assert!(!check_first_visit(&kv).await.unwrap());
    }
}
