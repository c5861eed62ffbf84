//! 统计页：场次解析、球杆过滤选项、图表数据加载

use crate::caddie::metrics::charts::{
    contact_breakdown, dispersion_points, gapping_series, intention_result_matrix,
    match_rate_series, practice_volume_by_week, trajectory_counts, ContactSlice,
    DispersionPoint, GappingBar, IntentionMatrix, MatchRatePoint, TrajectoryCount, WeeklyVolume,
};
use crate::caddie::metrics::types::{
    MissTrendPoint, OverviewMetrics, OverviewParams, SessionSummary, SummaryOptions,
};
use crate::caddie::query::RemoteData;
use crate::caddie::session::{RecentSessions, Session};
use crate::caddie::shell::{QueryState, QueryUpdate, Tab};
use crate::caddie::types::{error_message, DEFAULT_ERROR_MESSAGE};
use anyhow::Result;
use futures_util::future::join;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// 统计页场次下拉框请求的条数
pub const SESSION_LIST_LIMIT: u32 = 50;
/// 单场汇总最多返回的击球明细
pub const SUMMARY_SHOT_LIMIT: u32 = 1000;

/// 当前查看的场次：URL 参数优先，其次是上次新建的场次，最后是最新的场次
pub fn resolve_session_id(
    param: Option<&str>,
    stored: Option<&str>,
    sessions: &[Session],
) -> Option<String> {
    param
        .filter(|s| !s.is_empty())
        .or(stored.filter(|s| !s.is_empty()))
        .or(sessions.first().map(|s| s.id.as_str()))
        .map(str::to_string)
}

/// 球杆过滤选项：总览间隔数据与单场球杆统计的并集，按字母排序
pub fn club_filter_options(
    overview: Option<&OverviewMetrics>,
    summary: Option<&SessionSummary>,
) -> Vec<String> {
    let mut options = BTreeSet::new();
    if let Some(overview) = overview {
        options.extend(overview.gapping.iter().filter_map(|g| g.club.clone()));
    }
    if let Some(summary) = summary {
        options.extend(summary.by_club.iter().filter_map(|c| c.club.clone()));
    }
    options.into_iter().filter(|c| !c.is_empty()).collect()
}

/// 场次下拉框的一项
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionOption {
    pub id: String,
    /// `<日期> (<n> shots)`
    pub label: String,
}

impl From<&Session> for SessionOption {
    fn from(session: &Session) -> Self {
        let date = session
            .created_at
            .as_deref()
            .and_then(|d| chrono::DateTime::parse_from_rfc3339(d).ok())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let shots = session.count.as_ref().map(|c| c.shots).unwrap_or(0);
        Self {
            id: session.id.clone(),
            label: format!("{} ({} shots)", date, shots),
        }
    }
}

/// 总览图表
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverviewCharts {
    pub match_rate: Vec<MatchRatePoint>,
    pub gapping: Vec<GappingBar>,
    pub practice_volume: Vec<WeeklyVolume>,
    pub miss_trend: Vec<MissTrendPoint>,
}

impl From<&OverviewMetrics> for OverviewCharts {
    fn from(metrics: &OverviewMetrics) -> Self {
        Self {
            match_rate: match_rate_series(&metrics.sessions),
            gapping: gapping_series(&metrics.gapping),
            practice_volume: practice_volume_by_week(&metrics.practice_calendar),
            miss_trend: metrics.miss_trend.clone(),
        }
    }
}

/// 单场图表
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionCharts {
    pub intention_result: IntentionMatrix,
    pub dispersion: Vec<DispersionPoint>,
    pub trajectory: Vec<TrajectoryCount>,
    pub contact: Vec<ContactSlice>,
    pub avg_distance: Option<f64>,
    pub avg_dispersion: Option<f64>,
}

impl From<&SessionSummary> for SessionCharts {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            intention_result: intention_result_matrix(&summary.pairs),
            dispersion: dispersion_points(&summary.scatter, summary.shots.as_deref()),
            trajectory: trajectory_counts(summary.trajectory_pairs.as_deref().unwrap_or_default()),
            contact: contact_breakdown(summary.contact.as_deref().unwrap_or_default()),
            avg_distance: summary.aggregates.avg.distance,
            avg_dispersion: summary.aggregates.avg.dispersion,
        }
    }
}

/// 统计页的完整视图
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub sessions: Vec<SessionOption>,
    pub session_id: Option<String>,
    pub selected: Option<Session>,
    pub club: String,
    pub club_options: Vec<String>,
    pub overview: Option<OverviewCharts>,
    pub overview_error: Option<String>,
    pub summary: Option<SessionCharts>,
    pub summary_error: Option<String>,
    /// URL 中没有场次参数但解析出了场次时，需要写回的查询参数
    #[serde(skip)]
    pub query_sync: Option<QueryState>,
}

/// 统计页数据加载
#[derive(Clone)]
pub struct StatsLoader {
    remote: RemoteData,
    recent: RecentSessions,
}

impl StatsLoader {
    pub fn new(remote: RemoteData, recent: RecentSessions) -> Self {
        Self { remote, recent }
    }

    /// 根据当前 URL 参数加载统计页
    ///
    /// 总览与单场汇总并发请求，任一失败只影响对应的图表区域。
    pub async fn load(&self, query: &QueryState) -> Result<StatsView> {
        let stored = self.recent.take_last_session_id().await?;
        let sessions = match self.remote.sessions(Some(SESSION_LIST_LIMIT), None).await {
            Ok(list) => list,
            Err(e) => {
                warn!("[Stats] 场次列表加载失败: {:?}", e);
                Vec::new()
            }
        };

        let param = query.session();
        let session_id = resolve_session_id(param, stored.as_deref(), &sessions);
        let query_sync = match (param, session_id.as_deref()) {
            (None, Some(id)) => Some(query.updated(&[
                ("tab", QueryUpdate::Set(Tab::Stats.as_str().to_string())),
                ("session", QueryUpdate::Set(id.to_string())),
            ])),
            _ => None,
        };
        debug!(
            "[Stats] 解析场次: param={:?}, stored={:?}, resolved={:?}",
            param, stored, session_id
        );

        let club = query.club().to_string();
        let overview_params = OverviewParams {
            club: Some(club.clone()),
            ..Default::default()
        };
        let summary_opts = SummaryOptions {
            club: Some(club.clone()),
            include_shots: true,
            limit_shots: Some(SUMMARY_SHOT_LIMIT),
        };
        let (overview, summary) = join(
            self.remote.overview(&overview_params),
            self.remote.session_summary(session_id.as_deref(), &summary_opts),
        )
        .await;

        let (overview, overview_error) = match overview {
            Ok(metrics) => (Some(metrics), None),
            Err(e) => {
                warn!("[Stats] 总览加载失败: {:?}", e);
                (None, Some(error_message(&e, DEFAULT_ERROR_MESSAGE)))
            }
        };
        let (summary, summary_error) = match summary {
            Ok(summary) => (summary, None),
            Err(e) => {
                warn!("[Stats] 单场汇总加载失败: {:?}", e);
                (None, Some(error_message(&e, DEFAULT_ERROR_MESSAGE)))
            }
        };

        let selected = session_id
            .as_deref()
            .and_then(|id| sessions.iter().find(|s| s.id == id))
            .cloned();
        let view = StatsView {
            sessions: sessions.iter().map(SessionOption::from).collect(),
            club_options: club_filter_options(overview.as_ref(), summary.as_ref()),
            overview: overview.as_ref().map(OverviewCharts::from),
            summary: summary.as_ref().map(SessionCharts::from),
            session_id,
            selected,
            club,
            overview_error,
            summary_error,
            query_sync,
        };
        info!(
            "[Stats] 📊 统计页已加载: {} 个场次, 当前场次 {:?}",
            view.sessions.len(),
            view.session_id
        );
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caddie::api::ApiClient;
    use crate::caddie::auth::{AuthApi, EmptyAuthListener};
    use crate::caddie::db::create_sqlite_pool_with_migration;
    use crate::caddie::fetch::AuthFetch;
    use crate::caddie::kv::LocalKvDao;
    use crate::caddie::metrics::types::{ClubCount, GappingEntry};
    use crate::caddie::query::QueryCache;
    use crate::caddie::session::{EmptySessionListener, LocalSessionDao, SessionApi, SessionCount};
    use crate::caddie::token::TokenStore;
    use std::sync::Arc;

    fn session(id: &str) -> Session {
        Session {
            id: id.to_string(),
            created_at: Some("2026-03-04T10:00:00.000Z".to_string()),
            mode: None,
            count: Some(SessionCount { shots: 12 }),
        }
    }

    #[test]
    fn session_resolution_prefers_param_then_stored_then_latest() {
        let sessions = vec![session("latest"), session("older")];
        assert_eq!(
            resolve_session_id(Some("p"), Some("s"), &sessions).as_deref(),
            Some("p")
        );
        assert_eq!(
            resolve_session_id(None, Some("s"), &sessions).as_deref(),
            Some("s")
        );
        assert_eq!(
            resolve_session_id(Some(""), None, &sessions).as_deref(),
            Some("latest")
        );
        assert_eq!(resolve_session_id(None, None, &[]), None);
    }

    #[test]
    fn club_options_are_a_sorted_union() {
        let overview = OverviewMetrics {
            gapping: vec![
                GappingEntry { club: Some("IRON7".into()), avg_carry: Some(150.0), stdev: None },
                GappingEntry { club: None, avg_carry: Some(10.0), stdev: None },
            ],
            ..Default::default()
        };
        let summary = SessionSummary {
            by_club: vec![
                ClubCount { club: Some("DRIVER".into()), count: 3 },
                ClubCount { club: Some("IRON7".into()), count: 1 },
            ],
            ..Default::default()
        };
        assert_eq!(
            club_filter_options(Some(&overview), Some(&summary)),
            vec!["DRIVER".to_string(), "IRON7".to_string()]
        );
        assert!(club_filter_options(None, None).is_empty());
    }

    #[test]
    fn session_option_label_shows_date_and_shots() {
        let option = SessionOption::from(&session("a"));
        assert_eq!(option.label, "2026-03-04 (12 shots)");
    }

    #[tokio::test]
    async fn offline_load_uses_stored_session_and_reports_errors() {
        let pool = create_sqlite_pool_with_migration("sqlite::memory:")
            .await
            .unwrap();
        let kv = LocalKvDao::new(pool.clone());
        let base = "http://127.0.0.1:9".to_string();
        let client = reqwest::Client::new();
        let auth = Arc::new(AuthApi::new(
            client.clone(),
            base.clone(),
            TokenStore::new(kv.clone()),
            Arc::new(EmptyAuthListener),
            "/login".to_string(),
        ));
        let fetch = Arc::new(AuthFetch::new(client, base, auth, Arc::new(EmptyAuthListener)));
        let api = ApiClient::new(fetch);
        let recent = RecentSessions::new(
            SessionApi::new(api.clone()),
            LocalSessionDao::new(pool),
            kv,
            Arc::new(EmptySessionListener),
        );
        recent.set_last_session_id("s-7").await.unwrap();
        let loader = StatsLoader::new(RemoteData::new(api, Arc::new(QueryCache::new())), recent);

        let view = loader.load(&QueryState::parse("tab=stats")).await.unwrap();
        assert_eq!(view.session_id.as_deref(), Some("s-7"));
        assert_eq!(view.club, "ALL");
        assert!(view.sessions.is_empty());
        assert!(view.overview.is_none());
        assert_eq!(view.overview_error.as_deref(), Some(DEFAULT_ERROR_MESSAGE));
        assert!(view.summary_error.is_some());
        let sync = view.query_sync.unwrap();
        assert_eq!(sync.to_query_string(), "tab=stats&session=s-7");

        // 已被取走，第二次加载不再解析出场次
        let view = loader.load(&QueryState::parse("tab=stats")).await.unwrap();
        assert_eq!(view.session_id, None);
        assert!(view.query_sync.is_none());
        assert!(view.summary_error.is_none());
    }
}
