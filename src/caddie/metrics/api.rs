//! 统计 HTTP API 客户端

use crate::caddie::api::ApiClient;
use crate::caddie::metrics::types::{OverviewMetrics, OverviewParams, SessionSummary, SummaryOptions};
use crate::caddie::types::{api_path, path_with_query};
use anyhow::Result;
use tracing::debug;

#[derive(Clone)]
pub struct MetricsApi {
    api: ApiClient,
}

impl MetricsApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn overview(&self, params: &OverviewParams) -> Result<OverviewMetrics> {
        let path = path_with_query("/metrics/overview", &params.query_pairs());
        let overview: OverviewMetrics = self.api.get(&path).await?;
        debug!(
            "[MetricsAPI] 总览: {} 个场次, {} 支球杆",
            overview.sessions.len(),
            overview.gapping.len()
        );
        Ok(overview)
    }

    pub async fn session_summary(
        &self,
        session_id: &str,
        opts: &SummaryOptions,
    ) -> Result<SessionSummary> {
        let path = path_with_query(
            &api_path(&["sessions", session_id, "summary"]),
            &opts.query_pairs(),
        );
        self.api.get(&path).await
    }
}
