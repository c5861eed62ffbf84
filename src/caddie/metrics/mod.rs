//! 统计指标：总览、单场汇总，以及图表数据准备

pub mod api;
pub mod charts;
pub mod types;

pub use api::MetricsApi;
pub use types::{OverviewMetrics, OverviewParams, SessionSummary, SummaryOptions};
