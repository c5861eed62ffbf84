pub mod api;
pub mod auth;
pub mod client;
pub mod club;
pub mod db;
pub mod enums;
pub mod fetch;
pub mod flow;
pub mod kv;
pub mod metrics;
pub mod query;
pub mod serialization;
pub mod session;
pub mod shell;
pub mod shot;
pub mod stats;
pub mod token;
pub mod types;

// 重新导出认证与请求相关类型
pub use auth::{AuthApi, AuthListener, EmptyAuthListener, UserProfile};
pub use fetch::{AuthFetch, FetchState};
pub use types::{error_message, ApiError};

// 重新导出向导与统计相关类型
pub use flow::{FlowBackend, SessionFlow, ShotDraft};
pub use stats::{StatsLoader, StatsView};
