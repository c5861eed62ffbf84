pub mod caddie;

// 重新导出常用类型，方便外部使用
pub use caddie::{
    client::{ClientConfig, RangeCaddieClient},
    query::{QueryCache, QueryKey, RemoteData},
    session::{LocalSessionSummary, RecentSessions, Session, SessionMode},
    shell::{GuardDecision, QueryState, Tab, Theme},
    ApiError, SessionFlow,
};
