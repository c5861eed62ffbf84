//! 练习场次：服务端接口、本地最近场次缓存、变更监听

pub mod api;
pub mod dao;
pub mod listener;
pub mod models;
pub mod service;

pub use api::SessionApi;
pub use dao::LocalSessionDao;
pub use listener::{EmptySessionListener, SessionListener};
pub use models::{LocalSessionSummary, Session, SessionCount, SessionMode};
pub use service::RecentSessions;
