//! 球杆：服务端球杆管理与本地球杆选择

pub mod api;
pub mod models;
pub mod service;

pub use api::ClubApi;
pub use models::{Club, ClubInput, ClubTypeInfo};
pub use service::ClubSelection;
