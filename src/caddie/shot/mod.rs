//! 击球记录：击球前意图与击球后结果

pub mod api;
pub mod models;

pub use api::ShotApi;
pub use models::{Lie, PostShotInput, PreShotInput, Shot};
