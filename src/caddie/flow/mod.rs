//! 新建练习场次向导
//!
//! 顶层步骤 `Mode → Pre → Post → Finish`，击球前后各有按模式划分的子步骤。
//! 网络调用通过 [`FlowBackend`] 注入，便于替换和测试。

pub mod backend;
pub mod finish;
pub mod models;
pub mod service;
pub mod state;

pub use backend::{ClientFlowBackend, FlowBackend};
pub use finish::{DeltaRow, FinishView, FlightRow, RangeFinishView};
pub use models::{PuttingDraft, RangeDraft, ShotDraft};
pub use service::SessionFlow;
pub use state::{FlowKey, FlowStep};
