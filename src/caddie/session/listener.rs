//! 场次监听器回调接口

use async_trait::async_trait;

/// 最近场次监听器
#[async_trait]
pub trait SessionListener: Send + Sync {
    /// 本地最近场次列表发生变更（新增、删除或服务端刷新），参数为 JSON 数组字符串
    async fn on_recent_sessions_changed(&self, sessions_json: String);
}

/// 默认空实现（无操作）
pub struct EmptySessionListener;

#[async_trait]
impl SessionListener for EmptySessionListener {
    async fn on_recent_sessions_changed(&self, _sessions_json: String) {
        // 默认不做任何处理
    }
}
