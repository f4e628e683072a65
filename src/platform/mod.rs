use async_trait::async_trait;

/// 应用入口页面路径，会话失效或登出后跳转目标
pub const ENTRY_PAGE: &str = "/pages/index/index";

/// 页面导航接口，由宿主环境实现
#[async_trait]
pub trait Navigator: Send + Sync {
    /// 关闭所有页面并跳转到指定页面
    async fn relaunch(&self, url: &str);
}
