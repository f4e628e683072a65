// 领域状态仓库
// 每个动作调用 HTTP 客户端并把结果归一成 ActionResult，错误不向上传播
pub mod auth;
pub mod spot;

pub use auth::AuthStore;
pub use spot::SpotStore;

/// 动作统一返回值
#[derive(Debug, Clone)]
pub struct ActionResult<T = ()> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ActionResult<T> {
    pub fn ok() -> Self {
        ActionResult {
            success: true,
            message: None,
            data: None,
        }
    }

    pub fn ok_with(data: T) -> Self {
        ActionResult {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ActionResult {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}
