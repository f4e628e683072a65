use thiserror::Error;

/// 客户端错误
/// 区分会话过期、业务错误、网络错误和上传错误
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP 客户端初始化失败
    #[error("初始化 HTTP 客户端失败")]
    Init(#[source] reqwest::Error),

    /// 401 响应，会话已失效
    #[error("登录已过期，请重新登录")]
    SessionExpired,

    /// HTTP 状态码 >= 400（非 401），消息来自服务端响应体
    #[error("{message}")]
    Api { message: String },

    /// 网络层失败，没有收到响应
    #[error("网络连接失败，请检查网络设置")]
    Network(#[source] reqwest::Error),

    /// 响应体不是合法的接口信封
    #[error("响应格式无效")]
    InvalidResponse(#[source] reqwest::Error),

    /// 文件上传失败
    #[error("{message}")]
    Upload { message: String },
}

impl ClientError {
    pub fn api(message: impl Into<String>) -> Self {
        ClientError::Api {
            message: message.into(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        ClientError::Upload {
            message: message.into(),
        }
    }
}

/// 存储错误，仅异步接口向调用方暴露
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("存储读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("缓存数据反序列化失败: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// 定位错误
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("获取位置失败，请检查定位权限")]
    PositionUnavailable,

    #[error("选择位置失败")]
    ChooseFailed,

    #[error("打开地图失败: {0}")]
    OpenFailed(String),

    #[error("定位权限被拒绝")]
    PermissionDenied,
}
