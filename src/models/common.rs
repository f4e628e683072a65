use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 接口统一响应信封
/// code 等于 200 表示业务成功，其余为业务失败，message 供调用方展示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseData {
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: i64,
}

impl ResponseData {
    pub fn is_success(&self) -> bool {
        self.code == 200
    }

    /// 把 data 字段解析为具体类型
    pub fn parse_data<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}
