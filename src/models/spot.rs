use serde::{Deserialize, Serialize};

/// 钓点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishingSpot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub favorites_count: i64,
    #[serde(default)]
    pub fish_types: Vec<String>,
    #[serde(default)]
    pub difficulty: i32,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

/// 钓点列表响应数据
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotListData {
    #[serde(default)]
    pub spots: Vec<FishingSpot>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// 钓点列表查询参数
#[derive(Debug, Clone, Default)]
pub struct SpotQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SpotQuery {
    /// 转成 URL 查询参数，未设置的字段不出现
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(lat) = self.lat {
            query.push(("lat", lat.to_string()));
        }
        if let Some(lng) = self.lng {
            query.push(("lng", lng.to_string()));
        }
        if let Some(radius) = self.radius {
            query.push(("radius", radius.to_string()));
        }
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

/// 创建钓点请求
#[derive(Debug, Clone, Serialize)]
pub struct CreateSpotRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub fish_types: Vec<String>,
    pub difficulty: i32,
    pub is_free: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}
