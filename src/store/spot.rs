use std::sync::Arc;

use crate::http::HttpClient;
use crate::location::calculate_distance;
use crate::models::{CreateSpotRequest, FishingSpot, SpotListData, SpotQuery};
use crate::store::ActionResult;

/// 钓点状态仓库
/// 四个集合各自独立拉取，除收藏数的乐观调整外互不同步
pub struct SpotStore {
    http: Arc<HttpClient>,
    spots: Vec<FishingSpot>,
    current_spot: Option<FishingSpot>,
    nearby_spots: Vec<FishingSpot>,
    favorite_spots: Vec<FishingSpot>,
    loading: bool,
}

impl SpotStore {
    pub fn new(http: Arc<HttpClient>) -> Self {
        SpotStore {
            http,
            spots: Vec::new(),
            current_spot: None,
            nearby_spots: Vec::new(),
            favorite_spots: Vec::new(),
            loading: false,
        }
    }

    pub fn spots(&self) -> &[FishingSpot] {
        &self.spots
    }

    pub fn current_spot(&self) -> Option<&FishingSpot> {
        self.current_spot.as_ref()
    }

    pub fn nearby_spots(&self) -> &[FishingSpot] {
        &self.nearby_spots
    }

    pub fn favorite_spots(&self) -> &[FishingSpot] {
        &self.favorite_spots
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// 获取钓点列表
    pub async fn fetch_spots(&mut self, query: &SpotQuery) -> Option<SpotListData> {
        self.loading = true;
        let result = self.http.get("/api/v1/spots", Some(&query.to_query())).await;
        self.loading = false;

        match result {
            Ok(resp) if resp.is_success() => match resp.parse_data::<SpotListData>() {
                Ok(data) => {
                    self.spots = data.spots.clone();
                    Some(data)
                }
                Err(e) => {
                    tracing::error!("获取钓点列表失败: {}", e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                tracing::error!("获取钓点列表失败: {}", e);
                None
            }
        }
    }

    /// 获取附近钓点，半径默认 5000 米，最多 20 条
    pub async fn fetch_nearby_spots(
        &mut self,
        lat: f64,
        lng: f64,
        radius: Option<f64>,
    ) -> Option<Vec<FishingSpot>> {
        let query = SpotQuery {
            lat: Some(lat),
            lng: Some(lng),
            radius: Some(radius.unwrap_or(5000.0)),
            limit: Some(20),
            ..Default::default()
        };

        self.loading = true;
        let result = self.http.get("/api/v1/spots", Some(&query.to_query())).await;
        self.loading = false;

        match result {
            Ok(resp) if resp.is_success() => match resp.parse_data::<SpotListData>() {
                Ok(data) => {
                    self.nearby_spots = data.spots.clone();
                    Some(data.spots)
                }
                Err(e) => {
                    tracing::error!("获取附近钓点失败: {}", e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                tracing::error!("获取附近钓点失败: {}", e);
                None
            }
        }
    }

    /// 获取钓点详情
    pub async fn fetch_spot_detail(&mut self, id: &str) -> Option<FishingSpot> {
        self.loading = true;
        let result = self.http.get(&format!("/api/v1/spots/{}", id), None).await;
        self.loading = false;

        match result {
            Ok(resp) if resp.is_success() => match resp.parse_data::<FishingSpot>() {
                Ok(spot) => {
                    self.current_spot = Some(spot.clone());
                    Some(spot)
                }
                Err(e) => {
                    tracing::error!("获取钓点详情失败: {}", e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                tracing::error!("获取钓点详情失败: {}", e);
                None
            }
        }
    }

    /// 创建钓点，成功后刷新钓点列表
    pub async fn create_spot(&mut self, req: CreateSpotRequest) -> ActionResult<FishingSpot> {
        let result = self.http.post("/api/v1/spots", Some(&req)).await;
        match result {
            Ok(resp) if resp.is_success() => {
                let created = resp.parse_data::<FishingSpot>().ok();
                // 刷新钓点列表
                self.fetch_spots(&SpotQuery::default()).await;
                match created {
                    Some(spot) => ActionResult::ok_with(spot),
                    None => ActionResult::ok(),
                }
            }
            Ok(resp) => ActionResult::fail(resp.message),
            Err(e) => ActionResult::fail(e.to_string()),
        }
    }

    /// 搜索钓点
    pub async fn search_spots(
        &mut self,
        keyword: &str,
        location: Option<&str>,
    ) -> Option<Vec<FishingSpot>> {
        let mut query = vec![("keyword", keyword.to_string())];
        if let Some(location) = location {
            query.push(("location", location.to_string()));
        }

        self.loading = true;
        let result = self.http.get("/api/v1/spots/search", Some(&query)).await;
        self.loading = false;

        match result {
            Ok(resp) if resp.is_success() => match resp.parse_data::<SpotListData>() {
                Ok(data) => {
                    self.spots = data.spots.clone();
                    Some(data.spots)
                }
                Err(e) => {
                    tracing::error!("搜索钓点失败: {}", e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                tracing::error!("搜索钓点失败: {}", e);
                None
            }
        }
    }

    /// 收藏钓点，成功后本地收藏数加一
    pub async fn favorite_spot(&mut self, spot_id: &str) -> ActionResult {
        let path = format!("/api/v1/spots/{}/favorite", spot_id);
        match self.http.post::<()>(&path, None).await {
            Ok(resp) if resp.is_success() => {
                // 更新本地状态
                if let Some(spot) = self.spots.iter_mut().find(|s| s.id == spot_id) {
                    spot.favorites_count += 1;
                }
                ActionResult::ok()
            }
            Ok(resp) => ActionResult::fail(resp.message),
            Err(e) => ActionResult::fail(e.to_string()),
        }
    }

    /// 取消收藏钓点，成功后本地收藏数减一，不会减到负数
    pub async fn unfavorite_spot(&mut self, spot_id: &str) -> ActionResult {
        let path = format!("/api/v1/spots/{}/favorite", spot_id);
        match self.http.delete(&path).await {
            Ok(resp) if resp.is_success() => {
                // 更新本地状态
                if let Some(spot) = self.spots.iter_mut().find(|s| s.id == spot_id) {
                    if spot.favorites_count > 0 {
                        spot.favorites_count -= 1;
                    }
                }
                ActionResult::ok()
            }
            Ok(resp) => ActionResult::fail(resp.message),
            Err(e) => ActionResult::fail(e.to_string()),
        }
    }

    /// 获取收藏的钓点
    pub async fn fetch_favorite_spots(&mut self) -> Option<Vec<FishingSpot>> {
        self.loading = true;
        let result = self.http.get("/api/v1/spots/favorites", None).await;
        self.loading = false;

        match result {
            Ok(resp) if resp.is_success() => match resp.parse_data::<SpotListData>() {
                Ok(data) => {
                    self.favorite_spots = data.spots.clone();
                    Some(data.spots)
                }
                Err(e) => {
                    tracing::error!("获取收藏钓点失败: {}", e);
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                tracing::error!("获取收藏钓点失败: {}", e);
                None
            }
        }
    }

    /// 按位置在本地列表里筛选钓点，半径默认 10000 米
    pub fn filter_spots_by_location(
        &self,
        lat: f64,
        lng: f64,
        radius: Option<f64>,
    ) -> Vec<FishingSpot> {
        let radius = radius.unwrap_or(10_000.0);
        self.spots
            .iter()
            .filter(|spot| calculate_distance(lat, lng, spot.latitude, spot.longitude) <= radius)
            .cloned()
            .collect()
    }

    /// 获取推荐钓点，失败时返回空列表
    pub async fn get_recommended_spots(&self, user_id: &str) -> Vec<FishingSpot> {
        let query = [("user_id", user_id.to_string())];
        match self.http.get("/api/v1/spots/recommendations", Some(&query)).await {
            Ok(resp) if resp.is_success() => match resp.parse_data::<SpotListData>() {
                Ok(data) => data.spots,
                Err(e) => {
                    tracing::error!("获取推荐钓点失败: {}", e);
                    Vec::new()
                }
            },
            Ok(_) => Vec::new(),
            Err(e) => {
                tracing::error!("获取推荐钓点失败: {}", e);
                Vec::new()
            }
        }
    }
}
