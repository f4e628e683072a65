use async_trait::async_trait;

use crate::error::LocationError;

/// 定位权限作用域
pub const LOCATION_SCOPE: &str = "scope.userLocation";

/// 地球半径（米）
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// 当前位置
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

/// 地图选点结果
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub address: String,
}

/// 平台定位能力接口，由宿主环境实现
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn get_location(&self) -> Result<Position, LocationError>;
    async fn choose_location(&self) -> Result<Place, LocationError>;
    async fn open_location(
        &self,
        latitude: f64,
        longitude: f64,
        name: &str,
        address: &str,
    ) -> Result<(), LocationError>;
    /// 查询某个权限作用域是否已授权
    async fn get_auth_setting(&self, scope: &str) -> Result<bool, LocationError>;
    /// 发起授权请求，被拒绝时返回错误
    async fn authorize(&self, scope: &str) -> Result<(), LocationError>;
}

/// 定位门面，封装平台接口并提供距离计算
pub struct Location<P: LocationProvider> {
    provider: P,
}

impl<P: LocationProvider> Location<P> {
    pub fn new(provider: P) -> Self {
        Location { provider }
    }

    /// 获取当前位置
    pub async fn get_current_location(&self) -> Result<Position, LocationError> {
        match self.provider.get_location().await {
            Ok(position) => Ok(position),
            Err(e) => {
                tracing::error!("获取位置失败: {}", e);
                Err(LocationError::PositionUnavailable)
            }
        }
    }

    /// 打开地图让用户选择位置
    pub async fn choose_location(&self) -> Result<Place, LocationError> {
        match self.provider.choose_location().await {
            Ok(place) => Ok(place),
            Err(e) => {
                tracing::error!("选择位置失败: {}", e);
                Err(LocationError::ChooseFailed)
            }
        }
    }

    /// 打开地图查看位置，只记录结果不返回错误
    pub async fn open_location(
        &self,
        latitude: f64,
        longitude: f64,
        name: Option<&str>,
        address: Option<&str>,
    ) {
        let name = name.unwrap_or("位置");
        let address = address.unwrap_or("");
        match self
            .provider
            .open_location(latitude, longitude, name, address)
            .await
        {
            Ok(()) => tracing::debug!("打开地图成功"),
            Err(e) => tracing::error!("打开地图失败: {}", e),
        }
    }

    /// 检查定位权限，查询失败视为未授权
    pub async fn check_location_auth(&self) -> bool {
        self.provider
            .get_auth_setting(LOCATION_SCOPE)
            .await
            .unwrap_or(false)
    }

    /// 请求定位权限，被拒绝返回 false
    pub async fn request_location_auth(&self) -> bool {
        self.provider.authorize(LOCATION_SCOPE).await.is_ok()
    }
}

/// 计算两点间大圆距离（米），haversine 公式
pub fn calculate_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// 格式化距离，千米以内取整显示米，否则保留一位小数显示千米
pub fn format_distance(distance: f64) -> String {
    if distance < 1000.0 {
        format!("{}m", distance.round() as i64)
    } else {
        format!("{:.1}km", distance / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(calculate_distance(31.23, 121.47, 31.23, 121.47), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = calculate_distance(31.23, 121.47, 39.90, 116.40);
        let ba = calculate_distance(39.90, 116.40, 31.23, 121.47);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn equator_fixture_matches_haversine() {
        // 赤道上纬度差 0.01 度约 1111.95 米
        let d = calculate_distance(0.0, 0.0, 0.01, 0.0);
        let expected = EARTH_RADIUS_M * 0.01f64.to_radians();
        assert!((d - expected).abs() < 1.0);
        assert!((d - 1111.95).abs() < 1.0);
    }

    #[test]
    fn format_distance_under_one_km_uses_meters() {
        assert_eq!(format_distance(999.0), "999m");
        assert_eq!(format_distance(0.4), "0m");
        assert_eq!(format_distance(12.6), "13m");
    }

    #[test]
    fn format_distance_at_or_over_one_km_uses_kilometers() {
        assert_eq!(format_distance(1500.0), "1.5km");
        assert_eq!(format_distance(1000.0), "1.0km");
        assert_eq!(format_distance(12345.0), "12.3km");
    }

    struct FakeProvider {
        position: Option<Position>,
        auth: Option<bool>,
        authorize_ok: bool,
    }

    #[async_trait]
    impl LocationProvider for FakeProvider {
        async fn get_location(&self) -> Result<Position, LocationError> {
            self.position
                .clone()
                .ok_or(LocationError::PositionUnavailable)
        }

        async fn choose_location(&self) -> Result<Place, LocationError> {
            Err(LocationError::ChooseFailed)
        }

        async fn open_location(
            &self,
            _latitude: f64,
            _longitude: f64,
            _name: &str,
            _address: &str,
        ) -> Result<(), LocationError> {
            Ok(())
        }

        async fn get_auth_setting(&self, scope: &str) -> Result<bool, LocationError> {
            assert_eq!(scope, LOCATION_SCOPE);
            self.auth.ok_or(LocationError::PermissionDenied)
        }

        async fn authorize(&self, _scope: &str) -> Result<(), LocationError> {
            if self.authorize_ok {
                Ok(())
            } else {
                Err(LocationError::PermissionDenied)
            }
        }
    }

    #[tokio::test]
    async fn current_location_passes_through_provider() {
        let facade = Location::new(FakeProvider {
            position: Some(Position {
                latitude: 31.0,
                longitude: 121.0,
                address: Some("上海".to_string()),
            }),
            auth: Some(true),
            authorize_ok: true,
        });
        let position = facade.get_current_location().await.unwrap();
        assert_eq!(position.latitude, 31.0);
        assert_eq!(position.address.as_deref(), Some("上海"));
    }

    #[tokio::test]
    async fn provider_failure_maps_to_descriptive_error() {
        let facade = Location::new(FakeProvider {
            position: None,
            auth: Some(true),
            authorize_ok: true,
        });
        let err = facade.get_current_location().await.unwrap_err();
        assert_eq!(err.to_string(), "获取位置失败，请检查定位权限");
    }

    #[tokio::test]
    async fn auth_check_failure_resolves_false() {
        let facade = Location::new(FakeProvider {
            position: None,
            auth: None,
            authorize_ok: false,
        });
        assert!(!facade.check_location_auth().await);
        assert!(!facade.request_location_auth().await);
    }
}
