use std::sync::Arc;

use crate::http::HttpClient;
use crate::models::{
    LoginData, LoginRequest, RegisterRequest, User, UserProfile, UserProfileUpdate, UserStats,
};
use crate::platform::{ENTRY_PAGE, Navigator};
use crate::storage::{Storage, TOKEN_KEY};
use crate::store::ActionResult;

/// 认证状态仓库
/// 令牌镜像到本地存储的固定键，登出或 401 时整体清除
pub struct AuthStore {
    http: Arc<HttpClient>,
    storage: Arc<Storage>,
    navigator: Option<Arc<dyn Navigator>>,
    user: Option<User>,
    profile: Option<UserProfile>,
    stats: Option<UserStats>,
    token: Option<String>,
    is_logged_in: bool,
}

impl AuthStore {
    /// 构造时从本地存储恢复令牌
    pub fn new(
        http: Arc<HttpClient>,
        storage: Arc<Storage>,
        navigator: Option<Arc<dyn Navigator>>,
    ) -> Self {
        let token = storage.get_raw(TOKEN_KEY);
        AuthStore {
            http,
            storage,
            navigator,
            user: None,
            profile: None,
            stats: None,
            token,
            is_logged_in: false,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn stats(&self) -> Option<&UserStats> {
        self.stats.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    pub fn research_points(&self) -> i64 {
        self.profile.as_ref().map_or(0, |p| p.research_points)
    }

    pub fn user_level(&self) -> i32 {
        self.profile.as_ref().map_or(1, |p| p.level)
    }

    pub fn achievement_count(&self) -> i64 {
        self.profile.as_ref().map_or(0, |p| p.achievement_count)
    }

    /// 检查登录状态
    /// 用 profile 接口验证令牌有效性，请求出错时清除本地令牌
    pub async fn check_login_status(&mut self) -> bool {
        if self.token.is_none() {
            self.is_logged_in = false;
            return false;
        }

        match self.http.get("/api/v1/users/profile", None).await {
            Ok(resp) if resp.is_success() => match resp.parse_data::<User>() {
                Ok(user) => {
                    self.user = Some(user);
                    self.is_logged_in = true;
                    true
                }
                Err(e) => {
                    tracing::error!("解析用户信息失败: {}", e);
                    false
                }
            },
            Ok(_) => false,
            Err(_) => {
                // token 无效，清除本地存储
                self.storage.remove(TOKEN_KEY);
                self.token = None;
                self.is_logged_in = false;
                false
            }
        }
    }

    /// 用户登录
    /// 成功后持久化令牌并补拉资料和统计，补拉失败不影响登录结果
    pub async fn login(&mut self, username: &str, password: &str) -> ActionResult {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let result = self.http.post("/api/v1/users/login", Some(&req)).await;
        match result {
            Ok(resp) if resp.is_success() => {
                let data: LoginData = match resp.parse_data() {
                    Ok(data) => data,
                    Err(e) => {
                        tracing::error!("解析登录数据失败: {}", e);
                        return ActionResult::fail("登录失败");
                    }
                };

                self.token = Some(data.token.clone());
                self.user = Some(data.user);
                self.is_logged_in = true;

                // 保存 token 到本地存储
                self.storage.set_raw(TOKEN_KEY, &data.token);

                // 获取用户详细信息和统计数据
                self.fetch_user_profile().await;
                self.fetch_user_stats().await;

                ActionResult::ok()
            }
            Ok(resp) => ActionResult::fail(resp.message),
            Err(e) => ActionResult::fail(e.to_string()),
        }
    }

    /// 用户注册，成功后自动登录
    pub async fn register(&mut self, req: RegisterRequest) -> ActionResult {
        let username = req.username.clone();
        let password = req.password.clone();

        let result = self.http.post("/api/v1/users/register", Some(&req)).await;
        match result {
            Ok(resp) if resp.is_success() => self.login(&username, &password).await,
            Ok(resp) => ActionResult::fail(resp.message),
            Err(e) => ActionResult::fail(e.to_string()),
        }
    }

    /// 获取用户资料，失败只记日志
    pub async fn fetch_user_profile(&mut self) {
        if self.token.is_none() {
            return;
        }

        match self.http.get("/api/v1/users/profile", None).await {
            Ok(resp) if resp.is_success() => match resp.parse_data::<UserProfile>() {
                Ok(profile) => self.profile = Some(profile),
                Err(e) => tracing::error!("获取用户资料失败: {}", e),
            },
            Ok(_) => {}
            Err(e) => tracing::error!("获取用户资料失败: {}", e),
        }
    }

    /// 获取用户统计数据，失败只记日志
    pub async fn fetch_user_stats(&mut self) {
        if self.token.is_none() {
            return;
        }

        match self.http.get("/api/v1/users/stats", None).await {
            Ok(resp) if resp.is_success() => match resp.parse_data::<UserStats>() {
                Ok(stats) => self.stats = Some(stats),
                Err(e) => tracing::error!("获取用户统计数据失败: {}", e),
            },
            Ok(_) => {}
            Err(e) => tracing::error!("获取用户统计数据失败: {}", e),
        }
    }

    /// 更新用户资料，成功后把补丁合并进内存态
    pub async fn update_profile(&mut self, update: UserProfileUpdate) -> ActionResult {
        match self.http.put("/api/v1/users/profile", Some(&update)).await {
            Ok(resp) if resp.is_success() => {
                let mut profile = self.profile.take().unwrap_or_default();
                if let Some(nickname) = update.nickname {
                    profile.nickname = Some(nickname);
                }
                if let Some(avatar) = update.avatar {
                    profile.avatar = Some(avatar);
                }
                if let Some(bio) = update.bio {
                    profile.bio = Some(bio);
                }
                self.profile = Some(profile);
                ActionResult::ok()
            }
            Ok(resp) => ActionResult::fail(resp.message),
            Err(e) => ActionResult::fail(e.to_string()),
        }
    }

    /// 用户登出：清空内存态和持久化令牌，跳转回入口页
    pub async fn logout(&mut self) {
        self.user = None;
        self.profile = None;
        self.stats = None;
        self.token = None;
        self.is_logged_in = false;

        self.storage.remove(TOKEN_KEY);
        if let Some(navigator) = &self.navigator {
            navigator.relaunch(ENTRY_PAGE).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::platform::testing::RecordingNavigator;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn envelope(code: i32, message: &str, data: Value) -> Value {
        json!({ "code": code, "message": message, "data": data, "timestamp": 1700000000000i64 })
    }

    fn user_json() -> Value {
        json!({ "id": "u1", "username": "渔夫", "email": "yu@example.com" })
    }

    async fn store(
        server: &MockServer,
    ) -> (tempfile::TempDir, Arc<Storage>, Arc<RecordingNavigator>, AuthStore) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(Storage::new(dir.path()));
        let config = Config {
            api_base_url: server.uri(),
            request_timeout_secs: 10,
            storage_dir: dir.path().to_path_buf(),
        };
        let navigator = Arc::new(RecordingNavigator::default());
        let http = Arc::new(
            HttpClient::new(&config, storage.clone())
                .unwrap()
                .with_navigator(navigator.clone()),
        );
        let auth = AuthStore::new(http, storage.clone(), Some(navigator.clone()));
        (dir, storage, navigator, auth)
    }

    fn mount_login(server: &MockServer) -> impl std::future::Future<Output = ()> + '_ {
        Mock::given(method("POST"))
            .and(path("/api/v1/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                200,
                "success",
                json!({ "token": "tok-1", "user": user_json() }),
            )))
            .mount(server)
    }

    #[tokio::test]
    async fn login_persists_token_and_fetches_follow_ups() {
        let server = MockServer::start().await;
        let (_dir, storage, _nav, mut auth) = store(&server).await;

        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                200,
                "success",
                json!({ "nickname": "老钓手", "research_points": 120, "level": 3 }),
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                200,
                "success",
                json!({ "spots_created": 2, "catches_count": 15 }),
            )))
            .mount(&server)
            .await;

        let result = auth.login("渔夫", "pass").await;
        assert!(result.success);
        assert!(auth.is_logged_in());
        assert_eq!(auth.token(), Some("tok-1"));
        assert_eq!(storage.get_raw(TOKEN_KEY), Some("tok-1".to_string()));
        assert_eq!(auth.user().unwrap().username, "渔夫");
        assert_eq!(auth.research_points(), 120);
        assert_eq!(auth.user_level(), 3);
        assert_eq!(auth.stats().unwrap().catches_count, 15);
    }

    #[tokio::test]
    async fn login_succeeds_even_when_follow_ups_fail() {
        let server = MockServer::start().await;
        let (_dir, _storage, _nav, mut auth) = store(&server).await;

        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/profile"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/stats"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = auth.login("渔夫", "pass").await;
        assert!(result.success);
        assert!(auth.is_logged_in());
        assert!(auth.profile().is_none());
        assert!(auth.stats().is_none());
    }

    #[tokio::test]
    async fn login_failure_surfaces_server_message() {
        let server = MockServer::start().await;
        let (_dir, storage, _nav, mut auth) = store(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v1/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                1002,
                "密码无效",
                json!(null),
            )))
            .mount(&server)
            .await;

        let result = auth.login("渔夫", "wrong").await;
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("密码无效"));
        assert!(!auth.is_logged_in());
        assert_eq!(storage.get_raw(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn login_then_logout_clears_everything() {
        let server = MockServer::start().await;
        let (_dir, storage, navigator, mut auth) = store(&server).await;

        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                200,
                "success",
                json!({ "nickname": "老钓手" }),
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                200,
                "success",
                json!({}),
            )))
            .mount(&server)
            .await;

        assert!(auth.login("渔夫", "pass").await.success);
        auth.logout().await;

        assert!(auth.user().is_none());
        assert!(auth.profile().is_none());
        assert!(auth.stats().is_none());
        assert!(auth.token().is_none());
        assert!(!auth.is_logged_in());
        assert_eq!(storage.get_raw(TOKEN_KEY), None);
        assert_eq!(
            navigator.relaunched.lock().unwrap().last().map(String::as_str),
            Some("/pages/index/index")
        );
    }

    #[tokio::test]
    async fn register_chains_into_login() {
        let server = MockServer::start().await;
        let (_dir, storage, _nav, mut auth) = store(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v1/users/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
                200,
                "success",
                json!(null),
            )))
            .expect(1)
            .mount(&server)
            .await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(200, "success", json!({}))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(200, "success", json!({}))))
            .mount(&server)
            .await;

        let result = auth
            .register(RegisterRequest {
                username: "渔夫".to_string(),
                email: "yu@example.com".to_string(),
                password: "pass".to_string(),
                phone: None,
            })
            .await;
        assert!(result.success);
        assert!(auth.is_logged_in());
        assert_eq!(storage.get_raw(TOKEN_KEY), Some("tok-1".to_string()));
    }

    #[tokio::test]
    async fn check_login_status_clears_token_on_expiry() {
        let server = MockServer::start().await;
        let (dir, storage, _nav, _auth) = store(&server).await;
        storage.set_raw(TOKEN_KEY, "stale");

        // 重新构造，模拟进程重启后从存储恢复令牌
        let config = Config {
            api_base_url: server.uri(),
            request_timeout_secs: 10,
            storage_dir: dir.path().to_path_buf(),
        };
        let http = Arc::new(HttpClient::new(&config, storage.clone()).unwrap());
        let mut auth = AuthStore::new(http, storage.clone(), None);
        assert_eq!(auth.token(), Some("stale"));

        Mock::given(method("GET"))
            .and(path("/api/v1/users/profile"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(!auth.check_login_status().await);
        assert!(auth.token().is_none());
        assert!(!auth.is_logged_in());
        assert_eq!(storage.get_raw(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn check_login_status_without_token_is_false() {
        let server = MockServer::start().await;
        let (_dir, _storage, _nav, mut auth) = store(&server).await;
        assert!(!auth.check_login_status().await);
        // 没有令牌时不应发请求
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_profile_merges_patch_on_success() {
        let server = MockServer::start().await;
        let (_dir, _storage, _nav, mut auth) = store(&server).await;

        Mock::given(method("PUT"))
            .and(path("/api/v1/users/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(200, "success", json!(null))))
            .mount(&server)
            .await;

        let result = auth
            .update_profile(UserProfileUpdate {
                nickname: Some("夜钓王".to_string()),
                ..Default::default()
            })
            .await;
        assert!(result.success);
        assert_eq!(auth.profile().unwrap().nickname.as_deref(), Some("夜钓王"));
    }
}
