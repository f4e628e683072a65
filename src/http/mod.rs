use std::path::Path;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, multipart};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::ClientError;
use crate::models::ResponseData;
use crate::platform::{ENTRY_PAGE, Navigator};
use crate::storage::{Storage, TOKEN_KEY};

/// 统一 HTTP 客户端
/// 请求拦截注入 Bearer 令牌，响应拦截统一处理 401 和错误分类
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    storage: Arc<Storage>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl HttpClient {
    pub fn new(config: &Config, storage: Arc<Storage>) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(ClientError::Init)?;

        Ok(HttpClient {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            storage,
            navigator: None,
        })
    }

    /// 注入导航器，401 时跳转回入口页
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// 请求拦截：本地有令牌时附加 Authorization 头
    fn attach_token(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.storage.get_raw(TOKEN_KEY) {
            Some(token) => req.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => req,
        }
    }

    /// 响应拦截：分类会话过期、业务错误和正常响应
    async fn intercept_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ResponseData, ClientError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            // token 过期，清除本地令牌并跳转到入口页
            self.storage.remove(TOKEN_KEY);
            if let Some(navigator) = &self.navigator {
                navigator.relaunch(ENTRY_PAGE).await;
            }
            return Err(ClientError::SessionExpired);
        }

        if status.is_client_error() || status.is_server_error() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "请求失败".to_string());
            return Err(ClientError::api(message));
        }

        response
            .json::<ResponseData>()
            .await
            .map_err(ClientError::InvalidResponse)
    }

    async fn request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&T>,
    ) -> Result<ResponseData, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(query) = query {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        req = self.attach_token(req);

        let response = req.send().await.map_err(|e| {
            tracing::error!("请求失败: {}", e);
            ClientError::Network(e)
        })?;

        self.intercept_response(response).await
    }

    pub async fn get(
        &self,
        path: &str,
        query: Option<&[(&str, String)]>,
    ) -> Result<ResponseData, ClientError> {
        self.request::<()>(Method::GET, path, query, None).await
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&T>,
    ) -> Result<ResponseData, ClientError> {
        self.request(Method::POST, path, None, body).await
    }

    pub async fn put<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&T>,
    ) -> Result<ResponseData, ClientError> {
        self.request(Method::PUT, path, None, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<ResponseData, ClientError> {
        self.request::<()>(Method::DELETE, path, None, None).await
    }

    /// 上传文件，multipart 传输，不走 JSON 信封
    /// 响应体能解析成 JSON 就返回 JSON，否则原样返回字符串
    pub async fn upload(
        &self,
        path: &str,
        file_path: &Path,
        field_name: &str,
        form_data: &[(String, String)],
    ) -> Result<Value, ClientError> {
        let bytes = tokio::fs::read(file_path).await.map_err(|e| {
            tracing::error!("上传失败: {}", e);
            ClientError::upload("上传失败")
        })?;

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();

        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let mut form = multipart::Form::new().part(field_name.to_string(), part);
        for (key, value) in form_data {
            form = form.text(key.clone(), value.clone());
        }

        let url = format!("{}{}", self.base_url, path);
        let req = self.attach_token(self.client.post(&url).multipart(form));

        let response = req.send().await.map_err(|e| {
            tracing::error!("上传失败: {}", e);
            ClientError::upload("上传失败，请检查网络连接")
        })?;

        if response.status() != StatusCode::OK {
            return Err(ClientError::upload("上传失败"));
        }

        let raw = response.text().await.map_err(|e| {
            tracing::error!("上传失败: {}", e);
            ClientError::upload("上传失败，请检查网络连接")
        })?;

        Ok(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    }
}
