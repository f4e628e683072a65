use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StorageError;

/// 认证令牌在本地存储中的固定键，以裸字符串形式保存
pub const TOKEN_KEY: &str = "token";

/// 缓存条目信封
/// data 为调用方数据，expire_time 为空表示永不过期
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub expire_time: Option<i64>,
    pub create_time: i64,
}

impl CacheEntry {
    fn new(data: Value, expire_ms: Option<i64>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        CacheEntry {
            data,
            expire_time: expire_ms.map(|ms| now + ms),
            create_time: now,
        }
    }

    fn is_expired(&self, now: i64) -> bool {
        matches!(self.expire_time, Some(t) if now >= t)
    }
}

/// 存储信息
#[derive(Debug, Clone)]
pub struct StorageInfo {
    pub keys: Vec<String>,
    pub current_size: u64,
}

/// 本地键值存储
/// 每个键对应一个文件，读取时惰性清理过期条目，没有后台扫描
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if let Err(e) = fs::create_dir_all(&root) {
            tracing::error!("创建存储目录失败: {}", e);
        }
        Storage { root }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // 键名只保留字母、数字、下划线和连字符，其余替换为下划线
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(name)
    }

    /// 设置缓存
    /// 序列化或写入失败只记录日志，不向调用方抛出
    pub fn set<T: Serialize>(&self, key: &str, data: &T, expire_ms: Option<i64>) {
        let value = match serde_json::to_value(data) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("设置缓存失败: {}", e);
                return;
            }
        };
        let entry = CacheEntry::new(value, expire_ms);
        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(e) = fs::write(self.entry_path(key), json) {
                    tracing::error!("设置缓存失败: {}", e);
                }
            }
            Err(e) => tracing::error!("设置缓存失败: {}", e),
        }
    }

    /// 获取缓存
    /// 不存在、已过期或数据损坏都返回 None；过期条目顺带删除
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match fs::read_to_string(self.entry_path(key)) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::error!("获取缓存失败: {}", e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!("获取缓存失败: {}", e);
                return None;
            }
        };

        // 检查是否过期
        if entry.is_expired(chrono::Utc::now().timestamp_millis()) {
            self.remove(key);
            return None;
        }

        match serde_json::from_value(entry.data) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::error!("获取缓存失败: {}", e);
                None
            }
        }
    }

    /// 删除缓存，键不存在时静默返回
    pub fn remove(&self, key: &str) {
        if let Err(e) = fs::remove_file(self.entry_path(key)) {
            if e.kind() != ErrorKind::NotFound {
                tracing::error!("删除缓存失败: {}", e);
            }
        }
    }

    /// 清空所有缓存
    pub fn clear(&self) {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("清空缓存失败: {}", e);
                return;
            }
        };
        for entry in entries.flatten() {
            if let Err(e) = fs::remove_file(entry.path()) {
                tracing::error!("清空缓存失败: {}", e);
            }
        }
    }

    /// 获取存储信息：现有键和占用字节数
    pub fn info(&self) -> Result<StorageInfo, StorageError> {
        let mut keys = Vec::new();
        let mut current_size = 0u64;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                keys.push(name.to_string());
            }
            current_size += entry.metadata()?.len();
        }
        keys.sort();
        Ok(StorageInfo { keys, current_size })
    }

    /// 异步设置缓存，写入失败向调用方返回错误
    pub async fn set_async<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        expire_ms: Option<i64>,
    ) -> Result<(), StorageError> {
        let entry = CacheEntry::new(serde_json::to_value(data)?, expire_ms);
        let json = serde_json::to_string(&entry)?;
        tokio::fs::write(self.entry_path(key), json).await?;
        Ok(())
    }

    /// 异步获取缓存
    /// 键不存在返回 Ok(None)；数据损坏或读取失败返回错误
    pub async fn get_async<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        let raw = match tokio::fs::read_to_string(self.entry_path(key)).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let entry: CacheEntry = serde_json::from_str(&raw)?;
        if entry.is_expired(chrono::Utc::now().timestamp_millis()) {
            self.remove(key);
            return Ok(None);
        }

        Ok(Some(serde_json::from_value(entry.data)?))
    }

    /// 写入裸字符串，不包缓存信封，用于令牌等固定键
    pub fn set_raw(&self, key: &str, value: &str) {
        if let Err(e) = fs::write(self.entry_path(key), value) {
            tracing::error!("设置缓存失败: {}", e);
        }
    }

    /// 读取裸字符串
    pub fn get_raw(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(s) if !s.is_empty() => Some(s),
            Ok(_) => None,
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::error!("获取缓存失败: {}", e);
                None
            }
        }
    }
}
