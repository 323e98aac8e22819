//! 对象缓存层
//!
//! 后端以插件形式注册到全局表，启动时按 `cache.type` 选择。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Once;

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// 后端异常，无法判断是否存在
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// `ttl` 为 0 时使用后端默认过期时间
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

/// 读取并反序列化 JSON 值，解析失败视为未命中
pub async fn get_json<T: DeserializeOwned>(cache: &dyn ObjectCache, key: &str) -> Option<T> {
    match cache.get_raw(key).await {
        CacheResult::Found(raw) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("缓存值解析失败 {}: {}", key, e);
                cache.remove(key).await;
                None
            }
        },
        _ => None,
    }
}

pub async fn insert_json<T: Serialize>(cache: &dyn ObjectCache, key: String, value: &T, ttl: u64) {
    match serde_json::to_string(value) {
        Ok(raw) => cache.insert_raw(key, raw, ttl).await,
        Err(e) => tracing::warn!("缓存值序列化失败 {}: {}", key, e),
    }
}

/// 声明缓存插件，生成 `register_plugin` 注册函数
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        pub fn register_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        let cache = <$ty>::new()
                            .map_err($crate::errors::EduConnectError::cache_connection)?;
                        Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>)
                    })
                }),
            );
        }
    };
}

static REGISTER_BUILTIN: Once = Once::new();

/// 注册内置缓存后端，可重复调用
pub fn register_builtin_plugins() {
    REGISTER_BUILTIN.call_once(|| {
        object_cache::moka::register_plugin();
        object_cache::redis::register_plugin();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserSummary;
    use crate::models::users::entities::UserRole;

    #[tokio::test]
    async fn test_json_helpers_round_trip_through_moka() {
        let cache = object_cache::moka::MokaCacheWrapper::with_capacity(100, 60);
        let summary = UserSummary {
            id: 1,
            username: "alice01".to_string(),
            display_name: None,
            role: UserRole::Student,
        };

        insert_json(&cache, "user:1".to_string(), &summary, 0).await;
        let cached: Option<UserSummary> = get_json(&cache, "user:1").await;
        assert_eq!(cached.map(|u| u.id), Some(1));

        cache.remove("user:1").await;
        assert!(get_json::<UserSummary>(&cache, "user:1").await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_is_treated_as_miss() {
        let cache = object_cache::moka::MokaCacheWrapper::with_capacity(100, 60);
        cache
            .insert_raw("broken".to_string(), "{not json".to_string(), 0)
            .await;
        assert!(get_json::<UserSummary>(&cache, "broken").await.is_none());
        assert_eq!(cache.get_raw("broken").await, CacheResult::NotFound);
    }
}
