use crate::domain::model::{AdviceResponse, FormData, TokenResponse};
use crate::utils::error::{ApiError, Result};
use async_trait::async_trait;

/// Durable client-side key-value storage with optional expiry.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// `ttl` of None keeps the entry until removed.
    fn set(&self, key: &str, value: &str, ttl: Option<chrono::Duration>) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout(&self) -> std::time::Duration;
    fn state_dir(&self) -> &str;
}

#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn request_token(&self) -> std::result::Result<TokenResponse, ApiError>;
}

#[async_trait]
pub trait AdviceApi: Send + Sync {
    async fn submit_for_advice(
        &self,
        form: &FormData,
    ) -> std::result::Result<AdviceResponse, ApiError>;
}
