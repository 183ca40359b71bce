use crate::domain::ports::KeyValueStore;
use crate::utils::error::Result;
use std::sync::Arc;

pub const LAST_COUNTRY_KEY: &str = "lastSelectedCountry";
pub const COUNTRY_PREFERENCE_DAYS: i64 = 30;

#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 讀取上次選擇的國家，讀取失敗視為未設定
    pub fn last_country(&self) -> Option<String> {
        match self.store.get(LAST_COUNTRY_KEY) {
            Ok(code) => code.filter(|c| !c.is_empty()),
            Err(e) => {
                tracing::warn!("🔶 Could not read country preference: {}", e);
                None
            }
        }
    }

    pub fn remember_country(&self, code: &str) -> Result<()> {
        self.store.set(
            LAST_COUNTRY_KEY,
            code,
            Some(chrono::Duration::days(COUNTRY_PREFERENCE_DAYS)),
        )
    }
}
