use crate::adapters::http::{ApiClient, HttpTransport};
use crate::adapters::storage::FileStore;
use crate::core::form::FormController;
use crate::core::preferences::PreferenceStore;
use crate::core::session::SessionManager;
use crate::core::{ConfigProvider, KeyValueStore};
use crate::utils::error::Result;
use std::sync::Arc;

/// Wires store, session, API client and form controller together.
pub struct TaxAdvisor {
    session: Arc<SessionManager>,
    client: Arc<ApiClient>,
    preferences: PreferenceStore,
}

impl TaxAdvisor {
    /// Persists state in a JSON file under the configured state directory.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let store = Arc::new(FileStore::new(config.state_dir()));
        tracing::debug!("Using state file {}", store.path().display());
        Self::with_store(config, store)
    }

    pub fn with_store<C: ConfigProvider>(config: &C, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let transport = HttpTransport::new(config.base_url(), config.request_timeout())?;
        let session = Arc::new(SessionManager::create(
            Arc::clone(&store),
            Arc::new(transport.clone()),
        ));
        let client = Arc::new(ApiClient::new(transport, Arc::clone(&session)));

        Ok(Self {
            session,
            client,
            preferences: PreferenceStore::new(store),
        })
    }

    /// Makes sure a session token exists. Failure is reported to session
    /// subscribers and logged; the caller may continue without a token.
    pub async fn start(&self) -> bool {
        match self.session.ensure_token().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("🔶 Starting without a session token: {}", e);
                false
            }
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn form(&self) -> FormController {
        FormController::new(self.client.clone(), self.preferences.clone())
    }
}
