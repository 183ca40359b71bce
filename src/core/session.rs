use crate::domain::ports::{KeyValueStore, TokenSource};
use crate::utils::error::ApiError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const TOKEN_REJECTED_MESSAGE: &str = "Session expired or invalid. Please try refreshing the page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TokenIssued,
    TokenRejected { status: u16, message: String },
    TokenFetchFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type SessionListener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// 管理 bearer token：快取、取得、失效與通知訂閱者
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn TokenSource>,
    token: RwLock<Option<String>>,
    // Held across the token request so concurrent callers share one fetch.
    fetch_gate: tokio::sync::Mutex<()>,
    listeners: Mutex<Vec<(SubscriptionId, SessionListener)>>,
    next_subscription: AtomicU64,
}

impl SessionManager {
    /// Loads any cached token from `store`.
    pub fn create(store: Arc<dyn KeyValueStore>, source: Arc<dyn TokenSource>) -> Self {
        let cached = match store.get(ACCESS_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("🔶 Could not read cached session token: {}", e);
                None
            }
        };
        if cached.is_some() {
            tracing::debug!("🔑 Restored cached session token");
        }

        Self {
            store,
            source,
            token: RwLock::new(cached),
            fetch_gate: tokio::sync::Mutex::new(()),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn current_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_token(&self) -> bool {
        self.current_token().is_some()
    }

    /// Returns the cached token, fetching one when none is cached.
    pub async fn ensure_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.current_token() {
            return Ok(token);
        }

        let _gate = self.fetch_gate.lock().await;
        if let Some(token) = self.current_token() {
            tracing::debug!("🔑 Token was fetched by a concurrent caller");
            return Ok(token);
        }

        tracing::info!("🔑 Requesting a new session token");
        match self.source.request_token().await {
            Ok(response) if !response.access_token.is_empty() => {
                self.store_token(&response.access_token);
                self.emit(&SessionEvent::TokenIssued);
                Ok(response.access_token)
            }
            Ok(_) => {
                let err = ApiError::network("Token endpoint returned an empty access token");
                self.fail_fetch(&err);
                Err(err)
            }
            Err(err) => {
                self.fail_fetch(&err);
                Err(err)
            }
        }
    }

    pub async fn refresh_token(&self) -> Result<String, ApiError> {
        self.invalidate();
        self.ensure_token().await
    }

    pub fn invalidate(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        if let Err(e) = self.store.remove(ACCESS_TOKEN_KEY) {
            tracing::warn!("🔶 Could not clear cached session token: {}", e);
        }
    }

    /// Called once per 401/403 on an authenticated request: drops the
    /// token, tells subscribers, and fetches a replacement. No further retry.
    pub async fn on_token_rejected(&self, status: u16) -> Result<String, ApiError> {
        self.invalidate();
        self.emit(&SessionEvent::TokenRejected {
            status,
            message: TOKEN_REJECTED_MESSAGE.to_string(),
        });
        self.ensure_token().await
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    fn store_token(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        // 寫入失敗時仍保留記憶體中的 token
        if let Err(e) = self.store.set(ACCESS_TOKEN_KEY, token, None) {
            tracing::warn!("🔶 Could not persist session token: {}", e);
        }
        tracing::info!("✅ Session token acquired");
    }

    fn fail_fetch(&self, err: &ApiError) {
        self.invalidate();
        let message = format!("Could not establish a session: {}", err.message());
        tracing::error!("❌ {}", message);
        self.emit(&SessionEvent::TokenFetchFailed { message });
    }

    fn emit(&self, event: &SessionEvent) {
        let listeners: Vec<SessionListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStore;
    use crate::domain::model::TokenResponse;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    struct CountingSource {
        calls: AtomicUsize,
        token: Option<String>,
        delay: Duration,
    }

    impl CountingSource {
        fn issuing(token: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                token: Some(token.to_string()),
                delay: Duration::ZERO,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                token: None,
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenSource for CountingSource {
        async fn request_token(&self) -> Result<TokenResponse, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.token {
                Some(token) => Ok(TokenResponse {
                    access_token: format!("{}-{}", token, n),
                    token_type: Some("bearer".to_string()),
                }),
                None => Err(ApiError::network("connection refused")),
            }
        }
    }

    fn recorder(session: &SessionManager) -> Arc<Mutex<Vec<SessionEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        session.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[tokio::test]
    async fn test_ensure_token_fetches_once_and_caches() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(CountingSource::issuing("tok"));
        let session = SessionManager::create(store.clone(), source.clone());

        assert_eq!(session.ensure_token().await.unwrap(), "tok-1");
        assert_eq!(session.ensure_token().await.unwrap(), "tok-1");

        assert_eq!(source.calls(), 1);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_cached_token_skips_fetch() {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "cached", None).unwrap();
        let source = Arc::new(CountingSource::issuing("tok"));

        let session = SessionManager::create(store, source.clone());

        assert_eq!(session.current_token().as_deref(), Some("cached"));
        assert_eq!(session.ensure_token().await.unwrap(), "cached");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(CountingSource::issuing("tok").with_delay(Duration::from_millis(50)));
        let session = Arc::new(SessionManager::create(store, source.clone()));

        let (a, b, c) = tokio::join!(
            session.ensure_token(),
            session.ensure_token(),
            session.ensure_token()
        );

        assert_eq!(source.calls(), 1);
        assert_eq!(a.unwrap(), "tok-1");
        assert_eq!(b.unwrap(), "tok-1");
        assert_eq!(c.unwrap(), "tok-1");
    }

    #[tokio::test]
    async fn test_fetch_failure_clears_and_notifies() {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "", None).unwrap();
        let source = Arc::new(CountingSource::failing());
        let session = SessionManager::create(store.clone(), source.clone());
        let events = recorder(&session);

        let err = session.ensure_token().await.unwrap_err();

        assert_eq!(err, ApiError::network("connection refused"));
        assert_eq!(session.current_token(), None);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[SessionEvent::TokenFetchFailed {
                message: "Could not establish a session: connection refused".to_string()
            }]
        );
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_rejection_clears_notifies_and_refetches_once() {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "stale", None).unwrap();
        let source = Arc::new(CountingSource::issuing("fresh"));
        let session = SessionManager::create(store.clone(), source.clone());
        let events = recorder(&session);

        let token = session.on_token_rejected(401).await.unwrap();

        assert_eq!(token, "fresh-1");
        assert_eq!(source.calls(), 1);
        assert_eq!(store.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("fresh-1"));
        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[
                SessionEvent::TokenRejected {
                    status: 401,
                    message: TOKEN_REJECTED_MESSAGE.to_string()
                },
                SessionEvent::TokenIssued,
            ]
        );
    }

    #[tokio::test]
    async fn test_rejection_with_failing_endpoint_does_not_loop() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(CountingSource::failing());
        let session = SessionManager::create(store, source.clone());

        assert!(session.on_token_rejected(403).await.is_err());
        assert_eq!(source.calls(), 1);
        assert!(!session.has_token());
    }

    #[tokio::test]
    async fn test_refresh_replaces_token() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(CountingSource::issuing("tok"));
        let session = SessionManager::create(store, source.clone());

        session.ensure_token().await.unwrap();
        assert_eq!(session.refresh_token().await.unwrap(), "tok-2");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_unsubscribed_listener_stops_receiving() {
        let store = Arc::new(MemoryStore::new());
        let source = Arc::new(CountingSource::issuing("tok"));
        let session = SessionManager::create(store, source);

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let id = session.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        session.ensure_token().await.unwrap();
        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
        session.refresh_token().await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
