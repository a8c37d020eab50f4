//! Application context: one explicitly constructed set of runtime handles.

use std::sync::Arc;
use taleweave_core::config::{TaleweaveConfig, Validatable};
use taleweave_core::error::TaleweaveError;
use taleweave_gateway::rest::{ApiClient, RestConfig};
use taleweave_gateway::ws::WebSocketConfig;
use tracing::{info, warn};

use crate::bus::LocalBus;
use crate::hooks::StoreSessionHooks;
use crate::realtime::RealtimeManager;
use crate::services::{AuthService, ResourceService};
use crate::store::{StatePersistence, Store};

/// Everything a client needs, wired together.
///
/// Every member is a handle, so clones share state.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Arc<TaleweaveConfig>,
    store: Store,
    bus: LocalBus,
    api: Arc<ApiClient>,
    realtime: RealtimeManager,
    auth: AuthService,
    resources: ResourceService,
    persistence: Option<StatePersistence>,
}

impl AppContext {
    /// Builds the context, hydrating the store when a storage directory is configured.
    ///
    /// # Errors
    ///
    /// Returns `TaleweaveError::Config` for an invalid configuration and
    /// `TaleweaveError::Network` if the HTTP client cannot be built.
    pub fn new(config: TaleweaveConfig) -> Result<Self, TaleweaveError> {
        config.validate()?;
        let ws_config = WebSocketConfig::from(&config.realtime);
        ws_config.validate()?;

        let persistence = config.storage.directory.as_deref().map(StatePersistence::new);
        let store = persistence
            .as_ref()
            .and_then(StatePersistence::load)
            .map(Store::hydrated)
            .unwrap_or_default();
        let bus = LocalBus::new();

        let realtime = RealtimeManager::new(ws_config, store.clone(), bus.clone());
        let hooks = StoreSessionHooks::new(store.clone(), bus.clone(), persistence.clone())
            .with_realtime(realtime.clone());
        let api = Arc::new(ApiClient::new(
            RestConfig::from(&config.api),
            Arc::new(hooks),
        )?);
        let auth = AuthService::new(
            Arc::clone(&api),
            store.clone(),
            realtime.clone(),
            persistence.clone(),
        );
        let resources = ResourceService::new(Arc::clone(&api), store.clone());

        info!(
            api = %config.api.base_url,
            authenticated = store.is_authenticated(),
            persistence = persistence.is_some(),
            "Client context ready"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            bus,
            api,
            realtime,
            auth,
            resources,
            persistence,
        })
    }

    /// Configuration the context was built from.
    #[must_use]
    pub fn config(&self) -> &TaleweaveConfig {
        &self.config
    }

    /// State store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Local signal bus.
    #[must_use]
    pub fn bus(&self) -> &LocalBus {
        &self.bus
    }

    /// HTTP gateway.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Realtime connection manager.
    #[must_use]
    pub fn realtime(&self) -> &RealtimeManager {
        &self.realtime
    }

    /// Session lifecycle.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Backend resources.
    #[must_use]
    pub fn resources(&self) -> &ResourceService {
        &self.resources
    }

    /// Persistence, when configured.
    #[must_use]
    pub fn persistence(&self) -> Option<&StatePersistence> {
        self.persistence.as_ref()
    }

    /// Closes the realtime connection and persists the store.
    pub async fn shutdown(&self) {
        self.realtime.disconnect().await;
        if let Some(persistence) = &self.persistence
            && let Err(error) = self.store.save_to(persistence)
        {
            warn!(%error, "Failed to persist state on shutdown");
        }
        info!("Client context shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use httpmock::prelude::*;
    use serde_json::Value;
    use std::time::Duration;
    use taleweave_core::error::ApiError;
    use taleweave_core::types::{Role, Theme, User, UserId};
    use taleweave_gateway::ws::ConnectionState;
    use tempfile::TempDir;
    use tokio::net::TcpListener;
    use tokio::time::{sleep, timeout};
    use tokio_tungstenite::accept_async;

    fn config(dir: Option<&TempDir>) -> TaleweaveConfig {
        let mut config = TaleweaveConfig::default();
        config.storage.directory = dir.map(|d| d.path().to_path_buf());
        config
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut bad = TaleweaveConfig::default();
        bad.api.base_url = "ftp://example.com".into();
        assert!(matches!(
            AppContext::new(bad),
            Err(TaleweaveError::Config(_))
        ));
    }

    #[test]
    fn test_without_persistence() {
        let context = AppContext::new(config(None)).unwrap();
        assert!(context.persistence().is_none());
        assert!(!context.store().is_authenticated());
    }

    #[tokio::test]
    async fn test_shutdown_persists_and_next_context_hydrates() {
        let dir = TempDir::new().unwrap();
        let first = AppContext::new(config(Some(&dir))).unwrap();
        first.store().login(
            User::new(UserId::new_unchecked("p-1"), "Sam", Role::Parent),
            "jwt",
        );
        first.store().set_theme(Theme::Dark);
        first.shutdown().await;

        let second = AppContext::new(config(Some(&dir))).unwrap();
        assert!(second.store().is_authenticated());
        assert_eq!(second.store().token().as_deref(), Some("jwt"));
        assert_eq!(second.store().theme(), Theme::Dark);
    }

    #[tokio::test]
    async fn test_expired_session_closes_live_updates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/stories");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/refresh");
                then.status(401);
            })
            .await;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            while ws.next().await.is_some() {}
        });

        let mut settings = config(None);
        settings.api.base_url = server.url("/api");
        settings.realtime.socket_url = format!("ws://{addr}/socket");
        settings.realtime.max_reconnect_attempts = 1;
        let context = AppContext::new(settings).unwrap();
        context.store().login(
            User::new(UserId::new_unchecked("t-1"), "Ms. Rivera", Role::Teacher),
            "jwt",
        );
        context.realtime().connect().await.unwrap();
        assert!(context.realtime().is_connected());

        let result = context.api().get::<Value>("/stories").await;
        assert!(matches!(result, Err(ApiError::SessionExpired)));
        assert!(!context.store().is_authenticated());

        timeout(Duration::from_secs(5), async {
            while context.realtime().state() != ConnectionState::Disconnected {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_clones_share_handles() {
        let context = AppContext::new(config(None)).unwrap();
        let clone = context.clone();
        context.store().set_live_updates(false);
        assert!(!clone.store().live_updates());
    }
}
