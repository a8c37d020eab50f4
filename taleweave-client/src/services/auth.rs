//! Sign-in, sign-up, and sign-out.

use serde_json::{Value, json};
use std::sync::Arc;
use taleweave_core::error::ApiError;
use taleweave_core::types::User;
use taleweave_gateway::rest::{ApiClient, extract_token};
use tracing::{info, warn};

use super::models::{LoginRequest, SignupRequest};
use crate::realtime::RealtimeManager;
use crate::store::{StatePersistence, Store};

/// Pulls the user record out of `{user}`, `{data: {user}}`, `{data: user}`,
/// or a bare user object.
fn extract_user(value: &Value) -> Result<User, ApiError> {
    let data = value.get("data").unwrap_or(value);
    let candidate = value
        .get("user")
        .or_else(|| data.get("user"))
        .unwrap_or(data);
    serde_json::from_value(candidate.clone()).map_err(|e| ApiError::Decode {
        reason: format!("user record: {e}"),
    })
}

/// Session lifecycle against the backend.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
    store: Store,
    realtime: RealtimeManager,
    persistence: Option<StatePersistence>,
}

impl AuthService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        api: Arc<ApiClient>,
        store: Store,
        realtime: RealtimeManager,
        persistence: Option<StatePersistence>,
    ) -> Self {
        Self {
            api,
            store,
            realtime,
            persistence,
        }
    }

    /// `POST /auth/login`; stores and persists the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response: Value = self
            .api
            .post("/auth/login", &LoginRequest { email, password })
            .await?;
        self.establish(&response)
    }

    /// `POST /auth/signup`; stores and persists the session.
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, ApiError> {
        let response: Value = self.api.post("/auth/signup", request).await?;
        self.establish(&response)
    }

    /// Ends the session.
    ///
    /// The backend call is best effort; the local session is cleared and the
    /// realtime connection closed whatever it returns.
    pub async fn logout(&self) {
        if self.store.token().is_some()
            && let Err(error) = self
                .api
                .post::<_, Value>("/auth/logout", &json!({}))
                .await
        {
            warn!(%error, "Logout request failed, signing out locally");
        }

        self.store.logout();
        self.persist();
        self.realtime.disconnect().await;
        info!("Signed out");
    }

    /// Exchanges the refresh cookie for a new credential.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        self.api.refresh().await.map(|_| ())
    }

    /// `GET /user/me`; refreshes the stored user record.
    pub async fn me(&self) -> Result<User, ApiError> {
        let response: Value = self.api.get("/user/me").await?;
        let user = extract_user(&response)?;
        if let Some(token) = self.store.token() {
            self.store.login(user.clone(), token);
            self.persist();
        }
        Ok(user)
    }

    fn establish(&self, response: &Value) -> Result<User, ApiError> {
        let token = extract_token(response).ok_or_else(|| ApiError::Decode {
            reason: "auth response carried no token".to_string(),
        })?;
        let user = extract_user(response)?;

        self.store.login(user.clone(), token);
        self.persist();
        info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(user)
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence
            && let Err(error) = self.store.save_to(persistence)
        {
            warn!(%error, "Failed to persist session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::LocalBus;
    use crate::hooks::StoreSessionHooks;
    use httpmock::prelude::*;
    use taleweave_core::types::{NewNotification, NotificationSeverity, Role, UserId};
    use taleweave_gateway::rest::RestConfig;
    use taleweave_gateway::ws::WebSocketConfig;
    use tempfile::TempDir;

    struct Fixture {
        auth: AuthService,
        store: Store,
        persistence: StatePersistence,
        _dir: TempDir,
    }

    fn fixture(server: &MockServer) -> Fixture {
        let dir = TempDir::new().unwrap();
        let persistence = StatePersistence::new(dir.path());
        let store = Store::new();
        let bus = LocalBus::new();
        let hooks = StoreSessionHooks::new(store.clone(), bus.clone(), Some(persistence.clone()));
        let config = RestConfig::builder().base_url(server.url("/api")).build();
        let api = Arc::new(ApiClient::new(config, Arc::new(hooks)).unwrap());
        let realtime = RealtimeManager::new(
            WebSocketConfig::builder()
                .url("ws://127.0.0.1:1/socket")
                .build(),
            store.clone(),
            bus,
        );
        Fixture {
            auth: AuthService::new(api, store.clone(), realtime, Some(persistence.clone())),
            store,
            persistence,
            _dir: dir,
        }
    }

    fn user_json() -> Value {
        json!({"id": "t-1", "name": "Ms. Rivera", "email": "rivera@example.com", "role": "teacher"})
    }

    #[test]
    fn test_extract_user_shapes() {
        for value in [
            json!({"user": user_json(), "token": "x"}),
            json!({"data": {"user": user_json(), "accessToken": "x"}}),
            json!({"data": user_json()}),
            user_json(),
        ] {
            assert_eq!(extract_user(&value).unwrap().role, Role::Teacher);
        }
        assert!(extract_user(&json!({"ok": true})).is_err());
    }

    #[tokio::test]
    async fn test_login_stores_and_persists() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/auth/login")
                    .json_body(json!({"email": "rivera@example.com", "password": "pw"}));
                then.status(200)
                    .json_body(json!({"user": user_json(), "token": "jwt-1"}));
            })
            .await;

        let f = fixture(&server);
        let user = f.auth.login("rivera@example.com", "pw").await.unwrap();

        mock.assert_async().await;
        assert_eq!(user.id, UserId::new_unchecked("t-1"));
        assert!(f.store.is_authenticated());
        assert_eq!(f.store.token().as_deref(), Some("jwt-1"));
        let saved = f.persistence.load().unwrap();
        assert_eq!(saved.token.as_deref(), Some("jwt-1"));
        assert_eq!(saved.user, Some(user));
    }

    #[tokio::test]
    async fn test_bad_credentials_do_not_refresh() {
        let server = MockServer::start_async().await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/refresh");
                then.status(200).json_body(json!({"token": "never"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/login");
                then.status(401)
                    .json_body(json!({"message": "Invalid email or password"}));
            })
            .await;

        let f = fixture(&server);
        let err = f.auth.login("x@example.com", "bad").await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Unauthorized {
                message: Some("Invalid email or password".into())
            }
        );
        assert_eq!(refresh.hits_async().await, 0);
        assert!(!f.store.is_authenticated());
    }

    #[tokio::test]
    async fn test_signup_accepts_wrapped_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/signup");
                then.status(201)
                    .json_body(json!({"data": {"user": user_json(), "accessToken": "jwt-2"}}));
            })
            .await;

        let f = fixture(&server);
        let request = SignupRequest {
            name: "Ms. Rivera".into(),
            email: "rivera@example.com".into(),
            password: "pw".into(),
            role: Role::Teacher,
        };
        f.auth.signup(&request).await.unwrap();
        assert_eq!(f.store.token().as_deref(), Some("jwt-2"));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_backend_fails() {
        let server = MockServer::start_async().await;
        let logout = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/logout");
                then.status(500);
            })
            .await;

        let f = fixture(&server);
        f.store.login(
            User::new(UserId::new_unchecked("t-1"), "Ms. Rivera", Role::Teacher),
            "jwt",
        );
        f.store.push_notification(NewNotification::new(NotificationSeverity::Info, "a", "b"));

        f.auth.logout().await;
        logout.assert_async().await;
        assert!(!f.store.is_authenticated());
        assert!(f.store.notifications().is_empty());
        assert!(f.persistence.load().unwrap().token.is_none());
    }

    #[tokio::test]
    async fn test_refresh_updates_store() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/refresh");
                then.status(200).json_body(json!({"token": "fresh"}));
            })
            .await;

        let f = fixture(&server);
        f.store.login(
            User::new(UserId::new_unchecked("t-1"), "Ms. Rivera", Role::Teacher),
            "stale",
        );
        f.auth.refresh().await.unwrap();
        assert_eq!(f.store.token().as_deref(), Some("fresh"));
        assert_eq!(f.persistence.load().unwrap().token.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_me_refreshes_user_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/user/me")
                    .header("authorization", "Bearer jwt");
                then.status(200).json_body(json!({"user": user_json()}));
            })
            .await;

        let f = fixture(&server);
        f.store.login(
            User::new(UserId::new_unchecked("t-1"), "Old Name", Role::Teacher),
            "jwt",
        );
        let user = f.auth.me().await.unwrap();
        assert_eq!(user.name, "Ms. Rivera");
        assert_eq!(f.store.user().map(|u| u.name), Some("Ms. Rivera".to_string()));
        assert_eq!(f.store.token().as_deref(), Some("jwt"));
    }
}
