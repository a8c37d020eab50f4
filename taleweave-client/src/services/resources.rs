//! Read services with fallback content, plus the few write helpers.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use taleweave_core::error::ApiError;
use taleweave_core::types::{Notification, NotificationId};
use taleweave_gateway::rest::ApiClient;
use tracing::{debug, warn};

use super::fallback::{FallbackCache, Resource, unwrap_data};
use super::models::{
    Achievement, AnalyticsOverview, Course, Invitation, InvitationRequest, JournalEntry,
    NewJournalEntry, Story,
};
use crate::store::Store;

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        reason: e.to_string(),
    })
}

/// Backend resources.
///
/// Reads never fail: on any error they answer from the last good payload
/// for the same path, else from [`Resource::fallback`]. Writes propagate
/// errors.
#[derive(Debug, Clone)]
pub struct ResourceService {
    api: Arc<ApiClient>,
    store: Store,
    cache: Arc<FallbackCache>,
}

impl ResourceService {
    /// Creates the service.
    #[must_use]
    pub fn new(api: Arc<ApiClient>, store: Store) -> Self {
        Self {
            api,
            store,
            cache: Arc::new(FallbackCache::new()),
        }
    }

    /// Cache of last good payloads.
    #[must_use]
    pub fn cache(&self) -> &FallbackCache {
        &self.cache
    }

    /// `GET /stories`
    pub async fn stories(&self) -> Vec<Story> {
        self.read(Resource::Stories).await
    }

    /// `GET /stories/{id}`. `None` when the story does not exist.
    pub async fn story(&self, id: &str) -> Option<Story> {
        let path = format!("{}/{id}", Resource::Stories.path());
        match self.fetch::<Story>(&path).await {
            Ok(story) => Some(story),
            Err(ApiError::NotFound { .. }) => None,
            Err(error) => {
                debug!(path, %error, "Serving fallback story");
                if let Some(cached) = self.cache.recall(&path)
                    && let Ok(story) = decode::<Story>(cached)
                {
                    return Some(story);
                }
                let stories: Vec<Story> = self.fallback(Resource::Stories);
                stories.into_iter().find(|story| story.id == id)
            }
        }
    }

    /// `GET /journal`
    pub async fn journal_entries(&self) -> Vec<JournalEntry> {
        self.read(Resource::Journal).await
    }

    /// `GET /analytics/overview`
    pub async fn analytics(&self) -> AnalyticsOverview {
        self.read(Resource::Analytics).await
    }

    /// `GET /notifications`
    pub async fn notifications(&self) -> Vec<Notification> {
        self.read(Resource::Notifications).await
    }

    /// `GET /courses`
    pub async fn courses(&self) -> Vec<Course> {
        self.read(Resource::Courses).await
    }

    /// `GET /invitations`
    pub async fn invitations(&self) -> Vec<Invitation> {
        self.read(Resource::Invitations).await
    }

    /// `GET /achievements`
    pub async fn achievements(&self) -> Vec<Achievement> {
        self.read(Resource::Achievements).await
    }

    /// `POST /journal`
    pub async fn create_journal_entry(
        &self,
        entry: &NewJournalEntry,
    ) -> Result<JournalEntry, ApiError> {
        let created: Value = self.api.post(Resource::Journal.path(), entry).await?;
        decode(unwrap_data(created))
    }

    /// `PUT /notifications/{id}/read`, then acknowledges it locally.
    pub async fn mark_notification_read(&self, id: &NotificationId) -> Result<(), ApiError> {
        let path = format!("{}/{id}/read", Resource::Notifications.path());
        let _: Value = self.api.put(&path, &json!({})).await?;
        self.store.mark_read(id);
        Ok(())
    }

    /// `POST /invitations`
    pub async fn send_invitation(
        &self,
        invitation: &InvitationRequest,
    ) -> Result<Invitation, ApiError> {
        let sent: Value = self
            .api
            .post(Resource::Invitations.path(), invitation)
            .await?;
        decode(unwrap_data(sent))
    }

    /// GETs `path`, decodes it, and caches the payload on success.
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = unwrap_data(self.api.get::<Value>(path).await?);
        let decoded = decode(value.clone()).inspect_err(|error| {
            warn!(path, %error, "Response did not match the expected shape");
        })?;
        self.cache.remember(path, value);
        Ok(decoded)
    }

    async fn read<T: DeserializeOwned + Default>(&self, resource: Resource) -> T {
        match self.fetch(resource.path()).await {
            Ok(value) => value,
            Err(error) => {
                debug!(path = resource.path(), %error, "Serving fallback");
                self.fallback(resource)
            }
        }
    }

    fn fallback<T: DeserializeOwned + Default>(&self, resource: Resource) -> T {
        if let Some(cached) = self.cache.recall(resource.path())
            && let Ok(value) = decode(cached)
        {
            return value;
        }
        decode(resource.fallback()).unwrap_or_else(|error| {
            warn!(path = resource.path(), %error, "Static fallback did not decode");
            T::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use taleweave_core::types::{NewNotification, NotificationSeverity, Role};
    use taleweave_gateway::rest::{MemorySession, RestConfig};

    fn service(server: &MockServer) -> (ResourceService, Store) {
        let config = RestConfig::builder().base_url(server.url("/api")).build();
        let api = ApiClient::new(config, Arc::new(MemorySession::new(Some("tok".into())))).unwrap();
        let store = Store::new();
        (ResourceService::new(Arc::new(api), store.clone()), store)
    }

    fn unreachable() -> (ResourceService, Store) {
        let config = RestConfig::builder()
            .base_url("http://127.0.0.1:1/api")
            .build();
        let api = ApiClient::new(config, Arc::new(MemorySession::default())).unwrap();
        let store = Store::new();
        (ResourceService::new(Arc::new(api), store.clone()), store)
    }

    #[tokio::test]
    async fn test_bare_and_wrapped_lists() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/stories");
                then.status(200)
                    .json_body(json!([{"id": "s1", "title": "One"}]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/courses");
                then.status(200)
                    .json_body(json!({"data": [{"id": "c1", "title": "Course", "lessons": 3}]}));
            })
            .await;

        let (service, _) = service(&server);
        let stories = service.stories().await;
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].title, "One");

        let courses = service.courses().await;
        assert_eq!(courses[0].lessons, 3);
        assert_eq!(service.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_serves_static_fallback() {
        let (service, _) = unreachable();
        assert!(!service.stories().await.is_empty());
        assert!(!service.journal_entries().await.is_empty());
        assert!(!service.notifications().await.is_empty());
        assert!(!service.courses().await.is_empty());
        assert!(!service.invitations().await.is_empty());
        assert!(!service.achievements().await.is_empty());
        assert_eq!(service.analytics().await, AnalyticsOverview::default());
        assert!(service.story("story-brave-little-cloud").await.is_some());
        assert!(service.story("missing").await.is_none());
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_error_after_success_serves_cached_payload() {
        let server = MockServer::start_async().await;
        let ok = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/achievements");
                then.status(200)
                    .json_body(json!([{"id": "a1", "title": "Cached"}]));
            })
            .await;

        let (service, _) = service(&server);
        assert_eq!(service.achievements().await[0].title, "Cached");
        ok.delete_async().await;

        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/achievements");
                then.status(503);
            })
            .await;
        let achievements = service.achievements().await;
        assert_eq!(achievements.len(), 1);
        assert_eq!(achievements[0].title, "Cached");
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_not_cached() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/journal");
                then.status(200).json_body(json!({"entries": 3}));
            })
            .await;

        let (service, _) = service(&server);
        let entries = service.journal_entries().await;
        assert_eq!(entries[0].id, "journal-welcome");
        assert!(service.cache().recall("/journal").is_none());
    }

    #[tokio::test]
    async fn test_story_not_found_is_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/stories/story-brave-little-cloud");
                then.status(404);
            })
            .await;

        let (service, _) = service(&server);
        assert!(service.story("story-brave-little-cloud").await.is_none());
    }

    #[tokio::test]
    async fn test_mark_notification_read_updates_store() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path_contains("/read");
                then.status(204);
            })
            .await;

        let (service, store) = service(&server);
        let id = store.push_notification(NewNotification::new(
            NotificationSeverity::Info,
            "t",
            "m",
        ));
        service.mark_notification_read(&id).await.unwrap();

        mock.assert_async().await;
        assert_eq!(store.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_writes_propagate_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/invitations");
                then.status(422)
                    .json_body(json!({"message": "Email already invited"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/journal");
                then.status(201).json_body(json!({"data": {
                    "id": "j-9", "title": "Today", "content": "Sunny"
                }}));
            })
            .await;

        let (service, _) = service(&server);
        let err = service
            .send_invitation(&InvitationRequest {
                email: "family@example.com".into(),
                role: Role::Parent,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation {
                message: "Email already invited".into()
            }
        );

        let entry = service
            .create_journal_entry(&NewJournalEntry {
                title: "Today".into(),
                content: "Sunny".into(),
                mood: None,
            })
            .await
            .unwrap();
        assert_eq!(entry.id, "j-9");
    }
}
