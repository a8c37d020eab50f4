//! Fallback content for read services.
//!
//! A read that fails is answered from the last good payload for the same
//! path, or from the static set for the resource when nothing was cached.

use dashmap::DashMap;
use serde_json::{Value, json};

/// Read endpoints with fallback content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// `GET /stories`
    Stories,
    /// `GET /journal`
    Journal,
    /// `GET /analytics/overview`
    Analytics,
    /// `GET /notifications`
    Notifications,
    /// `GET /courses`
    Courses,
    /// `GET /invitations`
    Invitations,
    /// `GET /achievements`
    Achievements,
}

impl Resource {
    /// Request path.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Stories => "/stories",
            Self::Journal => "/journal",
            Self::Analytics => "/analytics/overview",
            Self::Notifications => "/notifications",
            Self::Courses => "/courses",
            Self::Invitations => "/invitations",
            Self::Achievements => "/achievements",
        }
    }

    /// Static content served when neither the backend nor the cache can answer.
    #[must_use]
    pub fn fallback(&self) -> Value {
        match self {
            Self::Stories => json!([
                {
                    "id": "story-brave-little-cloud",
                    "title": "The Brave Little Cloud",
                    "description": "A small cloud learns that it is fine to feel scared of thunder.",
                    "themes": ["anxiety", "courage"]
                },
                {
                    "id": "story-garden-of-feelings",
                    "title": "The Garden of Feelings",
                    "description": "Every feeling is a seed that needs a different kind of care.",
                    "themes": ["emotions", "self-awareness"]
                },
                {
                    "id": "story-lighthouse-keeper",
                    "title": "The Lighthouse Keeper",
                    "description": "A lighthouse keeper helps lost boats find their way home.",
                    "themes": ["belonging", "friendship"]
                }
            ]),
            Self::Journal => json!([
                {
                    "id": "journal-welcome",
                    "title": "My first entry",
                    "content": "Write about something that made you smile today.",
                    "mood": "calm"
                }
            ]),
            Self::Analytics => json!({
                "totalStudents": 0,
                "activeStories": 0,
                "averageProgress": 0.0,
                "completedAssessments": 0,
                "atRiskStudents": 0
            }),
            Self::Notifications => json!([
                {
                    "id": "notification-offline",
                    "severity": "info",
                    "title": "Working offline",
                    "message": "Showing saved content until the connection returns.",
                    "createdAt": "2024-01-01T00:00:00Z",
                    "read": true
                }
            ]),
            Self::Courses => json!([
                {
                    "id": "course-emotional-literacy",
                    "title": "Emotional Literacy Foundations",
                    "description": "Naming, understanding, and expressing feelings.",
                    "lessons": 6
                },
                {
                    "id": "course-calm-strategies",
                    "title": "Calm-Down Strategies",
                    "description": "Breathing, grounding, and other tools for big feelings.",
                    "lessons": 4
                }
            ]),
            Self::Invitations => json!([
                {
                    "id": "invitation-sample",
                    "email": "family@example.com",
                    "role": "parent",
                    "status": "pending"
                }
            ]),
            Self::Achievements => json!([
                {
                    "id": "achievement-first-story",
                    "title": "First Story",
                    "description": "Finish your first story."
                },
                {
                    "id": "achievement-reflective-writer",
                    "title": "Reflective Writer",
                    "description": "Write five journal entries."
                }
            ]),
        }
    }
}

/// Strips a `{ "data": ... }` wrapper if present.
#[must_use]
pub fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Last good payload per request path.
#[derive(Debug, Default)]
pub struct FallbackCache {
    entries: DashMap<String, Value>,
}

impl FallbackCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a good payload for `path`.
    pub fn remember(&self, path: &str, value: Value) {
        self.entries.insert(path.to_string(), value);
    }

    /// Last good payload for `path`.
    #[must_use]
    pub fn recall(&self, path: &str) -> Option<Value> {
        self.entries.get(path).map(|entry| entry.value().clone())
    }

    /// Number of cached paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
