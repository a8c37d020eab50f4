//! Resource records returned by the backend.
//!
//! Fields are camelCase on the wire. Optional fields default so that older
//! and newer backends decode alike.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use taleweave_core::types::Role;

/// A therapeutic story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Short description.
    #[serde(default)]
    pub description: Option<String>,
    /// Themes the story works on, e.g. "anxiety".
    #[serde(default)]
    pub themes: Vec<String>,
    /// Reader's progress, percent.
    #[serde(default)]
    pub progress: Option<f64>,
}

/// A journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Body.
    #[serde(default)]
    pub content: String,
    /// Self-reported mood.
    #[serde(default)]
    pub mood: Option<String>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /journal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJournalEntry {
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Self-reported mood.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

/// Dashboard summary from `GET /analytics/overview`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsOverview {
    /// Students followed.
    pub total_students: u32,
    /// Stories in progress.
    pub active_stories: u32,
    /// Mean story progress, percent.
    pub average_progress: f64,
    /// Assessments completed.
    pub completed_assessments: u32,
    /// Students currently flagged at risk.
    pub at_risk_students: u32,
}

/// A course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Number of lessons.
    #[serde(default)]
    pub lessons: u32,
}

/// Invitation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Sent, not yet answered.
    #[default]
    Pending,
    /// Accepted.
    Accepted,
    /// Expired or revoked.
    Expired,
}

/// An invitation to join the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    /// Identifier.
    pub id: String,
    /// Invitee address.
    pub email: String,
    /// Role granted on acceptance.
    #[serde(default)]
    pub role: Role,
    /// Status.
    #[serde(default)]
    pub status: InvitationStatus,
}

/// Body of `POST /invitations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRequest {
    /// Invitee address.
    pub email: String,
    /// Role granted on acceptance.
    pub role: Role,
}

/// An earned or available achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    /// Identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// When it was earned; `None` while locked.
    #[serde(default)]
    pub earned_at: Option<DateTime<Utc>>,
}

/// Body of `POST /auth/signup`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Requested role.
    pub role: Role,
}

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}
