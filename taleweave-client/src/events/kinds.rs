//! Registry of known realtime event kinds and their payloads.
//!
//! Every inbound event is decoded into a [`RealtimeEvent`] variant. Field
//! names are camelCase on the wire; snake_case spellings are accepted too.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use taleweave_core::error::EventError;
use taleweave_core::types::{NotificationSeverity, Role, User, UserId};

/// Wire names of every known inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `presence-update`
    PresenceUpdate,
    /// `user:online`
    UserOnline,
    /// `notification`
    Notification,
    /// `analytics:update`
    AnalyticsUpdate,
    /// `story:progress`
    StoryProgress,
    /// `assessment:complete`
    AssessmentComplete,
    /// `alert:risk`
    RiskAlert,
    /// `journal-entry-created`
    JournalEntryCreated,
    /// `quiz-completed`
    QuizCompleted,
    /// `live-activity`
    LiveActivity,
    /// `deep-insights`
    DeepInsights,
    /// `high-risk-alert`
    HighRiskAlert,
}

impl EventKind {
    /// Every known kind.
    pub const ALL: [Self; 12] = [
        Self::PresenceUpdate,
        Self::UserOnline,
        Self::Notification,
        Self::AnalyticsUpdate,
        Self::StoryProgress,
        Self::AssessmentComplete,
        Self::RiskAlert,
        Self::JournalEntryCreated,
        Self::QuizCompleted,
        Self::LiveActivity,
        Self::DeepInsights,
        Self::HighRiskAlert,
    ];

    /// Wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PresenceUpdate => "presence-update",
            Self::UserOnline => "user:online",
            Self::Notification => "notification",
            Self::AnalyticsUpdate => "analytics:update",
            Self::StoryProgress => "story:progress",
            Self::AssessmentComplete => "assessment:complete",
            Self::RiskAlert => "alert:risk",
            Self::JournalEntryCreated => "journal-entry-created",
            Self::QuizCompleted => "quiz-completed",
            Self::LiveActivity => "live-activity",
            Self::DeepInsights => "deep-insights",
            Self::HighRiskAlert => "high-risk-alert",
        }
    }

    /// Looks up a kind by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic checks run after structural decoding.
trait Payload: DeserializeOwned {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

fn percent(field: &str, value: f64) -> Result<(), String> {
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{field} must be between 0 and 100, got {value}"));
    }
    Ok(())
}

/// Full replacement of the online-user set.
///
/// Accepts `{ "users": [...] }`, `{ "onlineUsers": [...] }`, or a bare array;
/// entries are ids or objects carrying `id` / `userId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PresenceWire")]
pub struct PresenceSnapshot {
    /// Online users.
    pub users: Vec<UserId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PresenceEntry {
    Id(UserId),
    User {
        #[serde(alias = "userId", alias = "user_id")]
        id: UserId,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PresenceWire {
    Bare(Vec<PresenceEntry>),
    Users {
        users: Vec<PresenceEntry>,
    },
    Online {
        #[serde(rename = "onlineUsers", alias = "online_users")]
        online_users: Vec<PresenceEntry>,
    },
}

impl From<PresenceWire> for PresenceSnapshot {
    fn from(wire: PresenceWire) -> Self {
        let entries = match wire {
            PresenceWire::Bare(entries)
            | PresenceWire::Users { users: entries }
            | PresenceWire::Online {
                online_users: entries,
            } => entries,
        };
        let users = entries
            .into_iter()
            .map(|entry| match entry {
                PresenceEntry::Id(id) | PresenceEntry::User { id } => id,
            })
            .collect();
        Self { users }
    }
}

impl Payload for PresenceSnapshot {
    fn check(&self) -> Result<(), String> {
        self.users
            .iter()
            .try_for_each(|id| require("user id", id.as_str()))
    }
}

/// One user went on- or offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOnline {
    /// User.
    #[serde(alias = "user_id")]
    pub user_id: UserId,
    /// New status.
    pub online: bool,
}

impl Payload for UserOnline {
    fn check(&self) -> Result<(), String> {
        require("userId", self.user_id.as_str())
    }
}

/// Server-pushed notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerNotification {
    /// Severity; `info` when absent.
    #[serde(default, alias = "type")]
    pub severity: NotificationSeverity,
    /// Title; a generic title is used when absent.
    #[serde(default)]
    pub title: String,
    /// Body.
    pub message: String,
    /// Optional action target.
    #[serde(default)]
    pub action: Option<String>,
}

impl Payload for ServerNotification {
    fn check(&self) -> Result<(), String> {
        require("message", &self.message)
    }
}

/// A metric on a dashboard changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsUpdate {
    /// Metric name.
    pub metric: String,
    /// New value.
    pub value: f64,
    /// Student the metric belongs to, if any.
    #[serde(default, alias = "student_id")]
    pub student_id: Option<UserId>,
}

impl Payload for AnalyticsUpdate {
    fn check(&self) -> Result<(), String> {
        require("metric", &self.metric)
    }
}

/// Reading progress through a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryProgress {
    /// Reader.
    #[serde(alias = "student_id")]
    pub student_id: UserId,
    /// Story.
    #[serde(alias = "story_id")]
    pub story_id: String,
    /// Percent complete.
    pub progress: u8,
}

impl Payload for StoryProgress {
    fn check(&self) -> Result<(), String> {
        require("studentId", self.student_id.as_str())?;
        require("storyId", &self.story_id)?;
        percent("progress", f64::from(self.progress))
    }
}

/// An assessment was scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentComplete {
    /// Student.
    #[serde(alias = "student_id")]
    pub student_id: UserId,
    /// Assessment.
    #[serde(alias = "assessment_id")]
    pub assessment_id: String,
    /// Score out of 100.
    pub score: f64,
}

impl Payload for AssessmentComplete {
    fn check(&self) -> Result<(), String> {
        require("studentId", self.student_id.as_str())?;
        require("assessmentId", &self.assessment_id)?;
        percent("score", self.score)
    }
}

/// Graded wellbeing risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low.
    Low,
    /// Medium.
    Medium,
    /// High.
    High,
    /// Critical.
    Critical,
}

impl RiskLevel {
    /// Severity of the notification raised for this level.
    #[must_use]
    pub const fn severity(&self) -> NotificationSeverity {
        match self {
            Self::Low | Self::Medium => NotificationSeverity::Warning,
            Self::High | Self::Critical => NotificationSeverity::Error,
        }
    }
}

/// A student's risk level changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAlert {
    /// Student.
    #[serde(alias = "student_id")]
    pub student_id: UserId,
    /// Level.
    pub level: RiskLevel,
    /// Explanation.
    pub message: String,
}

impl Payload for RiskAlert {
    fn check(&self) -> Result<(), String> {
        require("studentId", self.student_id.as_str())?;
        require("message", &self.message)
    }
}

/// A journal entry was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryCreated {
    /// Entry.
    #[serde(alias = "entry_id")]
    pub entry_id: String,
    /// Author.
    #[serde(alias = "student_id")]
    pub student_id: UserId,
    /// Title, if shared.
    #[serde(default)]
    pub title: Option<String>,
}

impl Payload for JournalEntryCreated {
    fn check(&self) -> Result<(), String> {
        require("entryId", &self.entry_id)?;
        require("studentId", self.student_id.as_str())
    }
}

/// A quiz was completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizCompleted {
    /// Student.
    #[serde(alias = "student_id")]
    pub student_id: UserId,
    /// Quiz.
    #[serde(alias = "quiz_id")]
    pub quiz_id: String,
    /// Score out of 100.
    pub score: f64,
}

impl Payload for QuizCompleted {
    fn check(&self) -> Result<(), String> {
        require("studentId", self.student_id.as_str())?;
        require("quizId", &self.quiz_id)?;
        percent("score", self.score)
    }
}

/// Something a user is doing right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveActivity {
    /// Actor.
    #[serde(alias = "user_id")]
    pub user_id: UserId,
    /// Description.
    pub activity: String,
    /// When it happened.
    #[serde(default, alias = "timestamp")]
    pub at: Option<DateTime<Utc>>,
}

impl Payload for LiveActivity {
    fn check(&self) -> Result<(), String> {
        require("userId", self.user_id.as_str())?;
        require("activity", &self.activity)
    }
}

/// Generated insights about a student or class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepInsights {
    /// Student, when the insights are individual.
    #[serde(default, alias = "student_id")]
    pub student_id: Option<UserId>,
    /// Insight lines.
    pub insights: Vec<String>,
}

impl Payload for DeepInsights {
    fn check(&self) -> Result<(), String> {
        if self.insights.is_empty() {
            return Err("insights must not be empty".to_string());
        }
        self.insights.iter().try_for_each(|line| require("insight", line))
    }
}

/// Urgent risk signal that always raises an error notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighRiskAlert {
    /// Student.
    #[serde(alias = "student_id")]
    pub student_id: UserId,
    /// Explanation.
    pub message: String,
    /// Contributing indicators.
    #[serde(default)]
    pub indicators: Vec<String>,
}

impl Payload for HighRiskAlert {
    fn check(&self) -> Result<(), String> {
        require("studentId", self.student_id.as_str())?;
        require("message", &self.message)
    }
}

/// A decoded, validated inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    /// Presence snapshot.
    PresenceUpdate(PresenceSnapshot),
    /// Single presence change.
    UserOnline(UserOnline),
    /// Generic notification.
    Notification(ServerNotification),
    /// Dashboard metric.
    AnalyticsUpdate(AnalyticsUpdate),
    /// Story progress.
    StoryProgress(StoryProgress),
    /// Assessment scored.
    AssessmentComplete(AssessmentComplete),
    /// Risk level change.
    RiskAlert(RiskAlert),
    /// Journal entry written.
    JournalEntryCreated(JournalEntryCreated),
    /// Quiz completed.
    QuizCompleted(QuizCompleted),
    /// Live activity.
    LiveActivity(LiveActivity),
    /// Generated insights.
    DeepInsights(DeepInsights),
    /// Urgent risk signal.
    HighRiskAlert(HighRiskAlert),
}

fn parse<T: Payload>(kind: EventKind, data: &Value) -> Result<T, EventError> {
    let payload = T::deserialize(data).map_err(|e| EventError::malformed(kind.name(), e.to_string()))?;
    payload
        .check()
        .map_err(|reason| EventError::malformed(kind.name(), reason))?;
    Ok(payload)
}

impl RealtimeEvent {
    /// Decodes and validates the payload of event `name`.
    ///
    /// # Errors
    ///
    /// `UnknownEvent` for names outside the registry, `MalformedPayload` when
    /// the payload fails structural or semantic checks.
    pub fn decode(name: &str, data: &Value) -> Result<Self, EventError> {
        let kind = EventKind::from_name(name).ok_or_else(|| EventError::UnknownEvent {
            event: name.to_string(),
        })?;

        Ok(match kind {
            EventKind::PresenceUpdate => Self::PresenceUpdate(parse(kind, data)?),
            EventKind::UserOnline => Self::UserOnline(parse(kind, data)?),
            EventKind::Notification => Self::Notification(parse(kind, data)?),
            EventKind::AnalyticsUpdate => Self::AnalyticsUpdate(parse(kind, data)?),
            EventKind::StoryProgress => Self::StoryProgress(parse(kind, data)?),
            EventKind::AssessmentComplete => Self::AssessmentComplete(parse(kind, data)?),
            EventKind::RiskAlert => Self::RiskAlert(parse(kind, data)?),
            EventKind::JournalEntryCreated => Self::JournalEntryCreated(parse(kind, data)?),
            EventKind::QuizCompleted => Self::QuizCompleted(parse(kind, data)?),
            EventKind::LiveActivity => Self::LiveActivity(parse(kind, data)?),
            EventKind::DeepInsights => Self::DeepInsights(parse(kind, data)?),
            EventKind::HighRiskAlert => Self::HighRiskAlert(parse(kind, data)?),
        })
    }

    /// Kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PresenceUpdate(_) => EventKind::PresenceUpdate,
            Self::UserOnline(_) => EventKind::UserOnline,
            Self::Notification(_) => EventKind::Notification,
            Self::AnalyticsUpdate(_) => EventKind::AnalyticsUpdate,
            Self::StoryProgress(_) => EventKind::StoryProgress,
            Self::AssessmentComplete(_) => EventKind::AssessmentComplete,
            Self::RiskAlert(_) => EventKind::RiskAlert,
            Self::JournalEntryCreated(_) => EventKind::JournalEntryCreated,
            Self::QuizCompleted(_) => EventKind::QuizCompleted,
            Self::LiveActivity(_) => EventKind::LiveActivity,
            Self::DeepInsights(_) => EventKind::DeepInsights,
            Self::HighRiskAlert(_) => EventKind::HighRiskAlert,
        }
    }
}

/// Outbound `identify` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    /// Current user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
}

impl Identify {
    /// Outbound event name.
    pub const EVENT: &'static str = "identify";
}

impl From<&User> for Identify {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("teleport"), None);
    }

    #[test]
    fn test_unknown_event() {
        let err = RealtimeEvent::decode("teleport", &json!({})).unwrap_err();
        assert_eq!(
            err,
            EventError::UnknownEvent {
                event: "teleport".into()
            }
        );
    }

    #[test]
    fn test_presence_shapes() {
        let expected = vec![UserId::new_unchecked("a"), UserId::new_unchecked("b")];
        for data in [
            json!(["a", "b"]),
            json!({"users": ["a", "b"]}),
            json!({"onlineUsers": [{"userId": "a"}, {"id": "b"}]}),
        ] {
            let event = RealtimeEvent::decode("presence-update", &data).unwrap();
            assert_eq!(
                event,
                RealtimeEvent::PresenceUpdate(PresenceSnapshot {
                    users: expected.clone()
                })
            );
        }

        assert!(RealtimeEvent::decode("presence-update", &json!({"count": 2})).is_err());
        assert!(RealtimeEvent::decode("presence-update", &json!([""])).is_err());
    }

    #[test]
    fn test_snake_case_aliases() {
        let event = RealtimeEvent::decode(
            "story:progress",
            &json!({"student_id": "s1", "story_id": "st1", "progress": 55}),
        )
        .unwrap();
        assert_eq!(event.kind(), EventKind::StoryProgress);
    }

    #[test]
    fn test_semantic_checks() {
        let cases = [
            ("story:progress", json!({"studentId": "s1", "storyId": "x", "progress": 101})),
            ("assessment:complete", json!({"studentId": "s1", "assessmentId": "a", "score": -1})),
            ("quiz-completed", json!({"studentId": "", "quizId": "q", "score": 50})),
            ("deep-insights", json!({"insights": []})),
            ("notification", json!({"title": "x", "message": "  "})),
            ("alert:risk", json!({"studentId": "s1", "level": "extreme", "message": "m"})),
            ("user:online", json!({"userId": "u1"})),
        ];
        for (name, data) in cases {
            let err = RealtimeEvent::decode(name, &data).unwrap_err();
            assert!(
                matches!(&err, EventError::MalformedPayload { event, .. } if event == name),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn test_notification_defaults_and_type_alias() {
        let event =
            RealtimeEvent::decode("notification", &json!({"type": "warning", "message": "m"}))
                .unwrap();
        let RealtimeEvent::Notification(n) = event else {
            panic!("wrong variant");
        };
        assert_eq!(n.severity, NotificationSeverity::Warning);
        assert!(n.title.is_empty());
    }

    #[test]
    fn test_risk_level_severity() {
        assert_eq!(RiskLevel::Medium.severity(), NotificationSeverity::Warning);
        assert_eq!(RiskLevel::Critical.severity(), NotificationSeverity::Error);
    }

    #[test]
    fn test_identify_wire_shape() {
        let user = User::new(UserId::new_unchecked("t-1"), "Ms. Rivera", Role::Teacher);
        let value = serde_json::to_value(Identify::from(&user)).unwrap();
        assert_eq!(
            value,
            json!({"userId": "t-1", "name": "Ms. Rivera", "role": "teacher"})
        );
    }
}
