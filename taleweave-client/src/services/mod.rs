//! Backend services built on the HTTP gateway.

mod auth;
mod fallback;
mod models;
mod resources;

pub use auth::AuthService;
pub use fallback::{FallbackCache, Resource, unwrap_data};
pub use models::{
    Achievement, AnalyticsOverview, Course, Invitation, InvitationRequest, InvitationStatus,
    JournalEntry, NewJournalEntry, SignupRequest, Story,
};
pub use resources::ResourceService;
