//! Read commands. These always print something: cached or bundled content
//! stands in when the backend is unreachable.

use taleweave_client::AppContext;

/// Lists stories.
pub async fn stories(context: &AppContext) {
    let stories = context.resources().stories().await;
    println!("{:<32} {:<36} {:>8}", "ID", "TITLE", "PROGRESS");
    for story in stories {
        let progress = story
            .progress
            .map_or_else(|| "-".to_string(), |p| format!("{p:.0}%"));
        println!("{:<32} {:<36} {:>8}", story.id, story.title, progress);
    }
}

/// Lists journal entries.
pub async fn journal(context: &AppContext) {
    let entries = context.resources().journal_entries().await;
    for entry in entries {
        let when = entry
            .created_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d").to_string());
        println!("{when}  {}", entry.title);
        if let Some(mood) = entry.mood {
            println!("            mood: {mood}");
        }
    }
}

/// Lists notifications, newest first. Unread ones are starred.
pub async fn notifications(context: &AppContext) {
    let mut notifications = context.resources().notifications().await;
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    for n in notifications {
        let marker = if n.read { ' ' } else { '*' };
        println!(
            "{marker} [{:<7}] {}  {}: {}",
            n.severity.as_str(),
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.title,
            n.message
        );
    }
}
