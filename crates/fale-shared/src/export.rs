//! Plain-text transcript export of a conversation.

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::types::Conversation;

const EMPTY_BODY: &str = "Nenhuma mensagem encontrada.";

/// Render `conversation` with timestamps in the machine's local time.
pub fn render_transcript(conversation: &Conversation) -> String {
    render_transcript_in(conversation, &Local)
}

/// Render `conversation` with timestamps shown in `tz`.
///
/// Layout: a `# title` line, a `Data:` line with the creation time, then one
/// `## sender (time):` block per message. Missing timestamps print as `-`.
pub fn render_transcript_in<Tz>(conversation: &Conversation, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", conversation.title));
    out.push_str(&format!(
        "Data: {}\n\n",
        format_time(conversation.created_at, tz, "%d/%m/%Y %H:%M:%S")
    ));

    if conversation.messages.is_empty() {
        out.push_str(EMPTY_BODY);
        return out;
    }

    for message in &conversation.messages {
        out.push_str(&format!(
            "## {} ({}):\n{}\n\n",
            message.sender.label(),
            format_time(message.created_at, tz, "%H:%M:%S"),
            message.content
        ));
    }
    out
}

fn format_time<Tz>(at: Option<DateTime<Utc>>, tz: &Tz, fmt: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match at {
        Some(at) => at.with_timezone(tz).format(fmt).to_string(),
        None => "-".to_string(),
    }
}
