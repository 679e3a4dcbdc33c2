use serde::Serialize;

/// Body of a notification is cut to this many characters.
pub const PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, Serialize)]
pub struct MessageNotification {
    pub ticket_id: i64,
    pub message_id: i64,
    pub sender_id: i64,
    pub preview: String,
}

pub fn preview(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_owned(),
    }
}
