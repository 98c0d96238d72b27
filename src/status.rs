use crate::spotify::PlaybackSnapshot;

pub const MAX_STATUS_CHARS: usize = 96;
const ELLIPSIS: &str = "...";

/// Emoji and text shown as the chat user's status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusPayload {
    pub emoji: String,
    pub text: String,
}

impl StatusPayload {
    /// Text longer than `MAX_STATUS_CHARS` is cut with [`truncate`].
    pub fn new(emoji: &str, text: String) -> Self {
        Self {
            emoji: emoji.to_string(),
            text: truncate(&text, MAX_STATUS_CHARS),
        }
    }

    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn is_cleared(&self) -> bool {
        self.emoji.is_empty() && self.text.is_empty()
    }
}

/// `"<artist1,artist2> - <title>"`, cut to 96 chars plus an ellipsis.
pub fn format_track_status(snapshot: &PlaybackSnapshot) -> String {
    truncate(
        &format!("{} - {}", snapshot.artists.join(","), snapshot.title),
        MAX_STATUS_CHARS,
    )
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &value[..cut], ELLIPSIS),
        None => value.to_string(),
    }
}
