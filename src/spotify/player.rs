#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Track,
    Other,
}

/// One "currently playing" result, discarded after formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub kind: ItemKind,
    pub artists: Vec<String>,
    pub title: String,
    pub external_url: Option<String>,
}

impl PlaybackSnapshot {
    pub fn is_playing_track(&self) -> bool {
        self.is_playing && self.kind == ItemKind::Track
    }
}

pub fn parse_currently_playing(body: &serde_json::Value) -> Option<PlaybackSnapshot> {
    if body.is_null() {
        return None;
    }

    let kind = match body["currently_playing_type"].as_str() {
        Some("track") => ItemKind::Track,
        _ => ItemKind::Other,
    };

    let item = &body["item"];
    let artists = item["artists"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|a| a["name"].as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();
    let title = item["name"].as_str().unwrap_or_default().to_string();
    let external_url = item["external_urls"]["spotify"]
        .as_str()
        .map(|s| s.to_string());

    Some(PlaybackSnapshot {
        is_playing: body["is_playing"].as_bool().unwrap_or(false),
        // A track without its item payload cannot be displayed.
        kind: if item.is_null() { ItemKind::Other } else { kind },
        artists,
        title,
        external_url,
    })
}
