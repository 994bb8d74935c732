//! YouTube video ID extraction.

use regex::Regex;
use std::sync::LazyLock;

/// URL shapes, tried in priority order: query parameter / `/v/` / short link,
/// then embed, then shorts.
static URL_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:v=|/v/|youtu\.be/)([a-zA-Z0-9_-]{11})").expect("Invalid regex"),
        Regex::new(r"(?:embed/)([a-zA-Z0-9_-]{11})").expect("Invalid regex"),
        Regex::new(r"(?:shorts/)([a-zA-Z0-9_-]{11})").expect("Invalid regex"),
    ]
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("Invalid regex"));

/// Extract the video ID from a YouTube URL, or accept a bare 11-character ID.
///
/// Returns `None` when nothing usable is found; absence is an ordinary outcome.
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    for pattern in URL_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(input) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
    }

    BARE_ID.is_match(input).then(|| input.to_string())
}

/// Build a watch URL for a video ID.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
