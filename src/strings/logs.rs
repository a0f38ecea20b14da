use crate::domain::types::Stream;

pub const STARTING: &str = "Starting threadwatch...";
pub const NO_FEATURES: &str = "No features subscribe to any stream; nothing to poll";
pub const SHUTDOWN: &str = "Shutdown requested, leaving polling loop";

pub fn config_loaded(path: &str, mode: &str, forum: &str) -> String {
    format!("Loaded configuration from {path} (mode: {mode}, forum: r/{forum})")
}

pub fn features_registered(names: &[&str]) -> String {
    format!("Registered features: {names:?}")
}

pub fn poll_stream(stream: Stream, polled: bool) -> String {
    format!("Poll {stream}: {polled}")
}

pub fn bot_username(name: &str) -> String {
    format!("Bot username: {name}")
}

pub fn cursor_seeded(stream: Stream, cursor: &str) -> String {
    format!("Latest {stream} fullname: {cursor}")
}

pub fn retrieving(stream: Stream, cursor: &str) -> String {
    format!("Retrieving {stream} before: {cursor}")
}

pub fn items_found(stream: Stream, count: usize) -> String {
    format!("{count} new {stream} found")
}

pub fn no_items(stream: Stream) -> String {
    format!("No new {stream}")
}

pub fn cycle_failed(stream: Stream, err: &str) -> String {
    format!("Polling {stream} failed, retrying after the normal interval: {err}")
}

pub fn item_skipped(reason: &str) -> String {
    format!("Ignoring item ({reason})")
}

pub fn feature_panicked(message: &str) -> String {
    format!("Feature panicked: {message}")
}

pub fn token_refreshed(expires_in: u64) -> String {
    format!("Refreshed access token (expires in {expires_in}s)")
}

pub fn unknown_listing_kind(kind: &str) -> String {
    format!("Dropping listing child of unexpected kind '{kind}'")
}
