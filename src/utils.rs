use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::types::{HistoryTableRow, SearchHistoryEntry};

/// `Basic` authorization header value for the client credentials.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = STANDARD.encode(format!("{client_id}:{client_secret}"));
    format!("Basic {credentials}")
}

pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn is_valid_session_id(candidate: &str) -> bool {
    Uuid::parse_str(candidate).is_ok()
}

pub fn playlist_link(open_url: &str, playlist_id: &str) -> String {
    format!(
        "{base}/playlist/{playlist_id}",
        base = open_url.trim_end_matches('/')
    )
}

pub fn history_table_rows(entries: &[SearchHistoryEntry]) -> Vec<HistoryTableRow> {
    entries
        .iter()
        .map(|e| HistoryTableRow {
            date: e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            query: e.search_query.clone(),
            link: e.spotify_link.clone(),
        })
        .collect()
}
