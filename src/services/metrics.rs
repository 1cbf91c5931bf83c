use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    /// Playlist downloads by outcome (ok, timeout, http_error, ...)
    pub static ref PLAYLIST_FETCHES: IntCounterVec = register_int_counter_vec!(
        "playlist_fetch_total",
        "Playlist downloads by outcome",
        &["outcome"]
    )
    .unwrap();

    pub static ref CHANNELS_PARSED: IntCounter = register_int_counter!(
        "playlist_channels_parsed_total",
        "Channels extracted from fetched playlists"
    )
    .unwrap();

    /// Stream checks by status class
    pub static ref STREAM_CHECKS: IntCounterVec = register_int_counter_vec!(
        "stream_checks_total",
        "Stream reachability checks by status class",
        &["class"]
    )
    .unwrap();
}
