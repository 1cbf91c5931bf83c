pub mod m3u_parser;
pub mod metrics;
pub mod playlist_fetcher;
pub mod status_checker;
