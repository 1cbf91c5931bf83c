use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{Channel, GroupedCatalog, UNKNOWN_GROUP};

const EXTINF_PREFIX: &str = "#EXTINF:";

lazy_static! {
    /// Regex to split an EXTINF line into attributes and title.
    /// The attribute group is greedy: the title starts after the last comma.
    static ref EXTINF_REGEX: Regex = Regex::new(r"^#EXTINF:-?\d+(.*),(.*)").unwrap();

    static ref LOGO_REGEX: Regex = Regex::new(r#"tvg-logo="([^"]+)""#).unwrap();
    static ref GROUP_REGEX: Regex = Regex::new(r#"group-title="([^"]+)""#).unwrap();
}

/// Parsed EXTINF line data
#[derive(Debug, PartialEq, Eq)]
struct ExtinfData {
    name: String,
    logo: String,
    group: String,
}

/// Parse an EXTINF line
/// Format: #EXTINF:duration tvg-logo="..." group-title="...",Title
///
/// Returns `None` when the line does not match or the title is empty.
fn parse_extinf(line: &str) -> Option<ExtinfData> {
    let caps = EXTINF_REGEX.captures(line)?;

    let attributes = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let name = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    if name.is_empty() {
        return None;
    }

    let logo = LOGO_REGEX
        .captures(attributes)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let group = GROUP_REGEX
        .captures(attributes)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        // blank titles share the default group instead of an empty key
        .filter(|g| !g.is_empty())
        .unwrap_or(UNKNOWN_GROUP)
        .to_string();

    Some(ExtinfData {
        name: name.to_string(),
        logo,
        group,
    })
}

fn is_stream_url(line: &str) -> bool {
    line.starts_with("http://") || line.starts_with("https://")
}

/// Parse playlist text into channels grouped by `group-title`.
///
/// Never fails: malformed entries are skipped and input without any
/// EXTINF/URL pair yields an empty catalog.
pub fn parse_playlist(content: &str) -> GroupedCatalog {
    let mut channels: Vec<Channel> = Vec::new();
    let mut pending: Option<ExtinfData> = None;

    for raw in content.split(|c| c == '\n' || c == '\r') {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(EXTINF_PREFIX) {
            // last metadata line before a URL wins
            pending = parse_extinf(line);
            continue;
        }

        // other directives (#EXTM3U, #EXTVLCOPT, ...) keep the pending entry
        if line.starts_with('#') {
            continue;
        }

        if let Some(extinf) = pending.take() {
            if is_stream_url(line) {
                channels.push(Channel::new(
                    channels.len(),
                    extinf.name,
                    extinf.logo,
                    extinf.group,
                    line,
                ));
            }
        }
    }

    GroupedCatalog::from_channels(channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(catalog: &GroupedCatalog, group: &str) -> Vec<String> {
        catalog
            .get(group)
            .unwrap_or_default()
            .iter()
            .map(|c| c.id().to_string())
            .collect()
    }

    #[test]
    fn test_parse_extinf() {
        let line = r#"#EXTINF:-1 tvg-id="globo" tvg-logo="http://logo.com/globo.png" group-title="TV",Globo HD"#;
        let extinf = parse_extinf(line).unwrap();

        assert_eq!(extinf.name, "Globo HD");
        assert_eq!(extinf.logo, "http://logo.com/globo.png");
        assert_eq!(extinf.group, "TV");
    }

    #[test]
    fn test_parse_extinf_minimal() {
        let extinf = parse_extinf("#EXTINF:-1,Canal Teste").unwrap();

        assert_eq!(extinf.name, "Canal Teste");
        assert_eq!(extinf.logo, "");
        assert_eq!(extinf.group, UNKNOWN_GROUP);
    }

    #[test]
    fn test_parse_extinf_title_after_last_comma() {
        let extinf = parse_extinf(r#"#EXTINF:0 group-title="A, B",Name"#).unwrap();
        assert_eq!(extinf.group, "A, B");
        assert_eq!(extinf.name, "Name");
    }

    // A whitespace-only group-title lands in Unknown Group rather than under an
    // empty group key.
    #[test]
    fn test_parse_extinf_trims_and_defaults_blank_values() {
        let extinf =
            parse_extinf(r#"#EXTINF:-1 tvg-logo=" http://x/l.png " group-title="   ",  Spaced  "#)
                .unwrap();
        assert_eq!(extinf.logo, "http://x/l.png");
        assert_eq!(extinf.group, UNKNOWN_GROUP);
        assert_eq!(extinf.name, "Spaced");

        let extinf = parse_extinf(r#"#EXTINF:-1 tvg-logo="" group-title="",Empty"#).unwrap();
        assert_eq!(extinf.logo, "");
        assert_eq!(extinf.group, UNKNOWN_GROUP);
    }

    #[test]
    fn test_parse_extinf_malformed() {
        assert!(parse_extinf("#EXTINF:abc,Name").is_none());
        assert!(parse_extinf("#EXTINF:-1 no comma here").is_none());
        assert!(parse_extinf("#EXTINF:-1,").is_none());
        assert!(parse_extinf("#EXTINF:-1,   ").is_none());
    }

    #[test]
    fn test_parse_playlist_reference_example() {
        let input = "#EXTINF:-1 tvg-logo=\"http://x/logo.png\" group-title=\"News\",Channel A\n\
                     http://example.com/a.m3u8\n\
                     #EXTINF:-1,Channel B\n\
                     http://example.com/b.m3u8\n";
        let catalog = parse_playlist(input);

        assert_eq!(catalog.group_names().collect::<Vec<_>>(), vec!["News", UNKNOWN_GROUP]);

        let news = catalog.get("News").unwrap();
        assert_eq!(news.len(), 1);
        assert_eq!(news[0].id(), "channel-0");
        assert_eq!(news[0].name(), "Channel A");
        assert_eq!(news[0].logo(), "http://x/logo.png");
        assert_eq!(news[0].stream_url(), "http://example.com/a.m3u8");

        let unknown = catalog.get(UNKNOWN_GROUP).unwrap();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].id(), "channel-1");
        assert_eq!(unknown[0].name(), "Channel B");
        assert_eq!(unknown[0].logo(), "");
    }

    #[test]
    fn test_parse_playlist_empty_inputs() {
        assert!(parse_playlist("").is_empty());
        assert!(parse_playlist("#EXTM3U\n\n# just a comment\n").is_empty());
        assert!(parse_playlist("http://example.com/orphan.m3u8\n").is_empty());
        assert!(parse_playlist("#EXTINF:-1,Dangling\n").is_empty());
    }

    #[test]
    fn test_ids_follow_discovery_order_across_groups() {
        let input = r#"#EXTM3U
#EXTINF:-1 group-title="B",One
http://s/1
#EXTINF:-1 group-title="A",Two
http://s/2
#EXTINF:-1 group-title="B",Three
https://s/3
"#;
        let catalog = parse_playlist(input);

        assert_eq!(ids(&catalog, "B"), vec!["channel-0", "channel-2"]);
        assert_eq!(ids(&catalog, "A"), vec!["channel-1"]);
        assert_eq!(catalog.channel_count(), 3);
    }

    #[test]
    fn test_last_metadata_line_wins() {
        let input = "#EXTINF:-1 group-title=\"Old\",First\n\
                     #EXTINF:-1 group-title=\"New\",Second\n\
                     http://s/x\n";
        let catalog = parse_playlist(input);

        assert!(catalog.get("Old").is_none());
        let new = catalog.get("New").unwrap();
        assert_eq!(new[0].name(), "Second");
        assert_eq!(new[0].id(), "channel-0");
    }

    #[test]
    fn test_non_url_line_discards_pending() {
        let input = "#EXTINF:-1,Lost\n\
                     not-a-url\n\
                     http://s/after\n\
                     #EXTINF:-1,Kept\n\
                     http://s/kept\n";
        let catalog = parse_playlist(input);

        assert_eq!(catalog.channel_count(), 1);
        let channels = catalog.get(UNKNOWN_GROUP).unwrap();
        assert_eq!(channels[0].name(), "Kept");
        assert_eq!(channels[0].id(), "channel-0");
    }

    #[test]
    fn test_non_http_scheme_dropped() {
        let input = "#EXTINF:-1,Local\n\
                     /media/local.ts\n\
                     #EXTINF:-1,Rtmp\n\
                     rtmp://s/live\n";
        assert!(parse_playlist(input).is_empty());
    }

    #[test]
    fn test_malformed_metadata_drops_following_url() {
        let input = "#EXTINF:-1,Good\n\
                     #EXTINF:bad\n\
                     http://s/dropped\n";
        assert!(parse_playlist(input).is_empty());
    }

    #[test]
    fn test_comments_between_metadata_and_url() {
        let input = "#EXTINF:-1 group-title=\"Movies\",Film\n\
                     #EXTVLCOPT:http-user-agent=Foo\n\
                     \n\
                     http://s/film.mp4\n";
        let catalog = parse_playlist(input);
        assert_eq!(catalog.get("Movies").unwrap()[0].stream_url(), "http://s/film.mp4");
    }

    #[test]
    fn test_crlf_and_indentation() {
        let input = "#EXTM3U\r\n  #EXTINF:-1 group-title=\"News\",Indented  \r\n   http://s/a  \r\n";
        let catalog = parse_playlist(input);
        let news = catalog.get("News").unwrap();
        assert_eq!(news[0].name(), "Indented");
        assert_eq!(news[0].stream_url(), "http://s/a");
    }
}
