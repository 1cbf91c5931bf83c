use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::status::StreamStatus;

/// Group assigned to entries without a `group-title` attribute
pub const UNKNOWN_GROUP: &str = "Unknown Group";

/// Single playlist channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    id: String,
    name: String,
    logo: String,
    group: String,
    #[serde(rename = "url")]
    stream_url: String,
    status: StreamStatus,
}

impl Channel {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        logo: impl Into<String>,
        group: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("channel-{}", index),
            name: name.into(),
            logo: logo.into(),
            group: group.into(),
            stream_url: stream_url.into(),
            status: StreamStatus::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logo URL, empty when the entry has none
    pub fn logo(&self) -> &str {
        &self.logo
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn stream_url(&self) -> &str {
        &self.stream_url
    }

    pub fn status(&self) -> &StreamStatus {
        &self.status
    }
}

/// Channels grouped by category, in discovery order.
///
/// Serializes as a JSON object keyed by group name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedCatalog {
    groups: Vec<(String, Vec<Channel>)>,
    index: HashMap<String, usize>,
}

impl GroupedCatalog {
    /// Stable grouping pass over finalized channels
    pub fn from_channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        let mut catalog = Self::default();
        for channel in channels {
            catalog.push(channel);
        }
        catalog
    }

    fn push(&mut self, channel: Channel) {
        match self.index.get(channel.group()) {
            Some(&pos) => self.groups[pos].1.push(channel),
            None => {
                let name = channel.group().to_string();
                self.index.insert(name.clone(), self.groups.len());
                self.groups.push((name, vec![channel]));
            }
        }
    }

    pub fn get(&self, group: &str) -> Option<&[Channel]> {
        self.index.get(group).map(|&pos| self.groups[pos].1.as_slice())
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn channel_count(&self) -> usize {
        self.groups.iter().map(|(_, channels)| channels.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Serialize for GroupedCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (name, channels) in &self.groups {
            map.serialize_entry(name, channels)?;
        }
        map.end()
    }
}

/// Request to fetch and group a playlist
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub m3u_url: String,
}

/// Grouped playlist response
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub groups: GroupedCatalog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Request to check a single stream
#[derive(Debug, Deserialize)]
pub struct CheckStatusRequest {
    #[serde(default)]
    pub stream_url: String,
}

/// Stream check response
#[derive(Debug, Serialize)]
pub struct CheckStatusResponse {
    pub status: StreamStatus,
}
