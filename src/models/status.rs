use serde::{Serialize, Serializer};

/// Outcome of a reachability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamStatus {
    /// Not checked yet
    Pending,
    /// No URL to check
    NotAvailable,
    /// Reachable and the body starts like an M3U playlist
    Stream,
    /// Reachable but no playlist signature in the prefix
    OtherContent,
    /// Reachable but reading the body failed
    ProcessingError,
    /// Upstream answered with a non-2xx/3xx status
    HttpError(u16),
    Timeout,
    ConnectionError,
    Error,
}

/// Coarse grouping of status labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Pending,
    NotAvailable,
    Working,
    NotWorking,
}

impl StatusClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusClass::Pending => "pending",
            StatusClass::NotAvailable => "not_available",
            StatusClass::Working => "working",
            StatusClass::NotWorking => "not_working",
        }
    }
}

impl StreamStatus {
    pub fn class(&self) -> StatusClass {
        match self {
            StreamStatus::Pending => StatusClass::Pending,
            StreamStatus::NotAvailable => StatusClass::NotAvailable,
            StreamStatus::Stream
            | StreamStatus::OtherContent
            | StreamStatus::ProcessingError => StatusClass::Working,
            StreamStatus::HttpError(_)
            | StreamStatus::Timeout
            | StreamStatus::ConnectionError
            | StreamStatus::Error => StatusClass::NotWorking,
        }
    }
}

impl std::fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamStatus::Pending => write!(f, "Pending"),
            StreamStatus::NotAvailable => write!(f, "N/A"),
            StreamStatus::Stream => write!(f, "Working (Stream)"),
            StreamStatus::OtherContent => write!(f, "Working (Other Content)"),
            StreamStatus::ProcessingError => write!(f, "Working (Processing Error)"),
            StreamStatus::HttpError(code) => write!(f, "Not Working (HTTP Error {})", code),
            StreamStatus::Timeout => write!(f, "Timeout"),
            StreamStatus::ConnectionError => write!(f, "Connection Error"),
            StreamStatus::Error => write!(f, "Error"),
        }
    }
}

impl Serialize for StreamStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
