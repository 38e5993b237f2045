use std::collections::BTreeMap;
use std::fmt;

/// Unique key of a tracked record, resolved once by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle state of a record. `Resolved` is the terminal state the diff
/// engine watches for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
    /// A status label the dashboard does not know about, kept verbatim.
    Other(String),
}

impl RecordStatus {
    /// Parses the labels used by the record service. Unknown labels are kept
    /// as [`RecordStatus::Other`] rather than rejected.
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "in progress" | "inprogress" | "in_progress" => Self::InProgress,
            "resolved" => Self::Resolved,
            "closed" => Self::Closed,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Opaque fields carried alongside a record (title, owner, timestamps).
pub type Payload = BTreeMap<String, String>;

/// One tracked item. A changed record arrives as a new value with the same id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub status: RecordStatus,
    pub payload: Payload,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, status: RecordStatus) -> Self {
        Self {
            id: id.into(),
            status,
            payload: Payload::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }
}
