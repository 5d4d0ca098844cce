use std::fmt;

/// Color given to members added without one.
pub const DEFAULT_COLOR: &str = "#0ea5e9";
/// Color reported for ids that are not (or no longer) in the member list.
pub const FALLBACK_COLOR: &str = "#9ca3af";
/// Name reported for ids that are not (or no longer) in the member list.
pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A roomie taking part in the shared ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// Hex color tag, e.g. `#0ea5e9`.
    pub color: String,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}
