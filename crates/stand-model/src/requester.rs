use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable opaque identity of a requester (chat id, account id, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(String);

impl RequesterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RequesterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequesterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for RequesterId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Someone asking for the stand.
///
/// Identity is the only thing compared; the display name is for messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub id: RequesterId,
    pub name: String,
}

impl Requester {
    pub fn new(id: impl Into<RequesterId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Returns `true` if both values refer to the same identity.
    #[inline]
    pub fn same_identity(&self, other: &Requester) -> bool {
        self.id == other.id
    }
}
