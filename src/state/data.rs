/// Shared data structures for the labeling session
///
/// These structs represent the data model that flows between
/// the session state and the server API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Quality label an operator can attach to an image
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    Good,
    Bad,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Good => write!(f, "Good"),
            Quality::Bad => write!(f, "Bad"),
        }
    }
}

/// A single label on one image path
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub quality: Quality,
    /// ISO-8601 UTC, millisecond precision (e.g. "2024-05-01T12:00:00.000Z")
    pub timestamp: String,
}

impl Annotation {
    /// Create an annotation stamped with the given instant
    pub fn new(quality: Quality, at: DateTime<Utc>) -> Self {
        Self {
            quality,
            timestamp: iso_timestamp(at),
        }
    }
}

/// Image path -> annotation. Sorted so the wire payload is stable.
pub type AnnotationMap = BTreeMap<String, Annotation>;

/// Format an instant the way the server's CSV expects it
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Last segment of a server path, accepting both `/` and `\` separators
pub fn display_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
