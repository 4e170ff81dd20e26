//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Accessors the tree builder needs from a flat record.
pub trait TreeItem {
    fn item_id(&self) -> &str;
    fn parent_id(&self) -> Option<&str>;
    fn rank(&self) -> f64;
}

/// Whether a node has been issued a permanent id by the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    #[default]
    Confirmed,
    /// Client-side placeholder keyed by a temporary id
    Pending,
}

impl NodeStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, NodeStatus::Confirmed)
    }
}

/// A flat tree record.
///
/// Fields unknown to the engine are kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub title: String,
    pub rank: f64,
    #[serde(default, skip_serializing_if = "NodeStatus::is_confirmed")]
    pub status: NodeStatus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, parent_id: Option<&str>, title: impl Into<String>, rank: f64) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            title: title.into(),
            rank,
            status: NodeStatus::Confirmed,
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == NodeStatus::Pending
    }
}

impl TreeItem for Node {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    fn rank(&self) -> f64 {
        self.rank
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pending() {
            write!(f, "{} [{}] (pending)", self.title, self.id)
        } else {
            write!(f, "{} [{}]", self.title, self.id)
        }
    }
}

/// Direction of a one-step sibling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Open optimistic-create session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineCreateSession {
    pub temp_id: String,
    pub source_id: Option<String>,
    pub after_id: Option<String>,
}

/// Arguments for opening an inline create session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginInlineCreate {
    pub temp_id: String,
    #[serde(default)]
    pub source_id: Option<String>,
}

/// Placeholder to insert for the open session.
///
/// `node.id` is ignored; the placeholder is keyed by the session's temp id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinePlaceholder {
    #[serde(default)]
    pub after_id: Option<String>,
    pub node: Node,
}

/// Promotion of a placeholder to its permanent id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmInlineCreate {
    pub temp_id: String,
    pub node_id: String,
}
