use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable 128-bit identifier for a node, generated once and persisted by
/// the agent (`~/.agent_config.json`) so it survives agent restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for NodeId {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

/// Identifier for a single `ImageTask`, normally the uploaded filename.
///
/// Kept distinct from `String` so that queue/registry APIs can't
/// accidentally be called with the wrong kind of string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// The filename stem, i.e. `"foo.png"` and `"foo"` both yield `"foo"`.
    ///
    /// Used by `TaskQueueManager::complete` to match a reported id against
    /// a stored one even when one side carries an extension and the other
    /// doesn't.
    pub fn stem(&self) -> &str {
        match self.0.rsplit_once('.') {
            Some((stem, _ext)) => stem,
            None => &self.0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display_roundtrips_through_parse() {
        let id = NodeId::new_v4();
        let s = id.to_string();
        let parsed = NodeId::parse(&s).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn task_id_stem_strips_extension() {
        assert_eq!(TaskId::from("foo.png").stem(), "foo");
        assert_eq!(TaskId::from("foo").stem(), "foo");
        assert_eq!(TaskId::from("a.b.png").stem(), "a.b");
    }
}
