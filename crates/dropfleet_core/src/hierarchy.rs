use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::document::SceneNode;

/// Deepest nesting level that is indexed or visited. Top-level objects are level 1.
pub const MAX_DEPTH: usize = 10;

/// Upper bound on parent hops when reconstructing a container path.
pub const MAX_PATH_STEPS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEntry {
    pub parent_id: Option<String>,
    pub display_name: String,
}

/// GUID -> (parent GUID, nickname) lookup built from one pass over the save.
///
/// Objects without a GUID cannot anchor their children, so anything below
/// them is not indexed at all.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    entries: HashMap<String, HierarchyEntry>,
}

impl HierarchyIndex {
    pub fn build(object_states: &[JsonValue]) -> Self {
        let mut index = Self::default();
        index.index_level(object_states, None, 1);
        index
    }

    fn index_level(&mut self, nodes: &[JsonValue], parent_id: Option<&str>, depth: usize) {
        if depth > MAX_DEPTH {
            return;
        }

        for value in nodes {
            let node = SceneNode::new(value);
            let Some(id) = node.id() else {
                continue;
            };

            self.entries.insert(
                id.to_string(),
                HierarchyEntry {
                    parent_id: parent_id.map(str::to_string),
                    display_name: node.display_name().to_string(),
                },
            );

            let children = node.children();
            if !children.is_empty() {
                self.index_level(children, Some(id), depth + 1);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&HierarchyEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ancestor nicknames of `start_id`, root first, excluding the object itself.
    /// Unnamed ancestors are skipped.
    pub fn resolve_path(&self, start_id: &str) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = start_id;

        for _ in 0..MAX_PATH_STEPS {
            let Some(entry) = self.entries.get(current) else {
                break;
            };
            let Some(parent_id) = entry.parent_id.as_deref() else {
                break;
            };

            if let Some(parent) = self.entries.get(parent_id)
                && !parent.display_name.is_empty()
            {
                path.push(parent.display_name.clone());
            }
            current = parent_id;
        }

        path.reverse();
        path
    }
}
