use serde_json::Value as JsonValue;

use crate::core_api::{CoreError, CoreErrorCode};

pub const OBJECT_STATES_KEY: &str = "ObjectStates";
pub const GUID_KEY: &str = "GUID";
pub const NICKNAME_KEY: &str = "Nickname";
pub const LUA_SCRIPT_KEY: &str = "LuaScript";
pub const CONTAINED_OBJECTS_KEY: &str = "ContainedObjects";

/// A parsed Tabletop Simulator save.
///
/// The whole JSON tree is kept as-is so keys, ordering and number literals of
/// objects the walker never touches are written back unchanged.
#[derive(Debug, Clone)]
pub struct SaveDocument {
    root: JsonValue,
}

impl SaveDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let root: JsonValue = serde_json::from_slice(bytes)?;
        Self::from_value(root)
    }

    pub fn from_value(root: JsonValue) -> Result<Self, CoreError> {
        match root.get(OBJECT_STATES_KEY) {
            Some(JsonValue::Array(_)) => Ok(Self { root }),
            Some(_) => Err(CoreError::new(
                CoreErrorCode::MissingObjectStates,
                format!("'{OBJECT_STATES_KEY}' is present but is not an array"),
            )),
            None => Err(CoreError::new(
                CoreErrorCode::MissingObjectStates,
                format!("missing '{OBJECT_STATES_KEY}' array"),
            )),
        }
    }

    pub fn object_states(&self) -> &[JsonValue] {
        self.root
            .get(OBJECT_STATES_KEY)
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn object_states_mut(&mut self) -> &mut [JsonValue] {
        self.root
            .get_mut(OBJECT_STATES_KEY)
            .and_then(JsonValue::as_array_mut)
            .map(Vec::as_mut_slice)
            .unwrap_or_default()
    }

    pub fn as_value(&self) -> &JsonValue {
        &self.root
    }

    pub fn to_pretty_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.root).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to serialize save file: {e}"),
            )
        })
    }
}

/// Read-only view over one entry of `ObjectStates` / `ContainedObjects`.
#[derive(Debug, Clone, Copy)]
pub struct SceneNode<'a> {
    value: &'a JsonValue,
}

impl<'a> SceneNode<'a> {
    pub fn new(value: &'a JsonValue) -> Self {
        Self { value }
    }

    /// The node's GUID. Non-string GUIDs are treated as absent.
    pub fn id(&self) -> Option<&'a str> {
        self.value.get(GUID_KEY).and_then(JsonValue::as_str)
    }

    pub fn nickname(&self) -> Option<&'a str> {
        self.value.get(NICKNAME_KEY).and_then(JsonValue::as_str)
    }

    /// Nickname, or an empty string when the object has none.
    pub fn display_name(&self) -> &'a str {
        self.nickname().unwrap_or("")
    }

    /// The script body, if present and non-empty.
    pub fn script(&self) -> Option<&'a str> {
        self.value
            .get(LUA_SCRIPT_KEY)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn children(&self) -> &'a [JsonValue] {
        self.value
            .get(CONTAINED_OBJECTS_KEY)
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

pub fn children_mut(value: &mut JsonValue) -> Option<&mut Vec<JsonValue>> {
    value
        .get_mut(CONTAINED_OBJECTS_KEY)
        .and_then(JsonValue::as_array_mut)
}

/// Replaces the node's script body. Non-object values are left alone.
pub fn set_script(value: &mut JsonValue, script: String) {
    if let Some(obj) = value.as_object_mut() {
        obj.insert(LUA_SCRIPT_KEY.to_string(), JsonValue::String(script));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{SaveDocument, SceneNode, set_script};
    use crate::core_api::CoreErrorCode;

    #[test]
    fn rejects_documents_without_object_states() {
        let err = SaveDocument::from_slice(br#"{"SaveName": "x"}"#)
            .expect_err("missing ObjectStates should fail");
        assert_eq!(err.code, CoreErrorCode::MissingObjectStates);

        let err = SaveDocument::from_slice(br#"{"ObjectStates": {}}"#)
            .expect_err("non-array ObjectStates should fail");
        assert_eq!(err.code, CoreErrorCode::MissingObjectStates);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = SaveDocument::from_slice(b"{\"ObjectStates\": [").expect_err("truncated json");
        assert_eq!(err.code, CoreErrorCode::Parse);
    }

    #[test]
    fn scene_node_reads_tts_keys() {
        let value = json!({
            "GUID": "abc123",
            "Nickname": "UCM Ships",
            "LuaScript": "",
            "ContainedObjects": [{"GUID": "def456"}]
        });
        let node = SceneNode::new(&value);
        assert_eq!(node.id(), Some("abc123"));
        assert_eq!(node.display_name(), "UCM Ships");
        assert_eq!(node.script(), None);
        assert_eq!(node.children().len(), 1);
    }

    #[test]
    fn set_script_overwrites_body_in_place() {
        let mut value: serde_json::Value =
            serde_json::from_str(r#"{"GUID": "a", "LuaScript": "old", "Other": 1.50}"#)
                .expect("valid json");
        set_script(&mut value, "new".to_string());
        assert_eq!(value["LuaScript"], "new");
        assert_eq!(value["Other"].to_string(), "1.50");
    }
}
