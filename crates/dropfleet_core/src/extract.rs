//! Regex heuristics for pulling card fields out of TTS Lua scripts.
//!
//! This is not a Lua parser. Each field is matched by the first assignment of
//! the form `[local ]field = value` in the script text.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BaseScale,
    Health,
    Signature,
    Points,
    ModelImage,
    CardFrontImage,
    CardImage,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Number,
    Url,
    Text,
}

impl Field {
    pub const ALL: [Self; 8] = [
        Self::BaseScale,
        Self::Health,
        Self::Signature,
        Self::Points,
        Self::ModelImage,
        Self::CardFrontImage,
        Self::CardImage,
        Self::Name,
    ];

    /// The identifier as it appears in card scripts.
    pub fn script_name(&self) -> &'static str {
        match *self {
            Self::BaseScale => "baseScale",
            Self::Health => "health",
            Self::Signature => "sig",
            Self::Points => "points",
            Self::ModelImage => "modelImage",
            Self::CardFrontImage => "cardFrontImage",
            Self::CardImage => "cardImage",
            Self::Name => "name",
        }
    }

    pub fn field_type(&self) -> FieldType {
        match *self {
            Self::BaseScale | Self::Health | Self::Signature | Self::Points => FieldType::Number,
            Self::ModelImage | Self::CardFrontImage | Self::CardImage => FieldType::Url,
            Self::Name => FieldType::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn assignment_prefix(field: Field) -> String {
    format!(r"\b(?:local\s+)?{}\s*=\s*", regex::escape(field.script_name()))
}

fn build_pattern(field: Field) -> Regex {
    let prefix = assignment_prefix(field);
    let value = match field.field_type() {
        FieldType::Number => r"([0-9.]+)",
        FieldType::Url => r#"['"](https?://[^'"]+)['"]"#,
        FieldType::Text => r#"['"](.*?)['"]"#,
    };
    Regex::new(&format!("{prefix}{value}")).expect("field pattern is a valid regex")
}

static PATTERNS: LazyLock<HashMap<Field, Regex>> = LazyLock::new(|| {
    Field::ALL
        .into_iter()
        .map(|field| (field, build_pattern(field)))
        .collect()
});

fn pattern(field: Field) -> &'static Regex {
    &PATTERNS[&field]
}

/// Raw text of the first assignment to `field`, trimmed.
pub fn find_raw<'s>(script: &'s str, field: Field) -> Option<&'s str> {
    pattern(field)
        .captures(script)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

pub fn extract(script: &str, field: Field) -> FieldValue {
    match field.field_type() {
        FieldType::Number => FieldValue::Number(extract_number(script, field)),
        FieldType::Url | FieldType::Text => FieldValue::Text(extract_text(script, field)),
    }
}

/// Numeric field value, or `0.0` when absent or unparseable.
pub fn extract_number(script: &str, field: Field) -> f64 {
    find_raw(script, field)
        .and_then(|raw| raw.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// String/URL field value, or [`UNKNOWN`] when absent.
pub fn extract_text(script: &str, field: Field) -> String {
    find_raw(script, field)
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN.to_string())
}
