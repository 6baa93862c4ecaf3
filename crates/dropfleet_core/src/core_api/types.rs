use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::faction::Faction;

pub const NOT_UPDATED: &str = "Not Updated";
pub const DEFAULT_EXCLUDED_CONTAINER: &str = "Old 2.0 Content";
pub const CONTAINER_PATH_SEPARATOR: &str = " > ";

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Whole numbers are written without a fractional part (`125`, not `125.0`).
fn serialize_plain_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipRecord {
    pub name: String,
    pub faction: Faction,
    #[serde(rename = "baseScale", serialize_with = "serialize_plain_number")]
    pub base_scale: f64,
    #[serde(serialize_with = "serialize_plain_number")]
    pub health: f64,
    #[serde(rename = "sig", serialize_with = "serialize_plain_number")]
    pub signature: f64,
    #[serde(serialize_with = "serialize_plain_number")]
    pub points: f64,
    #[serde(rename = "modelImage")]
    pub model_image: String,
    pub new_model_url: String,
    #[serde(rename = "cardFrontImage")]
    pub card_front_image: String,
    pub new_card_front_url: String,
    pub object_name: String,
    pub object_guid: String,
    pub container_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeRecord {
    pub name: String,
    pub faction: Faction,
    #[serde(serialize_with = "serialize_plain_number")]
    pub points: f64,
    #[serde(rename = "cardImage")]
    pub card_image: String,
    pub new_card_url: String,
    pub object_name: String,
    pub object_guid: String,
    pub container_path: String,
}

/// One line of the run log. Notes never abort the walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunNote {
    Error(String),
    Skipped(String),
    Excluded(String),
}

impl RunNote {
    pub fn message(&self) -> &str {
        match self {
            Self::Error(m) | Self::Skipped(m) | Self::Excluded(m) => m,
        }
    }

    /// Errors and skips belong in the error log; exclusions are informational.
    pub fn is_problem(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Skipped(_))
    }
}

impl fmt::Display for RunNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(m) => write!(f, "ERROR: {m}"),
            Self::Skipped(m) => write!(f, "SKIPPING: {m}"),
            Self::Excluded(m) => write!(f, "EXCLUDED: {m}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOptions {
    pub process_ships: bool,
    pub process_upgrades: bool,
    pub excluded_containers: Vec<String>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            process_ships: true,
            process_upgrades: true,
            excluded_containers: vec![DEFAULT_EXCLUDED_CONTAINER.to_string()],
        }
    }
}

impl WalkOptions {
    pub fn is_excluded<S: AsRef<str>>(&self, path: &[S]) -> bool {
        path.iter().any(|name| {
            self.excluded_containers
                .iter()
                .any(|excluded| excluded == name.as_ref())
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkOutcome {
    pub ships: Vec<ShipRecord>,
    pub upgrades: Vec<UpgradeRecord>,
    pub notes: Vec<RunNote>,
    /// True when at least one script body was rewritten.
    pub modified: bool,
    pub visited: usize,
}

impl WalkOutcome {
    pub fn problems(&self) -> impl Iterator<Item = &RunNote> {
        self.notes.iter().filter(|n| n.is_problem())
    }

    pub fn errors(&self) -> impl Iterator<Item = &RunNote> {
        self.notes.iter().filter(|n| matches!(n, RunNote::Error(_)))
    }
}
