use serde::{Deserialize, Serialize};

pub const SHIP_INDICATORS: [&str; 6] = [
    "rebuildUI()",
    "createModel",
    "cardFrontImage",
    "modelImage",
    "baseScale",
    "onSave()",
];

pub const UPGRADE_INDICATORS: [&str; 5] = [
    "rebuildUI()",
    "cardImage",
    "onLoad(",
    "points",
    "onSave()",
];

pub const MIN_INDICATOR_MATCHES: usize = 3;

const UPGRADE_IMAGE_FIELD: &str = "cardImage";
const SHIP_MODEL_FIELD: &str = "modelImage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    Ship,
    Upgrade,
    None,
}

fn count_indicators(script: &str, indicators: &[&str]) -> usize {
    indicators.iter().filter(|i| script.contains(*i)).count()
}

pub fn is_ship_script(script: &str) -> bool {
    count_indicators(script, &SHIP_INDICATORS) >= MIN_INDICATOR_MATCHES
}

pub fn is_upgrade_script(script: &str) -> bool {
    count_indicators(script, &UPGRADE_INDICATORS) >= MIN_INDICATOR_MATCHES
        && script.contains(UPGRADE_IMAGE_FIELD)
        && !script.contains(SHIP_MODEL_FIELD)
}

/// Heuristic card detection. Ship indicators take precedence.
pub fn classify_card(script: &str) -> CardKind {
    if is_ship_script(script) {
        CardKind::Ship
    } else if is_upgrade_script(script) {
        CardKind::Upgrade
    } else {
        CardKind::None
    }
}
