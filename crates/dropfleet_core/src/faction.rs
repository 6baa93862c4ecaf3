use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Faction {
    #[serde(rename = "UCM")]
    Ucm,
    #[serde(rename = "PHR")]
    Phr,
    Shaltari,
    Scourge,
    Resistance,
    Bioficers,
    #[default]
    Neutral,
}

impl Faction {
    /// Canonical scan order used by [`Faction::classify`].
    pub const ALL: [Self; 7] = [
        Self::Ucm,
        Self::Phr,
        Self::Shaltari,
        Self::Scourge,
        Self::Resistance,
        Self::Bioficers,
        Self::Neutral,
    ];

    const VARIANTS: [(&'static str, Self); 6] = [
        ("ucm", Self::Ucm),
        ("phr", Self::Phr),
        ("shaltari", Self::Shaltari),
        ("scourge", Self::Scourge),
        ("resistance", Self::Resistance),
        ("bio", Self::Bioficers),
    ];

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Ucm => "UCM",
            Self::Phr => "PHR",
            Self::Shaltari => "Shaltari",
            Self::Scourge => "Scourge",
            Self::Resistance => "Resistance",
            Self::Bioficers => "Bioficers",
            Self::Neutral => "Neutral",
        }
    }

    /// Maps a container or object nickname to a faction by substring match.
    pub fn classify(label: &str) -> Self {
        let label = label.to_lowercase();

        if let Some(faction) = Self::ALL
            .into_iter()
            .find(|f| label.contains(&f.as_str().to_lowercase()))
        {
            return faction;
        }

        Self::VARIANTS
            .into_iter()
            .find(|(needle, _)| label.contains(needle))
            .map(|(_, faction)| faction)
            .unwrap_or(Self::Neutral)
    }

    /// First non-neutral container in `path`, else whatever `fallback_name` says.
    pub fn from_container_path<S: AsRef<str>>(path: &[S], fallback_name: &str) -> Self {
        path.iter()
            .map(|name| Self::classify(name.as_ref()))
            .find(|f| !f.is_neutral())
            .unwrap_or_else(|| Self::classify(fallback_name))
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::Neutral
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFaction(pub String);

impl fmt::Display for UnknownFaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown faction '{}'", self.0)
    }
}

impl std::error::Error for UnknownFaction {}

impl FromStr for Faction {
    type Err = UnknownFaction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFaction(s.to_string()))
    }
}
