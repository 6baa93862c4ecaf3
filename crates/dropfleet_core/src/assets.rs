use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core_api::CoreError;
use crate::faction::Faction;

pub const DEFAULT_REPOSITORY: &str = "TemporalDistoriton/DropfleetTTS";
pub const DEFAULT_BRANCH: &str = "main";

const INVALID_FILE_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageKind {
    CardFront,
    Model,
    UpgradeCard,
}

impl ImageKind {
    pub fn label(&self) -> &'static str {
        match *self {
            Self::CardFront => "CardFrontImage",
            Self::Model => "ModelImage",
            Self::UpgradeCard => "UpgradeImage",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// External image store consulted while rewriting card scripts.
pub trait AssetRepository {
    fn exists(&self, faction: Faction, name: &str, kind: ImageKind) -> bool;
    fn canonical_url(&self, faction: Faction, name: &str, kind: ImageKind) -> String;
    /// Repository-relative path reported when an image is missing.
    fn describe_path(&self, faction: Faction, name: &str, kind: ImageKind) -> String {
        relative_path(faction, name, kind)
    }
}

/// Replaces characters that are not allowed in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.replace(INVALID_FILE_CHARS, "_").trim().to_string()
}

fn path_segments(faction: Faction, name: &str, kind: ImageKind) -> Vec<String> {
    let base = sanitize_file_name(name);
    match kind {
        ImageKind::CardFront | ImageKind::Model => {
            vec![
                faction.as_str().to_string(),
                format!("{base}_{}.png", kind.label()),
            ]
        }
        ImageKind::UpgradeCard => vec![
            faction.as_str().to_string(),
            "Upgrades".to_string(),
            format!("{base}.png"),
        ],
    }
}

/// `Faction/Name_CardFrontImage.png`, `Faction/Upgrades/Name.png`, ...
pub fn relative_path(faction: Faction, name: &str, kind: ImageKind) -> String {
    path_segments(faction, name, kind).join("/")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlStyle {
    /// `raw.githubusercontent.com/<repo>/<branch>/...`
    #[default]
    Raw,
    /// `github.com/<repo>/blob/<branch>/...`
    Blob,
    /// `github.com/<repo>/blob/<branch>/...?raw=true`
    BlobRaw,
    /// `github.com/<repo>/raw/<branch>/...`
    RawRedirect,
}

impl UrlStyle {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Raw => "raw",
            Self::Blob => "blob",
            Self::BlobRaw => "blob-raw",
            Self::RawRedirect => "raw-redirect",
        }
    }
}

impl fmt::Display for UrlStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlStyle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "blob" => Ok(Self::Blob),
            "blob-raw" | "blob_raw" => Ok(Self::BlobRaw),
            "raw-redirect" | "raw_redirect" => Ok(Self::RawRedirect),
            other => Err(CoreError::config(format!(
                "unknown url style '{other}' (expected raw, blob, blob-raw or raw-redirect)"
            ))),
        }
    }
}

/// Fixed URL template for the asset repository, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLayout {
    repository: String,
    branch: String,
    style: UrlStyle,
    base: Url,
}

impl AssetLayout {
    pub fn new(repository: &str, branch: &str, style: UrlStyle) -> Result<Self, CoreError> {
        let repo_parts: Vec<&str> = repository.split('/').filter(|p| !p.is_empty()).collect();
        if repo_parts.len() != 2 {
            return Err(CoreError::config(format!(
                "repository must look like 'owner/name', got '{repository}'"
            )));
        }
        if branch.trim().is_empty() {
            return Err(CoreError::config("branch must not be empty"));
        }

        let (host, infix) = match style {
            UrlStyle::Raw => ("https://raw.githubusercontent.com/", None),
            UrlStyle::Blob | UrlStyle::BlobRaw => ("https://github.com/", Some("blob")),
            UrlStyle::RawRedirect => ("https://github.com/", Some("raw")),
        };

        let mut base =
            Url::parse(host).map_err(|e| CoreError::config(format!("bad asset host: {e}")))?;
        {
            let mut segments = base
                .path_segments_mut()
                .map_err(|()| CoreError::config("asset host cannot carry a path"))?;
            segments.pop_if_empty();
            segments.extend(repo_parts.iter().copied());
            if let Some(infix) = infix {
                segments.push(infix);
            }
            segments.push(branch.trim());
        }

        Ok(Self {
            repository: repo_parts.join("/"),
            branch: branch.trim().to_string(),
            style,
            base,
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn style(&self) -> UrlStyle {
        self.style
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn url_for(&self, faction: Faction, name: &str, kind: ImageKind) -> String {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(path_segments(faction, name, kind));
        }
        if self.style == UrlStyle::BlobRaw {
            url.set_query(Some("raw=true"));
        }
        url.into()
    }
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self::new(DEFAULT_REPOSITORY, DEFAULT_BRANCH, UrlStyle::Raw)
            .expect("default asset layout is valid")
    }
}
