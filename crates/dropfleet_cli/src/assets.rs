use std::path::PathBuf;
use std::time::Duration;

use dropfleet_core::assets::{AssetLayout, AssetRepository, ImageKind, relative_path};
use dropfleet_core::core_api::CoreError;
use dropfleet_core::faction::Faction;
use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client;

pub const USER_AGENT: &str = concat!("dropfleet-tts/", env!("CARGO_PKG_VERSION"));

pub fn http_client(timeout: Duration) -> Result<Client, CoreError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| CoreError::config(format!("failed to build HTTP client: {e}")))
}

/// Checks images on the hosted repository with HEAD requests.
///
/// Anything other than `200 OK`, including timeouts and transport failures,
/// counts as a missing image.
pub struct HttpAssetRepository {
    client: Client,
    layout: AssetLayout,
}

impl HttpAssetRepository {
    pub fn new(layout: AssetLayout, timeout: Duration) -> Result<Self, CoreError> {
        Ok(Self {
            client: http_client(timeout)?,
            layout,
        })
    }
}

impl AssetRepository for HttpAssetRepository {
    fn exists(&self, faction: Faction, name: &str, kind: ImageKind) -> bool {
        let url = self.layout.url_for(faction, name, kind);
        match self.client.head(&url).send() {
            Ok(resp) => {
                debug!("HEAD {url} -> {}", resp.status());
                resp.status() == StatusCode::OK
            }
            Err(e) => {
                warn!("HEAD {url} failed: {e}");
                false
            }
        }
    }

    fn canonical_url(&self, faction: Faction, name: &str, kind: ImageKind) -> String {
        self.layout.url_for(faction, name, kind)
    }
}

/// Checks images against a local checkout of the asset repository while still
/// producing hosted URLs.
pub struct DirectoryAssetRepository {
    root: PathBuf,
    layout: AssetLayout,
}

impl DirectoryAssetRepository {
    pub fn new(root: impl Into<PathBuf>, layout: AssetLayout) -> Result<Self, CoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CoreError::config(format!(
                "asset directory does not exist: {}",
                root.display()
            )));
        }
        Ok(Self { root, layout })
    }

    fn local_path(&self, faction: Faction, name: &str, kind: ImageKind) -> PathBuf {
        let mut path = self.root.clone();
        for segment in relative_path(faction, name, kind).split('/') {
            path.push(segment);
        }
        path
    }
}

impl AssetRepository for DirectoryAssetRepository {
    fn exists(&self, faction: Faction, name: &str, kind: ImageKind) -> bool {
        let path = self.local_path(faction, name, kind);
        let found = path.is_file();
        debug!("{} -> {}", path.display(), if found { "found" } else { "missing" });
        found
    }

    fn canonical_url(&self, faction: Faction, name: &str, kind: ImageKind) -> String {
        self.layout.url_for(faction, name, kind)
    }
}
