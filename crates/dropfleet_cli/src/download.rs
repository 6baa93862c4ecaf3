use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use dropfleet_core::assets::{ImageKind, sanitize_file_name};
use dropfleet_core::core_api::{RunNote, ShipRecord};
use log::{info, warn};
use reqwest::blocking::Client;

const DEFAULT_EXTENSION: &str = "png";

/// Extension of the last URL path segment, `png` when there is none.
pub fn extension_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()?
                .next_back()
                .and_then(|name| Path::new(name).extension())
                .and_then(|ext| ext.to_str())
                .filter(|ext| !ext.is_empty())
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// `<root>/<Faction>/<Name>_<Kind>.<ext>`
pub fn image_destination(root: &Path, ship: &ShipRecord, kind: ImageKind, url: &str) -> PathBuf {
    root.join(ship.faction.as_str()).join(format!(
        "{}_{}.{}",
        sanitize_file_name(&ship.name),
        kind.label(),
        extension_from_url(url)
    ))
}

fn is_remote(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn fetch(client: &Client, url: &str, dest: &Path) -> Result<u64, String> {
    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir).map_err(|e| format!("create {}: {e}", dir.display()))?;
    }
    let mut resp = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| format!("GET {url}: {e}"))?;
    let mut file = File::create(dest).map_err(|e| format!("create {}: {e}", dest.display()))?;
    io::copy(&mut resp, &mut file).map_err(|e| format!("write {}: {e}", dest.display()))
}

/// Downloads the current model and card-front images of every ship.
///
/// Failures are returned as notes; one bad image never stops the rest.
pub fn download_ship_images(client: &Client, root: &Path, ships: &[ShipRecord]) -> Vec<RunNote> {
    let mut notes = Vec::new();
    let mut saved = 0usize;

    for ship in ships {
        for (kind, url) in [
            (ImageKind::Model, ship.model_image.as_str()),
            (ImageKind::CardFront, ship.card_front_image.as_str()),
        ] {
            if !is_remote(url) {
                continue;
            }
            let dest = image_destination(root, ship, kind, url);
            match fetch(client, url, &dest) {
                Ok(bytes) => {
                    info!("saved {} ({bytes} bytes)", dest.display());
                    saved += 1;
                }
                Err(e) => {
                    warn!("download failed for {}: {e}", ship.name);
                    notes.push(RunNote::Error(format!(
                        "Failed to download {kind} for {}: {e}",
                        ship.name
                    )));
                }
            }
        }
    }

    info!("downloaded {saved} images into {}", root.display());
    notes
}
