use log::{debug, info};
use serde_json::Value as JsonValue;

use crate::assets::{AssetRepository, ImageKind};
use crate::card::{CardKind, classify_card};
use crate::document::{SaveDocument, SceneNode, children_mut, set_script};
use crate::extract::{Field, UNKNOWN, extract_number, extract_text};
use crate::faction::Faction;
use crate::hierarchy::{HierarchyIndex, MAX_DEPTH};
use crate::rewrite::{replace_faction, replace_url};

use super::types::{
    CONTAINER_PATH_SEPARATOR, NOT_UPDATED, RunNote, ShipRecord, UpgradeRecord, WalkOptions,
    WalkOutcome,
};

const UNNAMED_OBJECT: &str = "Unnamed Object";
const UNNAMED_MODEL: &str = "Unnamed Model";

/// Identity of the object currently being processed.
struct ObjectRef<'p> {
    guid: &'p str,
    name: &'p str,
    container_path: &'p [String],
}

impl ObjectRef<'_> {
    fn container_label(&self) -> String {
        self.container_path.join(CONTAINER_PATH_SEPARATOR)
    }
}

/// Two-pass card processor: index the containment hierarchy, then walk the
/// tree extracting (and optionally rewriting) card scripts.
///
/// Without an asset repository the walk only extracts; no script is changed.
pub struct TreeWalker<'a> {
    options: &'a WalkOptions,
    assets: Option<&'a dyn AssetRepository>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(options: &'a WalkOptions) -> Self {
        Self {
            options,
            assets: None,
        }
    }

    pub fn with_assets(mut self, assets: &'a dyn AssetRepository) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn run(&self, document: &mut SaveDocument) -> WalkOutcome {
        let index = HierarchyIndex::build(document.object_states());
        debug!("indexed {} objects", index.len());

        let mut outcome = WalkOutcome::default();
        let modified = self.walk(document.object_states_mut(), &index, &[], 1, &mut outcome);
        outcome.modified = modified;
        outcome
    }

    fn walk(
        &self,
        nodes: &mut [JsonValue],
        index: &HierarchyIndex,
        parent_path: &[String],
        depth: usize,
        outcome: &mut WalkOutcome,
    ) -> bool {
        if depth > MAX_DEPTH {
            return false;
        }

        let mut modified = false;
        for value in nodes.iter_mut() {
            let node = SceneNode::new(value);
            let name = node.nickname().unwrap_or(UNNAMED_OBJECT);

            let mut current_path = parent_path.to_vec();
            if !name.is_empty() {
                current_path.push(name.to_string());
            }

            if self.options.is_excluded(&current_path) {
                self.note_excluded_branch(std::slice::from_ref(value), parent_path, depth, outcome);
                continue;
            }

            outcome.visited += 1;

            if let Some(script) = node.script() {
                let guid = node.id().unwrap_or("").to_string();
                let name = name.to_string();
                let script = script.to_string();
                if let Some(updated) = self.process_script(&guid, &name, &script, index, outcome)
                    && updated != script
                {
                    set_script(value, updated);
                    modified = true;
                }
            }

            if let Some(children) = children_mut(value)
                && !children.is_empty()
                && self.walk(children, index, &current_path, depth + 1, outcome)
            {
                modified = true;
            }
        }

        modified
    }

    /// Records one informational note per object in an ignored branch.
    fn note_excluded_branch(
        &self,
        nodes: &[JsonValue],
        parent_path: &[String],
        depth: usize,
        outcome: &mut WalkOutcome,
    ) {
        if depth > MAX_DEPTH {
            return;
        }

        for value in nodes {
            let node = SceneNode::new(value);
            let mut path = parent_path.to_vec();
            let name = node.nickname().unwrap_or(UNNAMED_OBJECT);
            if !name.is_empty() {
                path.push(name.to_string());
            }

            let label = path.join(CONTAINER_PATH_SEPARATOR);
            info!("skipping content in ignored container: {label}");
            outcome.notes.push(RunNote::Excluded(format!(
                "content in ignored container: {label}"
            )));

            self.note_excluded_branch(node.children(), &path, depth + 1, outcome);
        }
    }

    fn process_script(
        &self,
        guid: &str,
        name: &str,
        script: &str,
        index: &HierarchyIndex,
        outcome: &mut WalkOutcome,
    ) -> Option<String> {
        let kind = classify_card(script);
        let wanted = match kind {
            CardKind::Ship => self.options.process_ships,
            CardKind::Upgrade => self.options.process_upgrades,
            CardKind::None => false,
        };
        if !wanted {
            return None;
        }

        // The id-based path can disagree with the name-based walk path, so the
        // exclusion list is checked against both.
        let container_path = index.resolve_path(guid);
        if self.options.is_excluded(&container_path) {
            let label = container_path.join(CONTAINER_PATH_SEPARATOR);
            info!("skipping card in ignored container: {label}");
            outcome.notes.push(RunNote::Excluded(format!(
                "card '{name}' in ignored container: {label}"
            )));
            return None;
        }

        let object = ObjectRef {
            guid,
            name,
            container_path: &container_path,
        };
        let faction = Faction::from_container_path(&container_path, name);

        match kind {
            CardKind::Ship => Some(self.process_ship(&object, faction, script, outcome)),
            CardKind::Upgrade => Some(self.process_upgrade(&object, faction, script, outcome)),
            CardKind::None => None,
        }
    }

    fn process_ship(
        &self,
        object: &ObjectRef<'_>,
        faction: Faction,
        script: &str,
        outcome: &mut WalkOutcome,
    ) -> String {
        let name = card_name(script, object.name);
        debug!("found ship card '{name}' ({faction}) in object '{}'", object.name);

        let mut record = ShipRecord {
            name: name.clone(),
            faction,
            base_scale: extract_number(script, Field::BaseScale),
            health: extract_number(script, Field::Health),
            signature: extract_number(script, Field::Signature),
            points: extract_number(script, Field::Points),
            model_image: extract_text(script, Field::ModelImage),
            new_model_url: NOT_UPDATED.to_string(),
            card_front_image: extract_text(script, Field::CardFrontImage),
            new_card_front_url: NOT_UPDATED.to_string(),
            object_name: object.name.to_string(),
            object_guid: object.guid.to_string(),
            container_path: object.container_label(),
        };

        let mut updated = script.to_string();
        if let Some(assets) = self.assets {
            let card_front = self.lookup(assets, faction, &name, ImageKind::CardFront, outcome);
            let model = self.lookup(assets, faction, &name, ImageKind::Model, outcome);

            if card_front.is_none() && model.is_none() {
                outcome.notes.push(RunNote::Skipped(format!(
                    "No images found for {name} in {faction} faction"
                )));
            } else {
                if let Some(url) = card_front {
                    updated = replace_url(&updated, Field::CardFrontImage, &url);
                    debug!("updated CardFrontImage URL for {name} to {url}");
                    record.new_card_front_url = url;
                }
                if let Some(url) = model {
                    updated = replace_url(&updated, Field::ModelImage, &url);
                    debug!("updated ModelImage URL for {name} to {url}");
                    record.new_model_url = url;
                }
                updated = replace_faction(&updated, faction);
            }
        }

        outcome.ships.push(record);
        updated
    }

    fn process_upgrade(
        &self,
        object: &ObjectRef<'_>,
        faction: Faction,
        script: &str,
        outcome: &mut WalkOutcome,
    ) -> String {
        let name = card_name(script, object.name);
        debug!("found upgrade card '{name}' ({faction}) in object '{}'", object.name);

        let mut record = UpgradeRecord {
            name: name.clone(),
            faction,
            points: extract_number(script, Field::Points),
            card_image: extract_text(script, Field::CardImage),
            new_card_url: NOT_UPDATED.to_string(),
            object_name: object.name.to_string(),
            object_guid: object.guid.to_string(),
            container_path: object.container_label(),
        };

        let mut updated = script.to_string();
        if let Some(assets) = self.assets
            && let Some(url) = self.lookup(assets, faction, &name, ImageKind::UpgradeCard, outcome)
        {
            updated = replace_url(&updated, Field::CardImage, &url);
            updated = replace_faction(&updated, faction);
            debug!("updated upgrade image URL for {name} to {url}");
            record.new_card_url = url;
        }

        outcome.upgrades.push(record);
        updated
    }

    /// Canonical URL for an existing image; a missing image is noted as an error.
    fn lookup(
        &self,
        assets: &dyn AssetRepository,
        faction: Faction,
        name: &str,
        kind: ImageKind,
        outcome: &mut WalkOutcome,
    ) -> Option<String> {
        if assets.exists(faction, name, kind) {
            return Some(assets.canonical_url(faction, name, kind));
        }
        outcome.notes.push(RunNote::Error(format!(
            "{kind} not found for {name} in {faction} faction (tried path: {})",
            assets.describe_path(faction, name, kind)
        )));
        None
    }
}

/// Card name from the script, falling back to the object's nickname.
fn card_name(script: &str, object_name: &str) -> String {
    let name = extract_text(script, Field::Name);
    if name.is_empty() || name == UNKNOWN || name == UNNAMED_MODEL {
        object_name.to_string()
    } else {
        name
    }
}
