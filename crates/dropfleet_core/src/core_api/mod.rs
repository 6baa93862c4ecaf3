mod error;
mod types;
mod walker;

pub use error::{CoreError, CoreErrorCode};
pub use types::{
    CONTAINER_PATH_SEPARATOR, DEFAULT_EXCLUDED_CONTAINER, NOT_UPDATED, RunNote, ShipRecord,
    UpgradeRecord, WalkOptions, WalkOutcome,
};
pub use walker::TreeWalker;
