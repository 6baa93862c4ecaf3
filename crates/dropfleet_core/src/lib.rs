pub mod assets;
pub mod card;
pub mod core_api;
pub mod document;
pub mod extract;
pub mod faction;
pub mod hierarchy;
pub mod rewrite;
