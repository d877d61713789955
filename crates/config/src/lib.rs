// Configuration loading and on-disk selection storage

pub mod cache;
pub mod settings;
pub mod store;

pub use cache::{ConfigCache, DEFAULT_TTL};
pub use settings::Settings;
pub use store::JsonFileStore;
