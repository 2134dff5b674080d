pub mod bootstrap;
pub mod config;
pub mod models;
pub mod monitor;
pub mod plugins;
pub mod scraper;
pub mod setup;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use models::{RetailerTable, Settings, WatchedItem};
pub use monitor::{CheckOutcome, CheckReport, Monitor, ProbeSettings};
pub use store::SettingsStore;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
