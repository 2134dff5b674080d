pub mod retailer;
pub mod settings;

// Re-exports for convenience
pub use retailer::RetailerTable;
pub use settings::{MessagingCredentials, Settings, WatchedItem, DEFAULT_POLL_INTERVAL_MS};
