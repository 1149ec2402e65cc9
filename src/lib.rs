pub mod config;
pub mod estimate;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod scrapers;

pub use config::ScoutConfig;
pub use models::{ListingRecord, Site};
pub use pipeline::Pipeline;
