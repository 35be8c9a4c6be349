pub mod config;
pub mod errors;
pub mod layout;
pub mod models;

pub use config::{Config, LayoutConfig};
pub use errors::{AssetError, LayoutError};
pub use layout::{CardFrame, CardLayout, CardLayoutEngine};
pub use models::card::CardRecord;
