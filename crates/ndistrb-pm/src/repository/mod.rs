//! Remote information about what a user publishes.

mod listing;

pub use listing::{parse_listing, ModuleListing};
