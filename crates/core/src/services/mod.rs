//! Services around the analysis core: listing sources and export of results.

pub mod backends;
pub mod export;
pub mod listing;
