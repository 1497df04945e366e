pub mod enriched;
pub mod place;
pub mod provider;
