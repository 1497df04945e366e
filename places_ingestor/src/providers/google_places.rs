//! Google Places API (v1) `places:searchText` backend.

pub mod provider;
pub mod request;
pub mod response;

pub use provider::GooglePlacesProvider;
