pub mod mirror;
pub mod partition;
pub mod seed;
pub mod sink;
