//! Bronze layer catalog and pipeline.
//!
//! [`catalog`] keeps one external warehouse table in step with every ratings
//! partition in object storage. [`pipeline`] strings a full run together:
//! datasets, ingestion, mirroring, catalog refresh, transforms, and a final
//! sanity count.

pub mod catalog;
pub mod config;
pub mod pipeline;
pub mod storage;
pub mod warehouse;
