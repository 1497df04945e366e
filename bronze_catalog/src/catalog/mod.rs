//! External catalog subsystem.
//!
//! The warehouse sees the bronze ratings partitions through one external
//! table. This module rebuilds that table's definition from scratch on every
//! refresh:
//!
//! - [`listing`] enumerates every partition artifact under a prefix, across
//!   all run dates.
//! - [`definition`] is a pure function from that URI list to the definition
//!   document (autodetected CSV schema, one header row, hive-style partition
//!   columns inferred from `key=value` path segments).
//! - [`refresh`] pushes the document with "update, else create".
//! - [`bigquery`] is the REST client behind the refresh and the warehouse steps.
//!
//! The definition carries no state of its own beyond the URI list, so it can
//! always be rebuilt from what is in storage.

pub mod bigquery;
pub mod definition;
pub mod error;
pub mod listing;
pub mod refresh;
pub mod table_ref;

pub use error::CatalogError;
pub use table_ref::TableRef;
