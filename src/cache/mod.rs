//! In-memory caches behind the entitlement service
//!
//! Two independent caches, each with its own synchronization:
//!
//! | Cache | Key | Synchronization |
//! |-------|-----|-----------------|
//! | Catalog | exact id / family id | lock-free reads, one population lock |
//! | Ownership | checked id | concurrent map, no external lock |
//!
//! Neither cache expires. Failed or skipped backend calls are never cached
//! in the catalog; the ownership cache only stores definitive answers.

pub mod catalog;
pub mod ownership;

pub use catalog::{CatalogCache, VersionedProduct};
pub use ownership::OwnershipCache;
