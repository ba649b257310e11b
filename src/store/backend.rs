//! Storefront backend abstraction
//!
//! The engine never talks to a platform store directly. Everything that
//! needs the network goes through this trait, so the store can be a real
//! platform SDK, a remote service, or the in-memory backend used by the CLI
//! and tests.

use crate::error::EntitleResult;
use crate::store::types::{LicenseSnapshot, Product, ProductKind, PurchaseOutcome};
use async_trait::async_trait;

/// Abstract storefront interface
///
/// Implementations own their timeout policy. A returned
/// `EntitleError::BackendUnavailable` is treated by the engine as a
/// transient "unavailable" answer, never as a fatal error.
#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// Connectivity check consulted before network-bound calls
    async fn is_connected(&self) -> bool;

    /// Fetch the current user's license snapshot
    async fn fetch_license_snapshot(&self) -> EntitleResult<LicenseSnapshot>;

    /// Fetch every product of the given kinds in one round trip
    async fn fetch_catalog(&self, kinds: &[ProductKind]) -> EntitleResult<Vec<Product>>;

    /// Submit a purchase request for a resolved product
    async fn submit_purchase(&self, product: &Product) -> EntitleResult<PurchaseOutcome>;

    /// Get the human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}
