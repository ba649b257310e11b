//! Purchase coordination
//!
//! One attempt per call, no retries:
//!
//! ```text
//! start ─ offline ──────────────────────────────► NetworkError
//!   └── online ─ resolve product ─ not found ───► ServerError
//!                     └── found ─ submit ───────► Succeeded | AlreadyOwned
//!                                                 | UserCanceled | ServerError
//! ```
//!
//! Only `Succeeded` and `AlreadyOwned` mark the product owned, and the
//! notification is emitted after that write.

use crate::cache::{CatalogCache, OwnershipCache};
use crate::error::{EntitleError, EntitleResult};
use crate::service::events::{ProductPurchased, PurchaseEvents};
use crate::store::{Product, ProductKey, PurchaseOutcome, StorefrontBackend};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// A request to buy one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    /// Product id as the caller knows it
    pub product_id: String,
    /// Buy the highest listed version of the id's family
    pub use_latest_version: bool,
    /// Cache the resulting ownership under this id instead
    pub cache_as: Option<String>,
}

impl PurchaseRequest {
    /// Buy exactly the given product id
    pub fn exact(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            use_latest_version: false,
            cache_as: None,
        }
    }

    /// Buy the latest version of the given id's family
    pub fn latest(product_id: impl Into<String>) -> Self {
        Self {
            use_latest_version: true,
            ..Self::exact(product_id)
        }
    }

    /// Record ownership under another id, for ids that alias one
    /// entitlement (promo SKUs of a subscription, for example)
    pub fn cache_as(mut self, id: impl Into<String>) -> Self {
        self.cache_as = Some(id.into());
        self
    }

    /// Id written to the ownership cache on success
    pub fn cache_key(&self) -> &str {
        self.cache_as.as_deref().unwrap_or(&self.product_id)
    }
}

/// Drives a single purchase attempt against the storefront
pub(crate) struct PurchaseCoordinator<'a> {
    pub backend: &'a dyn StorefrontBackend,
    pub catalog: &'a CatalogCache,
    pub ownership: &'a OwnershipCache,
    pub events: &'a PurchaseEvents,
}

impl PurchaseCoordinator<'_> {
    pub async fn run(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> EntitleResult<PurchaseOutcome> {
        let attempt_id = Uuid::new_v4();
        let span = info_span!("purchase", %attempt_id, product_id = %request.product_id);

        async move {
            let outcome = self.attempt(request, cancel).await?;

            if outcome.grants_ownership() {
                let cache_key = request.cache_key();
                self.ownership.mark_owned(cache_key);
                self.events
                    .emit(ProductPurchased::new(cache_key, attempt_id));
                info!(%outcome, cache_key, "Purchase granted ownership");
            } else {
                info!(%outcome, "Purchase did not complete");
            }

            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    async fn attempt(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> EntitleResult<PurchaseOutcome> {
        if cancel.is_cancelled() {
            return Err(EntitleError::Canceled);
        }

        if !self.backend.is_connected().await {
            debug!("Offline, not attempting purchase");
            return Ok(PurchaseOutcome::NetworkError);
        }

        let Some(product) = self.resolve(request, cancel).await? else {
            warn!("Product not listed in catalog");
            return Ok(PurchaseOutcome::ServerError);
        };

        if cancel.is_cancelled() {
            return Err(EntitleError::Canceled);
        }

        // Once submitted the attempt runs to completion so the cache matches
        // what the storefront charged.
        debug!(resolved = %product.id, "Submitting purchase");
        match self.backend.submit_purchase(&product).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(error = %e, "Purchase submission failed");
                Ok(PurchaseOutcome::ServerError)
            }
        }
    }

    async fn resolve(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> EntitleResult<Option<Arc<Product>>> {
        if request.use_latest_version {
            let key = ProductKey::parse(&request.product_id);
            self.catalog
                .resolve_latest_by_family(&key.family_id, cancel)
                .await
        } else {
            self.catalog
                .resolve_by_exact_id(&request.product_id, cancel)
                .await
        }
    }
}
