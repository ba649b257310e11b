//! Entitlement service
//!
//! Public facade answering ownership, subscription and price questions by
//! combining the ownership and catalog caches, and exposing purchases.
//!
//! Every operation takes a `CancellationToken` checked on entry. Apart from
//! `EntitleError::Canceled`, failures never surface: an unreachable store
//! answers "not owned", an unknown product prices as `-`.

use crate::cache::{CatalogCache, OwnershipCache};
use crate::config::{LicenseFailurePolicy, StoreConfig};
use crate::error::{EntitleError, EntitleResult};
use crate::service::events::{PurchaseEvents, PurchaseStream};
use crate::service::purchase::{PurchaseCoordinator, PurchaseRequest};
use crate::store::{PriceInfo, ProductKey, PurchaseOutcome, StorefrontBackend};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Ownership, pricing and purchase facade over a storefront backend
pub struct EntitlementService {
    config: StoreConfig,
    backend: Arc<dyn StorefrontBackend>,
    catalog: CatalogCache,
    ownership: OwnershipCache,
    events: PurchaseEvents,
}

impl EntitlementService {
    /// Create a service with empty caches over an initialized backend
    pub fn new(config: StoreConfig, backend: Arc<dyn StorefrontBackend>) -> Self {
        if config.debug_all_owned {
            warn!("debug_all_owned is set: every ownership check returns true");
        }

        Self {
            catalog: CatalogCache::new(Arc::clone(&backend)),
            config,
            backend,
            ownership: OwnershipCache::new(),
            events: PurchaseEvents::default(),
        }
    }

    /// Set the purchase notification buffer size
    pub fn with_event_buffer(mut self, buffer: usize) -> Self {
        self.events = PurchaseEvents::new(buffer);
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Check storefront connectivity
    pub async fn is_connected(&self) -> bool {
        self.backend.is_connected().await
    }

    /// Catalog cache, for read-only listings
    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// Subscribe to `ProductPurchased` notifications
    pub fn subscribe(&self) -> PurchaseStream {
        self.events.subscribe()
    }

    /// Whether the id starts with any configured subscription prefix,
    /// ignoring case
    pub fn contains_subscription_prefix(&self, id: &str) -> bool {
        self.config
            .subscription_prefixes
            .iter()
            .any(|prefix| starts_with_ignore_case(id, prefix))
    }

    /// Whether any of the ids matches a subscription prefix
    pub fn contains_any_subscription_prefix<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        ids.iter()
            .any(|id| self.contains_subscription_prefix(id.as_ref()))
    }

    /// Whether the user owns the product
    ///
    /// A license entry matches when its token equals `id`, or when both `id`
    /// and the token are subscription ids, so any active subscription SKU
    /// satisfies a check keyed by another SKU of the subscription.
    pub async fn is_owned(&self, id: &str, cancel: &CancellationToken) -> EntitleResult<bool> {
        if cancel.is_cancelled() {
            return Err(EntitleError::Canceled);
        }

        if self.config.debug_all_owned {
            return Ok(true);
        }

        if let Some(owned) = self.ownership.get(id) {
            debug!(id, owned, "Ownership cache hit");
            return Ok(owned);
        }

        if !self.backend.is_connected().await {
            debug!(id, "Offline, skipping license fetch");
            return Ok(self.licenses_unavailable(id));
        }

        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EntitleError::Canceled),
            result = self.backend.fetch_license_snapshot() => result,
        };

        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(id, error = %e, "License snapshot unavailable");
                return Ok(self.licenses_unavailable(id));
            }
        };

        let is_subscription = self.contains_subscription_prefix(id);
        let owned = snapshot.active().any(|license| {
            license.offer_token == id
                || (is_subscription && self.contains_subscription_prefix(&license.offer_token))
        });

        debug!(id, owned, "Ownership resolved from license snapshot");
        Ok(self.ownership.remember(id, owned))
    }

    /// Answer for an id whose licenses could not be read
    fn licenses_unavailable(&self, id: &str) -> bool {
        match self.config.license_failures {
            LicenseFailurePolicy::Transient => false,
            LicenseFailurePolicy::Remember => self.ownership.remember(id, false),
        }
    }

    /// Whether any of the ids is owned, checked in order
    pub async fn is_any_owned<S: AsRef<str>>(
        &self,
        ids: &[S],
        cancel: &CancellationToken,
    ) -> EntitleResult<bool> {
        for id in ids {
            if self.is_owned(id.as_ref(), cancel).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether the user holds an active subscription
    ///
    /// Only subscription prefixes are checked, not lifetime unlocks.
    pub async fn is_subscription_owned(&self, cancel: &CancellationToken) -> EntitleResult<bool> {
        self.is_any_owned(self.config.subscription_prefixes.as_slice(), cancel)
            .await
    }

    /// Whether premium upsells may be shown: nothing premium is owned
    pub async fn can_show_premium_buttons(
        &self,
        cancel: &CancellationToken,
    ) -> EntitleResult<bool> {
        let premium_ids = self.config.premium_ids();
        let owned = self.is_any_owned(premium_ids.as_slice(), cancel).await?;
        Ok(!owned)
    }

    /// Price of a product
    ///
    /// With `use_latest_version` the id is reduced to its family and the
    /// highest listed version is priced.
    pub async fn get_price(
        &self,
        id: &str,
        use_latest_version: bool,
        cancel: &CancellationToken,
    ) -> EntitleResult<PriceInfo> {
        let product = if use_latest_version {
            let key = ProductKey::parse(id);
            self.catalog
                .resolve_latest_by_family(&key.family_id, cancel)
                .await?
        } else {
            self.catalog.resolve_by_exact_id(id, cancel).await?
        };

        Ok(product
            .map(|p| p.price_info())
            .unwrap_or_else(PriceInfo::not_found))
    }

    /// Price of the latest version of the id's family
    pub async fn get_latest_price(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> EntitleResult<PriceInfo> {
        self.get_price(id, true, cancel).await
    }

    /// Run one purchase attempt and report its outcome
    pub async fn purchase(
        &self,
        request: &PurchaseRequest,
        cancel: &CancellationToken,
    ) -> EntitleResult<PurchaseOutcome> {
        let coordinator = PurchaseCoordinator {
            backend: self.backend.as_ref(),
            catalog: &self.catalog,
            ownership: &self.ownership,
            events: &self.events,
        };
        coordinator.run(request, cancel).await
    }

    /// Buy a product, true if the user owns it afterwards
    pub async fn buy(
        &self,
        id: &str,
        use_latest_version: bool,
        cache_as: Option<&str>,
        cancel: &CancellationToken,
    ) -> EntitleResult<bool> {
        let mut request = if use_latest_version {
            PurchaseRequest::latest(id)
        } else {
            PurchaseRequest::exact(id)
        };
        if let Some(cache_as) = cache_as {
            request = request.cache_as(cache_as);
        }

        let outcome = self.purchase(&request, cancel).await?;
        Ok(outcome.grants_ownership())
    }
}

fn starts_with_ignore_case(id: &str, prefix: &str) -> bool {
    id.len() >= prefix.len()
        && id
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
