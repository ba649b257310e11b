//! Catalog cache
//!
//! Holds two views of the storefront catalog: products by exact id, and the
//! highest version seen per product family. Both are filled lazily by one
//! population routine that fetches the whole catalog in a single backend
//! round trip.
//!
//! Lookups are lock-free on a hit. On a miss, callers serialize on a single
//! population lock and re-check after acquiring it; a population epoch lets
//! callers that waited behind a completed pass read its result instead of
//! fetching again. The pass itself runs in a detached task owning the lock
//! guard, so a caller that gives up waiting never aborts it.

use crate::error::{EntitleError, EntitleResult};
use crate::store::{Product, ProductKind, StorefrontBackend};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::hash_map;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Latest product of a family with its parsed version
#[derive(Debug, Clone)]
pub struct VersionedProduct {
    pub version: u32,
    pub product: Arc<Product>,
}

/// What a caller is looking for
#[derive(Debug, Clone, Copy)]
enum Lookup<'a> {
    Exact(&'a str),
    Family(&'a str),
}

struct CatalogState {
    backend: Arc<dyn StorefrontBackend>,
    by_id: DashMap<String, Arc<Product>>,
    latest: DashMap<String, VersionedProduct>,
    populate_lock: Arc<Mutex<()>>,
    epoch: AtomicU64,
}

/// Lazily populated catalog shared by all callers
#[derive(Clone)]
pub struct CatalogCache {
    state: Arc<CatalogState>,
}

impl CatalogCache {
    /// Create an empty cache backed by the given storefront
    pub fn new(backend: Arc<dyn StorefrontBackend>) -> Self {
        Self {
            state: Arc::new(CatalogState {
                backend,
                by_id: DashMap::new(),
                latest: DashMap::new(),
                populate_lock: Arc::new(Mutex::new(())),
                epoch: AtomicU64::new(0),
            }),
        }
    }

    /// Resolve a product by its exact id
    pub async fn resolve_by_exact_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> EntitleResult<Option<Arc<Product>>> {
        self.resolve(Lookup::Exact(id), cancel).await
    }

    /// Resolve the highest listed version of a product family
    pub async fn resolve_latest_by_family(
        &self,
        family_id: &str,
        cancel: &CancellationToken,
    ) -> EntitleResult<Option<Arc<Product>>> {
        self.resolve(Lookup::Family(family_id), cancel).await
    }

    /// Number of completed population passes
    pub fn epoch(&self) -> u64 {
        self.state.epoch.load(Ordering::SeqCst)
    }

    /// Latest product of every cached family, ordered by family id
    pub fn latest_products(&self) -> Vec<VersionedProduct> {
        let mut entries: Vec<(String, VersionedProduct)> = self
            .state
            .latest
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, v)| v).collect()
    }

    /// Make sure at least one population pass has completed
    ///
    /// Returns false when the catalog is still empty because the store was
    /// offline or the fetch failed.
    pub async fn ensure_loaded(&self, cancel: &CancellationToken) -> EntitleResult<bool> {
        if cancel.is_cancelled() {
            return Err(EntitleError::Canceled);
        }

        let seen_epoch = self.epoch();
        if seen_epoch > 0 {
            return Ok(true);
        }

        self.populate_after(seen_epoch, || false, cancel).await?;
        Ok(self.epoch() > 0)
    }

    async fn resolve(
        &self,
        lookup: Lookup<'_>,
        cancel: &CancellationToken,
    ) -> EntitleResult<Option<Arc<Product>>> {
        if cancel.is_cancelled() {
            return Err(EntitleError::Canceled);
        }

        // Read before the fast path so a pass finishing between the miss
        // and the lock is detected.
        let seen_epoch = self.epoch();

        if let Some(product) = self.state.lookup(lookup) {
            debug!(?lookup, "Catalog cache hit");
            return Ok(Some(product));
        }

        self.populate_after(seen_epoch, || self.state.lookup(lookup).is_some(), cancel)
            .await?;

        let found = self.state.lookup(lookup);
        if found.is_none() {
            debug!(?lookup, "Product not listed in catalog");
        }
        Ok(found)
    }

    /// Run a population pass unless one completed since `seen_epoch` or
    /// `satisfied` already holds once the lock is acquired
    async fn populate_after(
        &self,
        seen_epoch: u64,
        satisfied: impl Fn() -> bool,
        cancel: &CancellationToken,
    ) -> EntitleResult<()> {
        let guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(EntitleError::Canceled),
            guard = Arc::clone(&self.state.populate_lock).lock_owned() => guard,
        };

        if satisfied() || self.epoch() != seen_epoch {
            debug!("Catalog populated while waiting");
            return Ok(());
        }

        let state = Arc::clone(&self.state);
        let population = tokio::spawn(async move {
            let _guard = guard;
            state.populate().await
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(EntitleError::Canceled),
            joined = population => {
                if let Err(e) = joined {
                    warn!(error = %e, "Catalog population task failed");
                }
                Ok(())
            }
        }
    }
}

impl CatalogState {
    fn lookup(&self, lookup: Lookup<'_>) -> Option<Arc<Product>> {
        match lookup {
            Lookup::Exact(id) => self.by_id.get(id).map(|e| Arc::clone(e.value())),
            Lookup::Family(family_id) => self
                .latest
                .get(family_id)
                .map(|e| Arc::clone(&e.value().product)),
        }
    }

    /// Fetch the full catalog and merge it into both maps
    ///
    /// Returns false when the pass was skipped or failed; the maps are left
    /// untouched in that case so the next miss retries.
    async fn populate(&self) -> bool {
        if !self.backend.is_connected().await {
            debug!("Offline, skipping catalog population");
            return false;
        }

        let products = match self.backend.fetch_catalog(&ProductKind::CATALOG).await {
            Ok(products) => products,
            Err(e) => {
                warn!(
                    backend = self.backend.backend_name(),
                    transient = e.is_transient(),
                    error = %e,
                    "Catalog fetch failed"
                );
                return false;
            }
        };

        let listed = products.len();
        let mut highest: HashMap<String, VersionedProduct> = HashMap::new();

        for product in products {
            let key = product.key();
            let product = Arc::new(product);

            self.by_id
                .entry(product.id.clone())
                .or_insert_with(|| Arc::clone(&product));

            let candidate = VersionedProduct {
                version: key.version,
                product,
            };
            match highest.entry(key.family_id) {
                hash_map::Entry::Occupied(mut e) => {
                    if candidate.version > e.get().version {
                        e.insert(candidate);
                    }
                }
                hash_map::Entry::Vacant(e) => {
                    e.insert(candidate);
                }
            }
        }

        let families = highest.len();
        for (family_id, candidate) in highest {
            match self.latest.entry(family_id) {
                Entry::Occupied(mut e) => {
                    if candidate.version > e.get().version {
                        e.insert(candidate);
                    }
                }
                Entry::Vacant(e) => {
                    e.insert(candidate);
                }
            }
        }

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(listed, families, epoch, "Catalog populated");
        true
    }
}
