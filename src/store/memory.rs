//! In-memory storefront backend
//!
//! Serves a fixed catalog and license snapshot from memory. The CLI loads it
//! from a JSON store fixture; tests build it directly and use the call
//! counters to assert how often the engine reached the backend.

use crate::error::{EntitleError, EntitleResult};
use crate::store::backend::StorefrontBackend;
use crate::store::types::{
    AddOnLicense, LicenseSnapshot, Product, ProductKind, PurchaseOutcome,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

/// Store fixture file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreFixture {
    /// Result of the connectivity check
    pub connected: bool,

    /// Simulated round-trip latency for every backend call
    pub latency_ms: u64,

    /// Whether catalog fetches succeed
    pub catalog_available: bool,

    /// Outcome returned for purchases, `null` makes submissions fail
    pub purchase_outcome: Option<PurchaseOutcome>,

    /// Listed products
    pub catalog: Vec<Product>,

    /// License entries, `null` makes the snapshot unavailable
    pub licenses: Option<Vec<AddOnLicense>>,
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self {
            connected: true,
            latency_ms: 0,
            catalog_available: true,
            purchase_outcome: Some(PurchaseOutcome::Succeeded),
            catalog: vec![],
            licenses: Some(vec![]),
        }
    }
}

impl StoreFixture {
    /// Load a fixture from a JSON file
    pub async fn load(path: &Path) -> EntitleResult<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            EntitleError::io(format!("reading store fixture {}", path.display()), e)
        })?;

        serde_json::from_str(&content).map_err(|e| EntitleError::FixtureInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Backend serving a catalog and licenses from memory
#[derive(Debug)]
pub struct MemoryBackend {
    connected: AtomicBool,
    catalog_available: AtomicBool,
    latency: Duration,
    catalog: RwLock<Vec<Product>>,
    licenses: RwLock<Option<LicenseSnapshot>>,
    purchase_outcome: RwLock<Option<PurchaseOutcome>>,
    catalog_fetches: AtomicUsize,
    license_fetches: AtomicUsize,
    purchase_submissions: AtomicUsize,
}

impl MemoryBackend {
    /// Create a connected backend listing the given products and no licenses
    pub fn new(catalog: Vec<Product>) -> Self {
        Self::from_fixture(StoreFixture {
            catalog,
            ..StoreFixture::default()
        })
    }

    /// Create a backend from fixture contents
    pub fn from_fixture(fixture: StoreFixture) -> Self {
        Self {
            connected: AtomicBool::new(fixture.connected),
            catalog_available: AtomicBool::new(fixture.catalog_available),
            latency: Duration::from_millis(fixture.latency_ms),
            catalog: RwLock::new(fixture.catalog),
            licenses: RwLock::new(fixture.licenses.map(LicenseSnapshot::new)),
            purchase_outcome: RwLock::new(fixture.purchase_outcome),
            catalog_fetches: AtomicUsize::new(0),
            license_fetches: AtomicUsize::new(0),
            purchase_submissions: AtomicUsize::new(0),
        }
    }

    /// Load a backend from a JSON fixture file
    pub async fn load(path: &Path) -> EntitleResult<Self> {
        let fixture = StoreFixture::load(path).await?;
        debug!(
            "Loaded store fixture {} ({} products)",
            path.display(),
            fixture.catalog.len()
        );
        Ok(Self::from_fixture(fixture))
    }

    /// Replace the license snapshot with the given active licenses
    pub fn with_licenses(mut self, add_ons: Vec<AddOnLicense>) -> Self {
        self.licenses = RwLock::new(Some(LicenseSnapshot::new(add_ons)));
        self
    }

    /// Make the license snapshot unavailable
    pub fn without_licenses(mut self) -> Self {
        self.licenses = RwLock::new(None);
        self
    }

    /// Delay every backend call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Script the outcome of purchase submissions, `None` makes them fail
    pub fn with_purchase_outcome(mut self, outcome: Option<PurchaseOutcome>) -> Self {
        self.purchase_outcome = RwLock::new(outcome);
        self
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn set_catalog_available(&self, available: bool) {
        self.catalog_available.store(available, Ordering::SeqCst);
    }

    /// Replace the license snapshot, `None` makes it unavailable
    pub async fn set_licenses(&self, add_ons: Option<Vec<AddOnLicense>>) {
        *self.licenses.write().await = add_ons.map(LicenseSnapshot::new);
    }

    /// Number of `fetch_catalog` calls served
    pub fn catalog_fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }

    /// Number of `fetch_license_snapshot` calls served
    pub fn license_fetches(&self) -> usize {
        self.license_fetches.load(Ordering::SeqCst)
    }

    /// Number of `submit_purchase` calls served
    pub fn purchase_submissions(&self) -> usize {
        self.purchase_submissions.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl StorefrontBackend for MemoryBackend {
    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn fetch_license_snapshot(&self) -> EntitleResult<LicenseSnapshot> {
        self.license_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        self.licenses
            .read()
            .await
            .clone()
            .ok_or_else(|| EntitleError::backend("license snapshot unavailable"))
    }

    async fn fetch_catalog(&self, kinds: &[ProductKind]) -> EntitleResult<Vec<Product>> {
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if !self.catalog_available.load(Ordering::SeqCst) {
            return Err(EntitleError::backend("catalog request failed"));
        }

        Ok(self
            .catalog
            .read()
            .await
            .iter()
            .filter(|p| kinds.contains(&p.kind))
            .cloned()
            .collect())
    }

    async fn submit_purchase(&self, product: &Product) -> EntitleResult<PurchaseOutcome> {
        self.purchase_submissions.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let outcome = (*self.purchase_outcome.read().await)
            .ok_or_else(|| EntitleError::backend("purchase request failed"))?;

        if outcome == PurchaseOutcome::Succeeded {
            let mut licenses = self.licenses.write().await;
            if let Some(snapshot) = licenses.as_mut() {
                snapshot.add_ons.push(AddOnLicense::active(product.id.clone()));
            }
        }

        Ok(outcome)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
