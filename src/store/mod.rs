//! Storefront data model and backend seam
//!
//! - `key`: product id → family id + version parsing
//! - `types`: products, prices, licenses, purchase outcomes
//! - `backend`: the `StorefrontBackend` trait the engine talks to
//! - `memory`: in-memory backend used by the CLI and tests

pub mod backend;
pub mod key;
pub mod memory;
pub mod types;

pub use backend::StorefrontBackend;
pub use key::ProductKey;
pub use memory::{MemoryBackend, StoreFixture};
pub use types::{
    AddOnLicense, DurationUnit, LicenseSnapshot, ListingPrice, PriceInfo, Product, ProductKind,
    PurchaseOutcome, SubscriptionTerms, MISSING_PRICE,
};
