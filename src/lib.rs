//! Entitle - In-app purchase entitlement engine
//!
//! Answers "does the user own X", "what does X cost" and "buy X" against a
//! storefront backend, caching the catalog and ownership answers for the
//! lifetime of the process.

pub mod audit;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod service;
pub mod store;
pub mod ui;

pub use error::{EntitleError, EntitleResult};
pub use service::{EntitlementService, ProductPurchased, PurchaseRequest};
pub use store::{MemoryBackend, PriceInfo, Product, ProductKey, PurchaseOutcome, StorefrontBackend};
