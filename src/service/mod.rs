//! Entitlement service and purchase coordination

pub mod entitlement;
pub mod events;
pub mod purchase;

pub use entitlement::EntitlementService;
pub use events::{ProductPurchased, PurchaseEvents, PurchaseStream, DEFAULT_EVENT_BUFFER};
pub use purchase::PurchaseRequest;
