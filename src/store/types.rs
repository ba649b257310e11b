//! Storefront data model: products, prices, licenses and purchase outcomes

use super::key::ProductKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Formatted price shown when a product cannot be resolved
pub const MISSING_PRICE: &str = "-";

/// Kind of add-on listed by the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// Owned once purchased (lifetime unlocks and subscriptions)
    Durable,
    /// Used up after purchase
    Consumable,
}

impl ProductKind {
    /// Kinds requested on every catalog fetch
    pub const CATALOG: [ProductKind; 2] = [ProductKind::Durable, ProductKind::Consumable];
}

/// Unit of a billing or trial period
///
/// Values the storefront reports that are not recognised normalize to
/// `Minute`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DurationUnit {
    #[default]
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl DurationUnit {
    /// Normalize a storefront duration name
    pub fn from_backend(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "minute" => Self::Minute,
            "hour" => Self::Hour,
            "day" => Self::Day,
            "week" => Self::Week,
            "month" => Self::Month,
            "year" => Self::Year,
            _ => Self::Minute,
        }
    }
}

impl From<String> for DurationUnit {
    fn from(raw: String) -> Self {
        Self::from_backend(&raw)
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        };
        write!(f, "{}", name)
    }
}

/// Price as listed by the storefront
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingPrice {
    /// Current price, sale-aware
    pub formatted_price: String,
    /// Price before any sale
    pub formatted_base_price: String,
    /// Price charged per billing period for subscriptions
    pub formatted_recurrence_price: String,
    pub is_on_sale: bool,
    pub sale_end_utc: Option<DateTime<Utc>>,
}

/// Billing and trial terms of a subscription SKU
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionTerms {
    pub billing_period: u32,
    pub billing_period_unit: DurationUnit,
    pub has_trial: bool,
    pub trial_period: u32,
    pub trial_period_unit: DurationUnit,
}

/// A purchasable product as returned by the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Exact product id (in-app offer token)
    pub id: String,

    #[serde(default = "default_kind")]
    pub kind: ProductKind,

    #[serde(default)]
    pub price: ListingPrice,

    /// Present for subscription SKUs
    #[serde(default)]
    pub subscription: Option<SubscriptionTerms>,
}

fn default_kind() -> ProductKind {
    ProductKind::Durable
}

impl Product {
    /// Create a one-time durable product
    pub fn new(id: impl Into<String>, price: ListingPrice) -> Self {
        Self {
            id: id.into(),
            kind: ProductKind::Durable,
            price,
            subscription: None,
        }
    }

    /// Attach subscription terms
    pub fn with_subscription(mut self, terms: SubscriptionTerms) -> Self {
        self.subscription = Some(terms);
        self
    }

    /// Family id and version parsed from the exact id
    pub fn key(&self) -> ProductKey {
        ProductKey::parse(&self.id)
    }

    pub fn family_id(&self) -> String {
        self.key().family_id
    }

    pub fn version(&self) -> u32 {
        self.key().version
    }

    pub fn is_subscription(&self) -> bool {
        self.subscription.is_some()
    }

    /// Project the listing into the price shown to users
    ///
    /// Subscriptions show the recurring price; one-time products show the
    /// current, sale-aware price.
    pub fn price_info(&self) -> PriceInfo {
        let terms = self.subscription.clone().unwrap_or_default();
        let is_subscription = self.is_subscription();

        PriceInfo {
            formatted_price: if is_subscription {
                self.price.formatted_recurrence_price.clone()
            } else {
                self.price.formatted_price.clone()
            },
            formatted_base_price: self.price.formatted_base_price.clone(),
            is_on_sale: self.price.is_on_sale,
            sale_end_utc: self.price.sale_end_utc,
            is_subscription,
            recurrence_length: terms.billing_period,
            recurrence_unit: terms.billing_period_unit,
            has_trial: terms.has_trial,
            trial_length: terms.trial_period,
            trial_unit: terms.trial_period_unit,
        }
    }
}

/// Price data presented to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub formatted_price: String,
    pub formatted_base_price: String,
    pub is_on_sale: bool,
    pub sale_end_utc: Option<DateTime<Utc>>,
    pub is_subscription: bool,
    pub recurrence_length: u32,
    pub recurrence_unit: DurationUnit,
    pub has_trial: bool,
    pub trial_length: u32,
    pub trial_unit: DurationUnit,
}

impl PriceInfo {
    /// Sentinel returned when no product could be resolved
    pub fn not_found() -> Self {
        Self {
            formatted_price: MISSING_PRICE.to_string(),
            formatted_base_price: String::new(),
            is_on_sale: false,
            sale_end_utc: None,
            is_subscription: false,
            recurrence_length: 0,
            recurrence_unit: DurationUnit::Minute,
            has_trial: false,
            trial_length: 0,
            trial_unit: DurationUnit::Minute,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.formatted_price == MISSING_PRICE
    }
}

/// One add-on license in a license snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnLicense {
    /// Product id the license was granted for
    pub offer_token: String,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl AddOnLicense {
    /// Create an active license for a product id
    pub fn active(offer_token: impl Into<String>) -> Self {
        Self {
            offer_token: offer_token.into(),
            is_active: true,
            expires_at: None,
        }
    }
}

/// Entitlements held by the current user at a point in time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseSnapshot {
    pub add_ons: Vec<AddOnLicense>,
}

impl LicenseSnapshot {
    pub fn new(add_ons: Vec<AddOnLicense>) -> Self {
        Self { add_ons }
    }

    /// Licenses that currently grant ownership
    pub fn active(&self) -> impl Iterator<Item = &AddOnLicense> {
        self.add_ons.iter().filter(|l| l.is_active)
    }
}

/// Result of one purchase attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOutcome {
    Succeeded,
    AlreadyOwned,
    ServerError,
    NetworkError,
    UserCanceled,
}

impl PurchaseOutcome {
    /// Whether the outcome grants ownership of the product
    pub fn grants_ownership(&self) -> bool {
        matches!(self, Self::Succeeded | Self::AlreadyOwned)
    }
}

impl fmt::Display for PurchaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Succeeded => "succeeded",
            Self::AlreadyOwned => "already owned",
            Self::ServerError => "server error",
            Self::NetworkError => "network error",
            Self::UserCanceled => "canceled by user",
        };
        write!(f, "{}", name)
    }
}
