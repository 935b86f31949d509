//! Subscription Entitlements
//!
//! Buying or restoring a subscription tier through a storefront and
//! applying it to the signed-in profile.

mod storefront;
mod team_code;
mod flow;


pub use storefront::{
    NextOutcome, Product, PurchaseOutcome, StaticStorefront, Storefront, Transaction, TransactionCheck,
};
pub use team_code::{allocate_team_code, generate_team_code, TEAM_CODE_LEN};
pub use flow::{purchase, restore_purchases};

/// Purchase failures, each with its own message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PurchaseError {
    #[error("This subscription is not available in the store.")]
    ProductNotFound,
    #[error("Your purchase is pending approval.")]
    Pending,
    #[error("Purchase cancelled.")]
    Cancelled,
    #[error("The purchase could not be verified: {0}")]
    VerificationFailed(String),
    #[error("No active subscription was found to restore.")]
    NothingToRestore,
    #[error("Store error: {0}")]
    Store(String),
    #[error("{0}")]
    Profile(String),
}
