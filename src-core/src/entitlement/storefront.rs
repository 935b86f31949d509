//! Storefront
//!
//! The app store seam. `StaticStorefront` sells a fixed product list and
//! is used offline and in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::config::ProductCatalog;
use super::PurchaseError;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub display_name: String,
    pub display_price: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub product_id: String,
    pub purchased_at: DateTime<Utc>,
}

/// Transaction as reported by the store, with its signature check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionCheck {
    Verified(Transaction),
    Unverified(Transaction, String),
}

impl TransactionCheck {
    pub fn verified(self) -> Result<Transaction, PurchaseError> {
        match self {
            TransactionCheck::Verified(tx) => Ok(tx),
            TransactionCheck::Unverified(_, reason) => Err(PurchaseError::VerificationFailed(reason)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Success(TransactionCheck),
    Pending,
    Cancelled,
}

#[async_trait]
pub trait Storefront: Send + Sync {
    async fn product(&self, product_id: &str) -> Result<Option<Product>, PurchaseError>;

    async fn purchase(&self, product: &Product) -> Result<PurchaseOutcome, PurchaseError>;

    /// Transactions currently entitling this device's account
    async fn current_entitlements(&self) -> Result<Vec<TransactionCheck>, PurchaseError>;
}

/// How the next purchase on a `StaticStorefront` completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NextOutcome {
    #[default]
    Complete,
    Unverified,
    Pending,
    Cancelled,
}

#[derive(Default)]
struct StoreState {
    next: NextOutcome,
    owned: Vec<TransactionCheck>,
}

pub struct StaticStorefront {
    products: Vec<Product>,
    state: Mutex<StoreState>,
}

impl StaticStorefront {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Storefront selling the configured basic and premium products
    pub fn with_catalog(catalog: &ProductCatalog) -> Self {
        Self::new(vec![
            Product {
                id: catalog.basic.clone(),
                display_name: "Basic".to_string(),
                display_price: "$4.99".to_string(),
            },
            Product {
                id: catalog.premium.clone(),
                display_name: "Premium".to_string(),
                display_price: "$9.99".to_string(),
            },
        ])
    }

    pub async fn set_next_outcome(&self, outcome: NextOutcome) {
        self.state.lock().await.next = outcome;
    }

    /// Pretend the account already owns `product_id`
    pub async fn grant(&self, product_id: &str) {
        let tx = new_transaction(product_id);
        self.state.lock().await.owned.push(TransactionCheck::Verified(tx));
    }
}

fn new_transaction(product_id: &str) -> Transaction {
    Transaction {
        id: uuid::Uuid::new_v4().to_string(),
        product_id: product_id.to_string(),
        purchased_at: Utc::now(),
    }
}

#[async_trait]
impl Storefront for StaticStorefront {
    async fn product(&self, product_id: &str) -> Result<Option<Product>, PurchaseError> {
        Ok(self.products.iter().find(|p| p.id == product_id).cloned())
    }

    async fn purchase(&self, product: &Product) -> Result<PurchaseOutcome, PurchaseError> {
        let mut state = self.state.lock().await;
        let outcome = match std::mem::take(&mut state.next) {
            NextOutcome::Pending => PurchaseOutcome::Pending,
            NextOutcome::Cancelled => PurchaseOutcome::Cancelled,
            NextOutcome::Unverified => PurchaseOutcome::Success(TransactionCheck::Unverified(
                new_transaction(&product.id),
                "signature mismatch".to_string(),
            )),
            NextOutcome::Complete => {
                let check = TransactionCheck::Verified(new_transaction(&product.id));
                state.owned.push(check.clone());
                PurchaseOutcome::Success(check)
            }
        };
        Ok(outcome)
    }

    async fn current_entitlements(&self) -> Result<Vec<TransactionCheck>, PurchaseError> {
        Ok(self.state.lock().await.owned.clone())
    }
}
