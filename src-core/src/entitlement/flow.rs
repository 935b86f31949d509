//! Purchase and restore

use crate::domain::{SubscriptionTier, User};
use crate::session::Session;
use super::team_code::allocate_team_code;
use super::{PurchaseError, PurchaseOutcome};

/// Buy `tier` and apply it to the signed-in profile
pub async fn purchase(session: &Session, tier: SubscriptionTier) -> Result<User, PurchaseError> {
    let user = session.require_user().map_err(PurchaseError::Profile)?;
    let catalog = &session.config().products;
    let product_id = catalog.product_for(tier).ok_or(PurchaseError::ProductNotFound)?;

    let storefront = &session.services().storefront;
    let product = storefront
        .product(product_id)
        .await?
        .ok_or(PurchaseError::ProductNotFound)?;

    log::info!("Purchasing {} for {}", product.id, user.email);
    let transaction = match storefront.purchase(&product).await? {
        PurchaseOutcome::Success(check) => check.verified()?,
        PurchaseOutcome::Pending => return Err(PurchaseError::Pending),
        PurchaseOutcome::Cancelled => return Err(PurchaseError::Cancelled),
    };

    let granted = catalog.tier_for(&transaction.product_id).unwrap_or(tier);
    grant(session, user, granted).await
}

/// Reapply the highest tier among the verified current entitlements
pub async fn restore_purchases(session: &Session) -> Result<User, PurchaseError> {
    let user = session.require_user().map_err(PurchaseError::Profile)?;
    let catalog = &session.config().products;

    let entitlements = session.services().storefront.current_entitlements().await?;
    let best = entitlements
        .into_iter()
        .filter_map(|check| match check.verified() {
            Ok(tx) => Some(tx),
            Err(e) => {
                log::warn!("Ignoring entitlement during restore: {}", e);
                None
            }
        })
        .filter_map(|tx| catalog.tier_for(&tx.product_id))
        .max()
        .ok_or(PurchaseError::NothingToRestore)?;

    log::info!("Restoring {} tier for {}", best.as_str(), user.email);
    grant(session, user, best).await
}

async fn grant(session: &Session, mut user: User, tier: SubscriptionTier) -> Result<User, PurchaseError> {
    user.apply_tier(tier);
    if !user.has_team() {
        let code = allocate_team_code(session.store(), &user.id).await?;
        user.team_code = Some(code);
        user.is_owner = true;
    }
    session.apply_profile(user).await.map_err(PurchaseError::Profile)
}
