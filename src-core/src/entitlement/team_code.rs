//! Team code allocation

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;

use crate::backend::DocumentStore;
use crate::domain::Team;
use crate::repository::{DocumentRepository, Repository, TeamRepository};
use super::PurchaseError;

pub const TEAM_CODE_LEN: usize = 6;
const MAX_ATTEMPTS: usize = 5;

pub fn generate_team_code<R: Rng>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(TEAM_CODE_LEN)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect()
}

/// Create a team document under a code no other team uses
pub async fn allocate_team_code(store: Arc<dyn DocumentStore>, owner_id: &str) -> Result<String, PurchaseError> {
    let teams = DocumentRepository::<Team>::unscoped(store);

    for _ in 0..MAX_ATTEMPTS {
        let code = generate_team_code(&mut rand::thread_rng());
        let taken = teams
            .find_by_id(&code)
            .await
            .map_err(|e| PurchaseError::Store(e.to_string()))?
            .is_some();
        if taken {
            log::debug!("Team code {} already taken", code);
            continue;
        }

        teams
            .save(Team::new(code.clone(), owner_id.to_string(), Utc::now()))
            .await
            .map_err(|e| PurchaseError::Store(e.to_string()))?;
        log::info!("Created team {} for {}", code, owner_id);
        return Ok(code);
    }

    Err(PurchaseError::Store("Could not allocate a unique team code.".to_string()))
}
