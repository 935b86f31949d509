//! Location Commands
//!
//! Locations have no feature flag of their own; only admins and owners
//! edit them.

use crate::domain::Location;
use crate::repository::{DocumentRepository, Repository, TeamRepository};
use crate::session::Session;

fn location_repo(session: &Session) -> Result<DocumentRepository<Location>, String> {
    let (user, _) = session.require_team()?;
    if !user.can_manage_members() {
        return Err("Only team admins can edit locations.".to_string());
    }
    session.team_repo::<Location>()
}

pub async fn save_location(session: &Session, location: Location) -> Result<Location, String> {
    let repo = location_repo(session)?;
    if location.name.trim().is_empty() {
        return Err("Location name cannot be empty.".to_string());
    }
    repo.save(location).await.map_err(|e| e.to_string())
}

pub async fn delete_location(session: &Session, id: &str) -> Result<(), String> {
    let repo = location_repo(session)?;
    repo.delete(id).await.map_err(|e| e.to_string())
}
