//! Checklist Commands

use chrono::Utc;

use crate::domain::{ChecklistTemplate, DomainError, Feature};
use crate::repository::{new_document_id, DocumentRepository, Repository, TeamRepository};
use crate::session::Session;

async fn load_checklist(repo: &DocumentRepository<ChecklistTemplate>, id: &str) -> Result<ChecklistTemplate, String> {
    repo.find_by_id(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| DomainError::NotFound(format!("checklist {}", id)).to_string())
}

/// Save a checklist, giving new items ids and re-deriving completion
pub async fn save_checklist(session: &Session, mut checklist: ChecklistTemplate) -> Result<ChecklistTemplate, String> {
    let (user, repo) = session.editor::<ChecklistTemplate>(Feature::Checklists)?;
    if checklist.title.trim().is_empty() {
        return Err("Checklist title cannot be empty.".to_string());
    }
    for item in &mut checklist.items {
        if item.id.is_empty() {
            item.id = new_document_id();
        }
    }
    checklist.refresh_completion(&user.email, Utc::now());
    repo.save(checklist).await.map_err(|e| e.to_string())
}

pub async fn delete_checklist(session: &Session, id: &str) -> Result<(), String> {
    let (_, repo) = session.editor::<ChecklistTemplate>(Feature::Checklists)?;
    repo.delete(id).await.map_err(|e| e.to_string())
}

/// Tick or untick one item on the stored checklist. Any team member may
/// do this.
pub async fn toggle_checklist_item(
    session: &Session,
    checklist_id: &str,
    item_id: &str,
) -> Result<ChecklistTemplate, String> {
    let (user, _) = session.require_team()?;
    let repo = session.team_repo::<ChecklistTemplate>()?;

    let mut checklist = load_checklist(&repo, checklist_id).await?;
    checklist
        .toggle_item(item_id, &user.email, Utc::now())
        .map_err(|e| e.to_string())?;
    repo.save(checklist).await.map_err(|e| e.to_string())
}

/// Untick everything so the checklist can be run again
pub async fn reset_checklist(session: &Session, checklist_id: &str) -> Result<ChecklistTemplate, String> {
    let (_, repo) = session.editor::<ChecklistTemplate>(Feature::Checklists)?;
    let mut checklist = load_checklist(&repo, checklist_id).await?;
    checklist.reset();
    repo.save(checklist).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChecklistItem;
    use crate::session::testing::{admin_session, member_session};

    fn preflight() -> ChecklistTemplate {
        ChecklistTemplate::new(
            "Preflight".into(),
            vec![
                ChecklistItem::new(String::new(), "Batteries".into()),
                ChecklistItem::new(String::new(), "Cables".into()),
            ],
        )
    }

    #[tokio::test]
    async fn test_toggle_completes_and_uncompletes() {
        let (session, _dir) = admin_session().await;
        let checklist = save_checklist(&session, preflight()).await.unwrap();
        let first = checklist.items[0].id.clone();
        let second = checklist.items[1].id.clone();
        assert!(!first.is_empty() && first != second);

        let checklist = toggle_checklist_item(&session, &checklist.id, &first).await.unwrap();
        assert!(checklist.completed_at.is_none());
        let checklist = toggle_checklist_item(&session, &checklist.id, &second).await.unwrap();
        assert!(checklist.is_completed());
        assert_eq!(checklist.completed_by.as_deref(), Some("ada@crew.io"));

        let checklist = toggle_checklist_item(&session, &checklist.id, &first).await.unwrap();
        assert!(checklist.completed_at.is_none());
        assert!(checklist.completed_by.is_none());

        let repo = session.team_repo::<ChecklistTemplate>().unwrap();
        let stored = repo.find_by_id(&checklist.id).await.unwrap().unwrap();
        assert_eq!(stored, checklist);
    }

    #[tokio::test]
    async fn test_members_can_toggle_but_not_edit() {
        let (member, _dir) = member_session().await;
        assert!(save_checklist(&member, preflight()).await.is_err());

        let repo = member.team_repo::<ChecklistTemplate>().unwrap();
        let mut stored = preflight();
        for (i, item) in stored.items.iter_mut().enumerate() {
            item.id = format!("i{}", i);
        }
        let stored = repo.save(stored).await.unwrap();

        let checklist = toggle_checklist_item(&member, &stored.id, "i0").await.unwrap();
        assert!(checklist.items[0].is_done);
        assert_eq!(checklist.title, "Preflight");

        let err = toggle_checklist_item(&member, &stored.id, "missing").await.unwrap_err();
        assert!(err.starts_with("Not found"));
        assert!(reset_checklist(&member, &stored.id).await.is_err());
    }

    #[tokio::test]
    async fn test_toggle_ignores_local_edits() {
        let (admin, _dir) = admin_session().await;
        let checklist = save_checklist(&admin, preflight()).await.unwrap();

        let mut forged = checklist.clone();
        forged.title = "Rewritten".into();
        forged.items.truncate(1);
        let toggled = toggle_checklist_item(&admin, &forged.id, &forged.items[0].id).await.unwrap();

        assert_eq!(toggled.title, "Preflight");
        assert_eq!(toggled.items.len(), 2);
    }

    #[tokio::test]
    async fn test_reset_clears_progress() {
        let (session, _dir) = admin_session().await;
        let checklist = save_checklist(&session, preflight()).await.unwrap();
        let id = checklist.items[0].id.clone();
        let checklist = toggle_checklist_item(&session, &checklist.id, &id).await.unwrap();

        let checklist = reset_checklist(&session, &checklist.id).await.unwrap();
        assert_eq!(checklist.progress(), (0, 2));
    }
}
