//! Idea Board Commands

use crate::domain::{Feature, IdeaCard};
use crate::repository::{Repository, TeamRepository};
use crate::session::Session;

pub async fn save_idea(session: &Session, idea: IdeaCard) -> Result<IdeaCard, String> {
    let (_, repo) = session.editor::<IdeaCard>(Feature::Ideas)?;
    if idea.title.trim().is_empty() {
        return Err("Idea title cannot be empty.".to_string());
    }
    repo.save(idea).await.map_err(|e| e.to_string())
}

pub async fn delete_idea(session: &Session, id: &str) -> Result<(), String> {
    let (_, repo) = session.editor::<IdeaCard>(Feature::Ideas)?;
    repo.delete(id).await.map_err(|e| e.to_string())
}

pub async fn toggle_idea_implemented(session: &Session, idea: &IdeaCard) -> Result<IdeaCard, String> {
    let (_, repo) = session.editor::<IdeaCard>(Feature::Ideas)?;
    let mut idea = idea.clone();
    idea.implemented = !idea.implemented;
    repo.save(idea).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::admin_session;

    #[tokio::test]
    async fn test_toggle_implemented() {
        let (session, _dir) = admin_session().await;
        let idea = save_idea(&session, IdeaCard::new("Confetti".into(), "End of set".into()))
            .await
            .unwrap();
        assert!(!idea.implemented);

        let idea = toggle_idea_implemented(&session, &idea).await.unwrap();
        assert!(idea.implemented);

        delete_idea(&session, &idea.id).await.unwrap();
        let repo = session.team_repo::<IdeaCard>().unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }
}
