//! Mirror Integration Tests

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    use crate::backend::{DocumentStore, MemoryStore};
    use crate::domain::{GearItem, GearStatus, IdeaCard, User};
    use crate::mirror::{CollectionMirror, MemberMirror, TeamMirror};
    use crate::repository::{DocumentRepository, Repository, TeamRepository};

    async fn wait_until<T, F>(rx: &mut watch::Receiver<Vec<T>>, predicate: F)
    where
        F: FnMut(&Vec<T>) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
            .await
            .expect("mirror did not publish in time")
            .expect("mirror stopped");
    }

    #[tokio::test]
    async fn test_mirror_follows_writes() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let repo = DocumentRepository::<IdeaCard>::for_team(store.clone(), "T1");
        repo.save(IdeaCard::new("Haze".into(), String::new())).await.unwrap();

        let mirror = CollectionMirror::<IdeaCard>::start(store.clone(), "T1");
        let mut rx = mirror.subscribe();
        wait_until(&mut rx, |ideas| ideas.len() == 1).await;

        let second = repo.save(IdeaCard::new("Pyro".into(), String::new())).await.unwrap();
        wait_until(&mut rx, |ideas| ideas.len() == 2).await;

        repo.delete(&second.id).await.unwrap();
        wait_until(&mut rx, |ideas| ideas.len() == 1).await;
        assert_eq!(mirror.current()[0].title, "Haze");
    }

    #[tokio::test]
    async fn test_empty_collection_still_publishes() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let mirror = CollectionMirror::<GearItem>::start(store, "T1");
        let mut rx = mirror.subscribe();
        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(mirror.current().is_empty());
    }

    #[tokio::test]
    async fn test_other_teams_are_invisible() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let mirror = TeamMirror::start(store.clone(), "MINE");
        let mut rx = mirror.gear.subscribe();

        let theirs = DocumentRepository::<GearItem>::for_team(store.clone(), "THEIRS");
        theirs.save(GearItem::new("Their mic".into(), "Audio".into(), GearStatus::Available)).await.unwrap();
        let mine = DocumentRepository::<GearItem>::for_team(store, "MINE");
        mine.save(GearItem::new("My mic".into(), "Audio".into(), GearStatus::Available)).await.unwrap();

        wait_until(&mut rx, |gear| gear.len() == 1).await;
        let snapshot = mirror.snapshot();
        assert_eq!(snapshot.gear[0].name, "My mic");
        assert!(snapshot.channels.is_empty());
        assert_eq!(mirror.team_code(), "MINE");
    }

    #[tokio::test]
    async fn test_undecodable_documents_are_skipped() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        store.set("ideas", "bad", json!({"id": "bad", "teamCode": "T1", "title": 42})).await.unwrap();
        store
            .set("ideas", "good", json!({"id": "good", "teamCode": "T1", "title": "Lasers"}))
            .await
            .unwrap();

        let mirror = CollectionMirror::<IdeaCard>::start(store, "T1");
        let mut rx = mirror.subscribe();
        wait_until(&mut rx, |ideas| ideas.len() == 1).await;
        assert!(mirror.find("good").is_some());
        assert!(mirror.find("bad").is_none());
    }

    #[tokio::test]
    async fn test_member_leaving_team_drops_from_roster() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let users = DocumentRepository::<User>::unscoped(store.clone());
        let mut user = User::new("u1".into(), "Dee".into(), "dee@crew.io".into(), Some("T1".into()));
        users.save(user.clone()).await.unwrap();

        let roster = MemberMirror::start(store, "T1");
        let mut rx = roster.subscribe();
        wait_until(&mut rx, |members| members.len() == 1).await;
        assert!(roster.find_by_email("DEE@crew.io").is_some());

        user.team_code = Some("T2".into());
        users.save(user).await.unwrap();
        wait_until(&mut rx, |members| members.is_empty()).await;
    }

    #[tokio::test]
    async fn test_dropping_mirror_stops_task() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let mirror = CollectionMirror::<IdeaCard>::start(store, "T1");
        let mut rx = mirror.subscribe();
        drop(mirror);

        let closed = tokio::time::timeout(Duration::from_secs(2), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }
}
