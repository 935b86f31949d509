//! Session
//!
//! Owns the injected backend services, the signed-in user and the live
//! mirrors for that user's team. Everything the command layer touches
//! goes through here.

use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::backend::{AuthProvider, BlobStore, DocumentStore};
use crate::config::AppConfig;
use crate::domain::{DomainError, Entity, Feature, User};
use crate::entitlement::Storefront;
use crate::mirror::{MemberMirror, TeamMirror, TeamSnapshot};
use crate::repository::{DocumentRepository, Repository, TeamRepository};

const MIN_PASSWORD_LEN: usize = 6;

/// Backend services a session is built from
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub blobs: Arc<dyn BlobStore>,
    pub storefront: Arc<dyn Storefront>,
    pub config: AppConfig,
}

/// Top-level screen for the current auth state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Main,
}

/// Live subscriptions for one team, dropped together
struct TeamSubscriptions {
    data: TeamMirror,
    members: MemberMirror,
}

impl TeamSubscriptions {
    fn start(store: Arc<dyn DocumentStore>, team_code: &str) -> Self {
        log::info!("Starting mirrors for team {}", team_code);
        Self {
            data: TeamMirror::start(store.clone(), team_code),
            members: MemberMirror::start(store, team_code),
        }
    }
}

pub struct Session {
    services: Services,
    user_tx: watch::Sender<Option<User>>,
    mirrors: Mutex<Option<TeamSubscriptions>>,
}

fn validate_sign_up(display_name: &str, email: &str, password: &str) -> Result<(), String> {
    if display_name.trim().is_empty() {
        return Err("Please enter your name.".to_string());
    }
    if !email.contains('@') {
        return Err("Please enter a valid email address.".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 6 characters.".to_string());
    }
    Ok(())
}

fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

impl Session {
    pub fn new(services: Services) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            services,
            user_tx,
            mirrors: Mutex::new(None),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.services.store.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.services.config
    }

    // ========================
    // Current user
    // ========================

    pub fn current_user(&self) -> Option<User> {
        self.user_tx.borrow().clone()
    }

    /// Receiver notified whenever the signed-in user or their profile changes
    pub fn subscribe_user(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    pub fn route(&self) -> Route {
        if self.user_tx.borrow().is_some() {
            Route::Main
        } else {
            Route::Login
        }
    }

    pub fn require_user(&self) -> Result<User, String> {
        self.current_user().ok_or_else(|| "You are not signed in.".to_string())
    }

    /// Signed-in user together with their team code
    pub fn require_team(&self) -> Result<(User, String), String> {
        let user = self.require_user()?;
        match user.team_code.clone() {
            Some(code) => Ok((user, code)),
            None => Err("Join or create a team first.".to_string()),
        }
    }

    /// User allowed to edit `feature`, plus a repository for their team
    pub fn editor<T: Entity>(&self, feature: Feature) -> Result<(User, DocumentRepository<T>), String> {
        let (user, code) = self.require_team()?;
        if !user.can_edit(feature) {
            let err = DomainError::PermissionDenied(format!(
                "You don't have permission to edit {}.",
                feature.label()
            ));
            return Err(err.to_string());
        }
        Ok((user, DocumentRepository::for_team(self.store(), &code)))
    }

    /// Repository for any team-scoped collection, read access only needs a team
    pub fn team_repo<T: Entity>(&self) -> Result<DocumentRepository<T>, String> {
        let (_, code) = self.require_team()?;
        Ok(DocumentRepository::for_team(self.store(), &code))
    }

    pub fn users(&self) -> DocumentRepository<User> {
        DocumentRepository::unscoped(self.store())
    }

    // ========================
    // Auth
    // ========================

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, String> {
        let account = self
            .services
            .auth
            .sign_in(email.trim(), password)
            .await
            .map_err(|e| e.to_string())?;

        let profile = self.users().find_by_id(&account.uid).await.map_err(|e| e.to_string())?;
        let user = match profile {
            Some(user) => user,
            None => {
                // Account exists without a profile document, recreate a bare one
                log::warn!("No profile for {}, creating one", account.email);
                let user = User::new(
                    account.uid.clone(),
                    default_display_name(&account.email),
                    account.email.clone(),
                    None,
                );
                self.users().save(user).await.map_err(|e| e.to_string())?
            }
        };

        log::info!("Signed in as {}", user.email);
        self.activate(user.clone()).await;
        Ok(user)
    }

    pub async fn sign_up(
        &self,
        display_name: &str,
        email: &str,
        password: &str,
        team_code: Option<String>,
    ) -> Result<User, String> {
        validate_sign_up(display_name, email, password)?;

        let account = self
            .services
            .auth
            .sign_up(email.trim(), password)
            .await
            .map_err(|e| e.to_string())?;

        let team_code = team_code.map(|c| c.trim().to_uppercase());
        let user = User::new(account.uid, display_name.trim().to_string(), account.email, team_code);
        let user = self.users().save(user).await.map_err(|e| e.to_string())?;

        log::info!("Created account {}", user.email);
        self.activate(user.clone()).await;
        Ok(user)
    }

    /// Pick up an auth session that is still valid from an earlier run
    pub async fn resume(&self) -> Result<Option<User>, String> {
        let Some(account) = self.services.auth.current_account().await else {
            return Ok(None);
        };
        let profile = self.users().find_by_id(&account.uid).await.map_err(|e| e.to_string())?;
        if let Some(user) = &profile {
            self.activate(user.clone()).await;
        }
        Ok(profile)
    }

    pub async fn sign_out(&self) -> Result<(), String> {
        self.services.auth.sign_out().await.map_err(|e| e.to_string())?;
        self.clear().await;
        log::info!("Signed out");
        Ok(())
    }

    /// Drop mirrors and the current user without touching the auth service
    pub(crate) async fn clear(&self) {
        self.mirrors.lock().await.take();
        self.user_tx.send_replace(None);
    }

    // ========================
    // Profile
    // ========================

    /// Persist the signed-in user's profile and republish it, restarting
    /// the mirrors when the team code changed
    pub async fn apply_profile(&self, user: User) -> Result<User, String> {
        let user = self.users().save(user).await.map_err(|e| e.to_string())?;
        self.activate(user.clone()).await;
        Ok(user)
    }

    async fn activate(&self, user: User) {
        {
            let mut mirrors = self.mirrors.lock().await;
            let running = mirrors.as_ref().map(|m| m.data.team_code().to_string());
            if running != user.team_code {
                // Old mirrors stop before the new ones subscribe
                mirrors.take();
                *mirrors = user
                    .team_code
                    .as_deref()
                    .map(|code| TeamSubscriptions::start(self.store(), code));
            }
        }
        self.user_tx.send_replace(Some(user));
    }

    // ========================
    // Mirrors
    // ========================

    /// Team code the mirrors currently follow
    pub async fn mirrored_team(&self) -> Option<String> {
        let mirrors = self.mirrors.lock().await;
        mirrors.as_ref().map(|m| m.data.team_code().to_string())
    }

    pub async fn team_snapshot(&self) -> Option<TeamSnapshot> {
        let mirrors = self.mirrors.lock().await;
        mirrors.as_ref().map(|m| m.data.snapshot())
    }

    pub async fn members(&self) -> Vec<User> {
        let mirrors = self.mirrors.lock().await;
        mirrors.as_ref().map(|m| m.members.members()).unwrap_or_default()
    }

    pub async fn subscribe_members(&self) -> Option<watch::Receiver<Vec<User>>> {
        let mirrors = self.mirrors.lock().await;
        mirrors.as_ref().map(|m| m.members.subscribe())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::backend::{FsBlobStore, LocalAuth, MemoryStore};
    use crate::entitlement::StaticStorefront;

    /// Session over in-memory services plus a handle on its storefront;
    /// the tempdir holds blobs
    pub fn storefront_session() -> (Session, Arc<StaticStorefront>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::default();
        let storefront = Arc::new(StaticStorefront::with_catalog(&config.products));
        let services = Services {
            store: Arc::new(MemoryStore::new()),
            auth: Arc::new(LocalAuth::new()),
            blobs: Arc::new(FsBlobStore::new(dir.path(), "http://blobs.test/o")),
            storefront: storefront.clone(),
            config,
        };
        (Session::new(services), storefront, dir)
    }

    pub fn test_session() -> (Session, tempfile::TempDir) {
        let (session, _, dir) = storefront_session();
        (session, dir)
    }

    /// Session signed in as an admin of team `T1`
    pub async fn admin_session() -> (Session, tempfile::TempDir) {
        let (session, dir) = test_session();
        let mut user = session
            .sign_up("Ada", "ada@crew.io", "secret1", Some("T1".into()))
            .await
            .unwrap();
        user.is_admin = true;
        session.apply_profile(user).await.unwrap();
        (session, dir)
    }

    /// Session signed in as a plain member of `T1` with no edit rights
    pub async fn member_session() -> (Session, tempfile::TempDir) {
        let (session, dir) = test_session();
        session
            .sign_up("Max", "max@crew.io", "secret1", Some("T1".into()))
            .await
            .unwrap();
        (session, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::domain::{GearItem, GearStatus};

    #[tokio::test]
    async fn test_sign_up_routes_to_main_and_starts_mirrors() {
        let (session, _dir) = test_session();
        assert_eq!(session.route(), Route::Login);

        let user = session
            .sign_up("Ada", "ada@crew.io", "secret1", Some(" t1 ".into()))
            .await
            .unwrap();

        assert_eq!(user.team_code.as_deref(), Some("T1"));
        assert_eq!(session.route(), Route::Main);
        assert_eq!(session.mirrored_team().await.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let (session, _dir) = test_session();
        assert!(session.sign_up(" ", "a@b.io", "secret1", None).await.is_err());
        assert!(session.sign_up("Ada", "nope", "secret1", None).await.is_err());
        let err = session.sign_up("Ada", "a@b.io", "short", None).await.unwrap_err();
        assert_eq!(err, "Password must be at least 6 characters.");
        assert_eq!(session.route(), Route::Login);
    }

    #[tokio::test]
    async fn test_user_without_team_has_no_mirrors() {
        let (session, _dir) = test_session();
        session.sign_up("Solo", "solo@crew.io", "secret1", None).await.unwrap();

        assert!(session.mirrored_team().await.is_none());
        assert!(session.team_snapshot().await.is_none());
        assert_eq!(session.require_team().unwrap_err(), "Join or create a team first.");
    }

    #[tokio::test]
    async fn test_sign_in_loads_profile() {
        let (session, _dir) = test_session();
        session.sign_up("Ada", "ada@crew.io", "secret1", Some("T1".into())).await.unwrap();
        session.sign_out().await.unwrap();
        assert_eq!(session.route(), Route::Login);
        assert!(session.mirrored_team().await.is_none());

        let user = session.sign_in("ADA@crew.io", "secret1").await.unwrap();
        assert_eq!(user.display_name, "Ada");
        assert_eq!(session.mirrored_team().await.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_wrong_password_surfaces_message() {
        let (session, _dir) = test_session();
        session.sign_up("Ada", "ada@crew.io", "secret1", None).await.unwrap();
        session.sign_out().await.unwrap();

        let err = session.sign_in("ada@crew.io", "wrong-one").await.unwrap_err();
        assert!(!err.is_empty());
        assert!(session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_team_change_restarts_mirrors() {
        let (session, _dir) = admin_session().await;
        let mut user = session.require_user().unwrap();
        user.team_code = Some("T2".into());
        session.apply_profile(user).await.unwrap();

        assert_eq!(session.mirrored_team().await.as_deref(), Some("T2"));
        assert_eq!(session.require_team().unwrap().1, "T2");
    }

    #[tokio::test]
    async fn test_editor_checks_feature_flag() {
        let (session, _dir) = member_session().await;
        let err = session.editor::<GearItem>(Feature::Gear).unwrap_err();
        assert!(err.contains("permission"));

        let mut user = session.require_user().unwrap();
        user.access.set(Feature::Gear, true);
        session.apply_profile(user).await.unwrap();

        let (_, repo) = session.editor::<GearItem>(Feature::Gear).unwrap();
        repo.save(GearItem::new("Mic".into(), "Audio".into(), GearStatus::Available))
            .await
            .unwrap();
        assert_eq!(repo.team_code(), Some("T1"));
        assert!(format!("{:?}", repo).contains("gear"));
    }

    #[tokio::test]
    async fn test_user_watch_sees_sign_out() {
        let (session, _dir) = admin_session().await;
        let mut rx = session.subscribe_user();
        assert!(rx.borrow_and_update().is_some());

        session.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }
}
