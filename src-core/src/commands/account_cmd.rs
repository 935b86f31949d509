//! Account & Team Membership Commands

use crate::domain::{Feature, Team, User};
use crate::repository::{DocumentRepository, Repository};
use crate::session::Session;

/// Change the signed-in user's display name and campus
pub async fn update_profile(
    session: &Session,
    display_name: &str,
    assigned_campus: Option<String>,
) -> Result<User, String> {
    let mut user = session.require_user()?;
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err("Please enter your name.".to_string());
    }
    user.display_name = display_name.to_string();
    user.assigned_campus = assigned_campus.filter(|c| !c.trim().is_empty());
    session.apply_profile(user).await
}

/// Re-authenticate, move the login to `new_email`, then update the
/// profile. Stops at the first failure; earlier steps stay applied.
pub async fn change_email(session: &Session, password: &str, new_email: &str) -> Result<User, String> {
    let mut user = session.require_user()?;
    let auth = &session.services().auth;
    let new_email = new_email.trim();

    auth.reauthenticate(password).await.map_err(|e| e.to_string())?;
    auth.update_email(new_email).await.map_err(|e| e.to_string())?;

    user.email = new_email.to_string();
    log::info!("Changed login email for {}", user.id);
    session.apply_profile(user).await
}

pub async fn change_password(session: &Session, current: &str, new_password: &str) -> Result<(), String> {
    session.require_user()?;
    let auth = &session.services().auth;
    auth.reauthenticate(current).await.map_err(|e| e.to_string())?;
    auth.update_password(new_password).await.map_err(|e| e.to_string())
}

/// Remove the profile document and the login, then end the session
pub async fn delete_account(session: &Session, password: &str) -> Result<(), String> {
    let user = session.require_user()?;
    let auth = &session.services().auth;

    auth.reauthenticate(password).await.map_err(|e| e.to_string())?;
    session.users().delete(&user.id).await.map_err(|e| e.to_string())?;
    auth.delete_account().await.map_err(|e| e.to_string())?;

    log::info!("Deleted account {}", user.id);
    session.clear().await;
    Ok(())
}

/// Attach the signed-in user to an existing team
pub async fn join_team(session: &Session, code: &str) -> Result<User, String> {
    let mut user = session.require_user()?;
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err("Enter a team code.".to_string());
    }

    let teams = DocumentRepository::<Team>::unscoped(session.store());
    if teams.find_by_id(&code).await.map_err(|e| e.to_string())?.is_none() {
        return Err(format!("No team found with code {}.", code));
    }

    user.team_code = Some(code);
    user.is_owner = false;
    session.apply_profile(user).await
}

/// Team member record, checked to belong to the caller's team
async fn team_member(session: &Session, member_id: &str) -> Result<User, String> {
    let (admin, code) = session.require_team()?;
    if !admin.can_manage_members() {
        return Err("Only team admins can manage members.".to_string());
    }
    let member = session
        .users()
        .find_by_id(member_id)
        .await
        .map_err(|e| e.to_string())?
        .filter(|m| m.team_code.as_deref() == Some(code.as_str()))
        .ok_or_else(|| "That person is not on your team.".to_string())?;
    Ok(member)
}

pub async fn update_member_access(
    session: &Session,
    member_id: &str,
    feature: Feature,
    allowed: bool,
) -> Result<User, String> {
    let mut member = team_member(session, member_id).await?;
    member.access.set(feature, allowed);
    let member = session.users().update(&member).await.map_err(|e| e.to_string())?;

    // Editing one's own flags republishes the profile
    if session.current_user().is_some_and(|u| u.id == member.id) {
        session.apply_profile(member.clone()).await?;
    }
    Ok(member)
}

/// Take a member off the team by clearing their team code
pub async fn remove_member(session: &Session, member_id: &str) -> Result<User, String> {
    let mut member = team_member(session, member_id).await?;
    if member.is_owner {
        return Err("The team owner cannot be removed.".to_string());
    }
    if session.current_user().is_some_and(|u| u.id == member.id) {
        return Err("You cannot remove yourself.".to_string());
    }

    member.team_code = None;
    member.is_admin = false;
    member.access = Default::default();
    log::info!("Removing {} from team", member.email);
    session.users().update(&member).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::TeamRepository;
    use crate::session::testing::{admin_session, test_session};
    use crate::session::Route;
    use chrono::Utc;

    async fn add_member(session: &Session, name: &str, team: Option<&str>) -> User {
        let user = User::new(
            format!("uid-{}", name),
            name.to_string(),
            format!("{}@crew.io", name.to_lowercase()),
            team.map(str::to_string),
        );
        session.users().save(user).await.unwrap()
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (session, _dir) = admin_session().await;
        let user = update_profile(&session, " Ada L ", Some("North".into())).await.unwrap();
        assert_eq!(user.display_name, "Ada L");
        assert_eq!(session.current_user().unwrap().assigned_campus.as_deref(), Some("North"));
        assert!(update_profile(&session, "", None).await.is_err());
    }

    #[tokio::test]
    async fn test_change_email_aborts_on_bad_password() {
        let (session, _dir) = admin_session().await;
        assert!(change_email(&session, "wrong-pass", "new@crew.io").await.is_err());
        assert_eq!(session.current_user().unwrap().email, "ada@crew.io");

        let user = change_email(&session, "secret1", "new@crew.io").await.unwrap();
        assert_eq!(user.email, "new@crew.io");
        session.sign_out().await.unwrap();
        assert!(session.sign_in("new@crew.io", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn test_change_password() {
        let (session, _dir) = admin_session().await;
        change_password(&session, "secret1", "secret2").await.unwrap();
        session.sign_out().await.unwrap();
        assert!(session.sign_in("ada@crew.io", "secret1").await.is_err());
        assert!(session.sign_in("ada@crew.io", "secret2").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_account_signs_out() {
        let (session, _dir) = admin_session().await;
        let id = session.require_user().unwrap().id;
        delete_account(&session, "secret1").await.unwrap();

        assert_eq!(session.route(), Route::Login);
        assert!(session.users().find_by_id(&id).await.unwrap().is_none());
        assert!(session.sign_in("ada@crew.io", "secret1").await.is_err());
    }

    #[tokio::test]
    async fn test_join_team_requires_existing_team() {
        let (session, _dir) = test_session();
        session.sign_up("Solo", "solo@crew.io", "secret1", None).await.unwrap();

        let err = join_team(&session, "abc123").await.unwrap_err();
        assert_eq!(err, "No team found with code ABC123.");

        let teams = DocumentRepository::<Team>::unscoped(session.store());
        teams.save(Team::new("ABC123".into(), "someone".into(), Utc::now())).await.unwrap();
        let user = join_team(&session, " abc123 ").await.unwrap();
        assert_eq!(user.team_code.as_deref(), Some("ABC123"));
        assert_eq!(session.mirrored_team().await.as_deref(), Some("ABC123"));
    }

    #[tokio::test]
    async fn test_admin_manages_member_access() {
        let (session, _dir) = admin_session().await;
        let bo = add_member(&session, "Bo", Some("T1")).await;

        let bo = update_member_access(&session, &bo.id, Feature::Gear, true).await.unwrap();
        assert!(bo.can_edit(Feature::Gear));
        assert!(!bo.can_edit(Feature::Chat));

        let bo = remove_member(&session, &bo.id).await.unwrap();
        assert!(bo.team_code.is_none());
        assert!(!bo.can_edit(Feature::Gear));
    }

    #[tokio::test]
    async fn test_cannot_manage_other_teams() {
        let (session, _dir) = admin_session().await;
        let outsider = add_member(&session, "Cy", Some("T9")).await;
        let err = remove_member(&session, &outsider.id).await.unwrap_err();
        assert_eq!(err, "That person is not on your team.");

        let me = session.require_user().unwrap();
        assert_eq!(remove_member(&session, &me.id).await.unwrap_err(), "You cannot remove yourself.");
    }

    #[tokio::test]
    async fn test_members_cannot_manage_members() {
        let (session, _dir) = test_session();
        session.sign_up("Max", "max@crew.io", "secret1", Some("T1".into())).await.unwrap();
        let bo = add_member(&session, "Bo", Some("T1")).await;
        let err = update_member_access(&session, &bo.id, Feature::Chat, true).await.unwrap_err();
        assert_eq!(err, "Only team admins can manage members.");
    }
}
