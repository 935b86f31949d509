//! Chat Commands
//!
//! Channel management, messages and attachments. Message commands work
//! on the stored channel, never on the caller's copy.

use chrono::Utc;
use mime_guess::mime;

use crate::domain::{
    next_group_position, Attachment, AttachmentKind, Channel, DomainError, Feature, Message, User,
};
use crate::repository::{new_document_id, DocumentRepository, Repository, TeamRepository};
use crate::session::Session;
use super::clean_file_name;

async fn load_channel(repo: &DocumentRepository<Channel>, id: &str) -> Result<Channel, String> {
    repo.find_by_id(id)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| DomainError::NotFound(format!("channel {}", id)).to_string())
}

/// Create or update a channel. New group channels go to the end of the list;
/// updates keep the stored message history.
pub async fn save_channel(session: &Session, mut channel: Channel) -> Result<Channel, String> {
    let (_, repo) = session.editor::<Channel>(Feature::Chat)?;

    if channel.name.trim().is_empty() && !channel.is_direct() {
        return Err("Channel name cannot be empty.".to_string());
    }
    if channel.id.is_empty() {
        if !channel.is_direct() {
            let existing = repo.list().await.map_err(|e| e.to_string())?;
            channel.position = next_group_position(&existing);
        }
    } else if let Some(stored) = repo.find_by_id(&channel.id).await.map_err(|e| e.to_string())? {
        channel.messages = stored.messages;
        channel.last_message_at = stored.last_message_at;
    }
    repo.save(channel).await.map_err(|e| e.to_string())
}

pub async fn delete_channel(session: &Session, id: &str) -> Result<(), String> {
    let (_, repo) = session.editor::<Channel>(Feature::Chat)?;
    repo.delete(id).await.map_err(|e| e.to_string())
}

/// Direct channel between the current user and `emails`, reusing an
/// existing one with the same participants
pub async fn open_direct_channel(session: &Session, emails: Vec<String>) -> Result<Channel, String> {
    let (user, _) = session.require_team()?;
    let repo = session.team_repo::<Channel>()?;

    let mut participants: Vec<String> = emails
        .into_iter()
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    participants.push(user.email.to_ascii_lowercase());
    participants.sort();
    participants.dedup();
    if participants.len() < 2 {
        return Err("Pick at least one other person.".to_string());
    }

    let existing = repo.list().await.map_err(|e| e.to_string())?;
    if let Some(channel) = existing
        .into_iter()
        .find(|c| c.is_direct() && c.has_participants(&participants))
    {
        return Ok(channel);
    }

    repo.save(Channel::new_direct(participants)).await.map_err(|e| e.to_string())
}

/// Read-only channels only accept posts from users with chat edit rights
fn check_can_post(user: &User, channel: &Channel) -> Result<(), String> {
    if channel.read_only && !user.can_edit(Feature::Chat) {
        return Err("This channel is read-only.".to_string());
    }
    Ok(())
}

pub async fn send_message(session: &Session, channel_id: &str, text: String) -> Result<Channel, String> {
    let (user, _) = session.require_team()?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err("Message cannot be empty.".to_string());
    }

    let repo = session.team_repo::<Channel>()?;
    let mut channel = load_channel(&repo, channel_id).await?;
    check_can_post(&user, &channel)?;
    channel.append_message(Message::new(new_document_id(), user.email, text, Utc::now()));
    repo.save(channel).await.map_err(|e| e.to_string())
}

/// Upload a file and post it as a message with an optional caption
pub async fn upload_attachment(
    session: &Session,
    channel_id: &str,
    file_name: &str,
    bytes: Vec<u8>,
    caption: String,
) -> Result<Channel, String> {
    let (user, _) = session.require_team()?;
    if channel_id.is_empty() {
        return Err("Save the channel before attaching files.".to_string());
    }
    let repo = session.team_repo::<Channel>()?;
    let channel = load_channel(&repo, channel_id).await?;
    check_can_post(&user, &channel)?;

    let name = clean_file_name(file_name);
    let content_type = mime_guess::from_path(&name).first_or_octet_stream();
    let kind = if content_type.type_() == mime::IMAGE {
        AttachmentKind::Image
    } else {
        AttachmentKind::File
    };

    let path = format!("attachments/{}/{}-{}", channel_id, new_document_id(), name);
    let url = session
        .services()
        .blobs
        .upload(&path, bytes, content_type.as_ref())
        .await
        .map_err(|e| e.to_string())?;
    log::info!("Uploaded attachment {} to channel {}", name, channel_id);

    // Re-read so messages posted during the upload survive
    let mut channel = load_channel(&repo, channel_id).await?;
    let message = Message::new(new_document_id(), user.email, caption.trim().to_string(), Utc::now())
        .with_attachment(Attachment { url, name, kind });
    channel.append_message(message);
    repo.save(channel).await.map_err(|e| e.to_string())
}

/// Authors edit their own messages; admins may edit any
fn check_message_owner(user: &User, channel: &Channel, message_id: &str) -> Result<(), String> {
    let message = channel
        .messages
        .iter()
        .find(|m| m.id == message_id)
        .ok_or_else(|| format!("Message {} not found", message_id))?;
    if !message.author.eq_ignore_ascii_case(&user.email) && !user.can_manage_members() {
        return Err("You can only change your own messages.".to_string());
    }
    Ok(())
}

pub async fn edit_message(
    session: &Session,
    channel_id: &str,
    message_id: &str,
    text: String,
) -> Result<Channel, String> {
    let (user, _) = session.require_team()?;
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err("Message cannot be empty.".to_string());
    }

    let repo = session.team_repo::<Channel>()?;
    let mut channel = load_channel(&repo, channel_id).await?;
    check_message_owner(&user, &channel, message_id)?;
    channel
        .edit_message(message_id, text, Utc::now())
        .map_err(|e| e.to_string())?;
    repo.save(channel).await.map_err(|e| e.to_string())
}

pub async fn delete_message(session: &Session, channel_id: &str, message_id: &str) -> Result<Channel, String> {
    let (user, _) = session.require_team()?;
    let repo = session.team_repo::<Channel>()?;
    let mut channel = load_channel(&repo, channel_id).await?;
    check_message_owner(&user, &channel, message_id)?;
    channel.remove_message(message_id).map_err(|e| e.to_string())?;
    repo.save(channel).await.map_err(|e| e.to_string())
}

pub async fn set_channel_read_only(session: &Session, channel_id: &str, read_only: bool) -> Result<Channel, String> {
    let (_, repo) = session.editor::<Channel>(Feature::Chat)?;
    let mut channel = load_channel(&repo, channel_id).await?;
    channel.read_only = read_only;
    repo.save(channel).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{admin_session, member_session};

    #[tokio::test]
    async fn test_group_channels_get_unique_positions() {
        let (session, _dir) = admin_session().await;
        let a = save_channel(&session, Channel::new_group("General".into(), 0)).await.unwrap();
        let b = save_channel(&session, Channel::new_group("Audio".into(), 0)).await.unwrap();
        let c = save_channel(&session, Channel::new_group("Video".into(), 0)).await.unwrap();

        assert_eq!((a.position, b.position, c.position), (0, 1, 2));
        assert_eq!(a.team_code, "T1");

        // Renaming keeps the position
        let mut renamed = b.clone();
        renamed.name = "Sound".into();
        let renamed = save_channel(&session, renamed).await.unwrap();
        assert_eq!(renamed.position, 1);
    }

    #[tokio::test]
    async fn test_member_without_chat_rights_cannot_manage_channels() {
        let (session, _dir) = member_session().await;
        let err = save_channel(&session, Channel::new_group("General".into(), 0)).await.unwrap_err();
        assert!(err.contains("permission"));
    }

    #[tokio::test]
    async fn test_direct_channel_is_reused() {
        let (session, _dir) = admin_session().await;
        let first = open_direct_channel(&session, vec!["Bo@crew.io".into()]).await.unwrap();
        let second = open_direct_channel(&session, vec!["bo@crew.io".into(), "ada@crew.io".into()])
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.is_direct());

        let roster = vec![User::new("u2".into(), "Bo".into(), "bo@crew.io".into(), Some("T1".into()))];
        assert_eq!(first.display_title("ada@crew.io", &roster), "Bo");
        assert!(open_direct_channel(&session, vec!["ada@crew.io".into()]).await.is_err());
    }

    #[tokio::test]
    async fn test_message_lifecycle() {
        let (session, _dir) = admin_session().await;
        let channel = save_channel(&session, Channel::new_group("General".into(), 0)).await.unwrap();

        let channel = send_message(&session, &channel.id, " Soundcheck at 5 ".into()).await.unwrap();
        let message_id = channel.messages[0].id.clone();
        assert_eq!(channel.messages[0].text, "Soundcheck at 5");
        assert_eq!(channel.messages[0].author, "ada@crew.io");
        assert!(channel.last_message_at.is_some());

        let channel = edit_message(&session, &channel.id, &message_id, "Soundcheck at 6".into())
            .await
            .unwrap();
        assert!(channel.messages[0].edited_at.is_some());

        let channel = delete_message(&session, &channel.id, &message_id).await.unwrap();
        assert!(channel.messages.is_empty());
        assert!(channel.last_message_at.is_none());
    }

    #[tokio::test]
    async fn test_read_only_channel_blocks_members() {
        let (session, _dir) = member_session().await;
        let repo = session.team_repo::<Channel>().unwrap();
        let mut announcements = Channel::new_group("Announcements".into(), 0);
        announcements.read_only = true;
        let announcements = repo.save(announcements).await.unwrap();

        let err = send_message(&session, &announcements.id, "hi".into()).await.unwrap_err();
        assert_eq!(err, "This channel is read-only.");
    }

    #[tokio::test]
    async fn test_others_messages_are_protected() {
        let (session, _dir) = member_session().await;
        let repo = session.team_repo::<Channel>().unwrap();
        let mut channel = Channel::new_group("General".into(), 0);
        channel.append_message(Message::new("m1".into(), "boss@crew.io".into(), "hi".into(), Utc::now()));
        let channel = repo.save(channel).await.unwrap();

        let err = delete_message(&session, &channel.id, "m1").await.unwrap_err();
        assert_eq!(err, "You can only change your own messages.");
    }

    #[tokio::test]
    async fn test_image_attachment_upload() {
        let (session, dir) = admin_session().await;
        let channel = save_channel(&session, Channel::new_group("General".into(), 0)).await.unwrap();

        let channel = upload_attachment(&session, &channel.id, "stage.png", vec![1, 2, 3], "Plot".into())
            .await
            .unwrap();
        let attachment = channel.messages[0].attachment.clone().unwrap();
        assert_eq!(attachment.kind, AttachmentKind::Image);
        assert_eq!(attachment.name, "stage.png");
        assert!(attachment.url.starts_with("http://blobs.test/o/attachments%2F"));
        assert!(dir.path().join("attachments").join(&channel.id).is_dir());

        let channel = upload_attachment(&session, &channel.id, "rider.pdf", vec![4], String::new())
            .await
            .unwrap();
        assert_eq!(channel.messages[1].attachment.as_ref().unwrap().kind, AttachmentKind::File);
    }

    #[tokio::test]
    async fn test_member_cannot_bypass_read_only_with_edited_copy() {
        let (session, _dir) = member_session().await;
        let repo = session.team_repo::<Channel>().unwrap();
        let mut announcements = Channel::new_group("Announcements".into(), 0);
        announcements.read_only = true;
        let announcements = repo.save(announcements).await.unwrap();

        // Only the id reaches the command, the stored flags decide
        let mut forged = announcements.clone();
        forged.read_only = false;
        forged.name = "Renamed".into();
        assert!(send_message(&session, &forged.id, "hi".into()).await.is_err());

        let stored = repo.find_by_id(&announcements.id).await.unwrap().unwrap();
        assert!(stored.read_only);
        assert_eq!(stored.name, "Announcements");
        assert!(stored.messages.is_empty());
    }

    #[tokio::test]
    async fn test_sends_from_one_snapshot_keep_both_messages() {
        let (session, _dir) = admin_session().await;
        let snapshot = save_channel(&session, Channel::new_group("General".into(), 0)).await.unwrap();

        send_message(&session, &snapshot.id, "first".into()).await.unwrap();
        let channel = send_message(&session, &snapshot.id, "second".into()).await.unwrap();

        let texts: Vec<&str> = channel.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);

        // Renaming from the stale snapshot keeps the history
        let mut renamed = snapshot.clone();
        renamed.name = "Crew".into();
        let renamed = save_channel(&session, renamed).await.unwrap();
        assert_eq!(renamed.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_foreign_channel_is_not_found() {
        let (session, _dir) = admin_session().await;
        let other = DocumentRepository::<Channel>::for_team(session.store(), "T2");
        let foreign = other.save(Channel::new_group("Theirs".into(), 0)).await.unwrap();

        let err = send_message(&session, &foreign.id, "hi".into()).await.unwrap_err();
        assert!(err.starts_with("Not found"));
        assert!(delete_channel(&session, &foreign.id).await.is_err());
        assert!(other.find_by_id(&foreign.id).await.unwrap().is_some());
    }
}
