//! Channel Entity
//!
//! Chat channels with their embedded message list. Group channels are
//! ordered by `position` in the sidebar; direct channels are identified
//! by their participant set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::entity::{DomainError, DomainResult, Entity};
use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    #[default]
    Group,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    #[default]
    File,
}

/// Uploaded file referenced by a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub kind: AttachmentKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    /// Author email
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub edited_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachment: Option<Attachment>,
}

impl Message {
    pub fn new(id: String, author: String, text: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            author,
            text,
            timestamp,
            edited_at: None,
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: ChannelKind,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub position: i32,
    /// Participant emails (direct channels only)
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub team_code: String,
}

impl Channel {
    pub fn new_group(name: String, position: i32) -> Self {
        Self {
            id: String::new(),
            name,
            kind: ChannelKind::Group,
            messages: Vec::new(),
            position,
            participants: Vec::new(),
            last_message_at: None,
            read_only: false,
            team_code: String::new(),
        }
    }

    pub fn new_direct(participants: Vec<String>) -> Self {
        Self {
            kind: ChannelKind::Direct,
            participants,
            ..Self::new_group(String::new(), 0)
        }
    }

    pub fn is_direct(&self) -> bool {
        self.kind == ChannelKind::Direct
    }

    /// Title shown in the sidebar. Direct channels list the other
    /// participants by display name, falling back to their email.
    pub fn display_title(&self, current_email: &str, roster: &[User]) -> String {
        if !self.is_direct() {
            return self.name.clone();
        }

        let others: Vec<String> = self
            .participants
            .iter()
            .filter(|p| !p.eq_ignore_ascii_case(current_email))
            .map(|p| {
                roster
                    .iter()
                    .find(|u| u.email.eq_ignore_ascii_case(p))
                    .map(|u| u.display_name.clone())
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| p.clone())
            })
            .collect();

        if others.is_empty() {
            if self.name.is_empty() {
                "Direct Message".to_string()
            } else {
                self.name.clone()
            }
        } else {
            others.join(", ")
        }
    }

    /// Order- and case-insensitive participant set comparison
    pub fn has_participants(&self, emails: &[String]) -> bool {
        let mut mine: Vec<String> = self.participants.iter().map(|p| p.to_ascii_lowercase()).collect();
        let mut theirs: Vec<String> = emails.iter().map(|p| p.to_ascii_lowercase()).collect();
        mine.sort();
        mine.dedup();
        theirs.sort();
        theirs.dedup();
        mine == theirs
    }

    pub fn append_message(&mut self, message: Message) {
        self.last_message_at = Some(message.timestamp);
        self.messages.push(message);
    }

    pub fn edit_message(&mut self, message_id: &str, text: String, at: DateTime<Utc>) -> DomainResult<()> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| DomainError::NotFound(format!("Message {}", message_id)))?;
        message.text = text;
        message.edited_at = Some(at);
        Ok(())
    }

    pub fn remove_message(&mut self, message_id: &str) -> DomainResult<Message> {
        let index = self
            .messages
            .iter()
            .position(|m| m.id == message_id)
            .ok_or_else(|| DomainError::NotFound(format!("Message {}", message_id)))?;
        let removed = self.messages.remove(index);
        self.last_message_at = self.messages.last().map(|m| m.timestamp);
        Ok(removed)
    }
}

/// Next free sidebar position among group channels
pub fn next_group_position(channels: &[Channel]) -> i32 {
    channels
        .iter()
        .filter(|c| !c.is_direct())
        .map(|c| c.position)
        .max()
        .map_or(0, |max| max + 1)
}

impl Entity for Channel {
    const COLLECTION: &'static str = "channels";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn team_code(&self) -> Option<&str> {
        Some(&self.team_code)
    }

    fn set_team_code(&mut self, code: String) {
        self.team_code = code;
    }
}
