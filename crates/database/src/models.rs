//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Sender {
    /// End user writing from their own phone.
    User,
    /// Automated assistant.
    Ai,
    /// Human operator.
    Admin,
}

impl Sender {
    /// Wire name of the sender type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
            Sender::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle bucket a conversation is filed under on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ConversationCategory {
    New,
    Active,
    Old,
    Test,
}

/// A user in the system, identified by their phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// UUID assigned on creation.
    pub id: String,
    /// Phone number in E.164 form (e.g., "+15550001"). Unique.
    pub phone: String,
    /// Display name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A conversation. Each user has at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    /// UUID assigned on creation.
    pub id: String,
    /// Owning user. Unique, so at most one conversation exists per user.
    pub user_id: String,
    /// Display title, derived from phone and name on creation.
    pub title: String,
    /// Whether a human operator has taken over from automated handling.
    pub human_override: bool,
    /// Dashboard category, if assigned.
    pub category: Option<ConversationCategory>,
    /// Whether alert notifications are enabled.
    pub alerts: bool,
    /// When the conversation started.
    pub start_date: String,
    /// When the last message arrived.
    pub latest_date: String,
}

/// A message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// UUID assigned on creation.
    pub id: String,
    /// Conversation this message belongs to.
    pub conversation_id: String,
    /// Message text. May be empty when an attachment is present.
    pub content: String,
    /// Who sent it.
    pub sender: Sender,
    /// When it was sent.
    pub sent_at: String,
}

/// Metadata for a file stored alongside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    /// UUID assigned on creation.
    pub id: String,
    /// Message this attachment belongs to.
    pub message_id: String,
    /// Path within content storage.
    pub file_path: String,
    /// MIME type of the stored file.
    pub mime_type: String,
    /// Media category ("image", "audio", "video" or "file").
    pub category: String,
    /// Original file name as uploaded.
    pub file_name: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// A message annotated with its attachments, oldest attachment first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageWithAttachments {
    #[serde(flatten)]
    pub message: Message,
    pub attachments: Vec<Attachment>,
}

/// A needs-human flag raised against a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Assistance {
    /// UUID assigned on creation.
    pub id: String,
    /// Conversation the flag was raised against.
    pub conversation_id: String,
    /// Whether the conversation still needs human attention.
    pub needs_human: bool,
    /// Why the flag was raised, if given.
    pub reason: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// When the flag was resolved, if it has been.
    pub resolved_at: Option<String>,
}
