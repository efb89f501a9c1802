//! Ingestion request and receipt types.

use database::Sender;
use media_store::MediaCategory;
use serde::Serialize;

/// An inbound message to ingest.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// Who authored the message. Drives the user-creation policy.
    pub sender_type: Sender,
    /// Phone number the message is keyed by.
    pub phone: String,
    /// Display name, used only when a user is created.
    pub name: Option<String>,
    /// Message text. May be empty when media is present.
    pub content: String,
    /// Optional media attachment.
    pub media: Option<MediaPayload>,
}

/// A file attached to an inbound message.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    /// Raw file content.
    pub bytes: Vec<u8>,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Category determining the storage folder.
    pub category: MediaCategory,
}

/// Who a stored message is attributed to in the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SenderDescriptor {
    /// End user, identified by their directory entry.
    EndUser {
        id: String,
        phone: String,
        name: String,
    },
    /// Synthetic system identity for AI and admin senders.
    System { id: String, name: String },
}

impl SenderDescriptor {
    /// Fixed identity for a system sender.
    pub fn system(sender: Sender) -> Self {
        let (id, name) = match sender {
            Sender::Ai => ("ai-system", "AI"),
            Sender::Admin => ("admin-system", "Admin"),
            // End users are described by their directory entry, never a
            // synthetic identity.
            Sender::User => unreachable!("end users have a directory identity"),
        };
        SenderDescriptor::System {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Successful ingestion result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReceipt {
    /// Inserted message.
    pub message_id: String,
    /// Conversation the message landed in.
    pub conversation_id: String,
    /// Message text as stored.
    pub content: String,
    /// When the message was recorded.
    pub timestamp: String,
    /// Who the message is attributed to.
    pub sender: SenderDescriptor,
    /// Whether this call created the user.
    pub created_user: bool,
}
