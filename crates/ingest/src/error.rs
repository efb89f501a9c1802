//! Error taxonomy for message ingestion.

use database::{DatabaseError, Sender};
use thiserror::Error;

/// Errors surfaced by the ingestion workflow.
///
/// Each variant maps to a stable wire code via [`IngestError::code`].
/// Underlying storage error text is preserved for diagnostics and never
/// retried automatically.
#[derive(Debug, Error)]
pub enum IngestError {
    /// No user exists for the phone and the sender policy forbids creating
    /// one.
    #[error("cannot proceed without an existing user: {phone}")]
    UserNotFound { phone: String },

    /// User creation failed.
    #[error("could not create user: {0}")]
    UserCreationFailed(String),

    /// Conversation creation failed.
    #[error("could not create conversation: {0}")]
    ConversationCreationFailed(String),

    /// Message insert failed.
    #[error("could not create message: {0}")]
    MessageCreationFailed(String),

    /// Attachment upload or metadata insert failed; the message was rolled
    /// back.
    #[error("upload failed, {sender} message rolled back: {detail}")]
    UploadFailed { sender: Sender, detail: String },

    /// The atomic message cascade failed as a whole.
    #[error("message cascade failed: {0}")]
    Rpc(String),

    /// Lookup or other storage failure outside the creation steps.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl IngestError {
    /// Stable error code for the wire envelope.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::UserNotFound { .. } => "USER_NOT_FOUND",
            IngestError::UserCreationFailed(_) => "USER_CREATION_FAILED",
            IngestError::ConversationCreationFailed(_) => "CONVERSATION_CREATION_FAILED",
            IngestError::MessageCreationFailed(_) => "MESSAGE_CREATION_FAILED",
            IngestError::UploadFailed { .. } => "UPLOAD_FAILED",
            IngestError::Rpc(_) => "RPC_ERROR",
            IngestError::Database(_) => "SERVER_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let err = IngestError::UserNotFound {
            phone: "+1".to_string(),
        };
        assert_eq!(err.code(), "USER_NOT_FOUND");

        let err = IngestError::UploadFailed {
            sender: Sender::Ai,
            detail: "disk full".to_string(),
        };
        assert_eq!(err.code(), "UPLOAD_FAILED");
        assert_eq!(
            err.to_string(),
            "upload failed, ai message rolled back: disk full"
        );
    }
}
