//! Conversation-bootstrap and message-ingestion orchestrator.
//!
//! Given an inbound message tied to a phone number, the [`Ingestor`]
//! idempotently resolves or creates the user, resolves or creates exactly
//! one conversation for that user, and inserts the message. When media is
//! attached it is uploaded as well, rolling the message back if the upload
//! fails.
//!
//! Sender policy:
//! - End-user messages run through the atomic message cascade, which may
//!   create the user and conversation.
//! - AI and admin messages never create a user; they fail with
//!   `USER_NOT_FOUND` when no human has initiated contact yet. The
//!   conversation is still created if missing, since the system may be first
//!   to write into an existing user's empty history.

pub mod error;
pub mod ingestor;
pub mod request;
mod saga;

pub use error::IngestError;
pub use ingestor::{Ensured, Ingestor};
pub use request::{IngestReceipt, IngestRequest, MediaPayload, SenderDescriptor};

pub use database::Sender;
pub use media_store::MediaCategory;
