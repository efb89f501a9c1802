//! The ingestion orchestrator.

use database::{cascade, conversation, message, user};
use database::{Conversation, Database, Sender, User};
use media_store::{storage_path, MediaStore};
use tracing::{debug, info};

use crate::error::IngestError;
use crate::request::{IngestReceipt, IngestRequest, MediaPayload, SenderDescriptor};
use crate::saga::{Compensation, Compensations};

/// Result of resolving (or creating) a user and their conversation.
#[derive(Debug, Clone)]
pub struct Ensured {
    /// Resolved or created user.
    pub user: User,
    /// The user's single conversation.
    pub conversation: Conversation,
    /// Whether this call created the user.
    pub created_user: bool,
}

/// Orchestrates user resolution, conversation bootstrap, message insertion,
/// and attachment upload for one inbound message.
///
/// Steps within one call are strictly sequential; later steps depend on
/// identifiers produced by earlier ones. Failures are never retried, and
/// partial progress is compensated before an error surfaces.
pub struct Ingestor<M: MediaStore> {
    db: Database,
    media: M,
}

impl<M: MediaStore> Ingestor<M> {
    /// Create an ingestor over a database handle and a media store.
    pub fn new(db: Database, media: M) -> Self {
        Self { db, media }
    }

    /// Get the database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Ingest one inbound message end-to-end.
    pub async fn execute(&self, request: IngestRequest) -> Result<IngestReceipt, IngestError> {
        info!(
            sender = %request.sender_type,
            phone = %request.phone,
            has_media = request.media.is_some(),
            "ingesting message"
        );

        match request.sender_type {
            Sender::User => self.ingest_end_user(request).await,
            Sender::Ai | Sender::Admin => self.ingest_system(request).await,
        }
    }

    /// Resolve the user and their conversation for a phone number.
    ///
    /// When `create_user_if_missing` is false and no user exists, fails with
    /// `USER_NOT_FOUND` before any side effect. The conversation is created
    /// if absent either way; creation failure is surfaced without retry.
    pub async fn ensure_user_and_conversation(
        &self,
        phone: &str,
        name: Option<&str>,
        create_user_if_missing: bool,
    ) -> Result<Ensured, IngestError> {
        let pool = self.db.pool();
        let mut created_user = false;

        let user = match user::find_by_phone(pool, phone).await? {
            Some(user) => user,
            None if !create_user_if_missing => {
                return Err(IngestError::UserNotFound {
                    phone: phone.to_string(),
                });
            }
            None => {
                let name = name.filter(|n| !n.is_empty()).unwrap_or("No name");
                let user = user::insert_user(pool, phone, name)
                    .await
                    .map_err(|e| IngestError::UserCreationFailed(e.to_string()))?;
                created_user = true;
                user
            }
        };

        let conversation = match conversation::find_by_user_id(pool, &user.id).await? {
            Some(conversation) => conversation,
            None => {
                debug!(user_id = %user.id, "no conversation yet, creating one");
                let title = format!("{} - {}", user.phone, user.name);
                conversation::insert_conversation(pool, &user.id, &title)
                    .await
                    .map_err(|e| IngestError::ConversationCreationFailed(e.to_string()))?
            }
        };

        Ok(Ensured {
            user,
            conversation,
            created_user,
        })
    }

    /// End-user path: the atomic cascade resolves user, conversation, and
    /// message in one transaction.
    async fn ingest_end_user(&self, request: IngestRequest) -> Result<IngestReceipt, IngestError> {
        let pool = self.db.pool();

        let cascade = cascade::insert_message_cascade(
            pool,
            &request.phone,
            request.name.as_deref().unwrap_or(""),
            &request.content,
        )
        .await
        .map_err(|e| IngestError::Rpc(e.to_string()))?;

        let mut compensations = Compensations::new();
        compensations.push(Compensation::DeleteMessage {
            message_id: cascade.message_id.clone(),
        });

        if let Some(media) = &request.media {
            if let Err(e) = self.attach_media(&cascade.message_id, media).await {
                compensations.unwind(pool).await;
                return Err(IngestError::UploadFailed {
                    sender: Sender::User,
                    detail: e,
                });
            }
        }

        let name = match user::find_by_id(pool, &cascade.user_id).await? {
            Some(user) => user.name,
            None => request.name.unwrap_or_else(|| "No name".to_string()),
        };

        Ok(IngestReceipt {
            message_id: cascade.message_id,
            conversation_id: cascade.conversation_id,
            content: request.content,
            timestamp: cascade.sent_at,
            sender: SenderDescriptor::EndUser {
                id: cascade.user_id,
                phone: request.phone,
                name,
            },
            created_user: cascade.created_user,
        })
    }

    /// AI/admin path: the user must already exist; the conversation is
    /// created if missing.
    async fn ingest_system(&self, request: IngestRequest) -> Result<IngestReceipt, IngestError> {
        let pool = self.db.pool();
        let sender = request.sender_type;

        let ensured = self
            .ensure_user_and_conversation(&request.phone, None, false)
            .await?;

        let stored = message::insert_message(
            pool,
            &ensured.conversation.id,
            &request.content,
            sender,
        )
        .await
        .map_err(|e| IngestError::MessageCreationFailed(e.to_string()))?;

        let mut compensations = Compensations::new();
        compensations.push(Compensation::DeleteMessage {
            message_id: stored.id.clone(),
        });

        if let Some(media) = &request.media {
            if let Err(e) = self.attach_media(&stored.id, media).await {
                compensations.unwind(pool).await;
                return Err(IngestError::UploadFailed { sender, detail: e });
            }
        }

        Ok(IngestReceipt {
            message_id: stored.id,
            conversation_id: ensured.conversation.id,
            content: request.content,
            timestamp: stored.sent_at,
            sender: SenderDescriptor::system(sender),
            created_user: false,
        })
    }

    /// Upload media for an already-inserted message and record its metadata.
    ///
    /// Runs strictly after the message insert so a failure can be
    /// compensated by deleting the message; an attachment row is never
    /// written before its file is stored.
    async fn attach_media(&self, message_id: &str, media: &MediaPayload) -> Result<(), String> {
        let destination = storage_path(media.category, &media.file_name);

        let stored_path = self
            .media
            .upload(&media.bytes, &destination, &media.mime_type)
            .await
            .map_err(|e| e.to_string())?;

        database::attachment::insert_attachment(
            self.db.pool(),
            database::attachment::NewAttachment {
                message_id,
                file_path: &stored_path,
                mime_type: &media.mime_type,
                category: media.category.as_str(),
                file_name: &media.file_name,
            },
        )
        .await
        .map_err(|e| e.to_string())?;

        debug!(message_id, path = %stored_path, "attachment recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use media_store::{FsMediaStore, MediaCategory, MediaStoreError};

    /// Media store that always fails, for rollback tests.
    struct FailingStore;

    #[async_trait]
    impl MediaStore for FailingStore {
        async fn upload(&self, _: &[u8], _: &str, _: &str) -> media_store::Result<String> {
            Err(MediaStoreError::InvalidPath("simulated failure".to_string()))
        }
    }

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn end_user_request(phone: &str, name: &str, content: &str) -> IngestRequest {
        IngestRequest {
            sender_type: Sender::User,
            phone: phone.to_string(),
            name: Some(name.to_string()),
            content: content.to_string(),
            media: None,
        }
    }

    fn png_media() -> MediaPayload {
        MediaPayload {
            bytes: b"png bytes".to_vec(),
            file_name: "café résumé.png".to_string(),
            mime_type: "image/png".to_string(),
            category: MediaCategory::Image,
        }
    }

    #[tokio::test]
    async fn test_end_user_first_contact_creates_everything() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(db.clone(), FsMediaStore::new(dir.path()));

        let receipt = ingestor
            .execute(end_user_request("+15550001", "Ana", "Hello"))
            .await
            .unwrap();

        assert!(receipt.created_user);
        assert_eq!(receipt.content, "Hello");
        match &receipt.sender {
            SenderDescriptor::EndUser { phone, name, .. } => {
                assert_eq!(phone, "+15550001");
                assert_eq!(name, "Ana");
            }
            other => panic!("expected end-user sender, got {:?}", other),
        }

        let user = user::find_by_phone(db.pool(), "+15550001")
            .await
            .unwrap()
            .unwrap();
        let conv = conversation::find_by_user_id(db.pool(), &user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conv.title, "+15550001 - Ana");

        let messages = message::find_by_conversation_id(db.pool(), &conv.id)
            .await
            .unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message.sender, Sender::User);
    }

    #[tokio::test]
    async fn test_repeated_contact_keeps_one_conversation() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(db.clone(), FsMediaStore::new(dir.path()));

        for content in ["one", "two", "three"] {
            ingestor
                .execute(end_user_request("+15550001", "Ana", content))
                .await
                .unwrap();
        }

        let conversations = conversation::list_conversations(db.pool()).await.unwrap();
        assert_eq!(conversations.len(), 1);

        let messages = message::find_by_conversation_id(db.pool(), &conversations[0].id)
            .await
            .unwrap();
        assert_eq!(messages.len(), 3);
    }

    #[tokio::test]
    async fn test_ai_sender_never_creates_user() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(db.clone(), FsMediaStore::new(dir.path()));

        let result = ingestor
            .execute(IngestRequest {
                sender_type: Sender::Ai,
                phone: "+19990000".to_string(),
                name: None,
                content: "hi".to_string(),
                media: None,
            })
            .await;

        assert!(matches!(result, Err(IngestError::UserNotFound { .. })));

        // No side effects at all.
        assert!(user::list_users(db.pool()).await.unwrap().is_empty());
        assert!(conversation::list_conversations(db.pool())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_ai_sender_uses_existing_user_and_system_identity() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(db.clone(), FsMediaStore::new(dir.path()));

        ingestor
            .execute(end_user_request("+15550001", "Ana", "Hello"))
            .await
            .unwrap();

        let receipt = ingestor
            .execute(IngestRequest {
                sender_type: Sender::Ai,
                phone: "+15550001".to_string(),
                name: None,
                content: "How can I help?".to_string(),
                media: None,
            })
            .await
            .unwrap();

        assert!(!receipt.created_user);
        assert_eq!(
            receipt.sender,
            SenderDescriptor::System {
                id: "ai-system".to_string(),
                name: "AI".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_admin_creates_conversation_for_existing_user_without_one() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(db.clone(), FsMediaStore::new(dir.path()));

        // User exists but has never had a conversation bootstrapped.
        user::insert_user(db.pool(), "+15550001", "Ana").await.unwrap();

        let receipt = ingestor
            .execute(IngestRequest {
                sender_type: Sender::Admin,
                phone: "+15550001".to_string(),
                name: None,
                content: "Following up on your ticket".to_string(),
                media: None,
            })
            .await
            .unwrap();

        assert_eq!(
            receipt.sender,
            SenderDescriptor::System {
                id: "admin-system".to_string(),
                name: "Admin".to_string(),
            }
        );

        let conversations = conversation::list_conversations(db.pool()).await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].title, "+15550001 - Ana");
    }

    #[tokio::test]
    async fn test_failed_upload_rolls_back_message() {
        let db = test_db().await;
        let ingestor = Ingestor::new(db.clone(), FailingStore);

        let mut request = end_user_request("+15550001", "Ana", "hi");
        request.media = Some(png_media());

        let result = ingestor.execute(request).await;
        assert!(matches!(
            result,
            Err(IngestError::UploadFailed {
                sender: Sender::User,
                ..
            })
        ));

        // User and conversation survive, but the message is gone.
        let user = user::find_by_phone(db.pool(), "+15550001")
            .await
            .unwrap()
            .unwrap();
        let conv = conversation::find_by_user_id(db.pool(), &user.id)
            .await
            .unwrap()
            .unwrap();
        let messages = message::find_by_conversation_id(db.pool(), &conv.id)
            .await
            .unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_successful_upload_stores_file_and_metadata() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(db.clone(), FsMediaStore::new(dir.path()));

        let mut request = end_user_request("+15550001", "Ana", "");
        request.media = Some(png_media());

        let receipt = ingestor.execute(request).await.unwrap();

        let attachments = database::attachment::find_by_message_id(db.pool(), &receipt.message_id)
            .await
            .unwrap();
        assert_eq!(attachments.len(), 1);

        let path = &attachments[0].file_path;
        assert!(path.starts_with("images/"));
        assert!(path.ends_with("_cafe_resume.png"));
        assert!(dir.path().join(path).exists());
    }

    #[tokio::test]
    async fn test_ensure_reuses_existing_user_and_conversation() {
        let db = test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let ingestor = Ingestor::new(db.clone(), FsMediaStore::new(dir.path()));

        let first = ingestor
            .ensure_user_and_conversation("+15550001", Some("Ana"), true)
            .await
            .unwrap();
        assert!(first.created_user);

        let second = ingestor
            .ensure_user_and_conversation("+15550001", Some("Ana"), true)
            .await
            .unwrap();
        assert!(!second.created_user);
        assert_eq!(first.user.id, second.user.id);
        assert_eq!(first.conversation.id, second.conversation.id);
    }
}
