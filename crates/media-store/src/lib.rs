//! Content storage for message attachments.
//!
//! Attachment bytes live here; the database only holds metadata pointing at
//! the returned storage paths. The [`MediaStore`] trait abstracts the
//! backend so ingestion can be tested against failing stores.

pub mod error;
pub mod path;
pub mod store;

pub use error::{MediaStoreError, Result};
pub use path::{sanitize_file_name, storage_path, MediaCategory};
pub use store::{FsMediaStore, MediaStore};
