//! HTTP API for the Helpline messaging/support backend.
//!
//! Exposes message ingestion plus the thin list/get/update endpoints over
//! axum. All responses use the envelope
//! `{success, message, data?}` / `{success, message, error: {code, message}}`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
