//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own credential storage, password verification, and
//! session lifecycle so route handlers can stay focused on form handling
//! and auth plumbing.

pub mod password;
pub mod pg_session;
pub mod pg_store;
pub mod session;
pub mod store;
