//! calPal core library — configuration, session persistence, backend REST
//! client, OAuth callback listener, conversation state, and formatters
//! used by the desktop application.

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod format;
pub mod session;
