//! HTTP server for SealChain.
//!
//! Exposes payment recording, block lookup, the audit view and chain
//! verification over JSON. Ledger calls run on the blocking pool since an
//! append mines a nonce and rewrites the chain file.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::SealServer;
