//! # mmbridge Session
//!
//! Cached, self-healing access to a Mattermost server.
//!
//! [`ChatSession`] sits between tool handlers and a [`ChatApi`] driver:
//!
//! - Reads are served from a TTL cache when fresh and written through on fetch.
//! - Team and channel names resolve through cached name indices.
//! - Batch enrichment fetches each missing user or channel once, substituting
//!   placeholders for ids that fail.
//! - An expired password session is re-established once and the failed call
//!   retried once.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mmbridge_core::ChatApi;
//! use mmbridge_session::{ChatSession, SessionConfig};
//!
//! async fn recent(driver: Arc<dyn ChatApi>) -> mmbridge_core::Result<()> {
//!     let session = ChatSession::new(SessionConfig::from_env()?, driver);
//!     session.connect().await?;
//!
//!     for post in session
//!         .get_posts_by_channel_name("engineering", "town-square", 0, 20)
//!         .await?
//!     {
//!         println!("[{}] {}: {}", post.create_at_formatted, post.username, post.message);
//!     }
//!
//!     session.disconnect().await;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod enrich;
#[cfg(test)]
mod mock;
mod resolve;
mod retry;
mod session;

pub use config::{AuthMode, SessionConfig};
pub use enrich::{BatchResolver, Enrichable};
pub use mmbridge_core::{BridgeError, ChatApi, Result};
pub use resolve::NameResolver;
pub use retry::ReauthPolicy;
pub use session::ChatSession;
