//! # mmbridge Core
//!
//! Core record types, errors, and traits shared by the mmbridge crates.
//!
//! - **Types**: Explicit records for users, teams, channels and posts
//! - **Errors**: A single error enum with auth/not-found classification
//! - **Constants**: Defaults and the auth-failure phrase list
//! - **Traits**: The [`ChatApi`] interface a remote driver implements
//!
//! ## Example
//!
//! ```rust
//! use mmbridge_core::{Team, BridgeError};
//!
//! let team: Team = serde_json::from_str(r#"{"id": "t1", "name": "engineering"}"#).unwrap();
//! assert_eq!(team.index_name(), Some("engineering"));
//!
//! let err = BridgeError::api("Session is invalid");
//! assert!(err.is_auth_error());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{BridgeError, Result};
pub use traits::*;
pub use types::*;
