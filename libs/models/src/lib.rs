//! Atrium domain models
//!
//! Plain data types shared by the search compiler and by whatever layer
//! produces search requests.
//!
//! # Module Organization
//!
//! - `grant`: authorization grants (`"ROLE,target"`) and the role ladder
//! - `user`: users, user groups and grant bookkeeping
//! - `status`: visibility status of collections and items
//! - `search`: the search expression tree and sort criteria
//!
//! # Example
//!
//! ```rust
//! use atrium_models::grant::{Grant, GrantType};
//!
//! let grant = Grant::parse("ADMIN,col123");
//! assert_eq!(grant.grant_type, Some(GrantType::Admin));
//! assert_eq!(grant.to_string(), "ADMIN,col123");
//! ```

pub mod error;
pub mod grant;
pub mod search;
pub mod status;
pub mod user;

pub use error::{Error, Result};
pub use grant::{Grant, GrantType};
pub use status::Status;
pub use user::{User, UserGroup};
