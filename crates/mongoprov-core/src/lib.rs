//! Mongoprov Core Library
//!
//! Member model, validation and configuration for declarative MongoDB
//! replica-set provisioning.

pub mod config;
pub mod error;
pub mod member;
pub mod validate;

pub use config::MongoprovConfig;
pub use error::{Error, Result};
pub use member::{MemberId, MemberSpec};
pub use validate::{seed_hosts, validate_members};

/// Mongoprov version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
