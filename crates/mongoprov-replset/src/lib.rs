//! Replica set reconciliation
//!
//! Takes a validated member list, builds the ordered configuration document
//! the server expects, applies it through an admin-command seam and waits
//! for the set to report a healthy status.

mod admin;
mod error;
mod reconciler;

pub use admin::{MongoAdmin, ReplSetAdmin};
pub use error::{ReplSetError, ReplSetResult};
pub use reconciler::{
    member_document, replica_set_document, ReconcileSettings, Reconciler, WaitOutcome,
};
