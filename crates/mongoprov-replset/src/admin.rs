//! Admin-command seam between the reconciler and the MongoDB driver
//!
//! The connection is owned by the caller and passed in; the reconciler only
//! runs commands through this trait and never opens or closes anything
//! itself.

use async_trait::async_trait;
use bson::Document;
use mongodb::error::ErrorKind;
use mongodb::Client;

use crate::error::{ReplSetError, ReplSetResult};

/// Runs administrative commands against a replica set.
#[async_trait]
pub trait ReplSetAdmin: Send + Sync {
    async fn run_command(&self, command: Document) -> ReplSetResult<Document>;
}

/// `ReplSetAdmin` backed by the official driver. Commands are issued against
/// the `admin` database.
#[derive(Debug, Clone)]
pub struct MongoAdmin {
    client: Client,
}

impl MongoAdmin {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReplSetAdmin for MongoAdmin {
    async fn run_command(&self, command: Document) -> ReplSetResult<Document> {
        self.client
            .database("admin")
            .run_command(command)
            .await
            .map_err(|e| match *e.kind {
                ErrorKind::Command(ref failure) => ReplSetError::Operation {
                    code: failure.code,
                    code_name: failure.code_name.clone(),
                    message: failure.message.clone(),
                },
                _ => ReplSetError::Transport(e.to_string()),
            })
    }
}
