//! Reconciliation of a declared member list against a running replica set
//!
//! Responsibilities:
//! - Map validated members into ordered configuration documents
//! - Initiate the set, or reconfigure it when it already exists
//! - Poll the set status until it reports healthy, with bounded retries

use std::time::Duration;

use bson::{doc, Bson, Document};
use tracing::{debug, info, warn};

use mongoprov_core::member::{
    MemberId, MemberSpec, DEFAULT_ARBITER_ONLY, DEFAULT_BUILD_INDEXES, DEFAULT_HIDDEN,
    DEFAULT_PRIORITY, DEFAULT_SLAVE_DELAY, DEFAULT_VOTES,
};

use crate::admin::ReplSetAdmin;
use crate::error::{ReplSetError, ReplSetResult};

/// Server code for `replSetInitiate` against an already-initialized set.
const ALREADY_INITIALIZED: i32 = 23;

/// Tunables for the status-wait loop.
#[derive(Debug, Clone)]
pub struct ReconcileSettings {
    /// Extra status polls after the first failed one
    pub status_retries: u32,
    /// Fixed pause between polls
    pub retry_interval: Duration,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            status_retries: 10,
            retry_interval: Duration::from_secs(5),
        }
    }
}

/// How the status wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The set reported a successful status
    Healthy,
    /// The retry budget ran out; not an error, callers decide what it means
    RetriesExhausted,
}

/// One optional member setting: its wire name, and the value to write when
/// the declared setting differs from the server default.
struct OptionalField {
    wire_name: &'static str,
    value_if_changed: fn(&MemberSpec) -> Option<Bson>,
}

/// Optional settings in wire order. `_id` and `host` are unconditional and
/// handled separately.
const OPTIONAL_FIELDS: &[OptionalField] = &[
    OptionalField {
        wire_name: "buildIndexes",
        value_if_changed: |m| {
            m.build_indexes
                .filter(|&v| v != DEFAULT_BUILD_INDEXES)
                .map(Bson::Boolean)
        },
    },
    OptionalField {
        wire_name: "priority",
        value_if_changed: |m| {
            m.priority
                .filter(|&v| v != DEFAULT_PRIORITY)
                .map(Bson::Double)
        },
    },
    OptionalField {
        wire_name: "arbiterOnly",
        value_if_changed: |m| {
            m.arbiter_only
                .filter(|&v| v != DEFAULT_ARBITER_ONLY)
                .map(Bson::Boolean)
        },
    },
    OptionalField {
        wire_name: "slaveDelay",
        value_if_changed: |m| {
            m.slave_delay
                .filter(|&v| v != DEFAULT_SLAVE_DELAY)
                .map(Bson::Int64)
        },
    },
    OptionalField {
        wire_name: "hidden",
        value_if_changed: |m| m.hidden.filter(|&v| v != DEFAULT_HIDDEN).map(Bson::Boolean),
    },
    OptionalField {
        wire_name: "votes",
        value_if_changed: |m| m.votes.filter(|&v| v != DEFAULT_VOTES).map(Bson::Int32),
    },
    OptionalField {
        wire_name: "tags",
        value_if_changed: |m| {
            m.tags.as_ref().filter(|tags| !tags.is_empty()).map(|tags| {
                Bson::Document(
                    tags.iter()
                        .map(|(k, v)| (k.clone(), Bson::String(v.clone())))
                        .collect(),
                )
            })
        },
    },
];

/// Build the wire configuration for one member.
///
/// `_id` and `host` always come first, in that order. Optional settings are
/// written only when declared AND different from the server default, so a
/// member left at defaults produces the two-field document the server
/// expects. Field order is preserved for the BSON encoding.
pub fn member_document(member: &MemberSpec) -> Document {
    let mut config = Document::new();
    config.insert("_id", member_id_bson(&member.id));
    config.insert("host", member.host.clone());

    for field in OPTIONAL_FIELDS {
        if let Some(value) = (field.value_if_changed)(member) {
            config.insert(field.wire_name, value);
        }
    }

    config
}

fn member_id_bson(id: &MemberId) -> Bson {
    match id {
        MemberId::Number(n) => i32::try_from(*n)
            .map(Bson::Int32)
            .unwrap_or(Bson::Int64(*n)),
        MemberId::Name(name) => Bson::String(name.clone()),
    }
}

/// Assemble the full replica set configuration document.
pub fn replica_set_document(name: &str, members: &[MemberSpec]) -> Document {
    let member_docs: Vec<Bson> = members
        .iter()
        .map(|m| Bson::Document(member_document(m)))
        .collect();

    doc! { "_id": name, "members": member_docs }
}

/// Applies a declared configuration and waits for the set to become healthy.
pub struct Reconciler<A> {
    admin: A,
    settings: ReconcileSettings,
}

impl<A: ReplSetAdmin> Reconciler<A> {
    pub fn new(admin: A) -> Self {
        Self {
            admin,
            settings: ReconcileSettings::default(),
        }
    }

    pub fn with_settings(admin: A, settings: ReconcileSettings) -> Self {
        Self { admin, settings }
    }

    /// Apply the declared members and wait for a successful status.
    pub async fn reconcile(
        &self,
        name: &str,
        members: &[MemberSpec],
    ) -> ReplSetResult<WaitOutcome> {
        let config = replica_set_document(name, members);
        self.apply_config(config).await?;
        self.wait_for_successful_status().await
    }

    /// Initiate the set, falling back to a reconfiguration when the server
    /// reports it is already initialized.
    async fn apply_config(&self, config: Document) -> ReplSetResult<()> {
        match self
            .admin
            .run_command(doc! { "replSetInitiate": config.clone() })
            .await
        {
            Ok(_) => {
                info!("Replica set initiated");
                Ok(())
            }
            Err(ReplSetError::Operation { code, .. }) if code == ALREADY_INITIALIZED => {
                debug!("Replica set already initialized, reconfiguring");
                self.reconfigure(config).await
            }
            Err(e) => Err(e),
        }
    }

    async fn reconfigure(&self, mut config: Document) -> ReplSetResult<()> {
        let current = self.admin.run_command(doc! { "replSetGetConfig": 1 }).await?;

        let version = current
            .get_document("config")
            .ok()
            .and_then(|c| c.get_i32("version").ok())
            .unwrap_or(1);

        config.insert("version", version + 1);
        self.admin
            .run_command(doc! { "replSetReconfig": config })
            .await?;

        info!("Replica set reconfigured to version {}", version + 1);
        Ok(())
    }

    /// Poll the set status until it reports success.
    ///
    /// Only operation-level failures are retried; anything else propagates
    /// untouched. An exhausted budget is reported as
    /// `WaitOutcome::RetriesExhausted`, not as an error.
    pub async fn wait_for_successful_status(&self) -> ReplSetResult<WaitOutcome> {
        let mut retries = self.settings.status_retries;

        loop {
            match self.admin.run_command(doc! { "replSetGetStatus": 1 }).await {
                Ok(_) => return Ok(WaitOutcome::Healthy),
                Err(ReplSetError::Operation { .. }) if retries > 0 => {
                    warn!("Waiting for successful replica set status, {} retries left", retries);
                    tokio::time::sleep(self.settings.retry_interval).await;
                    retries -= 1;
                }
                Err(ReplSetError::Operation { code_name, .. }) => {
                    debug!("Retry budget exhausted waiting for status ({})", code_name);
                    return Ok(WaitOutcome::RetriesExhausted);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
