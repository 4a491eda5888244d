//! Replica set member descriptors
//!
//! A member arrives from configuration as a loose key/value table and is
//! decoded into a `MemberSpec` once validated. Optional settings left unset
//! are treated as sitting at their server-side default and are omitted from
//! the generated configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default for `build_indexes`
pub const DEFAULT_BUILD_INDEXES: bool = true;
/// Default for `priority`
pub const DEFAULT_PRIORITY: f64 = 1.0;
/// Default for `arbiter_only`
pub const DEFAULT_ARBITER_ONLY: bool = false;
/// Default for `slave_delay`
pub const DEFAULT_SLAVE_DELAY: i64 = 0;
/// Default for `hidden`
pub const DEFAULT_HIDDEN: bool = false;
/// Default for `votes`
pub const DEFAULT_VOTES: i32 = 1;

/// Member `_id` as written by the operator. Numeric in typical deployments,
/// but any unique scalar is passed through to the server untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberId {
    Number(i64),
    Name(String),
}

/// One replica set member as declared by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSpec {
    pub id: MemberId,
    pub host: String,
    pub build_indexes: Option<bool>,
    pub priority: Option<f64>,
    pub arbiter_only: Option<bool>,
    pub slave_delay: Option<i64>,
    pub hidden: Option<bool>,
    pub votes: Option<i32>,
    pub tags: Option<IndexMap<String, String>>,
}
