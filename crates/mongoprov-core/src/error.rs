//! Error types for mongoprov

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error("at least one replica set member must be configured")]
    EmptyMemberList,

    #[error("some member configurations are not key/value tables:\n{}", render_members(.0))]
    MalformedMember(Vec<serde_json::Value>),

    #[error("some members are missing an 'id' or 'host' key:\n{}", render_members(.0))]
    MissingRequiredField(Vec<serde_json::Value>),

    #[error("some member 'host' settings are the wrong format:\n{}", render_members(.0))]
    InvalidHostFormat(Vec<serde_json::Value>),

    #[error("member '{member}' has an invalid field value: {source}")]
    InvalidFieldValue {
        member: String,
        source: serde_json::Error,
    },

    // Configuration errors
    #[error("replica set name must not be empty")]
    MissingReplicaSetName,

    #[error("failed to read config file '{path}': {source}")]
    ConfigRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: String,
        source: toml::de::Error,
    },
}

fn render_members(members: &[serde_json::Value]) -> String {
    members
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
