//! Structural validation of the declared member list
//!
//! All checks run before any command is sent to the server. Checks run in
//! order and each one reports every offending element, not just the first.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::info;

use crate::error::{Error, Result};
use crate::member::MemberSpec;

/// `hostname-or-ip:port`, lowercase
static HOST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9\-.]+:\d+$").expect("host pattern"));

/// Validate the raw member list declared for `replica_set` and decode it.
///
/// The list must be non-empty, every element must be a key/value table,
/// every element must carry `id` and `host`, and every `host` must look like
/// `hostname:port`. The first failing check aborts with all of its offenders
/// listed in the error.
pub fn validate_members(replica_set: &str, members: &[Value]) -> Result<Vec<MemberSpec>> {
    info!(
        "Configuring replica set '{}' with {} member(s)",
        replica_set,
        members.len()
    );

    if members.is_empty() {
        return Err(Error::EmptyMemberList);
    }

    let non_tables: Vec<Value> = members.iter().filter(|m| !m.is_object()).cloned().collect();
    if !non_tables.is_empty() {
        return Err(Error::MalformedMember(non_tables));
    }

    let incomplete: Vec<Value> = members
        .iter()
        .filter(|m| m.get("id").is_none() || m.get("host").is_none())
        .cloned()
        .collect();
    if !incomplete.is_empty() {
        return Err(Error::MissingRequiredField(incomplete));
    }

    let bad_hosts: Vec<Value> = members
        .iter()
        .filter(|m| {
            !m.get("host")
                .and_then(Value::as_str)
                .is_some_and(|host| HOST_PATTERN.is_match(host))
        })
        .cloned()
        .collect();
    if !bad_hosts.is_empty() {
        return Err(Error::InvalidHostFormat(bad_hosts));
    }

    members.iter().map(decode_member).collect()
}

fn decode_member(raw: &Value) -> Result<MemberSpec> {
    serde_json::from_value(raw.clone()).map_err(|source| Error::InvalidFieldValue {
        member: raw
            .get("host")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string(),
        source,
    })
}

/// Hosts of every declared member, in declaration order.
pub fn seed_hosts(members: &[MemberSpec]) -> Vec<String> {
    members.iter().map(|m| m.host.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::MemberId;
    use serde_json::json;

    fn member(id: i64, host: &str) -> Value {
        json!({"id": id, "host": host})
    }

    #[test]
    fn accepts_well_formed_members() {
        let members = validate_members(
            "rs0",
            &[
                member(0, "mongo-0.local:27017"),
                member(1, "mongo-1.local:27017"),
            ],
        )
        .unwrap();

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].id, MemberId::Number(0));
        assert_eq!(members[1].host, "mongo-1.local:27017");
    }

    #[test]
    fn accepts_typical_host_forms() {
        let members = validate_members(
            "rs0",
            &[member(0, "10.0.0.3:27017"), member(1, "db-2.example.com:27018")],
        );
        assert!(members.is_ok());
    }

    #[test]
    fn rejects_empty_member_list() {
        let err = validate_members("rs0", &[]).unwrap_err();
        assert!(matches!(err, Error::EmptyMemberList));
    }

    #[test]
    fn rejects_non_table_members() {
        let err = validate_members(
            "rs0",
            &[member(0, "a.b.c:27017"), json!("just-a-string"), json!(42)],
        )
        .unwrap_err();

        assert!(err.to_string().contains("just-a-string"));
        match err {
            Error::MalformedMember(bad) => {
                assert_eq!(bad, vec![json!("just-a-string"), json!(42)]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_members_missing_required_keys() {
        let err = validate_members(
            "rs0",
            &[
                member(0, "a.b.c:27017"),
                json!({"host": "b.c.d:27017"}),
                json!({"id": 2}),
            ],
        )
        .unwrap_err();

        match err {
            Error::MissingRequiredField(bad) => assert_eq!(bad.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_bad_host_formats() {
        let err = validate_members(
            "rs0",
            &[
                member(0, "BADHOST"),
                member(1, "no-port.example.com"),
                member(2, "under_score:27017"),
                member(3, "a.b.c:port"),
            ],
        )
        .unwrap_err();

        match err {
            Error::InvalidHostFormat(bad) => assert_eq!(bad.len(), 4),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_string_host_as_bad_format() {
        let err = validate_members("rs0", &[json!({"id": 0, "host": 27017})]).unwrap_err();
        assert!(matches!(err, Error::InvalidHostFormat(_)));
    }

    #[test]
    fn malformed_elements_are_reported_before_missing_keys() {
        let err = validate_members("rs0", &[json!({"id": 1}), json!("bare")]).unwrap_err();
        assert!(matches!(err, Error::MalformedMember(_)));
    }

    #[test]
    fn rejects_wrong_field_types() {
        let err = validate_members(
            "rs0",
            &[json!({"id": 0, "host": "a.b.c:27017", "priority": "high"})],
        )
        .unwrap_err();

        match err {
            Error::InvalidFieldValue { member, .. } => assert_eq!(member, "a.b.c:27017"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn decodes_optional_fields() {
        let members = validate_members(
            "rs0",
            &[json!({
                "id": 0,
                "host": "a.b.c:27017",
                "priority": 0.5,
                "hidden": true,
                "tags": {"dc": "east"},
            })],
        )
        .unwrap();

        assert_eq!(members[0].priority, Some(0.5));
        assert_eq!(members[0].hidden, Some(true));
        assert_eq!(
            members[0].tags.as_ref().unwrap().get("dc"),
            Some(&"east".to_string())
        );
    }

    #[test]
    fn seed_hosts_follow_declaration_order() {
        let members = validate_members(
            "rs0",
            &[member(1, "b.example.com:27017"), member(0, "a.example.com:27017")],
        )
        .unwrap();

        assert_eq!(
            seed_hosts(&members),
            vec!["b.example.com:27017", "a.example.com:27017"]
        );
    }
}
