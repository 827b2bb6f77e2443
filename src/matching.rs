use std::fmt;

use crate::value::{MemberInfo, Value};

/// Finds the expectation-side counterpart of a subject member.
///
/// Rules are tried in order and the first `Some` wins. When no rule matches,
/// the member takes no part in the comparison.
pub trait MatchingRule: fmt::Display + Send + Sync {
    fn match_member(&self, subject_member: &MemberInfo, expectation: &Value, path: &str) -> Option<MemberInfo>;
}

fn find_member(expectation: &Value, name: &str) -> Option<MemberInfo> {
    expectation
        .runtime_type()
        .and_then(|ty| ty.members().iter().find(|m| m.name() == name).cloned())
}

/// Pairs members that share a name.
pub struct MatchByName;

impl MatchingRule for MatchByName {
    fn match_member(&self, subject_member: &MemberInfo, expectation: &Value, _path: &str) -> Option<MemberInfo> {
        find_member(expectation, subject_member.name())
    }
}

impl fmt::Display for MatchByName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Match member by name")
    }
}

/// Pairs a subject member with a differently named expectation member.
pub struct MatchByMapping {
    subject: String,
    expectation: String,
}

impl MatchByMapping {
    pub fn new(subject: impl Into<String>, expectation: impl Into<String>) -> Self {
        Self { subject: subject.into(), expectation: expectation.into() }
    }
}

impl MatchingRule for MatchByMapping {
    fn match_member(&self, subject_member: &MemberInfo, expectation: &Value, _path: &str) -> Option<MemberInfo> {
        if subject_member.name() != self.subject {
            return None;
        }
        find_member(expectation, &self.expectation)
    }
}

impl fmt::Display for MatchByMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Match {} to {}", self.subject, self.expectation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member_of(v: &Value, name: &str) -> MemberInfo {
        v.runtime_type().and_then(|t| t.members().iter().find(|m| m.name() == name).cloned()).unwrap()
    }

    #[test]
    fn by_name() {
        let subject = Value::from_json(&json!({"Name": "a"}));
        let expectation = Value::from_json(&json!({"Name": "b", "Other": 1}));
        let m = MatchByName.match_member(&member_of(&subject, "Name"), &expectation, "");
        assert_eq!(m.map(|m| m.name().to_string()), Some("Name".into()));
    }

    #[test]
    fn by_name_misses_on_absent_expectation() {
        let subject = Value::from_json(&json!({"Name": "a"}));
        assert!(MatchByName.match_member(&member_of(&subject, "Name"), &Value::Null, "").is_none());
        let other = Value::from_json(&json!({"Title": "a"}));
        assert!(MatchByName.match_member(&member_of(&subject, "Name"), &other, "").is_none());
    }

    #[test]
    fn mapping_only_applies_to_its_subject_member() {
        let subject = Value::from_json(&json!({"Name": "a", "Age": 1}));
        let expectation = Value::from_json(&json!({"FullName": "a", "Age": 1}));
        let rule = MatchByMapping::new("Name", "FullName");
        let m = rule.match_member(&member_of(&subject, "Name"), &expectation, "");
        assert_eq!(m.map(|m| m.name().to_string()), Some("FullName".into()));
        assert!(rule.match_member(&member_of(&subject, "Age"), &expectation, "").is_none());
    }
}
