//! Per-node state of a structural equivalency walk.
//!
//! A [`ComparisonContext`] positions the caller at one subject/expectation
//! pair. It knows which members to descend into, how to pair them with the
//! expectation side, and whether the subject already appears further up the
//! current branch. It never decides whether two values are equal.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::ancestry::AncestorChain;
use crate::configuration::{Configuration, CyclicReferenceHandling};
use crate::errors::{EquivalencyError, Result};
use crate::path;
use crate::reason;
use crate::reporting::{Failure, Reporter};
use crate::selection::MemberSelectionContext;
use crate::value::{MemberInfo, Type, Value};

const PROPERTY: &str = "property ";
const ITEM: &str = "item";

#[derive(Clone)]
pub struct ComparisonContext {
    configuration: Arc<Configuration>,
    subject: Value,
    expectation: Value,
    subject_member: Option<MemberInfo>,
    matched_expectation_member: Option<MemberInfo>,
    declared_type: Option<Type>,
    path: String,
    description: String,
    reason: String,
    reason_args: Vec<Value>,
    ancestors: AncestorChain,
}

impl ComparisonContext {
    /// Root of a walk. The declared type defaults to the subject's runtime type.
    pub fn new(configuration: Arc<Configuration>, subject: Value, expectation: Value) -> Self {
        Self {
            configuration,
            declared_type: subject.runtime_type(),
            subject,
            expectation,
            subject_member: None,
            matched_expectation_member: None,
            path: String::new(),
            description: String::new(),
            reason: String::new(),
            reason_args: Vec::new(),
            ancestors: AncestorChain::new(),
        }
    }

    /// The "because …" phrase and its arguments, inherited by every descendant.
    pub fn with_reason(mut self, reason: impl Into<String>, args: Vec<Value>) -> Self {
        self.reason = reason.into();
        self.reason_args = args;
        self
    }

    /// Override the statically known type of the root subject.
    pub fn with_declared_type(mut self, declared_type: Type) -> Self {
        self.declared_type = Some(declared_type);
        self
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    pub fn expectation(&self) -> &Value {
        &self.expectation
    }

    pub fn subject_member(&self) -> Option<&MemberInfo> {
        self.subject_member.as_ref()
    }

    pub fn matched_expectation_member(&self) -> Option<&MemberInfo> {
        self.matched_expectation_member.as_ref()
    }

    pub fn declared_type(&self) -> Option<&Type> {
        self.declared_type.as_ref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn reason_args(&self) -> &[Value] {
        &self.reason_args
    }

    pub fn ancestors(&self) -> &AncestorChain {
        &self.ancestors
    }

    pub fn is_root(&self) -> bool {
        self.description.is_empty()
    }

    /// Number of descents from the root to this node.
    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }

    /// The reason as it appears in a failure message, or `""`.
    pub fn reason_clause(&self) -> String {
        reason::render_clause(&self.reason, &self.reason_args)
    }

    /// Run the selection rules in order, each one refining the previous
    /// one's output. The subject must be present.
    pub fn selected_members(&self) -> Result<Vec<MemberInfo>> {
        let runtime_type = self
            .subject
            .runtime_type()
            .ok_or_else(|| EquivalencyError::AbsentSubject { path: self.path.clone() })?;
        let selection = MemberSelectionContext {
            declared_type: self.declared_type.as_ref(),
            runtime_type: &runtime_type,
            path: &self.path,
            use_runtime_type: self.configuration.use_runtime_types(),
        };
        let members = self
            .configuration
            .selection_rules()
            .iter()
            .fold(Vec::new(), |current, rule| {
                let next = rule.select_members(current, &selection);
                trace!(rule = %rule, path = %self.path, selected = next.len(), "selection rule applied");
                next
            });
        Ok(members)
    }

    /// True when the subject is the very same object as one of its ancestors.
    pub fn contains_cyclic_reference(&self) -> bool {
        self.ancestors.contains_reference(&self.subject)
    }

    /// Report the cycle if the configuration says so. Either way the caller
    /// should not descend any further.
    pub fn handle_cyclic_reference(&self, reporter: &mut dyn Reporter) {
        match self.configuration.cyclic_reference_handling() {
            CyclicReferenceHandling::ThrowException => {
                debug!(path = %self.path, "cyclic reference detected");
                reporter.report(Failure {
                    path: self.path.clone(),
                    description: self.description.clone(),
                    message: format!(
                        "Expected {} to be {}{}, but it contains a cyclic reference.",
                        self.subject_label(),
                        self.expectation,
                        self.reason_clause()
                    ),
                });
            }
            CyclicReferenceHandling::Ignore => {
                trace!(path = %self.path, "cyclic reference ignored");
            }
        }
    }

    /// Context for the expectation's counterpart of `candidate`, or `None`
    /// when no matching rule pairs it with anything. Failing getters
    /// propagate.
    pub fn create_for_nested_member(&self, candidate: &MemberInfo) -> Result<Option<ComparisonContext>> {
        let matched = self
            .configuration
            .matching_rules()
            .iter()
            .find_map(|rule| rule.match_member(candidate, &self.expectation, &self.path));
        let Some(matched) = matched else {
            debug!(path = %self.path, member = candidate.name(), "no matching expectation member, skipping");
            return Ok(None);
        };

        let subject = candidate.read(&self.subject)?;
        let expectation = matched.read(&self.expectation)?;
        Ok(Some(self.child(
            PROPERTY,
            candidate.name(),
            ".",
            subject,
            expectation,
            Some(candidate.clone()),
            Some(matched),
        )))
    }

    /// Context for one positionally aligned pair of collection items.
    pub fn create_for_collection_item(&self, index: usize, subject: Value, expectation: Value) -> ComparisonContext {
        self.child(
            ITEM,
            &path::index_label(index),
            "",
            subject,
            expectation,
            self.subject_member.clone(),
            self.matched_expectation_member.clone(),
        )
    }

    fn child(
        &self,
        member_type: &str,
        member_label: &str,
        separator: &str,
        subject: Value,
        expectation: Value,
        subject_member: Option<MemberInfo>,
        matched_expectation_member: Option<MemberInfo>,
    ) -> ComparisonContext {
        let description = if self.is_root() {
            format!("{member_type}{member_label}")
        } else {
            format!("{}{separator}{member_label}", self.description)
        };
        trace!(description = %description, depth = self.depth() + 1, "descending");
        ComparisonContext {
            configuration: Arc::clone(&self.configuration),
            declared_type: subject.runtime_type(),
            subject,
            expectation,
            subject_member,
            matched_expectation_member,
            path: path::combine(&self.path, member_label),
            description,
            reason: self.reason.clone(),
            reason_args: self.reason_args.clone(),
            ancestors: self.ancestors.push(self.subject.clone()),
        }
    }

    /// How failure messages refer to this node.
    pub fn subject_label(&self) -> &str {
        if self.is_root() {
            "subject"
        } else {
            &self.description
        }
    }
}

impl std::fmt::Debug for ComparisonContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonContext")
            .field("path", &self.path)
            .field("description", &self.description)
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::AssertionScope;
    use crate::value::ObjectType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn root(subject: serde_json::Value, expectation: serde_json::Value) -> ComparisonContext {
        ComparisonContext::new(
            Arc::new(Configuration::default()),
            Value::from_json(&subject),
            Value::from_json(&expectation),
        )
    }

    fn member(ctx: &ComparisonContext, name: &str) -> MemberInfo {
        ctx.selected_members().unwrap().into_iter().find(|m| m.name() == name).unwrap()
    }

    fn descend(ctx: &ComparisonContext, name: &str) -> ComparisonContext {
        ctx.create_for_nested_member(&member(ctx, name)).unwrap().unwrap()
    }

    #[test]
    fn root_has_no_description_or_members() {
        let ctx = root(json!({"a": 1}), json!({"a": 1}));
        assert!(ctx.is_root());
        assert_eq!(ctx.description(), "");
        assert_eq!(ctx.path(), "");
        assert!(ctx.subject_member().is_none());
        assert!(ctx.matched_expectation_member().is_none());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn nested_properties_are_dot_joined() {
        let data = json!({"a": {"b": {"c": 1}}});
        let ctx = root(data.clone(), data);
        let c = descend(&descend(&descend(&ctx, "a"), "b"), "c");
        assert_eq!(c.description(), "property a.b.c");
        assert_eq!(c.path(), "a.b.c");
        assert!(!c.is_root());
        assert_eq!(c.subject_member().map(MemberInfo::name), Some("c"));
        assert_eq!(c.depth(), 3);
    }

    #[test]
    fn collection_items_inherit_the_member() {
        let data = json!({"Lines": ["x", "y", "z"]});
        let ctx = root(data.clone(), data);
        let lines = descend(&ctx, "Lines");
        let item = lines.create_for_collection_item(2, Value::from("z"), Value::from("z"));
        assert_eq!(item.description(), "property Lines[2]");
        assert_eq!(item.path(), "Lines[2]");
        assert_eq!(item.subject_member().map(MemberInfo::name), Some("Lines"));
        assert_eq!(item.matched_expectation_member().map(MemberInfo::name), Some("Lines"));
    }

    #[test]
    fn items_of_a_root_collection() {
        let ctx = root(json!([{"Name": "a"}]), json!([{"Name": "a"}]));
        let item = ctx.create_for_collection_item(0, Value::Null, Value::Null);
        assert_eq!(item.description(), "item[0]");
        assert_eq!(item.path(), "[0]");
        assert!(item.subject_member().is_none());
        assert!(item.declared_type().is_none());
    }

    #[test]
    fn declared_type_follows_the_child_value() {
        let ctx = root(json!({"a": 1, "b": null}), json!({"a": 1, "b": null}));
        assert_eq!(descend(&ctx, "a").declared_type(), Some(&Type::Int));
        assert!(descend(&ctx, "b").declared_type().is_none());
    }

    #[test]
    fn reason_is_inherited() {
        let data = json!({"a": {"b": 1}});
        let ctx = root(data.clone(), data).with_reason("{0} said so", vec![Value::from("Bob")]);
        let b = descend(&descend(&ctx, "a"), "b");
        assert_eq!(b.reason(), "{0} said so");
        assert_eq!(b.reason_clause(), ", because Bob said so");
    }

    #[test]
    fn unmatched_member_is_skipped() {
        let ctx = root(json!({"Extra": 1}), json!({"Other": 1}));
        let extra = member(&ctx, "Extra");
        assert!(ctx.create_for_nested_member(&extra).unwrap().is_none());
    }

    #[test]
    fn absent_subject_cannot_select_members() {
        let ctx = root(json!(null), json!({"a": 1}));
        assert!(matches!(ctx.selected_members(), Err(EquivalencyError::AbsentSubject { .. })));
    }

    #[test]
    fn failing_getter_propagates() {
        let ty = ObjectType::builder("Broken").computed("Boom", |_| Err("nope".into())).build();
        let ctx = ComparisonContext::new(
            Arc::new(Configuration::default()),
            Value::Object(ty.instantiate()),
            Value::Object(ty.instantiate()),
        );
        let boom = member(&ctx, "Boom");
        assert!(matches!(
            ctx.create_for_nested_member(&boom),
            Err(EquivalencyError::Reflection { .. })
        ));
    }

    #[test]
    fn ancestors_grow_along_the_branch() {
        let data = json!({"a": {"b": 1}});
        let ctx = root(data.clone(), data);
        let a = descend(&ctx, "a");
        let b = descend(&a, "b");
        let chain = b.ancestors().to_vec();
        assert_eq!(chain.len(), 2);
        assert!(chain[0].same_reference(ctx.subject()));
        assert!(chain[1].same_reference(a.subject()));
    }

    #[test]
    fn cycle_message_includes_reason() {
        let ty = ObjectType::builder("Node").property("Next").build();
        let a = ty.instantiate();
        a.set("Next", Value::Object(a.clone())).unwrap();
        let ctx = ComparisonContext::new(
            Arc::new(Configuration::default()),
            Value::Object(a.clone()),
            Value::Object(a.clone()),
        )
        .with_reason("loops are bad", vec![]);
        let next = descend(&ctx, "Next");
        assert!(next.contains_cyclic_reference());

        let mut scope = AssertionScope::new();
        next.handle_cyclic_reference(&mut scope);
        assert_eq!(
            scope.failures()[0].message,
            "Expected property Next to be Node {Next}, because loops are bad, but it contains a cyclic reference."
        );
    }
}
