use std::sync::Arc;

use tracing::debug;

use crate::comparison::{LeafComparer, StrictEquality};
use crate::configuration::Configuration;
use crate::context::ComparisonContext;
use crate::errors::Result;
use crate::reporting::{AssertionScope, Failure, Reporter};
use crate::value::Value;

/// Walks a subject graph against an expectation graph, one
/// [`ComparisonContext`] per node, handing leaves to a [`LeafComparer`].
pub struct EquivalencyValidator<C: LeafComparer = StrictEquality> {
    comparer: C,
}

impl Default for EquivalencyValidator<StrictEquality> {
    fn default() -> Self {
        Self::new(StrictEquality)
    }
}

impl<C: LeafComparer> EquivalencyValidator<C> {
    pub fn new(comparer: C) -> Self {
        Self { comparer }
    }

    pub fn comparer(&self) -> &C {
        &self.comparer
    }

    /// Compare the subtree rooted at `ctx`, reporting every mismatch.
    ///
    /// Only a failing member getter makes this return `Err`; mismatches go to
    /// `reporter`.
    pub fn assert_equality(&self, ctx: &ComparisonContext, reporter: &mut dyn Reporter) -> Result<()> {
        if ctx.contains_cyclic_reference() {
            ctx.handle_cyclic_reference(reporter);
            return Ok(());
        }

        if let Some(max) = ctx.configuration().max_recursion_depth() {
            if ctx.depth() > max {
                report(ctx, reporter, format!("The maximum recursion depth was reached at {}.", ctx.subject_label()));
                return Ok(());
            }
        }

        match (ctx.subject(), ctx.expectation()) {
            (Value::Object(_), Value::Object(_)) => self.assert_members(ctx, reporter),
            (Value::List(subject), Value::List(expectation)) => {
                self.assert_items(ctx, subject, expectation, reporter)
            }
            (Value::Object(_), other) | (Value::List(_), other) if !other.is_null() => {
                let message = format!(
                    "Expected {} to be {}{}, but found {}.",
                    ctx.subject_label(),
                    other,
                    ctx.reason_clause(),
                    ctx.subject()
                );
                report(ctx, reporter, message);
                Ok(())
            }
            _ => {
                self.comparer.compare(ctx, reporter);
                Ok(())
            }
        }
    }

    fn assert_members(&self, ctx: &ComparisonContext, reporter: &mut dyn Reporter) -> Result<()> {
        for member in ctx.selected_members()? {
            match ctx.create_for_nested_member(&member)? {
                Some(child) => self.assert_equality(&child, reporter)?,
                None => debug!(path = %ctx.path(), member = member.name(), "member excluded, no counterpart"),
            }
        }
        Ok(())
    }

    fn assert_items(
        &self,
        ctx: &ComparisonContext,
        subject: &[Value],
        expectation: &[Value],
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        if subject.len() != expectation.len() {
            let message = format!(
                "Expected {} to be a collection with {} item(s){}, but it has {}.",
                ctx.subject_label(),
                expectation.len(),
                ctx.reason_clause(),
                subject.len()
            );
            report(ctx, reporter, message);
        }
        for (index, (s, e)) in subject.iter().zip(expectation).enumerate() {
            let child = ctx.create_for_collection_item(index, s.clone(), e.clone());
            self.assert_equality(&child, reporter)?;
        }
        Ok(())
    }
}

fn report(ctx: &ComparisonContext, reporter: &mut dyn Reporter, message: String) {
    reporter.report(Failure {
        path: ctx.path().to_string(),
        description: ctx.description().to_string(),
        message,
    });
}

/// Walk the whole graph below `ctx` and collect the outcome.
pub fn verify(ctx: &ComparisonContext) -> Result<()> {
    let mut scope = AssertionScope::new();
    EquivalencyValidator::default().assert_equality(ctx, &mut scope)?;
    scope.into_result()
}

/// Assert that `subject` is structurally equivalent to `expectation`.
pub fn assert_equivalent(subject: Value, expectation: Value, configuration: Configuration) -> Result<()> {
    verify(&ComparisonContext::new(Arc::new(configuration), subject, expectation))
}

/// Same as [`assert_equivalent`], for two JSON documents.
pub fn assert_json_equivalent(subject: &str, expectation: &str, configuration: Configuration) -> Result<()> {
    let subject: serde_json::Value = serde_json::from_str(subject)?;
    let expectation: serde_json::Value = serde_json::from_str(expectation)?;
    assert_equivalent(Value::from_json(&subject), Value::from_json(&expectation), configuration)
}
