use crate::context::ComparisonContext;
use crate::reporting::{Failure, Reporter};
use crate::value::Value;

/// Decides whether the subject and expectation at a leaf node are equal and
/// reports when they are not. Returns whether they matched.
pub trait LeafComparer {
    fn compare(&self, ctx: &ComparisonContext, reporter: &mut dyn Reporter) -> bool;
}

/// Plain equality. Integers and floats compare numerically with each other.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictEquality;

impl LeafComparer for StrictEquality {
    fn compare(&self, ctx: &ComparisonContext, reporter: &mut dyn Reporter) -> bool {
        let equal = values_equal(ctx.subject(), ctx.expectation());
        if !equal {
            reporter.report(Failure {
                path: ctx.path().to_string(),
                description: ctx.description().to_string(),
                message: format!(
                    "Expected {} to be {}{}, but found {}.",
                    ctx.subject_label(),
                    ctx.expectation(),
                    ctx.reason_clause(),
                    ctx.subject()
                ),
            });
        }
        equal
    }
}

/// Scalar equality. Objects and lists are equal only if they are the same
/// reference; structural comparison of those is the walker's job.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => floats_equal(*x, *y),
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => floats_equal(*i as f64, *f),
        (Value::Str(x), Value::Str(y)) => x == y,
        _ => a.same_reference(b),
    }
}

fn floats_equal(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() < f64::EPSILON
}
