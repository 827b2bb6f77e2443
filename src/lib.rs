//! Traversal engine for structural equivalency assertions.
//!
//! A walk starts from a root [`ComparisonContext`] built from a subject, an
//! expectation and a shared [`Configuration`]. The context selects members,
//! pairs them with the expectation side, and detects reference cycles; the
//! [`EquivalencyValidator`] drives it and delegates leaf comparisons.

pub mod ancestry;
pub mod comparison;
pub mod configuration;
pub mod context;
pub mod engine;
pub mod errors;
pub mod matching;
pub mod path;
pub mod reason;
pub mod reporting;
pub mod selection;
pub mod value;

pub use comparison::{LeafComparer, StrictEquality};
pub use configuration::{Configuration, EquivalencyOptions, CyclicReferenceHandling};
pub use context::ComparisonContext;
pub use engine::{assert_equivalent, assert_json_equivalent, verify, EquivalencyValidator};
pub use errors::{EquivalencyError, Result};
pub use matching::MatchingRule;
pub use reporting::{AssertionScope, Failure, Reporter};
pub use selection::{MemberSelectionContext, SelectionRule};
pub use value::{MemberInfo, ObjectType, Type, Value};
