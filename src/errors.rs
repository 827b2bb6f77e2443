use thiserror::Error;

use crate::reporting::Failure;

/// Everything that can go wrong while walking two object graphs.
#[derive(Debug, Error)]
pub enum EquivalencyError {
    /// Member selection was requested for a node whose subject is absent.
    #[error("cannot select members of an absent subject at `{path}`")]
    AbsentSubject { path: String },

    /// A member getter failed while reading its value.
    #[error("failed to read member `{member}`: {message}")]
    Reflection { member: String, message: String },

    /// A stored member was addressed that the object's type does not declare.
    #[error("type `{type_name}` has no member `{member}`")]
    UnknownMember { type_name: String, member: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The walk finished and at least one failure was reported.
    #[error("{} equivalency failure(s)", .failures.len())]
    AssertionFailed { failures: Vec<Failure> },
}

pub type Result<T> = std::result::Result<T, EquivalencyError>;
