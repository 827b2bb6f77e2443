use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::path;
use crate::value::{MemberInfo, MemberKind, Type};

/// What a selection rule may look at when picking members for one node.
#[derive(Debug, Clone, Copy)]
pub struct MemberSelectionContext<'a> {
    /// Statically known type at this node, if any.
    pub declared_type: Option<&'a Type>,
    /// Actual type of the subject at this node.
    pub runtime_type: &'a Type,
    /// Machine path of the node, empty at the root.
    pub path: &'a str,
    /// Whether members come from the runtime type instead of the declared one.
    pub use_runtime_type: bool,
}

impl<'a> MemberSelectionContext<'a> {
    /// The type whose members the rules should draw from.
    pub fn effective_type(&self) -> &'a Type {
        match self.declared_type {
            Some(declared) if !self.use_runtime_type => declared,
            _ => self.runtime_type,
        }
    }

    /// Path of `member` beneath this node.
    pub fn member_path(&self, member: &MemberInfo) -> String {
        path::combine(self.path, member.name())
    }
}

/// One step of the member selection pipeline.
///
/// Each rule receives the members chosen so far and returns the next set. The
/// output of the last rule is what gets compared.
pub trait SelectionRule: fmt::Display + Send + Sync {
    fn select_members(&self, current: Vec<MemberInfo>, ctx: &MemberSelectionContext<'_>) -> Vec<MemberInfo>;

    /// Blanket "include everything of a kind" rules, dropped once the caller
    /// asks for specific members.
    fn is_default_inclusion(&self) -> bool {
        false
    }
}

/// Members already selected win over newly added ones with the same name.
fn union(current: Vec<MemberInfo>, extra: impl IntoIterator<Item = MemberInfo>) -> Vec<MemberInfo> {
    current
        .into_iter()
        .chain(extra)
        .unique_by(|m| m.name().to_string())
        .collect()
}

fn public_of_kind(ty: &Type, kind: MemberKind) -> impl Iterator<Item = MemberInfo> + '_ {
    ty.members()
        .iter()
        .filter(move |m| m.is_public() && m.kind() == kind)
        .cloned()
}

pub struct AllPublicProperties;

impl SelectionRule for AllPublicProperties {
    fn select_members(&self, current: Vec<MemberInfo>, ctx: &MemberSelectionContext<'_>) -> Vec<MemberInfo> {
        union(current, public_of_kind(ctx.effective_type(), MemberKind::Property))
    }

    fn is_default_inclusion(&self) -> bool {
        true
    }
}

impl fmt::Display for AllPublicProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Include all public properties")
    }
}

pub struct AllPublicFields;

impl SelectionRule for AllPublicFields {
    fn select_members(&self, current: Vec<MemberInfo>, ctx: &MemberSelectionContext<'_>) -> Vec<MemberInfo> {
        union(current, public_of_kind(ctx.effective_type(), MemberKind::Field))
    }

    fn is_default_inclusion(&self) -> bool {
        true
    }
}

impl fmt::Display for AllPublicFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Include all public fields")
    }
}

/// Removes the member at a given path. Collection indices are ignored, so
/// `Items.Name` matches `Items[0].Name` and `Items[7].Name` alike.
pub struct ExcludeMemberByPath {
    path: String,
}

impl ExcludeMemberByPath {
    pub fn new(path: &str) -> Self {
        Self { path: path::without_indices(path) }
    }
}

impl SelectionRule for ExcludeMemberByPath {
    fn select_members(&self, current: Vec<MemberInfo>, ctx: &MemberSelectionContext<'_>) -> Vec<MemberInfo> {
        current
            .into_iter()
            .filter(|m| path::without_indices(&ctx.member_path(m)) != self.path)
            .collect()
    }
}

impl fmt::Display for ExcludeMemberByPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exclude member {}", self.path)
    }
}

/// Adds the member at a given path, along with every member on the way to
/// it and everything beneath it.
pub struct IncludeMemberByPath {
    path: String,
}

impl IncludeMemberByPath {
    pub fn new(path: &str) -> Self {
        Self { path: path::without_indices(path) }
    }
}

impl SelectionRule for IncludeMemberByPath {
    fn select_members(&self, current: Vec<MemberInfo>, ctx: &MemberSelectionContext<'_>) -> Vec<MemberInfo> {
        let wanted = ctx.effective_type().members().iter().filter(|m| {
            let member_path = path::without_indices(&ctx.member_path(m));
            path::is_same_or_child_of(&member_path, &self.path) || path::is_same_or_child_of(&self.path, &member_path)
        });
        union(current, wanted.cloned())
    }
}

impl fmt::Display for IncludeMemberByPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Include member {}", self.path)
    }
}

type MemberPredicate = Arc<dyn Fn(&MemberInfo, &str) -> bool + Send + Sync>;

/// Removes every member for which the predicate, given the member and its
/// path, returns true.
pub struct ExcludeMemberByPredicate {
    description: String,
    predicate: MemberPredicate,
}

impl ExcludeMemberByPredicate {
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&MemberInfo, &str) -> bool + Send + Sync + 'static,
    {
        Self { description: description.into(), predicate: Arc::new(predicate) }
    }
}

impl SelectionRule for ExcludeMemberByPredicate {
    fn select_members(&self, current: Vec<MemberInfo>, ctx: &MemberSelectionContext<'_>) -> Vec<MemberInfo> {
        current
            .into_iter()
            .filter(|m| !(self.predicate)(m, &ctx.member_path(m)))
            .collect()
    }
}

impl fmt::Display for ExcludeMemberByPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exclude members where {}", self.description)
    }
}
