//! Persistent chain of ancestor subjects used for cycle detection.
//!
//! Pushing returns a new chain that shares its tail with the original, so each
//! branch of the walk sees only its own ancestors and siblings share the
//! common prefix instead of copying it.

use std::rc::Rc;

use crate::value::Value;

struct Link {
    subject: Value,
    parent: Option<Rc<Link>>,
}

#[derive(Clone, Default)]
pub struct AncestorChain {
    head: Option<Rc<Link>>,
    len: usize,
}

impl AncestorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain with `subject` appended as the innermost ancestor.
    pub fn push(&self, subject: Value) -> Self {
        Self {
            head: Some(Rc::new(Link { subject, parent: self.head.clone() })),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if any ancestor is reference-identical to `subject`.
    pub fn contains_reference(&self, subject: &Value) -> bool {
        self.iter().any(|ancestor| ancestor.same_reference(subject))
    }

    /// Innermost ancestor first.
    pub fn iter(&self) -> Iter<'_> {
        Iter { next: self.head.as_deref() }
    }

    /// Root first, matching the order the walk visited them.
    pub fn to_vec(&self) -> Vec<Value> {
        let mut out: Vec<Value> = self.iter().cloned().collect();
        out.reverse();
        out
    }
}

pub struct Iter<'a> {
    next: Option<&'a Link>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        let link = self.next?;
        self.next = link.parent.as_deref();
        Some(&link.subject)
    }
}

impl std::fmt::Debug for AncestorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AncestorChain(len={})", self.len)
    }
}
