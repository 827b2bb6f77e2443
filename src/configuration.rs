//! Policy shared by every node of one walk.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::matching::{MatchByMapping, MatchByName, MatchingRule};
use crate::selection::{AllPublicFields, AllPublicProperties, ExcludeMemberByPath, IncludeMemberByPath, SelectionRule};

/// What to do when a subject turns out to be its own ancestor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclicReferenceHandling {
    /// Report a failure.
    #[default]
    ThrowException,
    /// Stop descending and treat the node as satisfied.
    Ignore,
}

pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 10;

#[derive(Clone)]
pub struct Configuration {
    selection_rules: Vec<Arc<dyn SelectionRule>>,
    matching_rules: Vec<Arc<dyn MatchingRule>>,
    cyclic_reference_handling: CyclicReferenceHandling,
    use_runtime_types: bool,
    max_recursion_depth: Option<usize>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            selection_rules: vec![Arc::new(AllPublicProperties)],
            matching_rules: vec![Arc::new(MatchByName)],
            cyclic_reference_handling: CyclicReferenceHandling::default(),
            use_runtime_types: false,
            max_recursion_depth: Some(DEFAULT_MAX_RECURSION_DEPTH),
        }
    }
}

impl Configuration {
    /// No rules at all. Selects nothing and matches nothing until rules are added.
    pub fn empty() -> Self {
        Self { selection_rules: Vec::new(), matching_rules: Vec::new(), ..Self::default() }
    }

    pub fn selection_rules(&self) -> &[Arc<dyn SelectionRule>] {
        &self.selection_rules
    }

    pub fn matching_rules(&self) -> &[Arc<dyn MatchingRule>] {
        &self.matching_rules
    }

    pub fn cyclic_reference_handling(&self) -> CyclicReferenceHandling {
        self.cyclic_reference_handling
    }

    pub fn use_runtime_types(&self) -> bool {
        self.use_runtime_types
    }

    pub fn max_recursion_depth(&self) -> Option<usize> {
        self.max_recursion_depth
    }

    pub fn using_selection_rule<R: SelectionRule + 'static>(mut self, rule: R) -> Self {
        self.selection_rules.push(Arc::new(rule));
        self
    }

    pub fn using_matching_rule<R: MatchingRule + 'static>(mut self, rule: R) -> Self {
        self.matching_rules.push(Arc::new(rule));
        self
    }

    pub fn including_fields(self) -> Self {
        self.using_selection_rule(AllPublicFields)
    }

    pub fn excluding(self, path: &str) -> Self {
        self.using_selection_rule(ExcludeMemberByPath::new(path))
    }

    /// Compare only the given member. The first inclusion drops the
    /// "all public" defaults.
    pub fn including(mut self, path: &str) -> Self {
        self.selection_rules.retain(|rule| !rule.is_default_inclusion());
        self.using_selection_rule(IncludeMemberByPath::new(path))
    }

    /// Tried before the by-name rule, so the mapping takes precedence.
    pub fn with_mapping(mut self, subject: &str, expectation: &str) -> Self {
        self.matching_rules.insert(0, Arc::new(MatchByMapping::new(subject, expectation)));
        self
    }

    pub fn ignoring_cyclic_references(mut self) -> Self {
        self.cyclic_reference_handling = CyclicReferenceHandling::Ignore;
        self
    }

    pub fn respecting_runtime_types(mut self) -> Self {
        self.use_runtime_types = true;
        self
    }

    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = Some(depth);
        self
    }

    pub fn allowing_infinite_recursion(mut self) -> Self {
        self.max_recursion_depth = None;
        self
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("selection_rules", &self.selection_rules.iter().map(|r| r.to_string()).collect::<Vec<_>>())
            .field("matching_rules", &self.matching_rules.iter().map(|r| r.to_string()).collect::<Vec<_>>())
            .field("cyclic_reference_handling", &self.cyclic_reference_handling)
            .field("use_runtime_types", &self.use_runtime_types)
            .field("max_recursion_depth", &self.max_recursion_depth)
            .finish()
    }
}

/// Data-only form of the builder knobs, e.g. from `--options '<json>'`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquivalencyOptions {
    pub include_fields: bool,
    pub excluding: Vec<String>,
    pub including: Vec<String>,
    /// `[subject, expectation]` member name pairs.
    pub mappings: Vec<(String, String)>,
    pub cyclic_references: CyclicReferenceHandling,
    pub respect_runtime_types: bool,
    /// Absent means the default depth; `0` allows infinite recursion.
    pub max_recursion_depth: Option<usize>,
}

impl From<&EquivalencyOptions> for Configuration {
    fn from(options: &EquivalencyOptions) -> Self {
        let mut config = Configuration::default();
        if options.include_fields {
            config = config.including_fields();
        }
        for path in &options.including {
            config = config.including(path);
        }
        for path in &options.excluding {
            config = config.excluding(path);
        }
        for (subject, expectation) in &options.mappings {
            config = config.with_mapping(subject, expectation);
        }
        if options.cyclic_references == CyclicReferenceHandling::Ignore {
            config = config.ignoring_cyclic_references();
        }
        if options.respect_runtime_types {
            config = config.respecting_runtime_types();
        }
        match options.max_recursion_depth {
            Some(0) => config = config.allowing_infinite_recursion(),
            Some(depth) => config = config.with_max_recursion_depth(depth),
            None => {}
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rule_names(config: &Configuration) -> Vec<String> {
        config.selection_rules().iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let config = Configuration::default();
        assert_eq!(rule_names(&config), vec!["Include all public properties"]);
        assert_eq!(config.matching_rules().len(), 1);
        assert_eq!(config.cyclic_reference_handling(), CyclicReferenceHandling::ThrowException);
        assert_eq!(config.max_recursion_depth(), Some(DEFAULT_MAX_RECURSION_DEPTH));
    }

    #[test]
    fn including_replaces_the_defaults() {
        let config = Configuration::default().including_fields().including("Name").including("Age");
        assert_eq!(rule_names(&config), vec!["Include member Name", "Include member Age"]);
    }

    #[test]
    fn mappings_are_consulted_first() {
        let config = Configuration::default().with_mapping("Name", "FullName");
        let names: Vec<String> = config.matching_rules().iter().map(|r| r.to_string()).collect();
        assert_eq!(names, vec!["Match Name to FullName", "Match member by name"]);
    }

    #[test]
    fn options_from_json() {
        let options: EquivalencyOptions = serde_json::from_str(
            r#"{"excluding":["Address.Zip"],"cyclic_references":"ignore","max_recursion_depth":0}"#,
        )
        .unwrap();
        let config = Configuration::from(&options);
        assert_eq!(
            rule_names(&config),
            vec!["Include all public properties", "Exclude member Address.Zip"]
        );
        assert_eq!(config.cyclic_reference_handling(), CyclicReferenceHandling::Ignore);
        assert_eq!(config.max_recursion_depth(), None);
    }

    #[test]
    fn options_reject_unknown_keys() {
        assert!(serde_json::from_str::<EquivalencyOptions>(r#"{"nope":true}"#).is_err());
    }
}
