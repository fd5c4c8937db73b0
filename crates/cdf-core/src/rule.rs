//! # Rule Contract
//!
//! The [`Rule`] trait is the shape every validation rule implements: which
//! dispatch keys it applies to, a whole-tree and/or per-element check, an
//! optional setup hook, and option handling validated against the rule's
//! statically declared option names.
//!
//! [`ReferenceRule`] refines the contract for reference-integrity checks:
//! a set of referenced identifiers must be a subset of the defined ones.

use std::collections::HashSet;

use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Violation};

/// Sentinel dispatch key for rules that check the whole tree once per run.
pub const TREE_KEY: &str = "tree";

/// A `(name, value)` pair configuring a named rule before setup.
///
/// Applied via [`Rule::set_option`]; fails if the rule does not declare an
/// option of that name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOption {
    /// The option name the rule must declare.
    pub name: String,
    /// The value to assign.
    pub value: String,
}

impl RuleOption {
    /// Create a rule option.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The parsed feed and schema trees, borrowed for the duration of one run.
///
/// Rules receive a context at every `setup` and check call instead of
/// holding the trees themselves, which keeps rule instances free of
/// document lifetimes.
#[derive(Debug, Clone, Copy)]
pub struct FeedContext<'a, 'input> {
    /// The parsed election data feed.
    pub feed: &'a Document<'input>,
    /// The parsed XSD schema.
    pub schema: &'a Document<'input>,
}

/// A unit of validation logic bound to one or more dispatch keys.
///
/// Success is `Ok(())`; a violation is returned, never panicked. Checks must
/// be safe to call repeatedly across elements without cross-contamination —
/// per-invocation state belongs in local values, not rule fields.
pub trait Rule {
    /// The rule class name used for option lookup, aggregation, and reports.
    fn name(&self) -> &'static str;

    /// One-line description shown by the rule listing.
    fn summary(&self) -> &'static str;

    /// The dispatch keys this rule is registered under. A whole-tree rule
    /// declares the single sentinel [`TREE_KEY`]. Pure declaration, no side
    /// effects.
    fn elements(&self) -> Vec<&'static str>;

    /// Apply a configuration option. Must be called, if at all, before
    /// [`Rule::setup`].
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownOption`] if the rule does not declare an option
    /// of that name. The default implementation declares none.
    fn set_option(&mut self, option: &RuleOption) -> Result<(), EngineError> {
        Err(EngineError::UnknownOption {
            rule: self.name().to_string(),
            option: option.name.clone(),
        })
    }

    /// One-time preparation, invoked once per instance after options are
    /// applied and before any check. Default is a no-op.
    fn setup(&mut self, _ctx: &FeedContext<'_, '_>) -> Result<(), Violation> {
        Ok(())
    }

    /// Check the whole tree. Invoked exactly once per run for rules
    /// registered under [`TREE_KEY`], before any per-element dispatch.
    fn check_tree(&mut self, _ctx: &FeedContext<'_, '_>) -> Result<(), Violation> {
        Ok(())
    }

    /// Check one element whose resolved logical type matched a declared key.
    fn check_element(
        &mut self,
        _ctx: &FeedContext<'_, '_>,
        _element: Node<'_, '_>,
    ) -> Result<(), Violation> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name()).finish()
    }
}

/// A whole-tree rule that verifies reference integrity: every referenced
/// identifier must name a defined one.
pub trait ReferenceRule {
    /// What kind of entity is missing when a reference dangles; used in the
    /// failure message.
    fn missing_element(&self) -> &'static str {
        "data"
    }

    /// All identifier values that reference a pre-defined value.
    ///
    /// Ex: a party leader ID references an ID from a PersonCollection; this
    /// returns the set of all party leader IDs.
    fn gather_reference_values(&self, ctx: &FeedContext<'_, '_>) -> HashSet<String>;

    /// All pre-defined identifier values available to be referenced.
    fn gather_defined_values(&self, ctx: &FeedContext<'_, '_>) -> HashSet<String>;

    /// Fail with the set difference `referenced - defined` when non-empty.
    ///
    /// The listing is sorted for deterministic output.
    fn check_references(&self, ctx: &FeedContext<'_, '_>) -> Result<(), Violation> {
        let referenced = self.gather_reference_values(ctx);
        let defined = self.gather_defined_values(ctx);
        let mut missing: Vec<&str> = referenced
            .difference(&defined)
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort_unstable();
        Err(Violation::error(format!(
            "No defined {} for {} found in the feed.",
            self.missing_element(),
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoOptions;

    impl Rule for NoOptions {
        fn name(&self) -> &'static str {
            "NoOptions"
        }
        fn summary(&self) -> &'static str {
            "Declares no options."
        }
        fn elements(&self) -> Vec<&'static str> {
            vec![TREE_KEY]
        }
    }

    #[test]
    fn default_set_option_rejects_everything() {
        let mut rule = NoOptions;
        let err = rule
            .set_option(&RuleOption::new("country_code", "us"))
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownOption { .. }));
    }

    struct FixedSets {
        referenced: Vec<&'static str>,
        defined: Vec<&'static str>,
    }

    impl ReferenceRule for FixedSets {
        fn missing_element(&self) -> &'static str {
            "Person"
        }
        fn gather_reference_values(&self, _ctx: &FeedContext<'_, '_>) -> HashSet<String> {
            self.referenced.iter().map(|s| s.to_string()).collect()
        }
        fn gather_defined_values(&self, _ctx: &FeedContext<'_, '_>) -> HashSet<String> {
            self.defined.iter().map(|s| s.to_string()).collect()
        }
    }

    fn dummy_ctx<'a, 'input>(doc: &'a roxmltree::Document<'input>) -> FeedContext<'a, 'input> {
        FeedContext {
            feed: doc,
            schema: doc,
        }
    }

    #[test]
    fn reference_check_passes_when_subset() {
        let doc = roxmltree::Document::parse("<Root/>").unwrap();
        let rule = FixedSets {
            referenced: vec!["id-1", "id-2"],
            defined: vec!["id-1", "id-2", "id-3", "id-4"],
        };
        assert!(rule.check_references(&dummy_ctx(&doc)).is_ok());
    }

    #[test]
    fn reference_check_lists_exactly_the_difference() {
        let doc = roxmltree::Document::parse("<Root/>").unwrap();
        let rule = FixedSets {
            referenced: vec!["id-1", "id-5", "id-6"],
            defined: vec!["id-1", "id-2", "id-3", "id-4"],
        };
        let violation = rule.check_references(&dummy_ctx(&doc)).unwrap_err();
        let text = violation.to_string();
        assert!(text.contains("id-5"));
        assert!(text.contains("id-6"));
        assert!(!text.contains("id-1"));
        assert!(text.contains("Person"));
    }
}
