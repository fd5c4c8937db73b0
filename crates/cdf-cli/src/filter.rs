//! # Rule Selection
//!
//! Turns the rule-set, include, and exclude arguments into the ordered list
//! of rule instances to run. Include and exclude names are validated
//! against the catalog before any file is touched.

use anyhow::{bail, Result};

use cdf_core::catalog::{self, RuleSet};
use cdf_core::Rule;

/// Validate that every listed rule name exists in the catalog.
pub fn validate_rule_names(names: &[String]) -> Result<()> {
    let known = catalog::all_rule_names();
    let invalid: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !n.is_empty() && !known.contains(n))
        .collect();
    if !invalid.is_empty() {
        bail!("The rule(s) {} do not exist", invalid.join(", "));
    }
    Ok(())
}

/// Select the rules to run, in catalog order.
///
/// A non-empty `include` list picks exactly those rules from the full
/// catalog; otherwise the pre-defined set is used, minus any `exclude`
/// names.
pub fn select_rules(
    set: RuleSet,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<Box<dyn Rule>>> {
    validate_rule_names(include)?;
    validate_rule_names(exclude)?;

    let selected = if include.is_empty() {
        catalog::rules_for(set)
            .into_iter()
            .filter(|r| !exclude.iter().any(|e| e == r.name()))
            .collect()
    } else {
        catalog::all_rules()
            .into_iter()
            .filter(|r| include.iter().any(|i| i == r.name()))
            .collect()
    };
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rules: &[Box<dyn Rule>]) -> Vec<&'static str> {
        rules.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn default_set_selects_all_election_rules() {
        let rules = select_rules(RuleSet::Election, &[], &[]).unwrap();
        assert_eq!(names(&rules), catalog::all_rule_names());
    }

    #[test]
    fn exclude_removes_from_the_set() {
        let rules = select_rules(
            RuleSet::Election,
            &[],
            &["OnlyOneElection".to_string(), "EmptyText".to_string()],
        )
        .unwrap();
        let selected = names(&rules);
        assert!(!selected.contains(&"OnlyOneElection"));
        assert!(!selected.contains(&"EmptyText"));
        assert!(selected.contains(&"DuplicateObjectIds"));
    }

    #[test]
    fn include_overrides_the_set() {
        // OnlyOneElection is not in the officeholder set, but an explicit
        // include picks from the full catalog.
        let rules = select_rules(
            RuleSet::Officeholder,
            &["OnlyOneElection".to_string()],
            &[],
        )
        .unwrap();
        assert_eq!(names(&rules), vec!["OnlyOneElection"]);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = select_rules(RuleSet::Election, &["NoSuchRule".to_string()], &[]).unwrap_err();
        assert!(err.to_string().contains("NoSuchRule"));

        let err =
            select_rules(RuleSet::Election, &[], &["AlsoMissing".to_string()]).unwrap_err();
        assert!(err.to_string().contains("AlsoMissing"));
    }
}
