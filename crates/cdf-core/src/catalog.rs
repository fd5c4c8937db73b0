//! # Built-in Rule Catalog
//!
//! The validation rules shipped with the engine, plus the pre-defined rule
//! sets used by the CLI. Each rule exercises the contract it refines:
//! whole-tree rules, a reference-integrity rule, date-range rules, an
//! option-bearing rule, and a multi-key element rule.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use roxmltree::Node;

use crate::dates;
use crate::error::{EngineError, ErrorLogEntry, Severity, Violation};
use crate::rule::{FeedContext, ReferenceRule, Rule, RuleOption, TREE_KEY};
use crate::schema;

// ---------------------------------------------------------------------------
// Rule Sets
// ---------------------------------------------------------------------------

/// A pre-defined selection of rules matched to the feed kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSet {
    /// Rules for election feeds (candidates, contests, dates).
    Election,
    /// Rules for sitting-officeholder feeds (no election-specific checks).
    Officeholder,
}

impl FromStr for RuleSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "election" => Ok(Self::Election),
            "officeholder" => Ok(Self::Officeholder),
            other => Err(format!(
                "rule set must be one of [election, officeholder], got \"{other}\""
            )),
        }
    }
}

/// Every rule in the catalog, in registration order.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(OnlyOneElection),
        Box::new(DuplicateObjectIds),
        Box::new(PartyLeadershipMustExist),
        Box::new(StartDatesNotInPast::default()),
        Box::new(EndDatesValid::default()),
        Box::new(GpUnitOcdId::default()),
        Box::new(PartyAbbreviationProvided),
        Box::new(EmptyText),
    ]
}

/// Rule names that may not apply to officeholder feeds.
const ELECTION_ONLY: &[&str] = &["OnlyOneElection", "StartDatesNotInPast", "EndDatesValid"];

/// The rules belonging to a pre-defined set, in registration order.
pub fn rules_for(set: RuleSet) -> Vec<Box<dyn Rule>> {
    match set {
        RuleSet::Election => all_rules(),
        RuleSet::Officeholder => all_rules()
            .into_iter()
            .filter(|r| !ELECTION_ONLY.contains(&r.name()))
            .collect(),
    }
}

/// Every rule class name in the catalog.
pub fn all_rule_names() -> Vec<&'static str> {
    all_rules().iter().map(|r| r.name()).collect()
}

// ---------------------------------------------------------------------------
// Whole-tree rules
// ---------------------------------------------------------------------------

/// The feed should contain at most one Election element.
pub struct OnlyOneElection;

impl Rule for OnlyOneElection {
    fn name(&self) -> &'static str {
        "OnlyOneElection"
    }

    fn summary(&self) -> &'static str {
        "The feed must not contain more than one Election element."
    }

    fn elements(&self) -> Vec<&'static str> {
        vec![TREE_KEY]
    }

    fn check_tree(&mut self, ctx: &FeedContext<'_, '_>) -> Result<(), Violation> {
        let mut elections: Vec<Node<'_, '_>> = Vec::new();
        for node in schema::find_by_type(ctx.feed.root(), "Election") {
            if !elections.contains(&node) {
                elections.push(node);
            }
        }
        if elections.len() > 1 {
            return Err(Violation::error(format!(
                "The feed contains {} Election elements; at most one is allowed.",
                elections.len()
            )));
        }
        Ok(())
    }
}

/// Every objectId in the feed must be unique.
pub struct DuplicateObjectIds;

impl Rule for DuplicateObjectIds {
    fn name(&self) -> &'static str {
        "DuplicateObjectIds"
    }

    fn summary(&self) -> &'static str {
        "Every objectId in the feed must be declared exactly once."
    }

    fn elements(&self) -> Vec<&'static str> {
        vec![TREE_KEY]
    }

    fn check_tree(&mut self, ctx: &FeedContext<'_, '_>) -> Result<(), Violation> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut log = Vec::new();
        for node in ctx.feed.descendants() {
            let Some(object_id) = node.attribute("objectId") else {
                continue;
            };
            if !seen.insert(object_id) {
                log.push(ErrorLogEntry::new(
                    Some(schema::source_line(node)),
                    format!("objectId \"{object_id}\" is declared more than once"),
                ));
            }
        }
        if log.is_empty() {
            Ok(())
        } else {
            Err(Violation::error("The feed contains duplicated object IDs").with_log(log))
        }
    }
}

/// Every PartyLeaderId must reference a Person defined in the feed.
pub struct PartyLeadershipMustExist;

impl ReferenceRule for PartyLeadershipMustExist {
    fn missing_element(&self) -> &'static str {
        "Person"
    }

    fn gather_reference_values(&self, ctx: &FeedContext<'_, '_>) -> HashSet<String> {
        schema::find_by_type(ctx.feed.root(), "PartyLeaderId")
            .iter()
            .filter_map(|n| n.text())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn gather_defined_values(&self, ctx: &FeedContext<'_, '_>) -> HashSet<String> {
        schema::find_by_type(ctx.feed.root(), "Person")
            .iter()
            .filter_map(|n| n.attribute("objectId"))
            .map(str::to_string)
            .collect()
    }
}

impl Rule for PartyLeadershipMustExist {
    fn name(&self) -> &'static str {
        "PartyLeadershipMustExist"
    }

    fn summary(&self) -> &'static str {
        "Every PartyLeaderId must reference a defined Person."
    }

    fn elements(&self) -> Vec<&'static str> {
        vec![TREE_KEY]
    }

    fn check_tree(&mut self, ctx: &FeedContext<'_, '_>) -> Result<(), Violation> {
        self.check_references(ctx)
    }
}

// ---------------------------------------------------------------------------
// Date rules
// ---------------------------------------------------------------------------

/// Election start dates should not be in the past.
pub struct StartDatesNotInPast {
    today: NaiveDate,
}

impl Default for StartDatesNotInPast {
    fn default() -> Self {
        Self {
            today: Utc::now().date_naive(),
        }
    }
}

impl StartDatesNotInPast {
    /// Pin "today" for deterministic checks.
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Rule for StartDatesNotInPast {
    fn name(&self) -> &'static str {
        "StartDatesNotInPast"
    }

    fn summary(&self) -> &'static str {
        "Election start dates should not be in the past."
    }

    fn elements(&self) -> Vec<&'static str> {
        vec!["Election"]
    }

    fn check_element(
        &mut self,
        _ctx: &FeedContext<'_, '_>,
        element: Node<'_, '_>,
    ) -> Result<(), Violation> {
        let mut bounds = dates::gather_dates(element, self.today)?;
        bounds.check_start_not_in_past();
        bounds.into_violation(Severity::Warning, "The election start date is invalid")
    }
}

/// Election end dates must not be in the past and must not precede the
/// start date.
pub struct EndDatesValid {
    today: NaiveDate,
}

impl Default for EndDatesValid {
    fn default() -> Self {
        Self {
            today: Utc::now().date_naive(),
        }
    }
}

impl EndDatesValid {
    /// Pin "today" for deterministic checks.
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Rule for EndDatesValid {
    fn name(&self) -> &'static str {
        "EndDatesValid"
    }

    fn summary(&self) -> &'static str {
        "Election end dates must be today or later and follow the start date."
    }

    fn elements(&self) -> Vec<&'static str> {
        vec!["Election"]
    }

    fn check_element(
        &mut self,
        _ctx: &FeedContext<'_, '_>,
        element: Node<'_, '_>,
    ) -> Result<(), Violation> {
        let mut bounds = dates::gather_dates(element, self.today)?;
        bounds.check_end_not_in_past();
        bounds.check_end_after_start();
        bounds.into_violation(Severity::Error, "The election end date is invalid")
    }
}

// ---------------------------------------------------------------------------
// Element rules
// ---------------------------------------------------------------------------

/// GpUnit OCD IDs must belong to the configured country.
pub struct GpUnitOcdId {
    country_code: String,
}

impl Default for GpUnitOcdId {
    fn default() -> Self {
        Self {
            country_code: "us".to_string(),
        }
    }
}

impl Rule for GpUnitOcdId {
    fn name(&self) -> &'static str {
        "GpUnitOcdId"
    }

    fn summary(&self) -> &'static str {
        "GpUnit OCD IDs must use the configured country division prefix."
    }

    fn elements(&self) -> Vec<&'static str> {
        vec!["GpUnit"]
    }

    fn set_option(&mut self, option: &RuleOption) -> Result<(), EngineError> {
        match option.name.as_str() {
            "country_code" => {
                self.country_code = option.value.trim().to_ascii_lowercase();
                Ok(())
            }
            _ => Err(EngineError::UnknownOption {
                rule: self.name().to_string(),
                option: option.name.clone(),
            }),
        }
    }

    fn check_element(
        &mut self,
        _ctx: &FeedContext<'_, '_>,
        element: Node<'_, '_>,
    ) -> Result<(), Violation> {
        let prefix = format!("ocd-division/country:{}", self.country_code);
        let mut log = Vec::new();
        for external_id in element
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "ExternalIdentifier")
        {
            let id_type = schema::find_child(external_id, "Type")
                .and_then(|n| n.text())
                .unwrap_or("");
            if id_type.trim() != "ocd-id" {
                continue;
            }
            let Some(value) = schema::find_child(external_id, "Value") else {
                continue;
            };
            let text = value.text().unwrap_or("").trim();
            if !text.starts_with(&prefix) {
                log.push(ErrorLogEntry::new(
                    Some(schema::source_line(value)),
                    format!("The OCD ID {text} does not start with {prefix}"),
                ));
            }
        }
        if log.is_empty() {
            Ok(())
        } else {
            Err(Violation::warning("The GpUnit OCD ID is invalid").with_log(log))
        }
    }
}

/// Parties should provide an abbreviation.
pub struct PartyAbbreviationProvided;

impl Rule for PartyAbbreviationProvided {
    fn name(&self) -> &'static str {
        "PartyAbbreviationProvided"
    }

    fn summary(&self) -> &'static str {
        "Parties should provide an Abbreviation element."
    }

    fn elements(&self) -> Vec<&'static str> {
        vec!["Party"]
    }

    fn check_element(
        &mut self,
        _ctx: &FeedContext<'_, '_>,
        element: Node<'_, '_>,
    ) -> Result<(), Violation> {
        let has_abbreviation = schema::find_child(element, "Abbreviation").is_some()
            || schema::find_child(element, "InternationalizedAbbreviation").is_some();
        if has_abbreviation {
            return Ok(());
        }
        let object_id = element.attribute("objectId").unwrap_or("unknown");
        Err(Violation::info(format!(
            "Party {object_id} has no abbreviation."
        )))
    }
}

/// Text-bearing elements should not be empty.
pub struct EmptyText;

impl Rule for EmptyText {
    fn name(&self) -> &'static str {
        "EmptyText"
    }

    fn summary(&self) -> &'static str {
        "Text and Title elements must not be empty."
    }

    fn elements(&self) -> Vec<&'static str> {
        vec!["Text", "Title"]
    }

    fn check_element(
        &mut self,
        _ctx: &FeedContext<'_, '_>,
        element: Node<'_, '_>,
    ) -> Result<(), Violation> {
        if !element.text().unwrap_or("").trim().is_empty() {
            return Ok(());
        }
        let tag = element.tag_name().name();
        Err(
            Violation::warning(format!("{tag} element is empty")).with_log(vec![
                ErrorLogEntry::new(
                    Some(schema::source_line(element)),
                    format!("{tag} element is empty"),
                ),
            ]),
        )
    }
}
