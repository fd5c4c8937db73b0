//! # cdf-core — Election Feed Validation Engine
//!
//! Rule dispatch and severity-aggregation engine for NIST 1500-100 election
//! data feeds. Loads a feed tree and a schema tree, runs a registered set of
//! independent validation rules against the whole tree and against
//! individual elements, and produces a severity-classified,
//! frequency-ranked report of violations.
//!
//! ## Components
//!
//! - [`schema`] — logical type resolution (`xsi:type` overrides) and tree
//!   search helpers.
//! - [`rule`] — the [`Rule`](rule::Rule) contract and its
//!   reference-integrity refinement.
//! - [`dates`] — date-range gathering and checks for date rules.
//! - [`registry`] — the dispatch table and the one-run-per-instance
//!   [`RulesRegistry`](registry::RulesRegistry).
//! - [`report`] — aggregate counters and the ranked violation report.
//! - [`stats`] — auxiliary entity/attribute counts.
//! - [`catalog`] — the built-in rules and pre-defined rule sets.
//!
//! ## Guarantees
//!
//! Every applicable rule runs exactly once per matching element regardless
//! of failures in other rules; a whole-tree rule runs exactly once per run
//! before any per-element dispatch; the grand total of captured failures
//! equals the sum of per-severity totals, which equals the sum of all
//! per-(severity, rule-class) counts. Only a schema/feed parse failure is
//! fatal.

pub mod catalog;
pub mod dates;
pub mod error;
pub mod registry;
pub mod report;
pub mod rule;
pub mod schema;
pub mod stats;

pub use error::{EngineError, ErrorLogEntry, Severity, Violation};
pub use registry::{RuleOptions, RulesRegistry, FATAL_RULE_CLASS};
pub use report::{print_exceptions, AggregateCounts};
pub use rule::{FeedContext, ReferenceRule, Rule, RuleOption, TREE_KEY};
