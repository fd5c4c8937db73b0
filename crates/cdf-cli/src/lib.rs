//! # cdf-cli — Feed Validator Command Line
//!
//! Provides the `cdf-validate` binary.
//!
//! ## Subcommands
//!
//! - `cdf-validate validate -x schema.xsd feed.xml …` — run the selected
//!   rules against one or more feeds and print the severity-ranked report.
//! - `cdf-validate list` — print the selected rules and their summaries.
//!
//! Exit code follows the worst severity found across all feeds: 3 for
//! errors, 2 for warnings, 1 for info, 0 for a clean run.

pub mod filter;
pub mod list;
pub mod validate;

use clap::ValueEnum;

use cdf_core::catalog::RuleSet;
use cdf_core::Severity;

/// Validator version printed in the per-feed metadata line.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Severity threshold argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityArg {
    /// Report everything.
    Info,
    /// Report warnings and errors.
    Warning,
    /// Report errors only.
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

/// Pre-defined rule set argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RuleSetArg {
    /// Rules for election feeds.
    Election,
    /// Rules for sitting-officeholder feeds.
    Officeholder,
}

impl From<RuleSetArg> for RuleSet {
    fn from(arg: RuleSetArg) -> Self {
        match arg {
            RuleSetArg::Election => RuleSet::Election,
            RuleSetArg::Officeholder => RuleSet::Officeholder,
        }
    }
}
