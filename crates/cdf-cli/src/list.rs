//! # List Subcommand
//!
//! Prints the selected rules and their one-line summaries, sorted by name.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use crate::filter;
use crate::RuleSetArg;

/// Arguments for the `list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Comma-separated list of rules to list (overrides the rule set).
    #[arg(short, long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Comma-separated list of rules to exclude from the rule set.
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Pre-defined rule set.
    #[arg(short = 'r', long = "rule-set", value_enum, default_value = "election")]
    pub rule_set: RuleSetArg,
}

/// Run `list`, writing the rule details to `out`.
pub fn run_list(args: &ListArgs, out: &mut impl Write) -> Result<()> {
    let mut rules = filter::select_rules(args.rule_set.into(), &args.include, &args.exclude)?;
    rules.sort_by_key(|r| r.name());
    writeln!(out, "Selected rules details:")?;
    for rule in rules {
        writeln!(out, "\t{} - {}", rule.name(), rule.summary())?;
    }
    Ok(())
}
