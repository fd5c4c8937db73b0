//! # Validate Subcommand
//!
//! Runs the selected rules against one or more feed files and prints the
//! severity-ranked report. Each feed gets its own registry (one run per
//! instance); the process exit code follows the worst severity found
//! across all feeds.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use sha2::{Digest, Sha256};

use cdf_core::{print_exceptions, stats, RuleOption, RuleOptions, RulesRegistry};

use crate::filter;
use crate::{RuleSetArg, SeverityArg};

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Common Data Format XSD file path.
    #[arg(short = 'x', long = "xsd")]
    pub xsd: PathBuf,

    /// XML feed files to be validated.
    #[arg(required = true)]
    pub feeds: Vec<PathBuf>,

    /// Minimum issue severity level to report.
    #[arg(short, long, value_enum, default_value = "info")]
    pub severity: SeverityArg,

    /// Comma-separated list of rules to validate (overrides the rule set).
    #[arg(short, long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Comma-separated list of rules to exclude from the rule set.
    #[arg(short, long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Pre-defined rule set.
    #[arg(short = 'r', long = "rule-set", value_enum, default_value = "election")]
    pub rule_set: RuleSetArg,

    /// Two-letter country code for OCD IDs.
    #[arg(short = 'c', long = "country-code", default_value = "us")]
    pub country_code: String,

    /// YAML file mapping rule names to lists of {name, value} options.
    #[arg(long = "rule-options")]
    pub rule_options: Option<PathBuf>,
}

/// Run `validate`, writing the report to `out`.
///
/// Returns the exit code: the worst severity found across all feeds.
pub fn run_validate(args: &ValidateArgs, verbose: bool, out: &mut impl Write) -> Result<u8> {
    let options = build_rule_options(args)?;
    let mut worst = 0u8;

    for feed in &args.feeds {
        writeln!(
            out,
            "\n--------- Results after validating file: {}",
            feed.display()
        )?;
        print_metadata(feed, out)?;

        let rules = filter::select_rules(args.rule_set.into(), &args.include, &args.exclude)?;
        tracing::info!(feed = %feed.display(), rules = rules.len(), "validating feed");

        let mut registry = RulesRegistry::new(feed, &args.xsd, rules, options.clone());
        registry.check_rules();
        print_exceptions(out, registry.counts(), args.severity.into(), verbose)?;

        if verbose {
            print_stats(feed, out)?;
        }
        worst = worst.max(registry.counts().exit_code());
    }
    Ok(worst)
}

/// Assemble the rule options: the YAML file first, then the country-code
/// flag applied to the OCD ID rule.
fn build_rule_options(args: &ValidateArgs) -> Result<RuleOptions> {
    let mut options: RuleOptions = match &args.rule_options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read rule options {}", path.display()))?;
            let parsed: HashMap<String, Vec<RuleOption>> = serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse rule options {}", path.display()))?;
            parsed
        }
        None => RuleOptions::new(),
    };
    options
        .entry("GpUnitOcdId".to_string())
        .or_default()
        .push(RuleOption::new("country_code", &args.country_code));
    Ok(options)
}

/// Print the validator version and the feed's SHA-256 checksum.
fn print_metadata(feed: &Path, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Validator version: {}", crate::VERSION)?;
    let bytes = fs::read(feed)
        .with_context(|| format!("failed to read feed {}", feed.display()))?;
    let digest = Sha256::digest(&bytes);
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    writeln!(out, "SHA-256 checksum: 0x{hex}")?;
    Ok(())
}

/// Print the auxiliary entity/attribute count section.
fn print_stats(feed: &Path, out: &mut impl Write) -> Result<()> {
    let xml = fs::read_to_string(feed)?;
    match roxmltree::Document::parse(&xml) {
        Ok(doc) => stats::count_stats(&doc, out)?,
        // check_rules already reported the parse failure.
        Err(err) => tracing::debug!("skipping stats, feed did not parse: {err}"),
    }
    Ok(())
}
