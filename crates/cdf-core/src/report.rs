//! # Severity Aggregator & Reporter
//!
//! [`AggregateCounts`] tallies every captured violation by severity and by
//! `(severity, rule-class)` pair; [`print_exceptions`] renders the
//! severity-then-frequency-ordered report to a line-oriented sink.
//!
//! ## Invariant
//!
//! The grand total equals the sum of per-severity totals, which equals the
//! sum over all `(severity, rule-class)` counts. Fatal parse failures are
//! attributed to the synthetic `FeedParse` rule class so the invariant
//! holds for aborted runs too.

use std::io::{self, Write};

use crate::error::{Severity, Violation};

/// Indentation for verbose per-message lines.
const MESSAGE_INDENT: &str = "              ";

/// All captured violations of one rule class at one severity.
#[derive(Debug, Clone)]
pub struct RuleBucket {
    /// The rule class name.
    pub rule: String,
    /// Occurrence count for this bucket.
    pub count: usize,
    /// Every captured violation, in capture order.
    pub violations: Vec<Violation>,
}

/// Run-scoped failure totals, owned by one registry for one run.
///
/// Buckets within a severity are kept in encounter order, which breaks
/// frequency ties deterministically in the report.
#[derive(Debug, Clone, Default)]
pub struct AggregateCounts {
    total: usize,
    severity_totals: [usize; 3],
    buckets: [Vec<RuleBucket>; 3],
}

impl AggregateCounts {
    /// Empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one captured violation attributed to `rule`.
    ///
    /// The violation contributes its log-entry count (or one, if the log is
    /// empty) to the grand total, the severity total, and the rule bucket.
    pub fn record(&mut self, rule: &str, violation: Violation) {
        let occurrences = violation.occurrence_count();
        let idx = violation.severity().index();

        self.total += occurrences;
        self.severity_totals[idx] += occurrences;

        let buckets = &mut self.buckets[idx];
        let position = match buckets.iter().position(|b| b.rule == rule) {
            Some(p) => p,
            None => {
                buckets.push(RuleBucket {
                    rule: rule.to_string(),
                    count: 0,
                    violations: Vec::new(),
                });
                buckets.len() - 1
            }
        };
        buckets[position].count += occurrences;
        buckets[position].violations.push(violation);
    }

    /// The grand total occurrence count.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The occurrence count at one severity.
    pub fn severity_total(&self, severity: Severity) -> usize {
        self.severity_totals[severity.index()]
    }

    /// The occurrence count for one rule class at one severity.
    pub fn rule_count(&self, severity: Severity, rule: &str) -> usize {
        self.buckets[severity.index()]
            .iter()
            .find(|b| b.rule == rule)
            .map_or(0, |b| b.count)
    }

    /// The buckets at one severity, in encounter order.
    pub fn buckets(&self, severity: Severity) -> &[RuleBucket] {
        &self.buckets[severity.index()]
    }

    /// The most severe level with a nonzero count.
    pub fn highest_severity(&self) -> Option<Severity> {
        Severity::ALL
            .into_iter()
            .rev()
            .find(|s| self.severity_total(*s) > 0)
    }

    /// Process exit code: 3 for errors, 2 for warnings, 1 for info, 0 clean.
    pub fn exit_code(&self) -> u8 {
        match self.highest_severity() {
            Some(Severity::Error) => 3,
            Some(Severity::Warning) => 2,
            Some(Severity::Info) => 1,
            None => 0,
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Print the violation report, most severe first.
///
/// Severities below `min_severity` are suppressed. If nothing is visible at
/// or above the threshold — including when lower-severity failures exist —
/// a single clean-run confirmation line is printed.
///
/// Within each severity, rule classes are ranked by descending occurrence
/// count; ties keep encounter order. With `verbose`, every captured
/// message is printed: `Line N: msg` when the source line is known, the
/// bare message otherwise, and the violation's own text when its log is
/// empty.
pub fn print_exceptions<W: Write>(
    out: &mut W,
    counts: &AggregateCounts,
    min_severity: Severity,
    verbose: bool,
) -> io::Result<()> {
    let visible: usize = Severity::ALL
        .into_iter()
        .filter(|s| *s >= min_severity)
        .map(|s| counts.severity_total(s))
        .sum();
    if visible == 0 {
        writeln!(out, "Validation completed with no warnings/errors.")?;
        return Ok(());
    }

    for severity in Severity::ALL.into_iter().rev() {
        if severity < min_severity {
            continue;
        }
        let severity_total = counts.severity_total(severity);
        if severity_total == 0 {
            continue;
        }
        writeln!(
            out,
            "{:6} {} message{} found",
            severity_total,
            severity.description(),
            plural(severity_total)
        )?;

        let mut ranked: Vec<&RuleBucket> = counts.buckets(severity).iter().collect();
        // Stable sort keeps encounter order for equal counts.
        ranked.sort_by(|a, b| b.count.cmp(&a.count));

        for bucket in ranked {
            writeln!(
                out,
                "{:10} {} {} message{}",
                bucket.count,
                bucket.rule,
                severity.description(),
                plural(bucket.count)
            )?;
            if verbose {
                for violation in &bucket.violations {
                    if violation.error_log().is_empty() {
                        writeln!(out, "{MESSAGE_INDENT}{violation}")?;
                        continue;
                    }
                    for entry in violation.error_log() {
                        match entry.line {
                            Some(line) => {
                                writeln!(out, "{MESSAGE_INDENT}Line {line}: {}", entry.message)?
                            }
                            None => writeln!(out, "{MESSAGE_INDENT}{}", entry.message)?,
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
