//! # Registry & Dispatcher
//!
//! [`RulesRegistry`] owns the rule instances and the aggregate counters for
//! one validation run. `check_rules` parses the schema and feed, builds the
//! dispatch table, runs every whole-tree rule once, then traverses the feed
//! in end order dispatching element rules by resolved logical type.
//!
//! A rule's failure never stops the run; it is captured into the counts and
//! processing continues. Only a schema/feed parse failure is fatal.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use roxmltree::Document;

use crate::error::{EngineError, Violation};
use crate::report::AggregateCounts;
use crate::rule::{FeedContext, Rule, RuleOption, TREE_KEY};
use crate::schema;

/// Synthetic rule class a fatal parse failure is attributed to, keeping the
/// aggregate sum invariant intact for aborted runs.
pub const FATAL_RULE_CLASS: &str = "FeedParse";

/// Options keyed by rule class name, applied before setup.
pub type RuleOptions = HashMap<String, Vec<RuleOption>>;

/// Registry of rules and the dispatch keys they check.
///
/// One run per instance: the dispatch table and counters are built by
/// `check_rules` and never reset. Construct a new registry for a new run.
pub struct RulesRegistry {
    feed_path: PathBuf,
    schema_path: PathBuf,
    rules: Vec<Box<dyn Rule>>,
    options: RuleOptions,
    dispatch: HashMap<String, Vec<usize>>,
    counts: AggregateCounts,
    config_errors: Vec<EngineError>,
}

impl RulesRegistry {
    /// Create a registry for one feed/schema pair and the rules to run.
    pub fn new(
        feed_path: impl Into<PathBuf>,
        schema_path: impl Into<PathBuf>,
        rules: Vec<Box<dyn Rule>>,
        options: RuleOptions,
    ) -> Self {
        Self {
            feed_path: feed_path.into(),
            schema_path: schema_path.into(),
            rules,
            options,
            dispatch: HashMap::new(),
            counts: AggregateCounts::new(),
            config_errors: Vec::new(),
        }
    }

    /// The aggregate counts captured so far.
    pub fn counts(&self) -> &AggregateCounts {
        &self.counts
    }

    /// Configuration failures encountered during registration.
    pub fn config_errors(&self) -> &[EngineError] {
        &self.config_errors
    }

    /// Rule class names registered under a dispatch key, in registration
    /// order.
    pub fn rules_for_key(&self, key: &str) -> Vec<&'static str> {
        self.dispatch
            .get(key)
            .map(|indices| indices.iter().map(|&i| self.rules[i].name()).collect())
            .unwrap_or_default()
    }

    /// All dispatch keys with at least one registered rule.
    pub fn dispatch_keys(&self) -> Vec<&str> {
        self.dispatch.keys().map(String::as_str).collect()
    }

    /// Run the full validation: parse both inputs, register rules, check.
    ///
    /// A parse failure is fatal for the whole run: it is counted as one
    /// `Error` occurrence under [`FATAL_RULE_CLASS`] and the run terminates
    /// without registering or invoking any rule.
    pub fn check_rules(&mut self) {
        let schema_path = self.schema_path.clone();
        let schema_xml = match fs::read_to_string(&schema_path) {
            Ok(xml) => xml,
            Err(source) => {
                return self.record_fatal(EngineError::Io {
                    path: schema_path.display().to_string(),
                    source,
                })
            }
        };
        let feed_path = self.feed_path.clone();
        let feed_xml = match fs::read_to_string(&feed_path) {
            Ok(xml) => xml,
            Err(source) => {
                return self.record_fatal(EngineError::Io {
                    path: feed_path.display().to_string(),
                    source,
                })
            }
        };
        let schema_doc = match Document::parse(&schema_xml) {
            Ok(doc) => doc,
            Err(source) => {
                return self.record_fatal(EngineError::Parse {
                    path: schema_path.display().to_string(),
                    source,
                })
            }
        };
        let feed_doc = match Document::parse(&feed_xml) {
            Ok(doc) => doc,
            Err(source) => {
                return self.record_fatal(EngineError::Parse {
                    path: feed_path.display().to_string(),
                    source,
                })
            }
        };
        self.check_parsed(&feed_doc, &schema_doc);
    }

    /// Run registration and both check phases against pre-parsed trees.
    pub fn check_parsed(&mut self, feed: &Document<'_>, schema: &Document<'_>) {
        let ctx = FeedContext { feed, schema };
        self.register_rules(&ctx);

        // Whole-tree phase, in registration order. A failure is captured
        // and later tree rules still run.
        let tree_rules = self.dispatch.get(TREE_KEY).cloned().unwrap_or_default();
        for idx in tree_rules {
            let name = self.rules[idx].name();
            if let Err(violation) = self.rules[idx].check_tree(&ctx) {
                tracing::debug!(rule = name, severity = %violation.severity(), "tree check failed");
                self.counts.record(name, violation);
            }
        }

        // Element phase: one end-order traversal; each element dispatches
        // to every rule registered under its resolved logical type.
        let mut order = Vec::new();
        schema::walk_post_order(feed.root(), &mut |node| order.push(node));
        for element in order {
            let key = match schema::resolve_type(element) {
                Some(key) => key,
                None => continue,
            };
            let indices = match self.dispatch.get(key) {
                Some(indices) => indices.clone(),
                None => continue,
            };
            for idx in indices {
                let name = self.rules[idx].name();
                if let Err(violation) = self.rules[idx].check_element(&ctx, element) {
                    self.counts.record(name, violation);
                }
            }
        }
    }

    /// Apply options, run setup, and insert each rule into the dispatch
    /// table under every key it declares.
    ///
    /// A configuration failure aborts registration of that rule only: the
    /// error is logged and retained, and the remaining rules register
    /// normally.
    fn register_rules(&mut self, ctx: &FeedContext<'_, '_>) {
        for idx in 0..self.rules.len() {
            let name = self.rules[idx].name();

            let opts = self.options.get(name).cloned().unwrap_or_default();
            let mut misconfigured = false;
            for opt in &opts {
                if let Err(err) = self.rules[idx].set_option(opt) {
                    tracing::error!(rule = name, "skipping rule: {err}");
                    self.config_errors.push(err);
                    misconfigured = true;
                    break;
                }
            }
            if misconfigured {
                continue;
            }

            if let Err(violation) = self.rules[idx].setup(ctx) {
                tracing::warn!(rule = name, "setup failed: {violation}");
                self.counts.record(name, violation);
                continue;
            }

            let mut keys: Vec<&'static str> = Vec::new();
            for key in self.rules[idx].elements() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            for key in keys {
                self.dispatch.entry(key.to_string()).or_default().push(idx);
            }
            tracing::debug!(rule = name, "registered");
        }
    }

    fn record_fatal(&mut self, err: EngineError) {
        tracing::error!("Fatal Error. {err}");
        self.counts
            .record(FATAL_RULE_CLASS, Violation::error(format!("Fatal Error. {err}")));
    }
}
