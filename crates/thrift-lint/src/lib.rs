//! Lint rule harness for Thrift IDL.
//!
//! A [`Rule`] inspects a CST read-only and reports diagnostics. The
//! [`Runner`] executes rules in insertion order, tags every diagnostic's
//! source with the runner's source tag, and returns a stably sorted result.
//! Nodes still inside error-recovery states are skipped so rules do not
//! pile noise on top of parse errors.

mod rules;

pub use rules::{DeprecatedFieldModifiers, FieldIdRequired};

use thrift_diagnostics::{Diagnostic, DiagnosticSource, Error, sort_diagnostics};
use thrift_syntax::Tree;
use thrift_text::Context;

/// A named lint rule.
pub trait Rule: Send + Sync {
    /// Stable rule identifier (e.g. `field_id_required`).
    fn id(&self) -> &'static str;
    /// One-line description for documentation and tooling.
    fn description(&self) -> &'static str;
    /// Inspects the tree and returns this rule's diagnostics.
    fn run(&self, ctx: &Context, tree: &Tree) -> Result<Vec<Diagnostic>, Error>;
}

/// Executes rules over a tree.
pub struct Runner {
    source_tag: String,
    rules: Vec<Box<dyn Rule>>,
}

impl Runner {
    /// Creates an empty runner whose diagnostics are tagged with
    /// `source_tag` (e.g. `thriftls.lint`).
    pub fn new(source_tag: impl Into<String>) -> Self {
        Self { source_tag: source_tag.into(), rules: Vec::new() }
    }

    /// A runner preloaded with the built-in rules.
    pub fn with_builtin_rules(source_tag: impl Into<String>) -> Self {
        let mut runner = Self::new(source_tag);
        runner.register(Box::new(FieldIdRequired));
        runner.register(Box::new(DeprecatedFieldModifiers));
        runner
    }

    /// Appends a rule; rules run in insertion order.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// The registered rules.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Runs every rule, checking the context between rule invocations.
    /// Diagnostics are tagged with the runner's source tag and sorted by
    /// `(span.start, span.end, severity, code, message)`.
    pub fn run(&self, ctx: &Context, tree: &Tree) -> Result<Vec<Diagnostic>, Error> {
        let mut all = Vec::new();
        for rule in &self.rules {
            ctx.check()?;
            let mut diagnostics = rule.run(ctx, tree)?;
            for diagnostic in &mut diagnostics {
                diagnostic.source = DiagnosticSource::Lint(self.source_tag.clone());
            }
            all.append(&mut diagnostics);
        }
        sort_diagnostics(&mut all);
        Ok(all)
    }
}

#[cfg(test)]
mod tests;
