use crate::{Rule, Runner};
use pretty_assertions::assert_eq;
use thrift_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSource, Error, Severity};
use thrift_syntax::{ParseOptions, Tree, parse};
use thrift_text::{ByteSpan, Context};

fn parse_src(source: &str) -> Tree {
    parse(
        &Context::new(),
        "file:///t.thrift",
        1,
        source.as_bytes().to_vec(),
        &ParseOptions::default(),
    )
    .unwrap()
}

fn run_builtin(source: &str) -> Vec<Diagnostic> {
    let tree = parse_src(source);
    Runner::with_builtin_rules("thriftls.lint").run(&Context::new(), &tree).unwrap()
}

#[test]
fn field_id_required_flags_missing_ids() {
    let src = "struct Foo {\n  1: i32 with_id,\n  i32 without_id,\n}\n";
    let diagnostics = run_builtin(src);
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code, DiagnosticCode::LintFieldIdRequired);
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert!(diagnostic.recoverable);
    // Reported on the field name.
    let name_start = src.find("without_id").unwrap();
    assert_eq!(diagnostic.span, ByteSpan::new(name_start, name_start + "without_id".len()));
}

#[test]
fn deprecated_modifiers_are_flagged() {
    let src = "struct Foo {\n  1: i32 a xsd_optional,\n  2: i32 b xsd_nillable,\n}\n";
    let diagnostics = run_builtin(src);
    let codes: Vec<_> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![
        DiagnosticCode::LintDeprecatedFieldXsdOptional,
        DiagnosticCode::LintDeprecatedFieldXsdNillable,
    ]);
}

#[test]
fn clean_input_is_clean() {
    assert!(run_builtin("struct Foo {\n  1: i32 a,\n  2: string b,\n}\n").is_empty());
    assert!(run_builtin("enum E { A, B }\nservice S { void ping() }\n").is_empty());
}

#[test]
fn recovered_fields_are_skipped() {
    // The struct subtree carries a parse error, so lint stays quiet about
    // its fields.
    let diagnostics = run_builtin("struct Foo {\n  i32 no_id,\n  ??? garbage\n}\n");
    assert!(diagnostics.iter().all(|d| d.code != DiagnosticCode::LintFieldIdRequired));
}

#[test]
fn diagnostics_are_tagged_and_sorted() {
    let src = "struct B {\n  i32 z,\n}\nstruct A {\n  i32 y xsd_optional,\n}\n";
    let diagnostics = run_builtin(src);
    assert!(!diagnostics.is_empty());
    for diagnostic in &diagnostics {
        assert_eq!(diagnostic.source, DiagnosticSource::Lint("thriftls.lint".to_string()));
    }
    for pair in diagnostics.windows(2) {
        assert!(
            (pair[0].span.start, pair[0].span.end) <= (pair[1].span.start, pair[1].span.end)
        );
    }
}

struct CountingRule;

impl Rule for CountingRule {
    fn id(&self) -> &'static str {
        "counting"
    }
    fn description(&self) -> &'static str {
        "counts nothing"
    }
    fn run(&self, ctx: &Context, _tree: &Tree) -> Result<Vec<Diagnostic>, Error> {
        ctx.check()?;
        Ok(Vec::new())
    }
}

#[test]
fn cancelled_context_stops_the_runner() {
    let tree = parse_src("struct Foo {}\n");
    let mut runner = Runner::new("thriftls.lint");
    runner.register(Box::new(CountingRule));
    let ctx = Context::new();
    ctx.cancel();
    assert!(matches!(runner.run(&ctx, &tree), Err(Error::Cancelled)));
}

#[test]
fn rule_metadata_is_exposed() {
    let runner = Runner::with_builtin_rules("thriftls.lint");
    let ids: Vec<_> = runner.rules().map(|r| r.id()).collect();
    assert_eq!(ids, vec!["field_id_required", "deprecated_field_modifiers"]);
    for rule in runner.rules() {
        assert!(!rule.description().is_empty());
    }
}
