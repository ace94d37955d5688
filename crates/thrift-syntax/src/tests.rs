use crate::grammar::{GrammarError, GrammarParser, GrammarTree, InputEdit, kinds};
use crate::tree::{NO_NODE, NodeFlags};
use crate::{
    ParseOptions, ReparseEvent, ReparseMode, child_node_ids, member_node_ids, parse, reparse,
    reset_parser_factory, set_parser_factory, set_reparse_observer, top_level_declaration_ids,
};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use thrift_diagnostics::DiagnosticCode;
use thrift_lexer::lex;
use thrift_text::{ByteSpan, Context, LineIndex};
use thrift_token::Token;

// The parser factory and reparse observer are process-wide; serialize every
// test in this binary so factory-swapping tests cannot race parse tests.
static GLOBALS: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn lock() -> MutexGuard<'static, ()> {
    let guard = GLOBALS.lock();
    reset_parser_factory();
    set_reparse_observer(None);
    guard
}

fn parse_str(source: &str) -> crate::Tree {
    parse(
        &Context::new(),
        "file:///test.thrift",
        1,
        source.as_bytes().to_vec(),
        &ParseOptions::default(),
    )
    .unwrap()
}

fn kind_names(tree: &crate::Tree, ids: &[crate::NodeId]) -> Vec<&'static str> {
    ids.iter().map(|&id| tree.kind_of(tree.node(id).unwrap())).collect()
}

#[test]
fn parse_simple_struct() {
    let _guard = lock();
    let tree = parse_str("struct Foo {\n  1: required i32 id;\n  2: optional string name,\n}\n");
    assert!(!tree.is_degraded());
    assert!(!tree.has_non_recoverable());

    let top = top_level_declaration_ids(&tree);
    assert_eq!(kind_names(&tree, &top), vec![kinds::STRUCT_DEFINITION]);

    let members = member_node_ids(&tree, top[0]);
    assert_eq!(kind_names(&tree, &members), vec![kinds::FIELD, kinds::FIELD]);

    let field = tree.node(members[0]).unwrap();
    let field_children = child_node_ids(&tree, field.id);
    assert_eq!(kind_names(&tree, &field_children), vec![kinds::FIELD_ID, kinds::FIELD_NAME]);
}

#[test]
fn parse_all_declaration_kinds() {
    let _guard = lock();
    let tree = parse_str(
        "include \"a.thrift\"\ncpp_include \"b.h\"\nnamespace go foo.bar\ntypedef i32 ID\nconst i32 X = 3\nenum E { A = 1, B }\nsenum S { \"one\" }\nstruct St { 1: i32 a }\nunion U { 1: i32 a }\nexception Ex { 1: string msg }\nservice Svc { void ping() }\n",
    );
    let top = top_level_declaration_ids(&tree);
    assert_eq!(kind_names(&tree, &top), vec![
        kinds::INCLUDE_DECLARATION,
        kinds::CPP_INCLUDE_DECLARATION,
        kinds::NAMESPACE_DECLARATION,
        kinds::TYPEDEF_DECLARATION,
        kinds::CONST_DECLARATION,
        kinds::ENUM_DEFINITION,
        kinds::SENUM_DEFINITION,
        kinds::STRUCT_DEFINITION,
        kinds::UNION_DEFINITION,
        kinds::EXCEPTION_DEFINITION,
        kinds::SERVICE_DEFINITION,
    ]);
    assert!(!tree.diagnostics.iter().any(|d| !d.recoverable));
}

#[test]
fn members_per_container() {
    let _guard = lock();
    let tree = parse_str(
        "enum E { A, B, C }\nsenum S { \"x\", \"y\" }\nservice Svc {\n  void ping(),\n  i32 add(1: i32 a, 2: i32 b)\n}\n",
    );
    let top = top_level_declaration_ids(&tree);
    assert_eq!(member_node_ids(&tree, top[0]).len(), 3);
    assert_eq!(member_node_ids(&tree, top[1]).len(), 2);
    let functions = member_node_ids(&tree, top[2]);
    assert_eq!(kind_names(&tree, &functions), vec![
        kinds::FUNCTION_DEFINITION,
        kinds::FUNCTION_DEFINITION
    ]);
}

#[test]
fn function_with_throws_and_params() {
    let _guard = lock();
    let tree = parse_str(
        "service S {\n  Reply call(1: Request req) throws (1: Err e)\n}\n",
    );
    let top = top_level_declaration_ids(&tree);
    let functions = member_node_ids(&tree, top[0]);
    let children = child_node_ids(&tree, functions[0]);
    assert_eq!(kind_names(&tree, &children), vec![kinds::PARAMETERS, kinds::THROWS]);
    let params = child_node_ids(&tree, children[0]);
    assert_eq!(kind_names(&tree, &params), vec![kinds::FIELD]);
}

#[test]
fn named_nodes_are_token_bounded() {
    let _guard = lock();
    let tree = parse_str(
        "const map<string, i32> M = {\"a\": 1, \"b\": 2}\nstruct Foo {\n  1: list<i32> xs = [1, 2, 3](ann = \"v\"),\n}\n",
    );
    for node in &tree.nodes {
        if node.id == NO_NODE || node.token_range.is_none() {
            continue;
        }
        assert!(
            node.is_token_bounded(),
            "node {:?} ({}) not bounded: span {}",
            node.id,
            tree.kind_of(node),
            node.span
        );
        let (first, last) = node.token_range.unwrap();
        let first_token = tree.token(first).unwrap();
        let last_token = tree.token(last).unwrap();
        assert_eq!(first_token.span.start, node.span.start);
        assert_eq!(last_token.span.end, node.span.end);
    }
    assert!(!tree.diagnostics.iter().any(|d| d.code == DiagnosticCode::InternalAlignment));
}

#[test]
fn error_recovery_produces_error_nodes() {
    let _guard = lock();
    let tree = parse_str("???\nstruct Foo { 1: i32 ok }\n");
    assert!(!tree.is_degraded());
    assert!(tree.diagnostics.iter().any(|d| d.code == DiagnosticCode::ParseErrorNode));
    // The struct after the garbage still parses.
    let top = top_level_declaration_ids(&tree);
    let struct_id = top
        .iter()
        .find(|&&id| tree.kind_of(tree.node(id).unwrap()) == kinds::STRUCT_DEFINITION);
    assert!(struct_id.is_some());
}

#[test]
fn missing_name_produces_missing_node() {
    let _guard = lock();
    let tree = parse_str("struct { 1: i32 a }\n");
    assert!(tree.diagnostics.iter().any(|d| d.code == DiagnosticCode::ParseMissingNode));
    let top = top_level_declaration_ids(&tree);
    let node = tree.node(top[0]).unwrap();
    assert!(node.flags.contains(NodeFlags::RECOVERED));
}

#[test]
fn degraded_tree_when_no_parser() {
    let _guard = lock();
    set_parser_factory(None);
    let tree = parse_str("struct Foo {}\n");
    assert!(tree.is_degraded());
    assert_eq!(tree.root, NO_NODE);
    assert!(tree.diagnostics.iter().any(|d| d.code == DiagnosticCode::InternalParse));
    assert!(tree.has_non_recoverable());
    reset_parser_factory();
}

fn make_edit(old_source: &[u8], new_source: &[u8], edit: (usize, usize, usize)) -> InputEdit {
    let (start, old_end, new_end) = edit;
    let old_index = LineIndex::new(old_source);
    let new_index = LineIndex::new(new_source);
    InputEdit {
        start_byte: start,
        old_end_byte: old_end,
        new_end_byte: new_end,
        start_point: old_index.offset_to_point(old_source, start).unwrap(),
        old_end_point: old_index.offset_to_point(old_source, old_end).unwrap(),
        new_end_point: new_index.offset_to_point(new_source, new_end).unwrap(),
    }
}

fn collect_events() -> (Arc<Mutex<Vec<ReparseEvent>>>, impl Fn()) {
    let events: Arc<Mutex<Vec<ReparseEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    set_reparse_observer(Some(Arc::new(move |event: &ReparseEvent| {
        sink.lock().push(event.clone());
    })));
    (events, || set_reparse_observer(None))
}

#[test]
fn incremental_reparse_matches_full_parse() {
    let _guard = lock();
    let (events, clear) = collect_events();

    let old_src = b"struct Foo {\n  1: i32 a,\n}\n".to_vec();
    let new_src = b"struct Foo {\n  1: i32 a,\n  2: i32 b,\n}\n".to_vec();
    let opts = ParseOptions::default();
    let ctx = Context::new();

    let old = parse(&ctx, "file:///t.thrift", 1, old_src.clone(), &opts).unwrap();
    let edit = make_edit(&old_src, &new_src, (25, 25, 37));
    let incremental =
        reparse(&ctx, &old, "file:///t.thrift", 2, new_src.clone(), Some(&[edit]), &opts).unwrap();

    let full = parse(&ctx, "file:///t.thrift", 2, new_src, &opts).unwrap();
    assert_eq!(incremental.tokens.len(), full.tokens.len());
    assert_eq!(incremental.nodes.len(), full.nodes.len());
    for (a, b) in incremental.nodes.iter().zip(&full.nodes) {
        assert_eq!((a.kind, a.span, a.flags), (b.kind, b.span, b.flags));
    }

    let events = events.lock().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].mode, ReparseMode::Incremental);
    assert!(events[0].applied_tree_edits);
    clear();
}

#[test]
fn whole_document_change_reparses_full() {
    let _guard = lock();
    let (events, clear) = collect_events();
    let opts = ParseOptions::default();
    let ctx = Context::new();

    let old = parse(&ctx, "file:///t.thrift", 1, b"struct A {}\n".to_vec(), &opts).unwrap();
    let new = reparse(&ctx, &old, "file:///t.thrift", 2, b"enum B {}\n".to_vec(), None, &opts)
        .unwrap();
    assert!(!new.is_degraded());

    let events = events.lock().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].mode, ReparseMode::Full);
    assert!(events[0].provided_old_tree);
    assert!(!events[0].applied_tree_edits);
    clear();
}

#[test]
fn invalid_edits_fall_back_to_full() {
    let _guard = lock();
    let (events, clear) = collect_events();
    let opts = ParseOptions::default();
    let ctx = Context::new();

    let old_src = b"struct A {}\n".to_vec();
    let new_src = b"struct AB {}\n".to_vec();
    let old = parse(&ctx, "file:///t.thrift", 1, old_src.clone(), &opts).unwrap();
    let bogus = InputEdit {
        start_byte: 500,
        old_end_byte: 600,
        new_end_byte: 700,
        start_point: thrift_text::Point::new(0, 0),
        old_end_point: thrift_text::Point::new(0, 0),
        new_end_point: thrift_text::Point::new(0, 0),
    };
    let new =
        reparse(&ctx, &old, "file:///t.thrift", 2, new_src, Some(&[bogus]), &opts).unwrap();
    assert!(!new.is_degraded());

    let events = events.lock().clone();
    assert_eq!(events[0].mode, ReparseMode::FallbackFull);
    assert!(events[0].fallback_reason.as_deref().unwrap_or("").starts_with("edit_validation"));
    clear();
}

/// A parser that corrupts its output whenever it is given an old tree, so
/// the periodic verification pass must catch the divergence.
struct DivergingParser;

impl GrammarParser for DivergingParser {
    fn parse(
        &mut self,
        source: &[u8],
        tokens: &[Token],
        old_tree: Option<&GrammarTree>,
    ) -> Result<GrammarTree, GrammarError> {
        let mut parser = crate::grammar::NativeGrammarParser::new();
        let mut tree = parser.parse(source, tokens, None)?;
        if old_tree.is_some() {
            if let Some(node) = tree.nodes.last_mut() {
                node.named = !node.named;
            }
        }
        Ok(tree)
    }
}

#[test]
fn verification_mismatch_disables_incremental() {
    let _guard = lock();
    set_parser_factory(Some(Arc::new(|| {
        Some(Box::new(DivergingParser) as Box<dyn GrammarParser>)
    })));
    let (events, clear) = collect_events();

    // Verify on every incremental reparse.
    let opts = ParseOptions { verification_interval: 1 };
    let ctx = Context::new();
    let old_src = b"struct Foo {\n  1: i32 a,\n}\n".to_vec();
    let new_src = b"struct Foo {\n  1: i32 a,\n  2: i32 b,\n}\n".to_vec();

    let old = parse(&ctx, "file:///t.thrift", 1, old_src.clone(), &opts).unwrap();
    let edit = make_edit(&old_src, &new_src, (25, 25, 37));
    let second =
        reparse(&ctx, &old, "file:///t.thrift", 2, new_src.clone(), Some(&[edit]), &opts)
            .unwrap();

    // The full-parse result was kept and a warning appended.
    assert!(
        second.diagnostics.iter().any(|d| d.code == DiagnosticCode::InternalVerification)
    );

    // The next incremental request must fall back.
    let third_src = b"struct Foo {\n  1: i32 a,\n  2: i32 b,\n  3: i32 c,\n}\n".to_vec();
    let edit = make_edit(&new_src, &third_src, (37, 37, 49));
    let _third =
        reparse(&ctx, &second, "file:///t.thrift", 3, third_src, Some(&[edit]), &opts).unwrap();

    let events = events.lock().clone();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].mode, ReparseMode::Incremental);
    assert!(events[0].verification_run);
    assert!(events[0].verification_failed);
    assert_eq!(events[1].mode, ReparseMode::FallbackFull);
    assert_eq!(events[1].fallback_reason.as_deref(), Some("incremental_disabled"));
    clear();
    reset_parser_factory();
}

#[test]
fn closed_tree_loses_its_runtime_handle() {
    let _guard = lock();
    let (events, clear) = collect_events();
    let opts = ParseOptions::default();
    let ctx = Context::new();

    let old = parse(&ctx, "file:///t.thrift", 1, b"struct A {}\n".to_vec(), &opts).unwrap();
    old.close();
    let old_src = b"struct A {}\n".to_vec();
    let new_src = b"struct AB {}\n".to_vec();
    let edit = make_edit(&old_src, &new_src, (8, 8, 9));
    let new = reparse(&ctx, &old, "file:///t.thrift", 2, new_src, Some(&[edit]), &opts).unwrap();
    assert!(!new.is_degraded());

    let events = events.lock().clone();
    assert_eq!(events[0].mode, ReparseMode::FallbackFull);
    assert!(!events[0].provided_old_tree);
    assert_eq!(events[0].fallback_reason.as_deref(), Some("no_runtime_handle"));
    clear();
}

#[test]
fn cancelled_context_stops_parse() {
    let _guard = lock();
    let ctx = Context::new();
    ctx.cancel();
    let result = parse(&ctx, "file:///t.thrift", 1, b"struct A {}\n".to_vec(),
        &ParseOptions::default());
    assert!(matches!(result, Err(thrift_diagnostics::Error::Cancelled)));
}

#[test]
fn lexer_diagnostics_flow_into_tree() {
    let _guard = lock();
    let tree = parse_str("const string X = 'unterminated\n");
    assert!(tree.diagnostics.iter().any(|d| d.code == DiagnosticCode::LexUnterminatedString));
    assert!(!tree.is_degraded());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn parse_never_panics_on_arbitrary_bytes(source in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _guard = lock();
        let tree = parse(
            &Context::new(),
            "file:///fuzz.thrift",
            1,
            source,
            &ParseOptions::default(),
        ).unwrap();
        // Default factory present: the tree must not be degraded.
        prop_assert!(!tree.is_degraded());
    }

    #[test]
    fn parse_never_panics_on_ascii_soup(source in "[ -~\\n\\r\\t]{0,300}") {
        let _guard = lock();
        let tree = parse(
            &Context::new(),
            "file:///fuzz.thrift",
            1,
            source.into_bytes(),
            &ParseOptions::default(),
        ).unwrap();
        prop_assert!(!tree.is_degraded());
        let tokens = &tree.tokens;
        prop_assert!(tokens.last().is_some_and(|t| t.is_eof()));
        let _ = lex(&tree.source);
    }
}
