use crate::{FormatOptions, document, range};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use pretty_assertions::assert_eq;
use thrift_diagnostics::{DiagnosticCode, Error, UnsafeReason};
use thrift_syntax::{ParseOptions, Tree, parse, reset_parser_factory, set_parser_factory};
use thrift_text::{ByteSpan, Context, apply_edits};

// The grammar factory is process-wide; serialize tests in this binary.
static GLOBALS: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn lock() -> MutexGuard<'static, ()> {
    let guard = GLOBALS.lock();
    reset_parser_factory();
    guard
}

fn parse_src(source: &[u8]) -> Tree {
    parse(&Context::new(), "file:///t.thrift", 1, source.to_vec(), &ParseOptions::default())
        .unwrap()
}

fn format(source: &[u8]) -> Vec<u8> {
    format_with(source, &FormatOptions::default())
}

fn format_with(source: &[u8], options: &FormatOptions) -> Vec<u8> {
    let tree = parse_src(source);
    document(&Context::new(), &tree, options).unwrap().output
}

fn format_str(source: &str) -> String {
    String::from_utf8(format(source.as_bytes())).unwrap()
}

#[test]
fn formats_struct() {
    let _guard = lock();
    let input =
        "struct Foo{1:required i32 id;2: optional string name(ann='x'),3: byte flag = 1;}\n";
    assert_eq!(
        format_str(input),
        "struct Foo {\n  1: required i32 id;\n  2: optional string name(ann = 'x'),\n  3: byte flag = 1;\n}\n"
    );
}

#[test]
fn directive_grouping() {
    let _guard = lock();
    let input = "include \"a.thrift\"\ncpp_include \"b.h\"\nnamespace go foo.bar\nnamespace rb foo.bar\ntypedef i32 ID\ntypedef string Name\nstruct X {}\n";
    let expected = "include \"a.thrift\"\ncpp_include \"b.h\"\n\nnamespace go foo.bar\nnamespace rb foo.bar\n\ntypedef i32 ID\ntypedef string Name\n\nstruct X {}\n";
    assert_eq!(format_str(input), expected);
}

#[test]
fn adjacent_consts_preserve_author_spacing() {
    let _guard = lock();
    let input = "const i32 A = 1\n\n\nconst i32 B = 2\nconst i32 C = 3\n";
    // A→B keeps the two blank lines (3 newlines), B→C keeps the single
    // newline.
    assert_eq!(
        format_str(input),
        "const i32 A = 1\n\n\nconst i32 B = 2\nconst i32 C = 3\n"
    );
}

#[test]
fn wrapped_signature() {
    let _guard = lock();
    let input = "service UpsertIdentityConnection {\n  UpsertIdentityConnectionResponse upsert_identity_connection(1: UpsertIdentityConnectionRequest request) throws(1: UpsertIdentityConnectionError error)\n}\n";
    let options = FormatOptions { line_width: Some(80), ..FormatOptions::default() };
    let output = String::from_utf8(format_with(input.as_bytes(), &options)).unwrap();
    assert_eq!(
        output,
        "service UpsertIdentityConnection {\n  UpsertIdentityConnectionResponse upsert_identity_connection(\n    1: UpsertIdentityConnectionRequest request\n  ) throws(\n    1: UpsertIdentityConnectionError error\n  )\n}\n"
    );
}

#[test]
fn short_signature_stays_flat() {
    let _guard = lock();
    let input = "service S {\n  void ping(),\n  i32 add(1: i32 a, 2: i32 b)\n}\n";
    assert_eq!(format_str(input), "service S {\n  void ping(),\n  i32 add(1: i32 a, 2: i32 b)\n}\n");
}

#[test]
fn unsafe_input_is_refused() {
    let _guard = lock();
    let tree = parse_src(b"const string X = 'unterminated\n");
    assert!(tree.diagnostics.iter().any(|d| d.code == DiagnosticCode::LexUnterminatedString));
    let err = document(&Context::new(), &tree, &FormatOptions::default()).unwrap_err();
    match err {
        Error::UnsafeToFormat { reason, .. } => assert_eq!(reason, UnsafeReason::SyntaxErrors),
        other => panic!("expected UnsafeToFormat, got {other:?}"),
    }
}

#[test]
fn unterminated_block_comment_is_refused() {
    let _guard = lock();
    let tree = parse_src(b"struct A {} /* never closed\n");
    let err = document(&Context::new(), &tree, &FormatOptions::default()).unwrap_err();
    assert!(matches!(err, Error::UnsafeToFormat { reason: UnsafeReason::SyntaxErrors, .. }));
}

#[test]
fn invalid_utf8_is_refused() {
    let _guard = lock();
    let tree = parse_src(b"struct A {}\n\xFF\n");
    let err = document(&Context::new(), &tree, &FormatOptions::default()).unwrap_err();
    assert!(matches!(err, Error::UnsafeToFormat { reason: UnsafeReason::InvalidUtf8, .. }));
}

#[test]
fn recoverable_parse_errors_still_format() {
    let _guard = lock();
    // Missing struct name: a recoverable MISSING node.
    let tree = parse_src(b"struct { 1: i32 a }\n");
    assert!(tree.diagnostics.iter().any(|d| d.code == DiagnosticCode::ParseMissingNode));
    let result = document(&Context::new(), &tree, &FormatOptions::default()).unwrap();
    assert_eq!(String::from_utf8(result.output).unwrap(), "struct {\n  1: i32 a\n}\n");
}

#[test]
fn degraded_tree_is_refused() {
    let _guard = lock();
    set_parser_factory(None);
    let tree = parse_src(b"struct A {}\n");
    assert!(tree.is_degraded());
    let err = document(&Context::new(), &tree, &FormatOptions::default()).unwrap_err();
    assert!(matches!(err, Error::UnsafeToFormat { reason: UnsafeReason::SyntaxErrors, .. }));
    reset_parser_factory();
}

#[test]
fn comments_are_preserved() {
    let _guard = lock();
    let input = "# header\n\n/** Doc comment. */\nstruct A {\n  // before field\n  1: i32 a, // trailing\n}\n";
    assert_eq!(
        format_str(input),
        "# header\n\n/** Doc comment. */\nstruct A {\n  // before field\n  1: i32 a, // trailing\n}\n"
    );
}

#[test]
fn blank_lines_capped_around_comments() {
    let _guard = lock();
    let input = "struct A {}\n\n\n\n\n\n// next\nstruct B {}\n";
    // Five blank lines collapse to the max of two (three newlines).
    assert_eq!(format_str(input), "struct A {}\n\n\n// next\nstruct B {}\n");
}

#[test]
fn explicit_zero_blank_lines() {
    let _guard = lock();
    let input = "struct A {}\n\n\n// next\nstruct B {}\n";
    let options = FormatOptions { max_blank_lines: Some(0), ..FormatOptions::default() };
    let output = String::from_utf8(format_with(input.as_bytes(), &options)).unwrap();
    assert_eq!(output, "struct A {}\n// next\nstruct B {}\n");
}

#[test]
fn bom_is_preserved() {
    let _guard = lock();
    let mut input = b"\xEF\xBB\xBF".to_vec();
    input.extend_from_slice(b"struct  A  {}\n");
    let output = format(&input);
    assert!(output.starts_with(b"\xEF\xBB\xBF"));
    assert_eq!(&output[3..], b"struct A {}\n");
}

#[test]
fn crlf_dominant_newline_is_kept() {
    let _guard = lock();
    let input = b"struct A {}\r\nstruct B {}\r\n";
    let output = format(input);
    assert_eq!(output, b"struct A {}\r\n\r\nstruct B {}\r\n");
}

#[test]
fn mixed_newlines_normalize_with_info() {
    let _guard = lock();
    let tree = parse_src(b"struct A {}\r\nstruct B {}\nstruct C {}\n");
    let result = document(&Context::new(), &tree, &FormatOptions::default()).unwrap();
    assert!(result.diagnostics.iter().any(|d| d.code == DiagnosticCode::FmtMixedNewlines));
    assert_eq!(
        String::from_utf8(result.output).unwrap(),
        "struct A {}\n\nstruct B {}\n\nstruct C {}\n"
    );
}

#[test]
fn no_trailing_newline_is_respected() {
    let _guard = lock();
    assert_eq!(format_str("struct  A {}"), "struct A {}");
}

#[test]
fn enum_and_map_consts() {
    let _guard = lock();
    let input = "enum E{A=1,B=2,}\nconst map<string,i32> M={'a':1,'b':2}\n";
    assert_eq!(
        format_str(input),
        "enum E {\n  A = 1,\n  B = 2,\n}\n\nconst map<string, i32> M = {'a': 1, 'b': 2}\n"
    );
}

#[test]
fn deprecated_spellings_are_not_rewritten() {
    let _guard = lock();
    let input = "struct A{1:byte b;2:i8 c;}\nservice S{async void f()}\n";
    assert_eq!(
        format_str(input),
        "struct A {\n  1: byte b;\n  2: i8 c;\n}\n\nservice S {\n  async void f()\n}\n"
    );
}

#[test]
fn formatting_is_idempotent() {
    let _guard = lock();
    let inputs: &[&str] = &[
        "struct Foo{1:required i32 id;2: optional string name(ann='x'),3: byte flag = 1;}\n",
        "include \"a.thrift\"\ncpp_include \"b.h\"\nnamespace go foo.bar\ntypedef i32 ID\nstruct X {}\n",
        "# header\nenum E{A=1}\nconst list<i32> L=[1,2,3]\nservice S{void ping()}\n",
        "union U {\n  1: i32 a\n  2: string b\n}\n",
    ];
    for input in inputs {
        let once = format_str(input);
        let twice = format_str(&once);
        assert_eq!(once, twice, "not idempotent for {input:?}");
    }
}

#[test]
fn formatted_output_reparses_cleanly() {
    let _guard = lock();
    let input = "struct Foo{1:required i32 id;}\nservice S{void ping()}\n";
    let output = format(input.as_bytes());
    let tree = parse_src(&output);
    assert!(!tree.has_non_recoverable());
    assert!(!tree.diagnostics.iter().any(|d| d.code == DiagnosticCode::ParseErrorNode));
}

#[test]
fn range_formats_annotation() {
    let _guard = lock();
    let src =
        b"struct Foo{1:required i32 id;2: optional string name(ann='x'),3: byte flag = 1;}\n";
    let tree = parse_src(src);
    let start = src.windows(3).position(|w| w == b"ann").unwrap();
    let span = ByteSpan::new(start, start + 3);

    let result = range(&Context::new(), &tree, span, &FormatOptions::default()).unwrap();
    assert_eq!(result.edits.len(), 1);
    let edited = apply_edits(src, &result.edits).unwrap();
    assert_eq!(
        String::from_utf8(edited).unwrap(),
        "struct Foo{1:required i32 id;2: optional string name(ann = 'x'),3: byte flag = 1;}\n"
    );
}

#[test]
fn range_on_formatted_field_returns_no_edits() {
    let _guard = lock();
    let src = b"struct Foo {\n  1: required i32 id;\n}\n";
    let tree = parse_src(src);
    let start = src.windows(2).position(|w| w == b"id").unwrap();
    let result =
        range(&Context::new(), &tree, ByteSpan::new(start, start + 2), &FormatOptions::default())
            .unwrap();
    assert!(result.edits.is_empty());
}

#[test]
fn range_widens_to_field() {
    let _guard = lock();
    let src = b"struct Foo {\n  1:required   i32 id;\n}\n";
    let tree = parse_src(src);
    let start = src.windows(2).position(|w| w == b"id").unwrap();
    let result =
        range(&Context::new(), &tree, ByteSpan::new(start, start + 2), &FormatOptions::default())
            .unwrap();
    assert_eq!(result.edits.len(), 1);
    let edited = apply_edits(src, &result.edits).unwrap();
    assert_eq!(String::from_utf8(edited).unwrap(), "struct Foo {\n  1: required i32 id;\n}\n");
}

#[test]
fn range_outside_document_is_invalid() {
    let _guard = lock();
    let tree = parse_src(b"struct A {}\n");
    let err = range(
        &Context::new(),
        &tree,
        ByteSpan::new(5, 500),
        &FormatOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }));
}

#[test]
fn range_with_no_safe_ancestor_fails_closed() {
    let _guard = lock();
    // Whitespace between declarations is inside no safe node.
    let src = b"struct A {}\n\nstruct B {}\n";
    let tree = parse_src(src);
    let err = range(
        &Context::new(),
        &tree,
        ByteSpan::new(12, 12),
        &FormatOptions::default(),
    )
    .unwrap_err();
    match err {
        Error::UnsafeToFormat { reason, message } => {
            assert_eq!(reason, UnsafeReason::SyntaxErrors);
            assert!(message.contains("FMT_RANGE_NO_SAFE_ANCESTOR"));
        }
        other => panic!("expected UnsafeToFormat, got {other:?}"),
    }
}

#[test]
fn cancelled_context_is_an_error() {
    let _guard = lock();
    let tree = parse_src(b"struct A {}\n");
    let ctx = Context::new();
    ctx.cancel();
    assert!(matches!(
        document(&ctx, &tree, &FormatOptions::default()),
        Err(Error::Cancelled)
    ));
}
