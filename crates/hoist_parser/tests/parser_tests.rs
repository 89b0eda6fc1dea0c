//! Parser integration tests.
//!
//! Verifies the trees the parser builds and the diagnostics it reports for
//! malformed or unsupported input.

use bumpalo::Bump;
use hoist_ast::{ArrowFunctionBody, Expression, ForInitializer, NodeFlags, Statement, SyntaxKind};
use hoist_core::intern::StringInterner;
use hoist_parser::parse_script;

/// Helper: parse source text and return the statement count and diagnostic codes.
fn parse(source: &str) -> (usize, Vec<u32>) {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, diagnostics) = parse_script(&arena, &interner, "test.js", source);
    let codes = diagnostics.diagnostics().iter().map(|d| d.code).collect();
    (sf.statements.len(), codes)
}

/// Helper: assert clean parsing into the expected number of top-level statements.
fn assert_statement_count(source: &str, expected: usize) {
    let (count, codes) = parse(source);
    assert!(codes.is_empty(), "unexpected diagnostics {:?} for: {}", codes, source);
    assert_eq!(count, expected, "source: {}", source);
}

/// Helper: assert that parsing reports a diagnostic with the given code.
fn assert_error(source: &str, code: u32) {
    let (_, codes) = parse(source);
    assert!(codes.contains(&code), "expected {} in {:?} for: {}", code, codes, source);
}

/// Helper: the message texts reported for a source.
fn messages(source: &str) -> Vec<String> {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (_, diagnostics) = parse_script(&arena, &interner, "test.js", source);
    diagnostics.diagnostics().iter().map(|d| d.message_text.clone()).collect()
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_parse_var_let_const() {
    assert_statement_count("var a = 1; let b = 2; const c = 3;", 3);
}

#[test]
fn test_parse_multiple_declarators() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "let a = 1, b, c = a;");
    let Statement::VariableStatement(stmt) = &sf.statements[0] else {
        panic!("expected a variable statement");
    };
    assert!(stmt.declaration_list.data.flags.contains(NodeFlags::LET));
    assert_eq!(stmt.declaration_list.declarations.len(), 3);
    assert!(stmt.declaration_list.declarations[1].initializer.is_none());
}

#[test]
fn test_const_requires_initializer() {
    assert_error("const x;", 1155);
}

#[test]
fn test_const_without_initializer_in_for_of_head() {
    assert_statement_count("for (const x of [1, 2]) {}", 1);
}

#[test]
fn test_parse_function_declaration() {
    assert_statement_count("function add(a, b = 2) { return a + b; }", 1);
}

#[test]
fn test_destructuring_is_unsupported() {
    let texts = messages("let { a } = obj;");
    assert!(texts.iter().any(|m| m == "'destructuring' is not supported."), "{:?}", texts);
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_parse_control_flow() {
    let source = "
        if (a) { b(); } else c();
        while (x) x--;
        do { y++; } while (y < 3)
        for (let i = 0; i < 3; i++) {}
        for (var k in o) {}
        switch (v) { case 1: break; default: f(); }
    ";
    assert_statement_count(source, 6);
}

#[test]
fn test_parse_try_catch_finally() {
    assert_statement_count("try { a(); } catch (e) { b(e); } finally { c(); }", 1);
    assert_statement_count("try { a(); } catch { b(); }", 1);
}

#[test]
fn test_try_without_handler() {
    assert_error("try { a(); }", 1005);
}

#[test]
fn test_catch_initializer_rejected() {
    assert_error("try {} catch (e = 1) {}", 1197);
}

#[test]
fn test_for_statement_kinds() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let source = "for (let i = 0; i < 2; i++) {} for (const k in o) {} for (x of xs) {}";
    let (sf, diagnostics) = parse_script(&arena, &interner, "test.js", source);
    assert!(diagnostics.is_empty());
    assert_eq!(sf.statements[0].kind(), SyntaxKind::ForStatement);
    assert_eq!(sf.statements[1].kind(), SyntaxKind::ForInStatement);
    let Statement::ForOfStatement(for_of) = &sf.statements[2] else {
        panic!("expected for...of");
    };
    assert!(matches!(for_of.initializer, ForInitializer::Expression(_)));
}

#[test]
fn test_for_in_head_allows_single_declaration() {
    assert_error("for (let a, b of xs) {}", 1188);
}

#[test]
fn test_in_operator_inside_for_initializer_parentheses() {
    assert_statement_count("for (var ok = ('a' in o); ok; ok = false) {}", 1);
}

#[test]
fn test_return_outside_function() {
    assert_error("return 1;", 1108);
}

#[test]
fn test_break_outside_loop() {
    assert_error("break;", 1105);
    assert_error("function f() { continue; }", 1104);
}

#[test]
fn test_break_inside_switch_in_function() {
    assert_statement_count("function f(x) { switch (x) { case 1: break; } }", 1);
}

#[test]
fn test_loop_context_does_not_leak_into_functions() {
    assert_error("while (true) { function g() { break; } }", 1105);
}

#[test]
fn test_labeled_statement_unsupported() {
    let texts = messages("outer: for (;;) {}");
    assert!(texts.iter().any(|m| m == "'labeled statement' is not supported."), "{:?}", texts);
}

#[test]
fn test_class_declaration_unsupported() {
    let texts = messages("class A { m() { return 1; } }\nlet x = 1;");
    assert_eq!(texts, vec!["'class' is not supported.".to_string()]);
}

// ============================================================================
// Automatic semicolon insertion
// ============================================================================

#[test]
fn test_asi_on_line_break() {
    assert_statement_count("let a = 1\nlet b = 2\na + b", 3);
}

#[test]
fn test_asi_before_close_brace() {
    assert_statement_count("function f() { return 1 }", 1);
}

#[test]
fn test_missing_semicolon_on_same_line() {
    assert_error("let a = 1 let b = 2", 1005);
}

#[test]
fn test_return_value_on_next_line_is_separate() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "function f() { return\n42 }");
    let Statement::FunctionDeclaration(f) = &sf.statements[0] else {
        panic!("expected a function declaration");
    };
    assert_eq!(f.body.statements.len(), 2);
    let Statement::ReturnStatement(ret) = &f.body.statements[0] else {
        panic!("expected a return statement");
    };
    assert!(ret.expression.is_none());
}

#[test]
fn test_stray_close_brace() {
    assert_error("let a = 1; }", 1128);
}

// ============================================================================
// Expressions
// ============================================================================

#[test]
fn test_binary_precedence() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "1 + 2 * 3;");
    let Statement::ExpressionStatement(stmt) = &sf.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::Binary(bin) = stmt.expression else {
        panic!("expected a binary expression");
    };
    assert_eq!(bin.operator_token.kind(), SyntaxKind::PlusToken);
    assert!(matches!(bin.right, Expression::Binary(_)));
}

#[test]
fn test_exponent_is_right_associative() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "2 ** 3 ** 2;");
    let Statement::ExpressionStatement(stmt) = &sf.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::Binary(bin) = stmt.expression else {
        panic!("expected a binary expression");
    };
    assert!(matches!(bin.left, Expression::NumericLiteral(_)));
    assert!(matches!(bin.right, Expression::Binary(_)));
}

#[test]
fn test_parse_operators() {
    assert_statement_count(
        "a = b ?? c; d ||= e; f &&= g; h ??= i; j = k ? l : m; n = typeof o; p = void 0; q = !r && ~s;",
        8,
    );
}

#[test]
fn test_optional_chaining() {
    assert_statement_count("a?.b; a?.[0]; a?.(1); a.b?.c();", 4);
}

#[test]
fn test_invalid_assignment_target() {
    assert_error("1 = 2;", 2364);
    assert_error("f() += 1;", 2364);
}

#[test]
fn test_invalid_update_operand() {
    assert_error("5++;", 2357);
    assert_error("++f();", 2357);
}

#[test]
fn test_arrow_functions() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let source = "const f = x => x * 2; const g = (a, b) => { return a + b; }; const h = () => ({});";
    let (sf, diagnostics) = parse_script(&arena, &interner, "test.js", source);
    assert!(diagnostics.is_empty());
    assert_eq!(sf.statements.len(), 3);
    let Statement::VariableStatement(stmt) = &sf.statements[1] else {
        panic!("expected a variable statement");
    };
    let Some(Expression::ArrowFunction(arrow)) = stmt.declaration_list.declarations[0].initializer else {
        panic!("expected an arrow function");
    };
    assert_eq!(arrow.parameters.len(), 2);
    assert!(matches!(arrow.body, ArrowFunctionBody::Block(_)));
}

#[test]
fn test_parenthesized_expression_is_not_arrow() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "(a + (b));");
    let Statement::ExpressionStatement(stmt) = &sf.statements[0] else {
        panic!("expected an expression statement");
    };
    assert!(matches!(stmt.expression, Expression::Parenthesized(_)));
}

#[test]
fn test_line_break_before_arrow() {
    assert_error("const f = (a)\n=> a;", 1200);
}

#[test]
fn test_object_literal_forms() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let source = "const o = { a: 1, 'b': 2, 3: 4, [k]: 5, c, m() { return 6; }, if: 7 };";
    let (sf, diagnostics) = parse_script(&arena, &interner, "test.js", source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    let Statement::VariableStatement(stmt) = &sf.statements[0] else {
        panic!("expected a variable statement");
    };
    let Some(Expression::ObjectLiteral(obj)) = stmt.declaration_list.declarations[0].initializer else {
        panic!("expected an object literal");
    };
    assert_eq!(obj.properties.len(), 7);
}

#[test]
fn test_method_is_named_function() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "({ greet() {} });");
    let Statement::ExpressionStatement(stmt) = &sf.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::ObjectLiteral(obj) = stmt.expression.skip_parentheses() else {
        panic!("expected an object literal");
    };
    let hoist_ast::ObjectLiteralElement::PropertyAssignment(prop) = &obj.properties[0] else {
        panic!("expected a property assignment");
    };
    let Expression::FunctionExpression(method) = prop.initializer else {
        panic!("expected a function expression");
    };
    assert!(method.data.flags.contains(NodeFlags::METHOD));
    assert_eq!(method.name.as_ref().map(|n| n.text_name.as_str()), Some("greet"));
}

#[test]
fn test_array_literal_with_holes() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "[1, , 3];");
    let Statement::ExpressionStatement(stmt) = &sf.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::ArrayLiteral(arr) = stmt.expression else {
        panic!("expected an array literal");
    };
    assert_eq!(arr.elements.len(), 3);
    assert!(matches!(arr.elements[1], Expression::OmittedExpression(_)));
}

#[test]
fn test_template_literal() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, diagnostics) = parse_script(&arena, &interner, "test.js", "`a${1}b${x + 2}c`;");
    assert!(diagnostics.is_empty());
    let Statement::ExpressionStatement(stmt) = &sf.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::TemplateExpression(tpl) = stmt.expression else {
        panic!("expected a template expression");
    };
    assert_eq!(tpl.head, "a");
    assert_eq!(tpl.template_spans.len(), 2);
    assert_eq!(tpl.template_spans[0].literal, "b");
    assert_eq!(tpl.template_spans[1].literal, "c");
}

#[test]
fn test_numeric_literal_values() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "0x10;");
    let Statement::ExpressionStatement(stmt) = &sf.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expression::NumericLiteral(n) = stmt.expression else {
        panic!("expected a numeric literal");
    };
    assert_eq!(n.value, 16.0);
}

#[test]
fn test_keyword_property_names() {
    assert_statement_count("a.default; a.if = 1; a.new();", 3);
}

#[test]
fn test_unsupported_expressions() {
    let texts = messages("new Foo(1);");
    assert_eq!(texts, vec!["'new' is not supported.".to_string()]);
    let texts = messages("f(...args);");
    assert_eq!(texts, vec!["'spread syntax' is not supported.".to_string()]);
    let texts = messages("delete o.x;");
    assert_eq!(texts, vec!["'delete' is not supported.".to_string()]);
}

#[test]
fn test_missing_expression() {
    assert_error("let a = ;", 1109);
}

// ============================================================================
// Directives and limits
// ============================================================================

#[test]
fn test_use_strict_directive() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "'use strict';\nx = 1;");
    assert!(sf.is_strict());
    let (sf, _) = parse_script(&arena, &interner, "test.js", "x = 1;\n'use strict';");
    assert!(!sf.is_strict());
}

#[test]
fn test_function_level_use_strict() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "function f() { \"use strict\"; return 1; }");
    assert!(!sf.is_strict());
    let Statement::FunctionDeclaration(f) = &sf.statements[0] else {
        panic!("expected a function declaration");
    };
    assert!(f.body.data.flags.contains(NodeFlags::STRICT_MODE));
}

#[test]
fn test_nesting_limit() {
    let source = format!("{}1{}", "(".repeat(500), ")".repeat(500));
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || assert_error(&source, 1199))
        .unwrap();
    handle.join().unwrap();
}

#[test]
fn test_scanner_errors_are_reported() {
    assert_error("let s = 'abc", 1002);
}

#[test]
fn test_shebang_is_skipped() {
    assert_statement_count("#!/usr/bin/env hoist\nlet a = 1;", 1);
}

#[test]
fn test_empty_source() {
    assert_statement_count("", 0);
}
