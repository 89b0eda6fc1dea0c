//! Scope chain integration tests.
//!
//! Exercises resolution, the binding lifecycle, per-iteration scopes and the
//! hoisting pre-scan against parsed scripts. Values are plain integers, with
//! the default `0` standing in for `undefined`.

use bumpalo::Bump;
use hoist_binder::{
    hoist_declarations, DeclarationKind, Name, ScopeChain, ScopeError, ScopeKind, ScopeRef,
};
use hoist_core::intern::StringInterner;
use hoist_parser::parse_script;

/// Helper: a name interned in `interner`.
fn name<'n>(interner: &StringInterner, text: &'n str) -> Name<'n> {
    Name::new(interner.intern(text), text)
}

/// Helper: parse `source` and hoist its top level into a fresh chain.
fn hoist_script(source: &str) -> Result<(), ScopeError> {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, diagnostics) = parse_script(&arena, &interner, "test.js", source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics.diagnostics());
    let chain: ScopeChain<i32> = ScopeChain::new();
    chain.hoist(&hoist_declarations(sf.statements), |_, _| 1)
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_unresolved_identifier() {
    let interner = StringInterner::new();
    let chain: ScopeChain<i32> = ScopeChain::new();
    assert_eq!(
        chain.lookup(name(&interner, "y")),
        Err(ScopeError::UnresolvedIdentifier("y".into()))
    );
}

#[test]
fn test_access_before_declaration_is_uninitialized_not_unresolved() {
    let interner = StringInterner::new();
    let chain: ScopeChain<i32> = ScopeChain::new();
    let x = name(&interner, "x");
    chain.declare(x, DeclarationKind::BlockMutable).unwrap();
    assert_eq!(chain.lookup(x), Err(ScopeError::UninitializedAccess("x".into())));
    assert_eq!(chain.assign(x, 1), Err(ScopeError::UninitializedAccess("x".into())));
    chain.initialize(x, 7).unwrap();
    assert_eq!(chain.lookup(x), Ok(7));
}

#[test]
fn test_shadowing() {
    let interner = StringInterner::new();
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let x = name(&interner, "x");
    chain.declare(x, DeclarationKind::BlockMutable).unwrap();
    chain.initialize(x, 1).unwrap();

    chain.enter_block();
    chain.declare(x, DeclarationKind::BlockMutable).unwrap();
    chain.initialize(x, 2).unwrap();
    assert_eq!(chain.lookup(x), Ok(2));
    chain.assign(x, 3).unwrap();
    chain.exit_block();

    assert_eq!(chain.lookup(x), Ok(1));
}

#[test]
fn test_inner_block_sees_outer_binding() {
    let interner = StringInterner::new();
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let x = name(&interner, "x");
    chain.declare(x, DeclarationKind::BlockMutable).unwrap();
    chain.initialize(x, 1).unwrap();
    chain.enter_block();
    chain.enter_block();
    chain.assign(x, 5).unwrap();
    chain.exit_block();
    chain.exit_block();
    assert_eq!(chain.lookup(x), Ok(5));
}

#[test]
fn test_builtins_can_be_shadowed() {
    let interner = StringInterner::new();
    let chain: ScopeChain<i32> = ScopeChain::new();
    let console = name(&interner, "console");
    chain.declare_builtin(console, DeclarationKind::Rebindable, 9).unwrap();
    assert_eq!(chain.lookup(console), Ok(9));
    chain.declare(console, DeclarationKind::BlockMutable).unwrap();
    chain.initialize(console, 4).unwrap();
    assert_eq!(chain.lookup(console), Ok(4));
}

#[test]
fn test_exit_block_never_pops_global() {
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    chain.exit_block();
    assert_eq!(chain.current_kind(), ScopeKind::Global);
}

// ============================================================================
// Declaration kinds
// ============================================================================

#[test]
fn test_const_second_initialization_fails() {
    let interner = StringInterner::new();
    let chain: ScopeChain<i32> = ScopeChain::new();
    let pi = name(&interner, "PI");
    chain.declare(pi, DeclarationKind::BlockImmutable).unwrap();
    chain.initialize(pi, 3).unwrap();
    assert_eq!(chain.initialize(pi, 4), Err(ScopeError::AlreadyInitialized("PI".into())));
    assert_eq!(chain.assign(pi, 4), Err(ScopeError::AlreadyInitialized("PI".into())));
    assert_eq!(chain.lookup(pi), Ok(3));
}

#[test]
fn test_var_in_block_survives_block_exit() {
    let interner = StringInterner::new();
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let v = name(&interner, "v");
    chain.enter_block();
    chain.declare(v, DeclarationKind::Rebindable).unwrap();
    assert_eq!(chain.lookup(v), Ok(0));
    chain.assign(v, 10).unwrap();
    chain.exit_block();
    assert_eq!(chain.lookup(v), Ok(10));
    chain.assign(v, 11).unwrap();
    assert_eq!(chain.lookup(v), Ok(11));
}

#[test]
fn test_let_in_block_unreachable_after_exit() {
    let interner = StringInterner::new();
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let b = name(&interner, "b");
    chain.enter_block();
    chain.declare(b, DeclarationKind::BlockMutable).unwrap();
    chain.initialize(b, 1).unwrap();
    chain.exit_block();
    assert_eq!(chain.lookup(b), Err(ScopeError::UnresolvedIdentifier("b".into())));
}

#[test]
fn test_sloppy_global_creation() {
    let interner = StringInterner::new();
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let g = name(&interner, "leaked");
    chain.enter_block();
    chain.declare_global(g, 2).unwrap();
    chain.exit_block();
    assert_eq!(chain.lookup(g), Ok(2));
}

// ============================================================================
// Functions and closures
// ============================================================================

#[test]
fn test_parameters_are_initialized() {
    let interner = StringInterner::new();
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let a = name(&interner, "a");
    let captured = chain.current();
    let saved = chain.enter_function(captured, vec![(a, 42)]).unwrap();
    assert_eq!(chain.current_kind(), ScopeKind::Function);
    assert_eq!(chain.lookup(a), Ok(42));
    chain.restore(saved);
    assert_eq!(chain.current_kind(), ScopeKind::Global);
    assert!(chain.lookup(a).is_err());
}

#[test]
fn test_free_identifiers_resolve_at_definition_site() {
    let interner = StringInterner::new();
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let x = name(&interner, "x");

    // Definition site: a block with x = 1, captured by a "closure".
    chain.enter_block();
    chain.declare(x, DeclarationKind::BlockMutable).unwrap();
    chain.initialize(x, 1).unwrap();
    let captured = chain.current();
    chain.exit_block();

    // Call site: a different block with its own x = 2.
    chain.enter_block();
    chain.declare(x, DeclarationKind::BlockMutable).unwrap();
    chain.initialize(x, 2).unwrap();
    let saved = chain.enter_function(captured, Vec::new()).unwrap();
    assert_eq!(chain.lookup(x), Ok(1));
    chain.restore(saved);
    assert_eq!(chain.lookup(x), Ok(2));
}

#[test]
fn test_var_loop_closures_share_one_binding() {
    let interner = StringInterner::new();
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let i = name(&interner, "i");
    chain.declare(i, DeclarationKind::Rebindable).unwrap();
    chain.assign(i, 0).unwrap();

    let mut captured: Vec<ScopeRef<i32>> = Vec::new();
    while chain.lookup(i).unwrap() < 3 {
        chain.enter_block();
        captured.push(chain.current());
        chain.exit_block();
        let next = chain.lookup(i).unwrap() + 1;
        chain.assign(i, next).unwrap();
    }

    let seen: Vec<i32> = captured
        .into_iter()
        .map(|scope| {
            let saved = chain.enter_function(scope, Vec::new()).unwrap();
            let value = chain.lookup(i).unwrap();
            chain.restore(saved);
            value
        })
        .collect();
    assert_eq!(seen, vec![3, 3, 3]);
}

#[test]
fn test_let_loop_closures_capture_per_iteration_binding() {
    let interner = StringInterner::new();
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    let i = name(&interner, "i");

    // for (let i = 0; i < 3; i++) { capture }
    chain.enter_block();
    chain.declare(i, DeclarationKind::BlockMutable).unwrap();
    chain.initialize(i, 0).unwrap();
    let mut captured: Vec<ScopeRef<i32>> = Vec::new();
    chain.fork_iteration();
    while chain.lookup(i).unwrap() < 3 {
        captured.push(chain.current());
        chain.fork_iteration();
        let next = chain.lookup(i).unwrap() + 1;
        chain.assign(i, next).unwrap();
    }
    chain.exit_block();

    let seen: Vec<i32> = captured
        .into_iter()
        .map(|scope| {
            let saved = chain.enter_function(scope, Vec::new()).unwrap();
            let value = chain.lookup(i).unwrap();
            chain.restore(saved);
            value
        })
        .collect();
    assert_eq!(seen, vec![0, 1, 2]);
}

// ============================================================================
// Hoisting
// ============================================================================

#[test]
fn test_hoisting_creates_tdz_for_let() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "var early; let late = 1;");
    let chain: ScopeChain<i32> = ScopeChain::new();
    chain.hoist(&hoist_declarations(sf.statements), |_, _| 1).unwrap();
    assert_eq!(chain.lookup(name(&interner, "early")), Ok(0));
    assert_eq!(
        chain.lookup(name(&interner, "late")),
        Err(ScopeError::UninitializedAccess("late".into()))
    );
}

#[test]
fn test_hoisting_binds_functions_before_execution() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "greet(); function greet() {}");
    let chain: ScopeChain<i32> = ScopeChain::new();
    let mut made = Vec::new();
    chain
        .hoist(&hoist_declarations(sf.statements), |decl, _| {
            made.push(decl.name.text_name.clone());
            99
        })
        .unwrap();
    assert_eq!(made, vec!["greet".to_string()]);
    assert_eq!(chain.lookup(name(&interner, "greet")), Ok(99));
}

#[test]
fn test_duplicate_lexical_declarations() {
    assert_eq!(
        hoist_script("let a = 1; let a = 2;"),
        Err(ScopeError::DuplicateDeclaration("a".into()))
    );
    assert_eq!(
        hoist_script("var b = 1; const b = 2;"),
        Err(ScopeError::DuplicateDeclaration("b".into()))
    );
    assert_eq!(
        hoist_script("function c() {} let c = 1;"),
        Err(ScopeError::DuplicateDeclaration("c".into()))
    );
}

#[test]
fn test_var_redeclaration_allowed() {
    assert_eq!(hoist_script("var a = 1; var a = 2; function a() {}"), Ok(()));
}

#[test]
fn test_var_crossing_block_lexical_declaration() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "{ let x = 1; { var x = 2; } }");
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    chain.hoist(&hoist_declarations(sf.statements), |_, _| 1).unwrap();

    let hoist_ast::Statement::Block(block) = &sf.statements[0] else {
        panic!("expected a block");
    };
    chain.enter_block();
    assert_eq!(
        chain.hoist(&hoist_declarations(block.statements), |_, _| 1),
        Err(ScopeError::DuplicateDeclaration("x".into()))
    );
}

#[test]
fn test_block_function_binds_in_block() {
    let arena = Bump::new();
    let interner = StringInterner::new();
    let (sf, _) = parse_script(&arena, &interner, "test.js", "{ function inner() {} }");
    let mut chain: ScopeChain<i32> = ScopeChain::new();
    chain.hoist(&hoist_declarations(sf.statements), |_, _| 1).unwrap();
    let inner = name(&interner, "inner");
    assert!(chain.lookup(inner).is_err());

    let hoist_ast::Statement::Block(block) = &sf.statements[0] else {
        panic!("expected a block");
    };
    chain.enter_block();
    chain.hoist(&hoist_declarations(block.statements), |_, _| 5).unwrap();
    assert_eq!(chain.lookup(inner), Ok(5));
    chain.exit_block();
    assert!(chain.lookup(inner).is_err());
}
