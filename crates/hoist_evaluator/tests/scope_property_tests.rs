//! Property tests for scope rules observed through whole scripts.
//!
//! Each case generates an identifier and a block nesting depth, builds a
//! script around them and checks what `console.log` reports.

use bumpalo::Bump;
use hoist_core::intern::StringInterner;
use hoist_evaluator::{BufferConsole, Interpreter, InterpreterOptions};
use hoist_parser::parse_script;
use proptest::prelude::*;

/// Helper: run `source` to completion and return its console lines.
fn output(source: String) -> Vec<String> {
    let handle = std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(move || {
            let arena = Bump::new();
            let interner = StringInterner::new();
            let (file, diagnostics) = parse_script(&arena, &interner, "test.js", &source);
            assert!(diagnostics.is_empty(), "{source}: {:?}", diagnostics.diagnostics());
            let file = arena.alloc(file);
            let console = BufferConsole::new();
            let mut interpreter =
                Interpreter::new(interner.clone(), InterpreterOptions::default(), Box::new(console.clone()));
            if let Err(e) = interpreter.run_script(file) {
                panic!("{source}: {}: {}", e.kind_name(), e.message());
            }
            console.lines()
        })
        .unwrap();
    handle.join().unwrap()
}

/// Helper: wrap `body` in `depth` nested blocks.
fn nested(depth: usize, body: &str) -> String {
    format!("{}{}{}", "{ ".repeat(depth), body, " }".repeat(depth))
}

/// Identifiers that can never collide with a keyword or a builtin.
fn identifier() -> impl Strategy<Value = String> {
    "v_[a-zA-Z0-9_]{0,8}"
}

fn lexical_keyword() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("let"), Just("const")]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_dead_zone_access_is_uninitialized_at_any_depth(
        id in identifier(),
        keyword in lexical_keyword(),
        depth in 0usize..6,
    ) {
        let body = format!(
            "try {{ {id}; }} catch (e) {{ console.log(e.name, e.message); }} {keyword} {id} = 1; console.log({id});"
        );
        let lines = output(nested(depth, &body));
        prop_assert_eq!(
            lines,
            vec![format!("ReferenceError Cannot access '{id}' before initialization"), "1".to_string()]
        );
    }

    #[test]
    fn test_var_escapes_any_block_nesting(
        id in identifier(),
        depth in 1usize..8,
        value in 0u32..1000,
    ) {
        let source = format!(
            "console.log({id}); {} console.log({id});",
            nested(depth, &format!("var {id} = {value};"))
        );
        prop_assert_eq!(output(source), vec!["undefined".to_string(), value.to_string()]);
    }

    #[test]
    fn test_inner_declaration_shadows_at_any_depth(
        id in identifier(),
        keyword in lexical_keyword(),
        depth in 1usize..6,
    ) {
        let mut source = format!("{keyword} {id} = 0; ");
        for level in 1..=depth {
            source.push_str(&format!("{{ {keyword} {id} = {level}; console.log({id}); "));
        }
        for _ in 0..depth {
            source.push_str("} ");
        }
        source.push_str(&format!("console.log({id});"));

        let mut expected: Vec<String> = (1..=depth).map(|level| level.to_string()).collect();
        expected.push("0".to_string());
        prop_assert_eq!(output(source), expected);
    }
}
