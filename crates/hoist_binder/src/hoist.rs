//! The hoisting pre-scan.
//!
//! Before a statement list runs, its declarations are collected so the scope
//! can be populated up front:
//! - `var` names from the whole list, including nested blocks and loop
//!   heads, but not nested functions;
//! - function declarations appearing directly in the list;
//! - `let`/`const` names appearing directly in the list.

use crate::binding::DeclarationKind;
use hoist_ast::node::*;
use hoist_ast::visitor::AstVisitor;
use hoist_core::intern::InternedString;

#[derive(Debug, Clone, Copy)]
pub struct LexicalDeclaration<'a> {
    pub name: &'a Identifier,
    pub kind: DeclarationKind,
}

#[derive(Debug, Default)]
pub struct HoistedDeclarations<'a> {
    pub var_names: Vec<&'a Identifier>,
    pub functions: Vec<&'a FunctionDeclaration<'a>>,
    pub lexical: Vec<LexicalDeclaration<'a>>,
}

impl<'a> HoistedDeclarations<'a> {
    /// Whether the list itself declares `key` with `let`, `const` or a
    /// function declaration.
    pub fn declares_lexically(&self, key: InternedString) -> bool {
        self.lexical.iter().any(|l| l.name.text == key) || self.functions.iter().any(|f| f.name.text == key)
    }

    pub fn is_empty(&self) -> bool {
        self.var_names.is_empty() && self.functions.is_empty() && self.lexical.is_empty()
    }
}

/// Pre-scan one statement list: a script, a function body or a block.
pub fn hoist_declarations<'a>(statements: &'a [Statement<'a>]) -> HoistedDeclarations<'a> {
    collect(statements.iter())
}

/// Pre-scan a `switch` body, whose clauses share a single block scope.
pub fn hoist_case_block<'a>(clauses: &'a [CaseOrDefaultClause<'a>]) -> HoistedDeclarations<'a> {
    collect(clauses.iter().flat_map(|clause| clause.statements().iter()))
}

fn collect<'a, I>(statements: I) -> HoistedDeclarations<'a>
where
    I: Iterator<Item = &'a Statement<'a>> + Clone,
{
    let mut hoisted = HoistedDeclarations::default();

    for stmt in statements.clone() {
        match stmt {
            Statement::VariableStatement(var_stmt) if var_stmt.declaration_list.is_block_scoped() => {
                let kind = if var_stmt.declaration_list.is_const() {
                    DeclarationKind::BlockImmutable
                } else {
                    DeclarationKind::BlockMutable
                };
                for decl in var_stmt.declaration_list.declarations.iter() {
                    hoisted.lexical.push(LexicalDeclaration { name: &decl.name, kind });
                }
            }
            Statement::FunctionDeclaration(func) => hoisted.functions.push(func),
            _ => {}
        }
    }

    let mut collector = VarCollector {
        names: &mut hoisted.var_names,
    };
    for stmt in statements {
        collector.visit_statement(stmt);
    }
    hoisted
}

/// Collects `var` names, stopping at function boundaries.
struct VarCollector<'a, 'v> {
    names: &'v mut Vec<&'a Identifier>,
}

impl<'a, 'v> AstVisitor<'a> for VarCollector<'a, 'v> {
    fn visit_variable_declaration_list(&mut self, node: &'a VariableDeclarationList<'a>) {
        if !node.is_block_scoped() {
            self.names.extend(node.declarations.iter().map(|decl| &decl.name));
        }
    }

    fn visit_function_declaration(&mut self, _node: &'a FunctionDeclaration<'a>) {}

    fn visit_function_body(&mut self, _parameters: &'a [ParameterDeclaration<'a>], _body: &'a Block<'a>) {}

    // Expressions cannot contain `var` outside a nested function.
    fn visit_expression(&mut self, _expr: &'a Expression<'a>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use hoist_core::intern::StringInterner;
    use hoist_parser::parse_script;

    fn names(ids: &[&Identifier]) -> Vec<String> {
        ids.iter().map(|id| id.text_name.clone()).collect()
    }

    #[test]
    fn test_vars_collected_through_blocks_not_functions() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let source = "
            var a = 1;
            if (a) { var b; for (var i = 0; i < 1; i++) { var c; } }
            try { var d; } catch (e) { var f; }
            function g() { var hidden; }
            const h = function () { var alsoHidden; };
        ";
        let (sf, _) = parse_script(&arena, &interner, "test.js", source);
        let hoisted = hoist_declarations(sf.statements);
        assert_eq!(names(&hoisted.var_names), vec!["a", "b", "i", "c", "d", "f"]);
        assert_eq!(hoisted.functions.len(), 1);
        assert_eq!(hoisted.lexical.len(), 1);
        assert_eq!(hoisted.lexical[0].kind, DeclarationKind::BlockImmutable);
    }

    #[test]
    fn test_lexical_only_from_direct_children() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (sf, _) = parse_script(&arena, &interner, "test.js", "let x = 1; { let y = 2; const z = 3; }");
        let hoisted = hoist_declarations(sf.statements);
        assert_eq!(hoisted.lexical.len(), 1);
        assert_eq!(hoisted.lexical[0].name.text_name, "x");
        assert_eq!(hoisted.lexical[0].kind, DeclarationKind::BlockMutable);
        assert!(hoisted.var_names.is_empty());
        assert!(hoisted.declares_lexically(interner.intern("x")));
        assert!(!hoisted.declares_lexically(interner.intern("y")));
    }

    #[test]
    fn test_case_block_shares_one_scope() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (sf, _) = parse_script(
            &arena,
            &interner,
            "test.js",
            "switch (k) { case 1: let a = 1; break; default: const b = 2; }",
        );
        let Statement::SwitchStatement(switch) = &sf.statements[0] else {
            panic!("expected a switch statement");
        };
        let hoisted = hoist_case_block(switch.case_block.clauses);
        assert_eq!(hoisted.lexical.len(), 2);
    }
}
