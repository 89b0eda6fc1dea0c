//! The script parser.
//!
//! A recursive descent parser over the scanner's token stream. Every parse
//! function consumes at least the tokens it recognizes and records a
//! diagnostic instead of failing, so one pass reports every problem.

use bumpalo::Bump;
use hoist_ast::node::*;
use hoist_ast::syntax_kind::SyntaxKind;
use hoist_ast::types::*;
use hoist_core::intern::StringInterner;
use hoist_core::text::TextRange;
use hoist_diagnostics::messages;
use hoist_diagnostics::{Diagnostic, DiagnosticCollection, DiagnosticMessage};
use hoist_scanner::{parse_numeric_literal, Scanner};

use crate::precedence::{get_binary_operator_precedence, OperatorPrecedence};

/// Maximum nesting of statements and expressions before the parser gives up.
const MAX_RECURSION_DEPTH: u32 = 200;

/// Move a `Vec` into the arena as a slice.
fn alloc_slice<T>(arena: &Bump, items: Vec<T>) -> &[T] {
    if items.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(items)
}

/// Where the parser currently is, for the checks on `return`, `break`,
/// `continue` and the `in` operator.
#[derive(Debug, Clone, Copy, Default)]
struct ParseContext {
    in_function: bool,
    iteration_depth: u32,
    switch_depth: u32,
    /// Inside a `for (...;` head, where `in` starts a `for...in`.
    disallow_in: bool,
}

/// Parse a whole script, returning the tree and every diagnostic found.
pub fn parse_script<'a>(
    arena: &'a Bump,
    interner: &StringInterner,
    file_name: &str,
    source_text: &str,
) -> (SourceFile<'a>, DiagnosticCollection) {
    let mut parser = Parser::new(arena, interner, file_name, source_text);
    let source_file = parser.parse_source_file();
    (source_file, parser.take_diagnostics())
}

pub struct Parser<'a> {
    arena: &'a Bump,
    interner: StringInterner,
    scanner: Scanner,
    file_name: String,
    source_text: String,
    context: ParseContext,
    diagnostics: DiagnosticCollection,
    recursion_depth: u32,
    /// Set once the nesting limit is hit; the rest of the input is skipped.
    aborted: bool,
}

impl<'a> Parser<'a> {
    pub fn new(arena: &'a Bump, interner: &StringInterner, file_name: &str, source_text: &str) -> Self {
        Self {
            arena,
            interner: interner.clone(),
            scanner: Scanner::new(source_text),
            file_name: file_name.to_string(),
            source_text: source_text.to_string(),
            context: ParseContext::default(),
            diagnostics: DiagnosticCollection::new(),
            recursion_depth: 0,
            aborted: false,
        }
    }

    pub fn parse_source_file(&mut self) -> SourceFile<'a> {
        self.scanner.skip_shebang();
        self.next_token();

        let mut statements = Vec::new();
        loop {
            self.parse_statement_list_into(&mut statements);
            if self.current_token() == SyntaxKind::EndOfFileToken {
                break;
            }
            // A `}` with no matching `{`.
            self.error(&messages::DECLARATION_OR_STATEMENT_EXPECTED, &[]);
            self.next_token();
        }

        let end = self.scanner.text_len() as u32;
        let mut data = NodeData::new(SyntaxKind::SourceFile, 0, end);
        if self.has_use_strict_directive(&statements) {
            data.flags |= NodeFlags::STRICT_MODE;
        }
        SourceFile {
            data,
            statements: alloc_slice(self.arena, statements),
            file_name: self.file_name.clone(),
            text: self.source_text.clone(),
        }
    }

    /// Parser and scanner diagnostics, ordered by position.
    pub fn take_diagnostics(mut self) -> DiagnosticCollection {
        for diagnostic in self.scanner.take_diagnostics().into_diagnostics() {
            let diagnostic = match diagnostic.span {
                Some(span) => diagnostic.located(&self.file_name, span),
                None => diagnostic,
            };
            self.diagnostics.add(diagnostic);
        }
        self.diagnostics.sort();
        self.diagnostics
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    fn next_token(&mut self) -> SyntaxKind {
        self.scanner.scan()
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    #[inline]
    fn token_end(&self) -> u32 {
        self.scanner.token_end() as u32
    }

    #[inline]
    fn token_value(&self) -> &str {
        self.scanner.token_value()
    }

    fn expect_token(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            let text = kind.token_text().unwrap_or("token");
            self.error(&messages::_0_EXPECTED, &[text]);
            false
        }
    }

    fn optional_token(&mut self, kind: SyntaxKind) -> bool {
        if self.current_token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Automatic semicolon insertion: a missing `;` is fine before `}`, at
    /// the end of input, or when the next token starts a new line.
    fn parse_expected_semicolon(&mut self) {
        match self.current_token() {
            SyntaxKind::SemicolonToken => {
                self.next_token();
            }
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken => {}
            _ if self.scanner.has_preceding_line_break() => {}
            _ => self.error(&messages::_0_EXPECTED, &[";"]),
        }
    }

    fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        let range = TextRange::new(self.token_pos(), self.token_end());
        self.error_at(range, message, args);
    }

    fn error_at(&mut self, range: TextRange, message: &DiagnosticMessage, args: &[&str]) {
        self.diagnostics.add(Diagnostic::with_location(
            self.file_name.clone(),
            range.to_span(),
            message,
            args,
        ));
    }

    fn unsupported(&mut self, what: &str) {
        self.error(&messages::_0_IS_NOT_SUPPORTED, &[what]);
    }

    fn is_identifier_text(&self, text: &str) -> bool {
        self.current_token() == SyntaxKind::Identifier && self.token_value() == text
    }

    /// Whether the token after the current one satisfies `f`. `f` also
    /// receives whether a line break precedes that token.
    fn next_token_is(&mut self, f: impl FnOnce(SyntaxKind, bool) -> bool) -> bool {
        self.scanner.look_ahead(|scanner| {
            let kind = scanner.scan();
            f(kind, scanner.has_preceding_line_break())
        })
    }

    fn enter_recursion(&mut self) -> bool {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            if !self.aborted {
                self.error(&messages::MAXIMUM_NESTING_DEPTH_EXCEEDED, &[]);
                self.aborted = true;
            }
            while self.current_token() != SyntaxKind::EndOfFileToken {
                self.next_token();
            }
            return false;
        }
        self.recursion_depth += 1;
        true
    }

    /// Run `f` with `in` allowed as a binary operator again, as inside any
    /// bracketed construct.
    fn allow_in<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = self.context.disallow_in;
        self.context.disallow_in = false;
        let result = f(self);
        self.context.disallow_in = saved;
        result
    }

    /// Consume an unsupported construct up to the end of its braces, or to
    /// the next `;` at nesting level zero.
    fn skip_construct(&mut self) {
        let mut depth = 0u32;
        loop {
            match self.current_token() {
                SyntaxKind::EndOfFileToken => return,
                SyntaxKind::OpenBraceToken | SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken => {
                    depth += 1
                }
                SyntaxKind::CloseBraceToken | SyntaxKind::CloseParenToken | SyntaxKind::CloseBracketToken => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 && self.current_token() == SyntaxKind::CloseBraceToken {
                        self.next_token();
                        return;
                    }
                }
                SyntaxKind::SemicolonToken if depth == 0 => {
                    self.next_token();
                    return;
                }
                _ => {}
            }
            self.next_token();
        }
    }

    // ========================================================================
    // Identifiers
    // ========================================================================

    fn make_identifier(&self, text: &str, pos: u32, end: u32) -> Identifier {
        Identifier {
            data: NodeData::new(SyntaxKind::Identifier, pos, end),
            text: self.interner.intern(text),
            text_name: text.to_string(),
        }
    }

    fn missing_identifier(&self) -> Identifier {
        let pos = self.token_pos();
        let mut id = self.make_identifier("", pos, pos);
        id.data.flags |= NodeFlags::MISSING;
        id
    }

    /// An identifier in a binding or reference position. Reserved words are
    /// rejected.
    fn parse_identifier(&mut self) -> Identifier {
        let pos = self.token_pos();
        let end = self.token_end();
        if self.current_token() == SyntaxKind::Identifier {
            let id = self.make_identifier(self.token_value(), pos, end);
            self.next_token();
            return id;
        }
        self.error(&messages::IDENTIFIER_EXPECTED, &[]);
        let id = self.missing_identifier();
        if self.current_token().is_keyword() {
            self.next_token();
        }
        id
    }

    /// An identifier after `.`, where reserved words are ordinary names.
    fn parse_identifier_name(&mut self) -> Identifier {
        if self.current_token().is_keyword() {
            let pos = self.token_pos();
            let end = self.token_end();
            let id = self.make_identifier(self.token_value(), pos, end);
            self.next_token();
            return id;
        }
        self.parse_identifier()
    }

    /// The name bound by a declaration, parameter or catch clause.
    fn parse_binding_identifier(&mut self) -> Identifier {
        if matches!(self.current_token(), SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken) {
            self.unsupported("destructuring");
            let id = self.missing_identifier();
            self.skip_construct();
            return id;
        }
        self.parse_identifier()
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    fn parse_statements(&mut self) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        self.parse_statement_list_into(&mut statements);
        alloc_slice(self.arena, statements)
    }

    fn parse_statement_list_into(&mut self, statements: &mut Vec<Statement<'a>>) {
        while !matches!(
            self.current_token(),
            SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken
        ) {
            let saved_pos = self.scanner.token_start();
            statements.push(self.parse_statement());
            if self.scanner.token_start() == saved_pos {
                self.skip_to_next_statement();
            }
        }
    }

    /// Error recovery after a statement that consumed nothing.
    fn skip_to_next_statement(&mut self) {
        self.next_token();
        while self.current_token() != SyntaxKind::EndOfFileToken {
            match self.current_token() {
                SyntaxKind::VarKeyword
                | SyntaxKind::LetKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::FunctionKeyword
                | SyntaxKind::IfKeyword
                | SyntaxKind::ForKeyword
                | SyntaxKind::WhileKeyword
                | SyntaxKind::DoKeyword
                | SyntaxKind::SwitchKeyword
                | SyntaxKind::ReturnKeyword
                | SyntaxKind::ThrowKeyword
                | SyntaxKind::TryKeyword
                | SyntaxKind::BreakKeyword
                | SyntaxKind::ContinueKeyword
                | SyntaxKind::CloseBraceToken => return,
                _ if self.scanner.has_preceding_line_break() => return,
                _ => {
                    self.next_token();
                }
            }
        }
    }

    fn parse_statement(&mut self) -> Statement<'a> {
        if !self.enter_recursion() {
            let pos = self.token_pos();
            let data = NodeData::new(SyntaxKind::EmptyStatement, pos, pos).with_flags(NodeFlags::MISSING);
            return Statement::EmptyStatement(data);
        }
        let statement = self.parse_statement_worker();
        self.recursion_depth -= 1;
        statement
    }

    fn parse_statement_worker(&mut self) -> Statement<'a> {
        match self.current_token() {
            SyntaxKind::SemicolonToken => {
                let pos = self.token_pos();
                let end = self.token_end();
                self.next_token();
                Statement::EmptyStatement(NodeData::new(SyntaxKind::EmptyStatement, pos, end))
            }
            SyntaxKind::OpenBraceToken => Statement::Block(self.parse_block()),
            SyntaxKind::VarKeyword | SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => {
                self.parse_variable_statement()
            }
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(),
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::ReturnKeyword => self.parse_return_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::ThrowKeyword => self.parse_throw_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::BreakKeyword => self.parse_break_or_continue_statement(true),
            SyntaxKind::ContinueKeyword => self.parse_break_or_continue_statement(false),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            kind @ (SyntaxKind::ClassKeyword
            | SyntaxKind::EnumKeyword
            | SyntaxKind::ExportKeyword
            | SyntaxKind::ImportKeyword
            | SyntaxKind::WithKeyword
            | SyntaxKind::DebuggerKeyword) => self.parse_unsupported_statement(kind.keyword_text().unwrap_or("statement")),
            SyntaxKind::Identifier if self.next_token_is(|kind, _| kind == SyntaxKind::ColonToken) => {
                self.parse_unsupported_statement("labeled statement")
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_unsupported_statement(&mut self, what: &str) -> Statement<'a> {
        let pos = self.token_pos();
        self.unsupported(what);
        self.next_token();
        self.skip_construct();
        let end = self.token_pos();
        let data = NodeData::new(SyntaxKind::EmptyStatement, pos, end).with_flags(NodeFlags::MISSING);
        Statement::EmptyStatement(data)
    }

    fn parse_block(&mut self) -> Block<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let statements = self.allow_in(|p| p.parse_statements());
        let end = self.token_end();
        self.expect_token(SyntaxKind::CloseBraceToken);
        Block {
            data: NodeData::new(SyntaxKind::Block, pos, end),
            statements,
        }
    }

    fn parse_variable_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let declaration_list = self.parse_variable_declaration_list();
        self.check_const_initializers(&declaration_list);
        let end = self.token_end();
        self.parse_expected_semicolon();
        Statement::VariableStatement(VariableStatement {
            data: NodeData::new(SyntaxKind::VariableStatement, pos, end),
            declaration_list,
        })
    }

    fn parse_variable_declaration_list(&mut self) -> VariableDeclarationList<'a> {
        let pos = self.token_pos();
        let flags = match self.current_token() {
            SyntaxKind::LetKeyword => NodeFlags::LET,
            SyntaxKind::ConstKeyword => NodeFlags::CONST,
            _ => NodeFlags::NONE,
        };
        self.next_token();

        let mut declarations = Vec::new();
        loop {
            declarations.push(self.parse_variable_declaration());
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        let end = self.token_end();
        VariableDeclarationList {
            data: NodeData::new(SyntaxKind::VariableDeclarationList, pos, end).with_flags(flags),
            declarations: alloc_slice(self.arena, declarations),
        }
    }

    fn parse_variable_declaration(&mut self) -> VariableDeclaration<'a> {
        let pos = self.token_pos();
        let name = self.parse_binding_identifier();
        let initializer = if self.optional_token(SyntaxKind::EqualsToken) {
            Some(self.parse_assignment_expression_and_alloc())
        } else {
            None
        };
        let end = self.token_end();
        VariableDeclaration {
            data: NodeData::new(SyntaxKind::VariableDeclaration, pos, end),
            name,
            initializer,
        }
    }

    /// `const` needs an initializer everywhere except a `for...in/of` head.
    fn check_const_initializers(&mut self, list: &VariableDeclarationList<'a>) {
        if !list.is_const() {
            return;
        }
        for declaration in list.declarations.iter() {
            if declaration.initializer.is_none() && !declaration.name.data.flags.contains(NodeFlags::MISSING) {
                self.error_at(
                    declaration.name.data.range,
                    &messages::CONST_DECLARATIONS_MUST_BE_INITIALIZED,
                    &[],
                );
            }
        }
    }

    fn parse_expression_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        let expression = self.parse_expression_and_alloc();
        let end = self.token_end();
        self.parse_expected_semicolon();
        Statement::ExpressionStatement(ExpressionStatement {
            data: NodeData::new(SyntaxKind::ExpressionStatement, pos, end),
            expression,
        })
    }

    fn parse_if_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::IfKeyword);
        let expression = self.parse_parenthesized_condition();
        let then_statement = self.arena.alloc(self.parse_statement());
        let else_statement = if self.optional_token(SyntaxKind::ElseKeyword) {
            Some(&*self.arena.alloc(self.parse_statement()))
        } else {
            None
        };
        let end = self.token_end();
        Statement::IfStatement(IfStatement {
            data: NodeData::new(SyntaxKind::IfStatement, pos, end),
            expression,
            then_statement,
            else_statement,
        })
    }

    /// `( expression )` after `if`, `while` and `switch`.
    fn parse_parenthesized_condition(&mut self) -> &'a Expression<'a> {
        self.expect_token(SyntaxKind::OpenParenToken);
        let expression = self.allow_in(|p| p.parse_expression_and_alloc());
        self.expect_token(SyntaxKind::CloseParenToken);
        expression
    }

    fn parse_return_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        if !self.context.in_function {
            self.error(&messages::A_RETURN_STATEMENT_CAN_ONLY_BE_USED_WITHIN_A_FUNCTION_BODY, &[]);
        }
        self.expect_token(SyntaxKind::ReturnKeyword);
        let expression = if !matches!(
            self.current_token(),
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) && !self.scanner.has_preceding_line_break()
        {
            Some(self.parse_expression_and_alloc())
        } else {
            None
        };
        let end = self.token_end();
        self.parse_expected_semicolon();
        Statement::ReturnStatement(ReturnStatement {
            data: NodeData::new(SyntaxKind::ReturnStatement, pos, end),
            expression,
        })
    }

    fn parse_loop_body(&mut self) -> &'a Statement<'a> {
        self.context.iteration_depth += 1;
        let statement = self.parse_statement();
        self.context.iteration_depth -= 1;
        self.arena.alloc(statement)
    }

    fn parse_while_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::WhileKeyword);
        let expression = self.parse_parenthesized_condition();
        let statement = self.parse_loop_body();
        let end = self.token_end();
        Statement::WhileStatement(WhileStatement {
            data: NodeData::new(SyntaxKind::WhileStatement, pos, end),
            expression,
            statement,
        })
    }

    fn parse_do_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::DoKeyword);
        let statement = self.parse_loop_body();
        self.expect_token(SyntaxKind::WhileKeyword);
        let expression = self.parse_parenthesized_condition();
        let end = self.token_end();
        // `do ... while (x)` takes a semicolon only when one is present.
        self.optional_token(SyntaxKind::SemicolonToken);
        Statement::DoStatement(DoStatement {
            data: NodeData::new(SyntaxKind::DoStatement, pos, end),
            statement,
            expression,
        })
    }

    fn parse_for_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ForKeyword);
        if self.is_identifier_text("await") {
            self.unsupported("for await");
            self.next_token();
        }
        self.expect_token(SyntaxKind::OpenParenToken);

        let initializer = if self.current_token() != SyntaxKind::SemicolonToken {
            let saved = self.context.disallow_in;
            self.context.disallow_in = true;
            let initializer = if matches!(
                self.current_token(),
                SyntaxKind::VarKeyword | SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword
            ) {
                ForInitializer::VariableDeclarationList(self.parse_variable_declaration_list())
            } else {
                ForInitializer::Expression(self.parse_expression_and_alloc())
            };
            self.context.disallow_in = saved;
            Some(initializer)
        } else {
            None
        };

        if self.is_identifier_text("of") || self.current_token() == SyntaxKind::InKeyword {
            let is_for_of = self.is_identifier_text("of");
            let initializer = match initializer {
                Some(initializer) => initializer,
                None => {
                    self.error(&messages::EXPRESSION_EXPECTED, &[]);
                    ForInitializer::Expression(self.alloc_missing_expression())
                }
            };
            self.check_for_in_or_of_initializer(&initializer);
            self.next_token();
            let expression = self.allow_in(|p| {
                if is_for_of {
                    p.parse_assignment_expression_and_alloc()
                } else {
                    p.parse_expression_and_alloc()
                }
            });
            self.expect_token(SyntaxKind::CloseParenToken);
            let statement = self.parse_loop_body();
            let end = self.token_end();

            return if is_for_of {
                Statement::ForOfStatement(ForOfStatement {
                    data: NodeData::new(SyntaxKind::ForOfStatement, pos, end),
                    initializer,
                    expression,
                    statement,
                })
            } else {
                Statement::ForInStatement(ForInStatement {
                    data: NodeData::new(SyntaxKind::ForInStatement, pos, end),
                    initializer,
                    expression,
                    statement,
                })
            };
        }

        if let Some(ForInitializer::VariableDeclarationList(ref list)) = initializer {
            self.check_const_initializers(list);
        }
        self.expect_token(SyntaxKind::SemicolonToken);
        let condition = if self.current_token() != SyntaxKind::SemicolonToken {
            Some(self.parse_expression_and_alloc())
        } else {
            None
        };
        self.expect_token(SyntaxKind::SemicolonToken);
        let incrementor = if self.current_token() != SyntaxKind::CloseParenToken {
            Some(self.parse_expression_and_alloc())
        } else {
            None
        };
        self.expect_token(SyntaxKind::CloseParenToken);
        let statement = self.parse_loop_body();
        let end = self.token_end();

        Statement::ForStatement(ForStatement {
            data: NodeData::new(SyntaxKind::ForStatement, pos, end),
            initializer,
            condition,
            incrementor,
            statement,
        })
    }

    fn check_for_in_or_of_initializer(&mut self, initializer: &ForInitializer<'a>) {
        match initializer {
            ForInitializer::VariableDeclarationList(list) => {
                if list.declarations.len() != 1 {
                    self.error_at(
                        list.data.range,
                        &messages::ONLY_A_SINGLE_VARIABLE_DECLARATION_IS_ALLOWED_IN_A_FOR_IN_OR_OF_STATEMENT,
                        &[],
                    );
                }
            }
            ForInitializer::Expression(expr) => {
                if !expr.is_assignment_target() && !expr.data().flags.contains(NodeFlags::MISSING) {
                    self.error_at(expr.range(), &messages::INVALID_ASSIGNMENT_TARGET, &[]);
                }
            }
        }
    }

    fn parse_throw_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::ThrowKeyword);
        // No line terminator is allowed between `throw` and its operand.
        if self.scanner.has_preceding_line_break() {
            self.error(&messages::EXPRESSION_EXPECTED, &[]);
        }
        let expression = self.parse_expression_and_alloc();
        let end = self.token_end();
        self.parse_expected_semicolon();
        Statement::ThrowStatement(ThrowStatement {
            data: NodeData::new(SyntaxKind::ThrowStatement, pos, end),
            expression,
        })
    }

    fn parse_try_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::TryKeyword);
        let try_block = self.parse_block();
        let catch_clause = if self.current_token() == SyntaxKind::CatchKeyword {
            let catch_pos = self.token_pos();
            self.next_token();
            let variable_declaration = if self.optional_token(SyntaxKind::OpenParenToken) {
                let name = self.parse_binding_identifier();
                if self.current_token() == SyntaxKind::EqualsToken {
                    self.error(&messages::CATCH_CLAUSE_VARIABLE_CANNOT_HAVE_AN_INITIALIZER, &[]);
                    self.next_token();
                    self.parse_assignment_expression();
                }
                self.expect_token(SyntaxKind::CloseParenToken);
                Some(name)
            } else {
                None
            };
            let block = self.parse_block();
            let catch_end = self.token_end();
            Some(CatchClause {
                data: NodeData::new(SyntaxKind::CatchClause, catch_pos, catch_end),
                variable_declaration,
                block,
            })
        } else {
            None
        };
        let finally_block = if self.optional_token(SyntaxKind::FinallyKeyword) {
            Some(self.parse_block())
        } else {
            None
        };
        if catch_clause.is_none() && finally_block.is_none() {
            self.error(&messages::_0_EXPECTED, &["catch"]);
        }
        let end = self.token_end();
        Statement::TryStatement(TryStatement {
            data: NodeData::new(SyntaxKind::TryStatement, pos, end),
            try_block,
            catch_clause,
            finally_block,
        })
    }

    fn parse_break_or_continue_statement(&mut self, is_break: bool) -> Statement<'a> {
        let pos = self.token_pos();
        if is_break && self.context.iteration_depth == 0 && self.context.switch_depth == 0 {
            self.error(
                &messages::A_BREAK_STATEMENT_CAN_ONLY_BE_USED_WITHIN_AN_ENCLOSING_ITERATION_OR_SWITCH_STATEMENT,
                &[],
            );
        } else if !is_break && self.context.iteration_depth == 0 {
            self.error(
                &messages::A_CONTINUE_STATEMENT_CAN_ONLY_BE_USED_WITHIN_AN_ENCLOSING_ITERATION_STATEMENT,
                &[],
            );
        }
        self.next_token();
        if self.current_token() == SyntaxKind::Identifier && !self.scanner.has_preceding_line_break() {
            self.unsupported("labeled statement");
            self.next_token();
        }
        let end = self.token_end();
        self.parse_expected_semicolon();
        if is_break {
            Statement::BreakStatement(NodeData::new(SyntaxKind::BreakStatement, pos, end))
        } else {
            Statement::ContinueStatement(NodeData::new(SyntaxKind::ContinueStatement, pos, end))
        }
    }

    fn parse_switch_statement(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::SwitchKeyword);
        let expression = self.parse_parenthesized_condition();

        let case_pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        self.context.switch_depth += 1;
        let mut clauses = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            let clause_pos = self.token_pos();
            match self.current_token() {
                SyntaxKind::CaseKeyword => {
                    self.next_token();
                    let case_expression = self.allow_in(|p| p.parse_expression_and_alloc());
                    self.expect_token(SyntaxKind::ColonToken);
                    let statements = self.parse_case_clause_statements();
                    let clause_end = self.token_pos();
                    clauses.push(CaseOrDefaultClause::CaseClause(CaseClause {
                        data: NodeData::new(SyntaxKind::CaseClause, clause_pos, clause_end),
                        expression: case_expression,
                        statements,
                    }));
                }
                SyntaxKind::DefaultKeyword => {
                    self.next_token();
                    self.expect_token(SyntaxKind::ColonToken);
                    let statements = self.parse_case_clause_statements();
                    let clause_end = self.token_pos();
                    clauses.push(CaseOrDefaultClause::DefaultClause(DefaultClause {
                        data: NodeData::new(SyntaxKind::DefaultClause, clause_pos, clause_end),
                        statements,
                    }));
                }
                _ => {
                    self.error(&messages::_0_EXPECTED, &["case"]);
                    self.next_token();
                }
            }
        }
        self.context.switch_depth -= 1;
        let case_end = self.token_end();
        self.expect_token(SyntaxKind::CloseBraceToken);
        let end = self.token_end();

        Statement::SwitchStatement(SwitchStatement {
            data: NodeData::new(SyntaxKind::SwitchStatement, pos, end),
            expression,
            case_block: CaseBlock {
                data: NodeData::new(SyntaxKind::CaseBlock, case_pos, case_end),
                clauses: alloc_slice(self.arena, clauses),
            },
        })
    }

    fn parse_case_clause_statements(&mut self) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CaseKeyword
                | SyntaxKind::DefaultKeyword
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EndOfFileToken
        ) {
            let saved_pos = self.scanner.token_start();
            statements.push(self.parse_statement());
            if self.scanner.token_start() == saved_pos {
                self.skip_to_next_statement();
            }
        }
        alloc_slice(self.arena, statements)
    }

    // ========================================================================
    // Functions
    // ========================================================================

    fn parse_function_declaration(&mut self) -> Statement<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::FunctionKeyword);
        if self.current_token() == SyntaxKind::AsteriskToken {
            self.unsupported("generator function");
            self.next_token();
        }
        let name = self.parse_binding_identifier();
        let parameters = self.parse_parameter_list();
        let body = self.parse_function_body();
        let end = self.token_end();
        Statement::FunctionDeclaration(FunctionDeclaration {
            data: NodeData::new(SyntaxKind::FunctionDeclaration, pos, end),
            name,
            parameters,
            body,
        })
    }

    fn parse_parameter_list(&mut self) -> &'a [ParameterDeclaration<'a>] {
        self.expect_token(SyntaxKind::OpenParenToken);
        let mut parameters = Vec::new();
        while !matches!(
            self.current_token(),
            SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
        ) {
            parameters.push(self.parse_parameter());
            if !self.optional_token(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.expect_token(SyntaxKind::CloseParenToken);
        alloc_slice(self.arena, parameters)
    }

    fn parse_parameter(&mut self) -> ParameterDeclaration<'a> {
        let pos = self.token_pos();
        if self.current_token() == SyntaxKind::DotDotDotToken {
            self.unsupported("rest parameter");
            self.next_token();
        }
        let name = self.parse_binding_identifier();
        let initializer = if self.optional_token(SyntaxKind::EqualsToken) {
            Some(self.allow_in(|p| p.parse_assignment_expression_and_alloc()))
        } else {
            None
        };
        let end = self.token_end();
        ParameterDeclaration {
            data: NodeData::new(SyntaxKind::Parameter, pos, end),
            name,
            initializer,
        }
    }

    /// A function body, with `return` allowed and loop/switch context reset.
    fn parse_function_body(&mut self) -> &'a Block<'a> {
        let saved = self.context;
        self.context = ParseContext {
            in_function: true,
            ..ParseContext::default()
        };
        let mut body = self.parse_block();
        self.context = saved;
        if self.has_use_strict_directive(body.statements) {
            body.data.flags |= NodeFlags::STRICT_MODE;
        }
        self.arena.alloc(body)
    }

    /// Whether the directive prologue of a statement list holds `"use strict"`.
    fn has_use_strict_directive(&self, statements: &[Statement<'a>]) -> bool {
        for statement in statements {
            let Statement::ExpressionStatement(expr_stmt) = statement else {
                return false;
            };
            let Expression::StringLiteral(literal) = expr_stmt.expression else {
                return false;
            };
            let raw = self
                .scanner
                .text_slice(literal.data.range.pos as usize, literal.data.range.end as usize);
            if raw == "\"use strict\"" || raw == "'use strict'" {
                return true;
            }
        }
        false
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression_and_alloc(&mut self) -> &'a Expression<'a> {
        let expr = self.parse_expression();
        self.arena.alloc(expr)
    }

    fn parse_assignment_expression_and_alloc(&mut self) -> &'a Expression<'a> {
        let expr = self.parse_assignment_expression();
        self.arena.alloc(expr)
    }

    /// `a, b, c` as nested comma `BinaryExpression`s.
    fn parse_expression(&mut self) -> Expression<'a> {
        let mut expr = self.parse_assignment_expression();
        while self.current_token() == SyntaxKind::CommaToken {
            let pos = expr.range().pos;
            let operator_token = Token::new(SyntaxKind::CommaToken, self.token_pos(), self.token_end());
            self.next_token();
            let right = self.parse_assignment_expression();
            let end = right.range().end;
            expr = Expression::Binary(BinaryExpression {
                data: NodeData::new(SyntaxKind::BinaryExpression, pos, end),
                left: self.arena.alloc(expr),
                operator_token,
                right: self.arena.alloc(right),
            });
        }
        expr
    }

    fn parse_assignment_expression(&mut self) -> Expression<'a> {
        if !self.enter_recursion() {
            return self.missing_expression();
        }
        let expr = self.parse_conditional_expression();

        let expr = if self.current_token().is_assignment_operator() {
            if !expr.is_assignment_target() && !expr.data().flags.contains(NodeFlags::MISSING) {
                self.error_at(expr.range(), &messages::INVALID_ASSIGNMENT_TARGET, &[]);
            }
            let pos = expr.range().pos;
            let operator_token = Token::new(self.current_token(), self.token_pos(), self.token_end());
            self.next_token();
            let right = self.parse_assignment_expression();
            let end = right.range().end;
            Expression::Binary(BinaryExpression {
                data: NodeData::new(SyntaxKind::BinaryExpression, pos, end),
                left: self.arena.alloc(expr),
                operator_token,
                right: self.arena.alloc(right),
            })
        } else {
            expr
        };

        self.recursion_depth -= 1;
        expr
    }

    fn parse_conditional_expression(&mut self) -> Expression<'a> {
        let expr = self.parse_binary_expression(OperatorPrecedence::Comma);

        if self.current_token() != SyntaxKind::QuestionToken {
            return expr;
        }
        let pos = expr.range().pos;
        self.next_token();
        let when_true = self.allow_in(|p| p.parse_assignment_expression_and_alloc());
        self.expect_token(SyntaxKind::ColonToken);
        let when_false = self.parse_assignment_expression_and_alloc();
        let end = when_false.range().end;
        Expression::Conditional(ConditionalExpression {
            data: NodeData::new(SyntaxKind::ConditionalExpression, pos, end),
            condition: self.arena.alloc(expr),
            when_true,
            when_false,
        })
    }

    fn parse_binary_expression(&mut self, min_precedence: OperatorPrecedence) -> Expression<'a> {
        let mut left = self.parse_unary_expression();

        loop {
            let kind = self.current_token();
            if kind == SyntaxKind::InKeyword && self.context.disallow_in {
                break;
            }
            let precedence = get_binary_operator_precedence(kind);
            if precedence == OperatorPrecedence::Invalid || precedence <= min_precedence {
                break;
            }
            if kind == SyntaxKind::InstanceOfKeyword {
                self.unsupported("instanceof");
            }

            let pos = left.range().pos;
            let operator_token = Token::new(kind, self.token_pos(), self.token_end());
            self.next_token();
            // `**` is right-associative.
            let right_precedence = if kind == SyntaxKind::AsteriskAsteriskToken {
                OperatorPrecedence::Multiplicative
            } else {
                precedence
            };
            let right = self.parse_binary_expression(right_precedence);
            let end = right.range().end;
            left = Expression::Binary(BinaryExpression {
                data: NodeData::new(SyntaxKind::BinaryExpression, pos, end),
                left: self.arena.alloc(left),
                operator_token,
                right: self.arena.alloc(right),
            });
        }

        left
    }

    fn parse_unary_expression(&mut self) -> Expression<'a> {
        if !self.enter_recursion() {
            return self.missing_expression();
        }
        let expr = self.parse_unary_expression_worker();
        self.recursion_depth -= 1;
        expr
    }

    fn parse_unary_expression_worker(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        match self.current_token() {
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                let operator = self.current_token();
                self.next_token();
                let operand = self.parse_unary_expression();
                if !operand.is_assignment_target() && !operand.data().flags.contains(NodeFlags::MISSING) {
                    self.error_at(operand.range(), &messages::INVALID_UPDATE_OPERAND, &[]);
                }
                let end = operand.range().end;
                Expression::PrefixUnary(PrefixUnaryExpression {
                    data: NodeData::new(SyntaxKind::PrefixUnaryExpression, pos, end),
                    operator,
                    operand: self.arena.alloc(operand),
                })
            }
            SyntaxKind::PlusToken | SyntaxKind::MinusToken | SyntaxKind::TildeToken | SyntaxKind::ExclamationToken => {
                let operator = self.current_token();
                self.next_token();
                let operand = self.parse_unary_expression();
                let end = operand.range().end;
                Expression::PrefixUnary(PrefixUnaryExpression {
                    data: NodeData::new(SyntaxKind::PrefixUnaryExpression, pos, end),
                    operator,
                    operand: self.arena.alloc(operand),
                })
            }
            SyntaxKind::TypeOfKeyword => {
                self.next_token();
                let expression = self.parse_unary_expression();
                let end = expression.range().end;
                Expression::TypeOf(TypeOfExpression {
                    data: NodeData::new(SyntaxKind::TypeOfExpression, pos, end),
                    expression: self.arena.alloc(expression),
                })
            }
            SyntaxKind::VoidKeyword => {
                self.next_token();
                let expression = self.parse_unary_expression();
                let end = expression.range().end;
                Expression::Void(VoidExpression {
                    data: NodeData::new(SyntaxKind::VoidExpression, pos, end),
                    expression: self.arena.alloc(expression),
                })
            }
            SyntaxKind::DeleteKeyword => {
                self.unsupported("delete");
                self.next_token();
                self.parse_unary_expression()
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> Expression<'a> {
        let expr = self.parse_left_hand_side_expression();
        if self.scanner.has_preceding_line_break()
            || !matches!(
                self.current_token(),
                SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
            )
        {
            return expr;
        }
        if !expr.is_assignment_target() && !expr.data().flags.contains(NodeFlags::MISSING) {
            self.error_at(expr.range(), &messages::INVALID_UPDATE_OPERAND, &[]);
        }
        let pos = expr.range().pos;
        let operator = self.current_token();
        let end = self.token_end();
        self.next_token();
        Expression::PostfixUnary(PostfixUnaryExpression {
            data: NodeData::new(SyntaxKind::PostfixUnaryExpression, pos, end),
            operand: self.arena.alloc(expr),
            operator,
        })
    }

    fn parse_left_hand_side_expression(&mut self) -> Expression<'a> {
        let mut expr = self.parse_primary_expression();

        loop {
            let pos = expr.range().pos;
            match self.current_token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let name = self.parse_identifier_name();
                    let end = name.data.range.end;
                    expr = Expression::PropertyAccess(PropertyAccessExpression {
                        data: NodeData::new(SyntaxKind::PropertyAccessExpression, pos, end),
                        expression: self.arena.alloc(expr),
                        question_dot_token: None,
                        name,
                    });
                }
                SyntaxKind::QuestionDotToken => {
                    let question_dot = Token::new(SyntaxKind::QuestionDotToken, self.token_pos(), self.token_end());
                    self.next_token();
                    expr = match self.current_token() {
                        SyntaxKind::OpenBracketToken => self.parse_element_access_rest(expr, Some(question_dot)),
                        SyntaxKind::OpenParenToken => {
                            let (arguments, end) = self.parse_argument_list();
                            Expression::Call(CallExpression {
                                data: NodeData::new(SyntaxKind::CallExpression, pos, end),
                                expression: self.arena.alloc(expr),
                                question_dot_token: Some(question_dot),
                                arguments,
                            })
                        }
                        _ => {
                            let name = self.parse_identifier_name();
                            let end = name.data.range.end;
                            Expression::PropertyAccess(PropertyAccessExpression {
                                data: NodeData::new(SyntaxKind::PropertyAccessExpression, pos, end),
                                expression: self.arena.alloc(expr),
                                question_dot_token: Some(question_dot),
                                name,
                            })
                        }
                    };
                }
                SyntaxKind::OpenBracketToken => {
                    expr = self.parse_element_access_rest(expr, None);
                }
                SyntaxKind::OpenParenToken => {
                    let (arguments, end) = self.parse_argument_list();
                    expr = Expression::Call(CallExpression {
                        data: NodeData::new(SyntaxKind::CallExpression, pos, end),
                        expression: self.arena.alloc(expr),
                        question_dot_token: None,
                        arguments,
                    });
                }
                SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                    self.unsupported("tagged template");
                    self.parse_template_expression();
                }
                _ => break,
            }
        }

        expr
    }

    /// `[argument]` after a member expression; the current token is `[`.
    fn parse_element_access_rest(&mut self, expr: Expression<'a>, question_dot: Option<Token>) -> Expression<'a> {
        let pos = expr.range().pos;
        self.expect_token(SyntaxKind::OpenBracketToken);
        let argument_expression = self.allow_in(|p| p.parse_expression_and_alloc());
        let end = self.token_end();
        self.expect_token(SyntaxKind::CloseBracketToken);
        Expression::ElementAccess(ElementAccessExpression {
            data: NodeData::new(SyntaxKind::ElementAccessExpression, pos, end),
            expression: self.arena.alloc(expr),
            question_dot_token: question_dot,
            argument_expression,
        })
    }

    /// `( args )`, returning the arguments and the end of the `)`.
    fn parse_argument_list(&mut self) -> (&'a [Expression<'a>], u32) {
        self.expect_token(SyntaxKind::OpenParenToken);
        let mut arguments = Vec::new();
        self.allow_in(|p| {
            while !matches!(
                p.current_token(),
                SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
            ) {
                if p.current_token() == SyntaxKind::DotDotDotToken {
                    p.unsupported("spread syntax");
                    p.next_token();
                }
                arguments.push(p.parse_assignment_expression());
                if !p.optional_token(SyntaxKind::CommaToken) {
                    break;
                }
            }
        });
        let end = self.token_end();
        self.expect_token(SyntaxKind::CloseParenToken);
        (alloc_slice(self.arena, arguments), end)
    }

    fn parse_primary_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let end = self.token_end();
        match self.current_token() {
            SyntaxKind::Identifier => {
                if self.is_identifier_text("async")
                    && self.next_token_is(|kind, line_break| {
                        !line_break && matches!(kind, SyntaxKind::FunctionKeyword | SyntaxKind::Identifier)
                    })
                {
                    self.unsupported("async function");
                    self.next_token();
                    return self.parse_primary_expression();
                }
                let id = self.parse_identifier();
                if self.current_token() == SyntaxKind::EqualsGreaterThanToken {
                    return self.parse_arrow_function_after_identifier(id);
                }
                Expression::Identifier(id)
            }
            SyntaxKind::NumericLiteral => {
                let text_name = self.token_value().to_string();
                let value = parse_numeric_literal(&text_name, self.scanner.token_flags());
                self.next_token();
                Expression::NumericLiteral(NumericLiteral {
                    data: NodeData::new(SyntaxKind::NumericLiteral, pos, end),
                    value,
                    text_name,
                })
            }
            SyntaxKind::StringLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                Expression::StringLiteral(StringLiteral {
                    data: NodeData::new(SyntaxKind::StringLiteral, pos, end),
                    value,
                })
            }
            SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateHead => {
                self.parse_template_expression()
            }
            SyntaxKind::TrueKeyword => {
                self.next_token();
                Expression::TrueKeyword(NodeData::new(SyntaxKind::TrueKeyword, pos, end))
            }
            SyntaxKind::FalseKeyword => {
                self.next_token();
                Expression::FalseKeyword(NodeData::new(SyntaxKind::FalseKeyword, pos, end))
            }
            SyntaxKind::NullKeyword => {
                self.next_token();
                Expression::NullKeyword(NodeData::new(SyntaxKind::NullKeyword, pos, end))
            }
            SyntaxKind::ThisKeyword => {
                self.next_token();
                Expression::ThisKeyword(NodeData::new(SyntaxKind::ThisKeyword, pos, end))
            }
            SyntaxKind::OpenParenToken => self.parse_parenthesized_expression(),
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::FunctionKeyword => self.parse_function_expression(),
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.unsupported("regular expression literal");
                self.next_token();
                while !matches!(
                    self.current_token(),
                    SyntaxKind::SlashToken | SyntaxKind::EndOfFileToken
                ) && !self.scanner.has_preceding_line_break()
                {
                    self.next_token();
                }
                self.optional_token(SyntaxKind::SlashToken);
                self.missing_expression()
            }
            SyntaxKind::NewKeyword => {
                self.unsupported("new");
                self.next_token();
                self.parse_primary_expression()
            }
            SyntaxKind::ClassKeyword => {
                self.unsupported("class");
                self.next_token();
                self.skip_construct();
                self.missing_expression()
            }
            SyntaxKind::DotDotDotToken => {
                self.unsupported("spread syntax");
                self.next_token();
                self.parse_primary_expression()
            }
            kind if kind.is_unsupported_keyword() => {
                self.unsupported(kind.keyword_text().unwrap_or("keyword"));
                self.next_token();
                self.missing_expression()
            }
            _ => self.parse_missing_expression(),
        }
    }

    fn missing_expression(&self) -> Expression<'a> {
        let pos = self.token_pos();
        Expression::OmittedExpression(
            NodeData::new(SyntaxKind::OmittedExpression, pos, pos).with_flags(NodeFlags::MISSING),
        )
    }

    fn alloc_missing_expression(&mut self) -> &'a Expression<'a> {
        let expr = self.missing_expression();
        self.arena.alloc(expr)
    }

    /// Report a missing expression. Closing punctuation is left for the
    /// enclosing construct to consume.
    fn parse_missing_expression(&mut self) -> Expression<'a> {
        self.error(&messages::EXPRESSION_EXPECTED, &[]);
        let expr = self.missing_expression();
        if !matches!(
            self.current_token(),
            SyntaxKind::CloseBraceToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::EndOfFileToken
        ) {
            self.next_token();
        }
        expr
    }

    fn parse_parenthesized_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        if self.is_parenthesized_arrow_function() {
            let parameters = self.parse_parameter_list();
            return self.parse_arrow_function_body(pos, parameters);
        }

        self.expect_token(SyntaxKind::OpenParenToken);
        let expression = self.allow_in(|p| p.parse_expression_and_alloc());
        let end = self.token_end();
        self.expect_token(SyntaxKind::CloseParenToken);
        Expression::Parenthesized(ParenthesizedExpression {
            data: NodeData::new(SyntaxKind::ParenthesizedExpression, pos, end),
            expression,
        })
    }

    /// Lookahead from `(`: the parentheses start an arrow function exactly
    /// when their matching `)` is followed by `=>`.
    fn is_parenthesized_arrow_function(&mut self) -> bool {
        self.scanner.look_ahead(|scanner| {
            let mut depth = 1u32;
            loop {
                match scanner.scan() {
                    SyntaxKind::OpenParenToken => depth += 1,
                    SyntaxKind::CloseParenToken => {
                        depth -= 1;
                        if depth == 0 {
                            return scanner.scan() == SyntaxKind::EqualsGreaterThanToken;
                        }
                    }
                    SyntaxKind::EndOfFileToken => return false,
                    _ => {}
                }
            }
        })
    }

    fn parse_arrow_function_after_identifier(&mut self, id: Identifier) -> Expression<'a> {
        let pos = id.data.range.pos;
        let parameter = ParameterDeclaration {
            data: NodeData::new(SyntaxKind::Parameter, pos, id.data.range.end),
            name: id,
            initializer: None,
        };
        let parameters = alloc_slice(self.arena, vec![parameter]);
        self.parse_arrow_function_body(pos, parameters)
    }

    fn parse_arrow_function_body(&mut self, pos: u32, parameters: &'a [ParameterDeclaration<'a>]) -> Expression<'a> {
        if self.scanner.has_preceding_line_break() {
            self.error(&messages::LINE_TERMINATOR_NOT_PERMITTED_BEFORE_ARROW, &[]);
        }
        self.expect_token(SyntaxKind::EqualsGreaterThanToken);
        let body = if self.current_token() == SyntaxKind::OpenBraceToken {
            ArrowFunctionBody::Block(self.parse_function_body())
        } else {
            let saved = self.context;
            self.context = ParseContext {
                in_function: true,
                disallow_in: saved.disallow_in,
                ..ParseContext::default()
            };
            let expr = self.parse_assignment_expression_and_alloc();
            self.context = saved;
            ArrowFunctionBody::Expression(expr)
        };
        let end = match body {
            ArrowFunctionBody::Block(block) => block.data.range.end,
            ArrowFunctionBody::Expression(expr) => expr.range().end,
        };
        Expression::ArrowFunction(ArrowFunction {
            data: NodeData::new(SyntaxKind::ArrowFunction, pos, end),
            parameters,
            body,
        })
    }

    fn parse_function_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::FunctionKeyword);
        if self.current_token() == SyntaxKind::AsteriskToken {
            self.unsupported("generator function");
            self.next_token();
        }
        let name = if self.current_token() == SyntaxKind::Identifier {
            Some(self.parse_identifier())
        } else {
            None
        };
        let parameters = self.parse_parameter_list();
        let body = self.parse_function_body();
        let end = body.data.range.end;
        Expression::FunctionExpression(FunctionExpression {
            data: NodeData::new(SyntaxKind::FunctionExpression, pos, end),
            name,
            parameters,
            body,
        })
    }

    fn parse_array_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        self.allow_in(|p| {
            while !matches!(
                p.current_token(),
                SyntaxKind::CloseBracketToken | SyntaxKind::EndOfFileToken
            ) {
                if p.current_token() == SyntaxKind::CommaToken {
                    let hole_pos = p.token_pos();
                    elements.push(Expression::OmittedExpression(NodeData::new(
                        SyntaxKind::OmittedExpression,
                        hole_pos,
                        hole_pos,
                    )));
                } else {
                    if p.current_token() == SyntaxKind::DotDotDotToken {
                        p.unsupported("spread syntax");
                        p.next_token();
                    }
                    elements.push(p.parse_assignment_expression());
                }
                if !p.optional_token(SyntaxKind::CommaToken) {
                    break;
                }
            }
        });
        let end = self.token_end();
        self.expect_token(SyntaxKind::CloseBracketToken);
        Expression::ArrayLiteral(ArrayLiteralExpression {
            data: NodeData::new(SyntaxKind::ArrayLiteralExpression, pos, end),
            elements: alloc_slice(self.arena, elements),
        })
    }

    fn parse_object_literal(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        self.expect_token(SyntaxKind::OpenBraceToken);
        let mut properties = Vec::new();
        self.allow_in(|p| {
            while !matches!(
                p.current_token(),
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                if let Some(element) = p.parse_object_literal_element() {
                    properties.push(element);
                }
                if !p.optional_token(SyntaxKind::CommaToken) {
                    break;
                }
            }
        });
        let end = self.token_end();
        self.expect_token(SyntaxKind::CloseBraceToken);
        Expression::ObjectLiteral(ObjectLiteralExpression {
            data: NodeData::new(SyntaxKind::ObjectLiteralExpression, pos, end),
            properties: alloc_slice(self.arena, properties),
        })
    }

    fn is_start_of_property_name(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            SyntaxKind::Identifier
                | SyntaxKind::StringLiteral
                | SyntaxKind::NumericLiteral
                | SyntaxKind::OpenBracketToken
        ) || kind.is_keyword()
    }

    fn parse_object_literal_element(&mut self) -> Option<ObjectLiteralElement<'a>> {
        let pos = self.token_pos();

        if self.current_token() == SyntaxKind::DotDotDotToken {
            self.unsupported("spread syntax");
            self.next_token();
            self.parse_assignment_expression();
            return None;
        }
        if (self.is_identifier_text("get") || self.is_identifier_text("set") || self.is_identifier_text("async"))
            && self.next_token_is(|kind, _| Self::is_start_of_property_name(kind))
        {
            let what = if self.is_identifier_text("async") { "async method" } else { "accessor" };
            self.unsupported(what);
            self.next_token();
        }
        if self.current_token() == SyntaxKind::AsteriskToken {
            self.unsupported("generator method");
            self.next_token();
        }

        let name = self.parse_property_name()?;

        if self.current_token() == SyntaxKind::OpenParenToken {
            let method_name = name.static_text().map(|text| {
                let range = match &name {
                    PropertyName::Identifier(id) => id.data.range,
                    PropertyName::StringLiteral(s) => s.data.range,
                    PropertyName::NumericLiteral(n) => n.data.range,
                    PropertyName::Computed(expr) => expr.range(),
                };
                self.make_identifier(&text, range.pos, range.end)
            });
            let parameters = self.parse_parameter_list();
            let body = self.parse_function_body();
            let end = body.data.range.end;
            let method = Expression::FunctionExpression(FunctionExpression {
                data: NodeData::new(SyntaxKind::FunctionExpression, pos, end).with_flags(NodeFlags::METHOD),
                name: method_name,
                parameters,
                body,
            });
            return Some(ObjectLiteralElement::PropertyAssignment(PropertyAssignment {
                data: NodeData::new(SyntaxKind::PropertyAssignment, pos, end),
                name,
                initializer: self.arena.alloc(method),
            }));
        }

        if self.optional_token(SyntaxKind::ColonToken) {
            let initializer = self.parse_assignment_expression_and_alloc();
            let end = initializer.range().end;
            return Some(ObjectLiteralElement::PropertyAssignment(PropertyAssignment {
                data: NodeData::new(SyntaxKind::PropertyAssignment, pos, end),
                name,
                initializer,
            }));
        }

        match name {
            PropertyName::Identifier(id)
                if matches!(
                    self.current_token(),
                    SyntaxKind::CommaToken | SyntaxKind::CloseBraceToken
                ) && !id.data.flags.contains(NodeFlags::MISSING) =>
            {
                let end = id.data.range.end;
                Some(ObjectLiteralElement::ShorthandPropertyAssignment(ShorthandPropertyAssignment {
                    data: NodeData::new(SyntaxKind::ShorthandPropertyAssignment, pos, end),
                    name: id,
                }))
            }
            _ => {
                self.error(&messages::_0_EXPECTED, &[":"]);
                None
            }
        }
    }

    fn parse_property_name(&mut self) -> Option<PropertyName<'a>> {
        let pos = self.token_pos();
        let end = self.token_end();
        match self.current_token() {
            SyntaxKind::StringLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                Some(PropertyName::StringLiteral(StringLiteral {
                    data: NodeData::new(SyntaxKind::StringLiteral, pos, end),
                    value,
                }))
            }
            SyntaxKind::NumericLiteral => {
                let text_name = self.token_value().to_string();
                let value = parse_numeric_literal(&text_name, self.scanner.token_flags());
                self.next_token();
                Some(PropertyName::NumericLiteral(NumericLiteral {
                    data: NodeData::new(SyntaxKind::NumericLiteral, pos, end),
                    value,
                    text_name,
                }))
            }
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let expression = self.parse_assignment_expression_and_alloc();
                self.expect_token(SyntaxKind::CloseBracketToken);
                Some(PropertyName::Computed(expression))
            }
            kind if kind == SyntaxKind::Identifier || kind.is_keyword() => {
                Some(PropertyName::Identifier(self.parse_identifier_name()))
            }
            _ => {
                self.error(&messages::PROPERTY_ASSIGNMENT_EXPECTED, &[]);
                if !matches!(
                    self.current_token(),
                    SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
                ) {
                    self.next_token();
                }
                None
            }
        }
    }

    fn parse_template_expression(&mut self) -> Expression<'a> {
        let pos = self.token_pos();
        let head = self.token_value().to_string();
        if self.current_token() == SyntaxKind::NoSubstitutionTemplateLiteral {
            let end = self.token_end();
            self.next_token();
            return Expression::TemplateExpression(TemplateExpression {
                data: NodeData::new(SyntaxKind::TemplateExpression, pos, end),
                head,
                template_spans: &[],
            });
        }

        self.next_token();
        let mut spans = Vec::new();
        loop {
            let span_pos = self.token_pos();
            let expression = self.allow_in(|p| p.parse_expression_and_alloc());
            let (kind, literal) = if self.current_token() == SyntaxKind::CloseBraceToken {
                let kind = self.scanner.rescan_template_token();
                let literal = self.token_value().to_string();
                (kind, literal)
            } else {
                self.error(&messages::_0_EXPECTED, &["}"]);
                (SyntaxKind::TemplateTail, String::new())
            };
            let span_end = self.token_end();
            spans.push(TemplateSpan {
                data: NodeData::new(SyntaxKind::TemplateSpan, span_pos, span_end),
                expression,
                literal,
            });
            if kind == SyntaxKind::TemplateTail || self.current_token() == SyntaxKind::EndOfFileToken {
                if kind == SyntaxKind::TemplateTail && self.current_token() == SyntaxKind::TemplateTail {
                    self.next_token();
                }
                break;
            }
            self.next_token();
        }
        let end = spans.last().map(|s| s.data.range.end).unwrap_or(pos);
        Expression::TemplateExpression(TemplateExpression {
            data: NodeData::new(SyntaxKind::TemplateExpression, pos, end),
            head,
            template_spans: alloc_slice(self.arena, spans),
        })
    }
}
