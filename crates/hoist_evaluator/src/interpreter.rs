//! The evaluator driver: walks statements and expressions over the scope
//! chain.
//!
//! Every scope the driver pushes is popped on the way out, whether the body
//! completed normally or an exception is propagating, so a `catch` always
//! resumes with the chain it started with.

use crate::builtins::{install_globals, Intrinsics};
use crate::console::Console;
use crate::error::{AccessKind, Exception, RuntimeError};
use crate::number::{format_number, to_int32};
use crate::operators;
use crate::value::*;
use hoist_ast::node::*;
use hoist_ast::types::NodeFlags;
use hoist_ast::SyntaxKind;
use hoist_binder::{
    hoist_case_block, hoist_declarations, DeclarationKind, HoistedDeclarations, Name, Scope, ScopeChain, ScopeError,
    ScopeKind, ScopeRef,
};
use hoist_core::intern::StringInterner;
use hoist_core::text::{LineMap, TextRange};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Index writes at or past this bound raise `RangeError: Invalid array length`.
const MAX_ARRAY_LENGTH: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Evaluate every function as if it opened with `"use strict"`.
    pub strict: bool,
    pub max_call_depth: u32,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_call_depth: 512,
        }
    }
}

/// How a statement finished.
enum Completion<'a> {
    Normal,
    Return(Value<'a>),
    Break,
    Continue,
}

type ExecResult<'a> = EvalResult<'a, Completion<'a>>;

/// A place an assignment or update writes to.
enum Reference<'a> {
    Binding(&'a Identifier),
    Property { base: Value<'a>, key: Rc<str> },
}

/// What a `for … of` walks. Arrays are read live so that a body that
/// pushes onto the array sees the new elements.
enum IterationSource<'a> {
    Items(Vec<Value<'a>>),
    LiveArray(ArrayRef<'a>),
}

impl<'a> IterationSource<'a> {
    fn get(&self, index: usize) -> Option<Value<'a>> {
        match self {
            IterationSource::Items(items) => items.get(index).cloned(),
            IterationSource::LiveArray(array) => array.borrow().elements.get(index).cloned(),
        }
    }
}

struct ScriptSource<'a> {
    file: &'a SourceFile<'a>,
    line_map: LineMap,
}

pub struct Interpreter<'a> {
    chain: ScopeChain<Value<'a>>,
    interner: StringInterner,
    options: InterpreterOptions,
    console: Box<dyn Console>,
    intrinsics: Intrinsics<'a>,
    source: Option<ScriptSource<'a>>,
    this_value: Value<'a>,
    strict: bool,
    call_depth: u32,
    /// Number of `try` blocks with a `catch` currently being executed.
    handler_depth: u32,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter with the builtins installed. `interner` must be
    /// the one the script was parsed with.
    pub fn new(interner: StringInterner, options: InterpreterOptions, console: Box<dyn Console>) -> Self {
        let interpreter = Self {
            chain: ScopeChain::new(),
            interner,
            options,
            console,
            intrinsics: Intrinsics::new(),
            source: None,
            this_value: Value::Undefined,
            strict: options.strict,
            call_depth: 0,
            handler_depth: 0,
        };
        if let Err(error) = install_globals(&interpreter) {
            warn!(%error, "failed to install builtins");
        }
        interpreter
    }

    pub fn options(&self) -> InterpreterOptions {
        self.options
    }

    /// Whether the code currently executing is strict.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Hoist and run a script's top level in the global scope.
    pub fn run_script(&mut self, file: &'a SourceFile<'a>) -> EvalResult<'a, ()> {
        self.source = Some(ScriptSource {
            file,
            line_map: LineMap::new(&file.text),
        });
        self.strict = self.options.strict || file.is_strict();
        debug!(file = %file.file_name, strict = self.strict, "run script");

        let result = self
            .hoist_scope(&hoist_declarations(file.statements))
            .and_then(|()| self.execute_statements(file.statements));
        match result {
            Ok(_) => Ok(()),
            Err(exception) => {
                warn!(kind = %exception.kind_name(), message = %exception.message(), "uncaught exception");
                Err(exception)
            }
        }
    }

    /// Call the global function `name` with no arguments.
    pub fn call_entry(&mut self, name: &str) -> EvalResult<'a, Value<'a>> {
        debug!(entry = name, "call entry point");
        let value = self.global(name)?;
        match &value {
            Value::Function(function) => self.call_function(function, Value::Undefined, &[]),
            _ => Err(RuntimeError::NotCallable(name.to_string()).into()),
        }
    }

    /// Resolve `name` from the current scope outward. Between statements
    /// of the top level that is the global scope.
    pub fn global(&self, name: &str) -> EvalResult<'a, Value<'a>> {
        let key = self.interner.intern(name);
        Ok(self.chain.lookup(Name::new(key, name))?)
    }

    pub fn call_value(&mut self, callee: &Value<'a>, this: Value<'a>, args: &[Value<'a>]) -> EvalResult<'a, Value<'a>> {
        match callee {
            Value::Function(function) => self.call_function(function, this, args),
            other => Err(RuntimeError::Type(format!("{} is not a function", crate::inspect::inspect(other))).into()),
        }
    }

    pub fn call_function(
        &mut self,
        function: &FunctionRef<'a>,
        this: Value<'a>,
        args: &[Value<'a>],
    ) -> EvalResult<'a, Value<'a>> {
        match &function.kind {
            FunctionKind::Native { call, .. } => {
                let call = *call;
                call(self, &this, args)
            }
            FunctionKind::Closure(closure) => self.call_closure(function, closure, this, args),
        }
    }

    /// Write one line to the console.
    pub fn log(&mut self, line: &str) {
        self.console.log(line);
    }

    pub(crate) fn define_global(&self, name: &str, kind: DeclarationKind, value: Value<'a>) -> Result<(), ScopeError> {
        let key = self.interner.intern(name);
        self.chain.declare_builtin(Name::new(key, name), kind, value)
    }

    // ========================================================================
    // Scopes and closures
    // ========================================================================

    /// Push a scope of `kind`, run `body` in it, and pop it again whatever
    /// the outcome.
    fn in_scope<T>(
        &mut self,
        kind: ScopeKind,
        body: impl FnOnce(&mut Self) -> EvalResult<'a, T>,
    ) -> EvalResult<'a, T> {
        self.chain.enter_scope(kind);
        let result = body(self);
        self.chain.exit_block();
        result
    }

    /// Install a pre-scanned statement list's declarations in the current
    /// scope.
    fn hoist_scope(&self, hoisted: &HoistedDeclarations<'a>) -> EvalResult<'a, ()> {
        let result = self.chain.hoist(hoisted, |decl, scope| {
            self.make_closure(
                &decl.name.text_name,
                decl.parameters,
                FunctionBody::Block(decl.body),
                scope,
                None,
                decl.data.range,
            )
        });
        result.map_err(|error| {
            let site = duplicate_site(hoisted, &error);
            let exception = Exception::from(error);
            match site {
                Some(range) => exception.at(range),
                None => exception,
            }
        })
    }

    fn make_closure(
        &self,
        name: &str,
        parameters: &'a [ParameterDeclaration<'a>],
        body: FunctionBody<'a>,
        scope: ScopeRef<Value<'a>>,
        lexical_this: Option<Value<'a>>,
        range: TextRange,
    ) -> Value<'a> {
        let strict = self.strict || matches!(body, FunctionBody::Block(block) if block.data.flags.contains(NodeFlags::STRICT_MODE));
        debug!(function = name, strict, arrow = lexical_this.is_some(), "create closure");
        let closure = Closure {
            parameters,
            body,
            scope,
            lexical_this,
            strict,
            source: self.source_slice(range),
        };
        Value::Function(Rc::new(FunctionObject::new(Rc::from(name), FunctionKind::Closure(closure))))
    }

    /// Script text covered by `range`, or `""` when no script is loaded.
    fn source_slice(&self, range: TextRange) -> &'a str {
        match &self.source {
            Some(source) => {
                let file: &'a SourceFile<'a> = source.file;
                file.text.get(source.line_map.byte_range(range)).unwrap_or("")
            }
            None => "",
        }
    }

    fn call_closure(
        &mut self,
        function: &FunctionObject<'a>,
        closure: &Closure<'a>,
        this: Value<'a>,
        args: &[Value<'a>],
    ) -> EvalResult<'a, Value<'a>> {
        if self.call_depth >= self.options.max_call_depth {
            return Err(RuntimeError::CallStackOverflow.into());
        }
        debug!(function = %function.name(), depth = self.call_depth + 1, args = args.len(), "invoke");

        let parameters = closure.parameters;
        let bindings = parameters
            .iter()
            .enumerate()
            .map(|(i, param)| (Name::from(&param.name), args.get(i).cloned().unwrap_or_default()));
        let saved_scope = self.chain.enter_function(closure.scope.clone(), bindings)?;

        let this = closure.lexical_this.clone().unwrap_or(this);
        let saved_this = std::mem::replace(&mut self.this_value, this);
        let saved_strict = std::mem::replace(&mut self.strict, closure.strict);
        self.call_depth += 1;

        let result = self.run_function_body(parameters, closure.body, args);

        self.call_depth -= 1;
        self.strict = saved_strict;
        self.this_value = saved_this;
        self.chain.restore(saved_scope);
        result
    }

    fn run_function_body(
        &mut self,
        parameters: &'a [ParameterDeclaration<'a>],
        body: FunctionBody<'a>,
        args: &[Value<'a>],
    ) -> EvalResult<'a, Value<'a>> {
        for (i, param) in parameters.iter().enumerate() {
            let Some(initializer) = param.initializer else {
                continue;
            };
            if matches!(args.get(i), None | Some(Value::Undefined)) {
                let value = self.evaluate_named(initializer, &param.name.text_name)?;
                self.chain.assign(Name::from(&param.name), value)?;
            }
        }

        match body {
            FunctionBody::Block(block) => {
                self.hoist_scope(&hoist_declarations(block.statements))?;
                match self.execute_statements(block.statements)? {
                    Completion::Return(value) => Ok(value),
                    _ => Ok(Value::Undefined),
                }
            }
            FunctionBody::Expression(expr) => self.evaluate(expr),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn execute_statements(&mut self, statements: &'a [Statement<'a>]) -> ExecResult<'a> {
        for statement in statements {
            match self.execute_statement(statement)? {
                Completion::Normal => {}
                abrupt => return Ok(abrupt),
            }
        }
        Ok(Completion::Normal)
    }

    fn execute_statement(&mut self, statement: &'a Statement<'a>) -> ExecResult<'a> {
        self.execute_statement_kind(statement)
            .map_err(|exception| exception.at(statement.range()))
    }

    fn execute_statement_kind(&mut self, statement: &'a Statement<'a>) -> ExecResult<'a> {
        match statement {
            Statement::Block(block) => self.execute_block(block),
            Statement::EmptyStatement(_) | Statement::FunctionDeclaration(_) => Ok(Completion::Normal),
            Statement::VariableStatement(stmt) => {
                self.execute_declaration_list(&stmt.declaration_list)?;
                Ok(Completion::Normal)
            }
            Statement::ExpressionStatement(stmt) => {
                self.evaluate(stmt.expression)?;
                Ok(Completion::Normal)
            }
            Statement::IfStatement(stmt) => {
                if self.evaluate(stmt.expression)?.is_truthy() {
                    self.execute_statement(stmt.then_statement)
                } else if let Some(else_statement) = stmt.else_statement {
                    self.execute_statement(else_statement)
                } else {
                    Ok(Completion::Normal)
                }
            }
            Statement::WhileStatement(stmt) => {
                while self.evaluate(stmt.expression)?.is_truthy() {
                    if let Some(exit) = self.loop_body(stmt.statement)? {
                        return Ok(exit);
                    }
                }
                Ok(Completion::Normal)
            }
            Statement::DoStatement(stmt) => {
                loop {
                    if let Some(exit) = self.loop_body(stmt.statement)? {
                        return Ok(exit);
                    }
                    if !self.evaluate(stmt.expression)?.is_truthy() {
                        break;
                    }
                }
                Ok(Completion::Normal)
            }
            Statement::ForStatement(stmt) => self.execute_for(stmt),
            Statement::ForInStatement(stmt) => {
                let target = self.evaluate(stmt.expression)?;
                let keys = IterationSource::Items(enumerable_keys(&target));
                self.execute_for_each(&stmt.initializer, keys, stmt.statement)
            }
            Statement::ForOfStatement(stmt) => {
                let target = self.evaluate(stmt.expression)?;
                let items = self.iteration_source(target, stmt.expression)?;
                self.execute_for_each(&stmt.initializer, items, stmt.statement)
            }
            Statement::ContinueStatement(_) => Ok(Completion::Continue),
            Statement::BreakStatement(_) => Ok(Completion::Break),
            Statement::ReturnStatement(stmt) => {
                let value = match stmt.expression {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Undefined,
                };
                Ok(Completion::Return(value))
            }
            Statement::SwitchStatement(stmt) => self.execute_switch(stmt),
            Statement::ThrowStatement(stmt) => {
                let value = self.evaluate(stmt.expression)?;
                Err(Exception::thrown_value(value, stmt.data.range))
            }
            Statement::TryStatement(stmt) => self.execute_try(stmt),
        }
    }

    fn execute_block(&mut self, block: &'a Block<'a>) -> ExecResult<'a> {
        self.in_scope(ScopeKind::Block, |this| {
            this.hoist_scope(&hoist_declarations(block.statements))?;
            this.execute_statements(block.statements)
        })
    }

    fn execute_declaration_list(&mut self, list: &'a VariableDeclarationList<'a>) -> EvalResult<'a, ()> {
        for decl in list.declarations {
            let name = Name::from(&decl.name);
            match decl.initializer {
                Some(initializer) => {
                    let value = self.evaluate_named(initializer, &decl.name.text_name)?;
                    self.chain.initialize(name, value)?;
                }
                // `let x;` leaves the dead zone as `undefined`; `var x;` was
                // already initialized by hoisting.
                None if list.is_block_scoped() => self.chain.initialize(name, Value::Undefined)?,
                None => {}
            }
        }
        Ok(())
    }

    /// Declare a loop head's `let`/`const` names in the current scope.
    fn declare_lexical(&self, list: &'a VariableDeclarationList<'a>) -> EvalResult<'a, ()> {
        let kind = if list.is_const() {
            DeclarationKind::BlockImmutable
        } else {
            DeclarationKind::BlockMutable
        };
        for decl in list.declarations {
            self.chain.declare(Name::from(&decl.name), kind)?;
        }
        Ok(())
    }

    /// Run one loop iteration. `Some` carries the completion the loop itself
    /// finishes with.
    fn loop_body(&mut self, body: &'a Statement<'a>) -> EvalResult<'a, Option<Completion<'a>>> {
        match self.execute_statement(body)? {
            Completion::Normal | Completion::Continue => Ok(None),
            Completion::Break => Ok(Some(Completion::Normal)),
            ret @ Completion::Return(_) => Ok(Some(ret)),
        }
    }

    fn execute_for(&mut self, stmt: &'a ForStatement<'a>) -> ExecResult<'a> {
        match &stmt.initializer {
            Some(ForInitializer::VariableDeclarationList(list)) if list.is_block_scoped() => {
                self.in_scope(ScopeKind::Block, |this| {
                    this.declare_lexical(list)?;
                    this.execute_declaration_list(list)?;
                    this.run_for_loop(stmt, true)
                })
            }
            Some(ForInitializer::VariableDeclarationList(list)) => {
                self.execute_declaration_list(list)?;
                self.run_for_loop(stmt, false)
            }
            Some(ForInitializer::Expression(expr)) => {
                self.evaluate(expr)?;
                self.run_for_loop(stmt, false)
            }
            None => self.run_for_loop(stmt, false),
        }
    }

    /// The test/body/update cycle. With `per_iteration`, the loop head's
    /// scope is copied before every iteration so closures created in the
    /// body keep that iteration's bindings.
    fn run_for_loop(&mut self, stmt: &'a ForStatement<'a>, per_iteration: bool) -> ExecResult<'a> {
        if per_iteration {
            self.chain.fork_iteration();
        }
        loop {
            if let Some(condition) = stmt.condition {
                if !self.evaluate(condition)?.is_truthy() {
                    break;
                }
            }
            if let Some(exit) = self.loop_body(stmt.statement)? {
                return Ok(exit);
            }
            if per_iteration {
                self.chain.fork_iteration();
            }
            if let Some(incrementor) = stmt.incrementor {
                self.evaluate(incrementor)?;
            }
        }
        Ok(Completion::Normal)
    }

    fn iteration_source(&self, target: Value<'a>, expr: &'a Expression<'a>) -> EvalResult<'a, IterationSource<'a>> {
        match target {
            Value::Array(array) => Ok(IterationSource::LiveArray(array)),
            Value::String(s) => Ok(IterationSource::Items(
                s.chars().map(|c| Value::from(c.to_string())).collect(),
            )),
            _ => {
                let text = self.source_slice(expr.range());
                Err(RuntimeError::Type(format!("{text} is not iterable")).into())
            }
        }
    }

    fn execute_for_each(
        &mut self,
        initializer: &'a ForInitializer<'a>,
        items: IterationSource<'a>,
        body: &'a Statement<'a>,
    ) -> ExecResult<'a> {
        let mut index = 0;
        while let Some(item) = items.get(index) {
            index += 1;
            let exit = match initializer {
                ForInitializer::VariableDeclarationList(list) if list.is_block_scoped() => {
                    self.in_scope(ScopeKind::Block, |this| {
                        this.declare_lexical(list)?;
                        this.bind_loop_variable(list, item)?;
                        this.loop_body(body)
                    })?
                }
                ForInitializer::VariableDeclarationList(list) => {
                    self.bind_loop_variable(list, item)?;
                    self.loop_body(body)?
                }
                ForInitializer::Expression(target) => {
                    let reference = self.reference(target)?;
                    self.write_reference(&reference, item)?;
                    self.loop_body(body)?
                }
            };
            if let Some(exit) = exit {
                return Ok(exit);
            }
        }
        Ok(Completion::Normal)
    }

    fn bind_loop_variable(&mut self, list: &'a VariableDeclarationList<'a>, item: Value<'a>) -> EvalResult<'a, ()> {
        if let Some(decl) = list.declarations.first() {
            self.chain.initialize(Name::from(&decl.name), item)?;
        }
        Ok(())
    }

    fn execute_switch(&mut self, stmt: &'a SwitchStatement<'a>) -> ExecResult<'a> {
        let discriminant = self.evaluate(stmt.expression)?;
        let clauses = stmt.case_block.clauses;
        self.in_scope(ScopeKind::Block, |this| {
            this.hoist_scope(&hoist_case_block(clauses))?;

            let mut start = None;
            for (i, clause) in clauses.iter().enumerate() {
                if let CaseOrDefaultClause::CaseClause(case) = clause {
                    if this.evaluate(case.expression)?.strict_equals(&discriminant) {
                        start = Some(i);
                        break;
                    }
                }
            }
            let start = start.or_else(|| {
                clauses
                    .iter()
                    .position(|clause| matches!(clause, CaseOrDefaultClause::DefaultClause(_)))
            });
            let Some(start) = start else {
                return Ok(Completion::Normal);
            };

            for clause in &clauses[start..] {
                match this.execute_statements(clause.statements())? {
                    Completion::Normal => {}
                    Completion::Break => return Ok(Completion::Normal),
                    abrupt => return Ok(abrupt),
                }
            }
            Ok(Completion::Normal)
        })
    }

    fn execute_try(&mut self, stmt: &'a TryStatement<'a>) -> ExecResult<'a> {
        let guarded = stmt.catch_clause.is_some();
        if guarded {
            self.handler_depth += 1;
        }
        let attempt = self.execute_block(&stmt.try_block);
        if guarded {
            self.handler_depth -= 1;
        }

        let outcome = match (attempt, &stmt.catch_clause) {
            (Err(exception), Some(clause)) => {
                debug!(
                    handler_depth = self.handler_depth + 1,
                    kind = %exception.kind_name(),
                    message = %exception.message(),
                    "exception intercepted by catch"
                );
                self.execute_catch(clause, exception)
            }
            (outcome, _) => outcome,
        };

        match &stmt.finally_block {
            Some(finally) => match self.execute_block(finally)? {
                Completion::Normal => outcome,
                overriding => Ok(overriding),
            },
            None => outcome,
        }
    }

    /// The catch parameter and the catch body share one scope.
    fn execute_catch(&mut self, clause: &'a CatchClause<'a>, exception: Exception<'a>) -> ExecResult<'a> {
        self.in_scope(ScopeKind::Catch, |this| {
            if let Some(param) = &clause.variable_declaration {
                let name = Name::from(param);
                this.chain.declare(name, DeclarationKind::BlockMutable)?;
                this.chain.initialize(name, exception.into_value())?;
            }
            this.hoist_scope(&hoist_declarations(clause.block.statements))?;
            this.execute_statements(clause.block.statements)
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub(crate) fn evaluate(&mut self, expr: &'a Expression<'a>) -> EvalResult<'a, Value<'a>> {
        self.evaluate_kind(expr).map_err(|exception| exception.at(expr.range()))
    }

    /// Evaluate an initializer that gives an anonymous function its name.
    fn evaluate_named(&mut self, expr: &'a Expression<'a>, name: &str) -> EvalResult<'a, Value<'a>> {
        let value = self.evaluate(expr)?;
        if matches!(
            expr.skip_parentheses(),
            Expression::FunctionExpression(_) | Expression::ArrowFunction(_)
        ) {
            if let Value::Function(function) = &value {
                function.infer_name(name);
            }
        }
        Ok(value)
    }

    fn evaluate_kind(&mut self, expr: &'a Expression<'a>) -> EvalResult<'a, Value<'a>> {
        match expr {
            Expression::Identifier(id) => self.lookup(id),
            Expression::NumericLiteral(literal) => Ok(Value::Number(literal.value)),
            Expression::StringLiteral(literal) => Ok(Value::from(literal.value.as_str())),
            Expression::TemplateExpression(template) => {
                let mut text = template.head.clone();
                for span in template.template_spans {
                    text.push_str(&self.evaluate(span.expression)?.to_js_string());
                    text.push_str(&span.literal);
                }
                Ok(Value::from(text))
            }
            Expression::TrueKeyword(_) => Ok(Value::Boolean(true)),
            Expression::FalseKeyword(_) => Ok(Value::Boolean(false)),
            Expression::NullKeyword(_) => Ok(Value::Null),
            Expression::ThisKeyword(_) => Ok(self.this_value.clone()),
            Expression::OmittedExpression(_) => Ok(Value::Undefined),
            Expression::ArrayLiteral(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in array.elements {
                    elements.push(self.evaluate(element)?);
                }
                Ok(Value::new_array(elements))
            }
            Expression::ObjectLiteral(object) => self.evaluate_object_literal(object),
            Expression::PropertyAccess(_) | Expression::ElementAccess(_) | Expression::Call(_) => {
                Ok(self.evaluate_chain(expr)?.unwrap_or_default())
            }
            Expression::Parenthesized(paren) => self.evaluate(paren.expression),
            Expression::FunctionExpression(function) => self.evaluate_function_expression(function),
            Expression::ArrowFunction(arrow) => {
                let body = match arrow.body {
                    ArrowFunctionBody::Block(block) => FunctionBody::Block(block),
                    ArrowFunctionBody::Expression(expr) => FunctionBody::Expression(expr),
                };
                Ok(self.make_closure(
                    "",
                    arrow.parameters,
                    body,
                    self.chain.current(),
                    Some(self.this_value.clone()),
                    arrow.data.range,
                ))
            }
            Expression::TypeOf(type_of) => {
                let value = match type_of.expression.skip_parentheses() {
                    // An undeclared name is the one reference `typeof` forgives.
                    Expression::Identifier(id) => match self.chain.lookup(Name::from(id)) {
                        Ok(value) => value,
                        Err(ScopeError::UnresolvedIdentifier(_)) => Value::Undefined,
                        Err(error) => return Err(error.into()),
                    },
                    operand => self.evaluate(operand)?,
                };
                Ok(Value::from(value.type_of()))
            }
            Expression::Void(void) => {
                self.evaluate(void.expression)?;
                Ok(Value::Undefined)
            }
            Expression::PrefixUnary(unary) => match unary.operator {
                SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken => {
                    self.evaluate_update(unary.operand, unary.operator, true)
                }
                SyntaxKind::ExclamationToken => Ok(Value::Boolean(!self.evaluate(unary.operand)?.is_truthy())),
                SyntaxKind::MinusToken => Ok(Value::Number(-self.evaluate(unary.operand)?.to_number())),
                SyntaxKind::PlusToken => Ok(Value::Number(self.evaluate(unary.operand)?.to_number())),
                SyntaxKind::TildeToken => {
                    let operand = self.evaluate(unary.operand)?.to_number();
                    Ok(Value::Number(f64::from(!to_int32(operand))))
                }
                other => Err(unsupported_operator(other)),
            },
            Expression::PostfixUnary(unary) => self.evaluate_update(unary.operand, unary.operator, false),
            Expression::Binary(binary) => self.evaluate_binary(binary),
            Expression::Conditional(conditional) => {
                if self.evaluate(conditional.condition)?.is_truthy() {
                    self.evaluate(conditional.when_true)
                } else {
                    self.evaluate(conditional.when_false)
                }
            }
        }
    }

    fn lookup(&self, id: &Identifier) -> EvalResult<'a, Value<'a>> {
        Ok(self.chain.lookup(Name::from(id))?)
    }

    fn evaluate_object_literal(&mut self, object: &'a ObjectLiteralExpression<'a>) -> EvalResult<'a, Value<'a>> {
        let mut properties = PropertyMap::default();
        for element in object.properties {
            match element {
                ObjectLiteralElement::PropertyAssignment(assignment) => {
                    let key = self.property_key(&assignment.name)?;
                    let value = self.evaluate_named(assignment.initializer, &key)?;
                    properties.insert(key, value);
                }
                ObjectLiteralElement::ShorthandPropertyAssignment(shorthand) => {
                    let value = self.lookup(&shorthand.name)?;
                    properties.insert(Rc::from(shorthand.name.text_name.as_str()), value);
                }
            }
        }
        Ok(Value::new_object(properties))
    }

    fn property_key(&mut self, name: &'a PropertyName<'a>) -> EvalResult<'a, Rc<str>> {
        let key = match name {
            PropertyName::Identifier(id) => Rc::from(id.text_name.as_str()),
            PropertyName::StringLiteral(literal) => Rc::from(literal.value.as_str()),
            PropertyName::NumericLiteral(literal) => Rc::from(format_number(literal.value)),
            PropertyName::Computed(expr) => self.evaluate(expr)?.to_property_key(),
        };
        Ok(key)
    }

    /// A named function expression sees its own name through an extra scope
    /// between it and its defining scope. Object literal methods do not.
    fn evaluate_function_expression(&mut self, function: &'a FunctionExpression<'a>) -> EvalResult<'a, Value<'a>> {
        let body = FunctionBody::Block(function.body);
        let range = function.data.range;
        match &function.name {
            Some(id) if !function.data.flags.contains(NodeFlags::METHOD) => {
                let own_scope = Rc::new(RefCell::new(Scope::new(ScopeKind::Block, Some(self.chain.current()))));
                let value = self.make_closure(&id.text_name, function.parameters, body, own_scope.clone(), None, range);
                let mut scope = own_scope.borrow_mut();
                let name = Name::from(id);
                scope.table.declare(name, DeclarationKind::BlockImmutable)?;
                scope.table.initialize(name, value.clone())?;
                Ok(value)
            }
            Some(id) => Ok(self.make_closure(&id.text_name, function.parameters, body, self.chain.current(), None, range)),
            None => Ok(self.make_closure("", function.parameters, body, self.chain.current(), None, range)),
        }
    }

    /// Evaluate a member/call chain. `None` means an optional link (`?.`)
    /// met `null` or `undefined` and the rest of the chain was skipped.
    fn evaluate_chain(&mut self, expr: &'a Expression<'a>) -> EvalResult<'a, Option<Value<'a>>> {
        let result = match expr {
            Expression::PropertyAccess(access) => {
                let Some(base) = self.evaluate_chain(access.expression)? else {
                    return Ok(None);
                };
                if access.question_dot_token.is_some() && base.is_nullish() {
                    return Ok(None);
                }
                self.get_property(&base, &access.name.text_name).map(Some)
            }
            Expression::ElementAccess(access) => {
                let Some(base) = self.evaluate_chain(access.expression)? else {
                    return Ok(None);
                };
                if access.question_dot_token.is_some() && base.is_nullish() {
                    return Ok(None);
                }
                let key = self.evaluate(access.argument_expression)?;
                self.get_element(&base, &key).map(Some)
            }
            Expression::Call(call) => self.evaluate_call(call),
            other => return self.evaluate(other).map(Some),
        };
        result.map_err(|exception| exception.at(expr.range()))
    }

    fn evaluate_call(&mut self, call: &'a CallExpression<'a>) -> EvalResult<'a, Option<Value<'a>>> {
        let callee_expr = call.expression.skip_parentheses();
        let (callee, this) = match callee_expr {
            Expression::PropertyAccess(access) => {
                let Some(base) = self.evaluate_chain(access.expression)? else {
                    return Ok(None);
                };
                if access.question_dot_token.is_some() && base.is_nullish() {
                    return Ok(None);
                }
                let callee = self
                    .get_property(&base, &access.name.text_name)
                    .map_err(|exception| exception.at(access.data.range))?;
                (callee, base)
            }
            Expression::ElementAccess(access) => {
                let Some(base) = self.evaluate_chain(access.expression)? else {
                    return Ok(None);
                };
                if access.question_dot_token.is_some() && base.is_nullish() {
                    return Ok(None);
                }
                let key = self.evaluate(access.argument_expression)?;
                let callee = self
                    .get_element(&base, &key)
                    .map_err(|exception| exception.at(access.data.range))?;
                (callee, base)
            }
            other => match self.evaluate_chain(other)? {
                Some(callee) => (callee, Value::Undefined),
                None => return Ok(None),
            },
        };
        if call.question_dot_token.is_some() && callee.is_nullish() {
            return Ok(None);
        }

        let mut args = Vec::with_capacity(call.arguments.len());
        for argument in call.arguments {
            args.push(self.evaluate(argument)?);
        }

        match &callee {
            Value::Function(function) => self
                .call_function(function, this, &args)
                .map(Some)
                .map_err(|exception| exception.at(call.data.range)),
            _ => Err(self.not_callable(callee_expr, &callee).at(call.data.range)),
        }
    }

    fn not_callable(&self, callee_expr: &'a Expression<'a>, callee: &Value<'a>) -> Exception<'a> {
        match callee_expr {
            // A hoisted `var f` called before `f = function …` has run.
            Expression::Identifier(id) if matches!(callee, Value::Undefined) => {
                ScopeError::InvocationOfUninitialized(id.text_name.clone()).into()
            }
            other => {
                let text = self.source_slice(other.range());
                let text = if text.is_empty() {
                    crate::inspect::inspect(callee)
                } else {
                    text.to_string()
                };
                RuntimeError::NotCallable(text).into()
            }
        }
    }

    fn evaluate_binary(&mut self, binary: &'a BinaryExpression<'a>) -> EvalResult<'a, Value<'a>> {
        let operator = binary.operator_token.kind();
        if operator.is_assignment_operator() {
            return self.evaluate_assignment(binary, operator);
        }
        match operator {
            SyntaxKind::AmpersandAmpersandToken => {
                let left = self.evaluate(binary.left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate(binary.right)
            }
            SyntaxKind::BarBarToken => {
                let left = self.evaluate(binary.left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate(binary.right)
            }
            SyntaxKind::QuestionQuestionToken => {
                let left = self.evaluate(binary.left)?;
                if !left.is_nullish() {
                    return Ok(left);
                }
                self.evaluate(binary.right)
            }
            SyntaxKind::CommaToken => {
                self.evaluate(binary.left)?;
                self.evaluate(binary.right)
            }
            _ => {
                let left = self.evaluate(binary.left)?;
                let right = self.evaluate(binary.right)?;
                Ok(operators::binary(operator, &left, &right)?)
            }
        }
    }

    fn evaluate_assignment(&mut self, binary: &'a BinaryExpression<'a>, operator: SyntaxKind) -> EvalResult<'a, Value<'a>> {
        let reference = self.reference(binary.left)?;
        let value = match operator {
            SyntaxKind::EqualsToken => match &reference {
                Reference::Binding(id) => self.evaluate_named(binary.right, &id.text_name)?,
                Reference::Property { .. } => self.evaluate(binary.right)?,
            },
            SyntaxKind::AmpersandAmpersandEqualsToken
            | SyntaxKind::BarBarEqualsToken
            | SyntaxKind::QuestionQuestionEqualsToken => {
                let current = self.read_reference(&reference)?;
                let keep = match operator {
                    SyntaxKind::AmpersandAmpersandEqualsToken => !current.is_truthy(),
                    SyntaxKind::BarBarEqualsToken => current.is_truthy(),
                    _ => !current.is_nullish(),
                };
                if keep {
                    return Ok(current);
                }
                self.evaluate(binary.right)?
            }
            compound => {
                let current = self.read_reference(&reference)?;
                let right = self.evaluate(binary.right)?;
                let operator = compound
                    .compound_assignment_operator()
                    .ok_or_else(|| unsupported_operator(compound))?;
                operators::binary(operator, &current, &right)?
            }
        };
        self.write_reference(&reference, value.clone())?;
        Ok(value)
    }

    fn evaluate_update(&mut self, operand: &'a Expression<'a>, operator: SyntaxKind, prefix: bool) -> EvalResult<'a, Value<'a>> {
        let reference = self.reference(operand)?;
        let old = self.read_reference(&reference)?.to_number();
        let new = if operator == SyntaxKind::PlusPlusToken {
            old + 1.0
        } else {
            old - 1.0
        };
        self.write_reference(&reference, Value::Number(new))?;
        Ok(Value::Number(if prefix { new } else { old }))
    }

    // ========================================================================
    // References and properties
    // ========================================================================

    fn reference(&mut self, target: &'a Expression<'a>) -> EvalResult<'a, Reference<'a>> {
        match target.skip_parentheses() {
            Expression::Identifier(id) => Ok(Reference::Binding(id)),
            Expression::PropertyAccess(access) => {
                let base = self.evaluate(access.expression)?;
                Ok(Reference::Property {
                    base,
                    key: Rc::from(access.name.text_name.as_str()),
                })
            }
            Expression::ElementAccess(access) => {
                let base = self.evaluate(access.expression)?;
                let key = self.evaluate(access.argument_expression)?.to_property_key();
                Ok(Reference::Property { base, key })
            }
            _ => Err(RuntimeError::Unsupported("assignment to this expression".to_string()).into()),
        }
    }

    fn read_reference(&self, reference: &Reference<'a>) -> EvalResult<'a, Value<'a>> {
        match reference {
            Reference::Binding(id) => self.lookup(id),
            Reference::Property { base, key } => self.get_property(base, key),
        }
    }

    fn write_reference(&mut self, reference: &Reference<'a>, value: Value<'a>) -> EvalResult<'a, ()> {
        match reference {
            Reference::Binding(id) => self.assign_identifier(id, value),
            Reference::Property { base, key } => self.set_property(base, key, value),
        }
    }

    /// Outside strict mode an assignment to an undeclared name creates a
    /// global.
    fn assign_identifier(&mut self, id: &'a Identifier, value: Value<'a>) -> EvalResult<'a, ()> {
        let name = Name::from(id);
        match self.chain.assign(name, value.clone()) {
            Err(ScopeError::UnresolvedIdentifier(_)) if !self.strict => {
                debug!(name = %id.text_name, "implicit global");
                self.chain.declare_global(name, value)?;
                Ok(())
            }
            result => Ok(result?),
        }
    }

    pub fn get_property(&self, base: &Value<'a>, key: &str) -> EvalResult<'a, Value<'a>> {
        let value = match base {
            Value::Undefined | Value::Null => {
                return Err(RuntimeError::PropertyOfNullish {
                    base: nullish_name(base),
                    property: key.to_string(),
                    access: AccessKind::Read,
                }
                .into())
            }
            Value::Object(object) => object.borrow().get(key).cloned().unwrap_or_default(),
            Value::Array(array) => {
                if key == "length" {
                    Value::Number(array.borrow().len() as f64)
                } else if let Some(index) = array_index(key) {
                    array.borrow().get(index)
                } else {
                    self.intrinsics.array_method(key)
                }
            }
            Value::String(s) => {
                if key == "length" {
                    Value::Number(s.chars().count() as f64)
                } else if let Some(index) = array_index(key) {
                    char_at(s, index)
                } else {
                    self.intrinsics.string_method(key)
                }
            }
            Value::Number(_) => self.intrinsics.number_method(key),
            Value::Boolean(_) => Value::Undefined,
            Value::Function(function) => match function.properties().get(key) {
                Some(value) => value.clone(),
                None if key == "name" => Value::String(function.name()),
                None if key == "length" => Value::Number(f64::from(function.arity())),
                None => Value::Undefined,
            },
        };
        Ok(value)
    }

    fn get_element(&self, base: &Value<'a>, key: &Value<'a>) -> EvalResult<'a, Value<'a>> {
        if let Value::Number(n) = key {
            if *n >= 0.0 && n.fract() == 0.0 && *n < f64::from(u32::MAX) {
                let index = *n as usize;
                match base {
                    Value::Array(array) => return Ok(array.borrow().get(index)),
                    Value::String(s) => return Ok(char_at(s, index)),
                    _ => {}
                }
            }
        }
        self.get_property(base, &key.to_property_key())
    }

    fn set_property(&mut self, base: &Value<'a>, key: &str, value: Value<'a>) -> EvalResult<'a, ()> {
        match base {
            Value::Undefined | Value::Null => Err(RuntimeError::PropertyOfNullish {
                base: nullish_name(base),
                property: key.to_string(),
                access: AccessKind::Write,
            }
            .into()),
            Value::Object(object) => {
                let mut record = object.borrow_mut();
                if record.is_frozen() {
                    return self.frozen_write(key);
                }
                record.insert(Rc::from(key), value);
                Ok(())
            }
            Value::Array(array) => {
                let mut record = array.borrow_mut();
                if record.is_frozen() {
                    return self.frozen_write(key);
                }
                if key == "length" {
                    let len = value.to_number();
                    if len < 0.0 || len.fract() != 0.0 || len >= MAX_ARRAY_LENGTH as f64 {
                        return Err(RuntimeError::Range("Invalid array length".to_string()).into());
                    }
                    record.set_len(len as usize);
                } else if let Some(index) = array_index(key) {
                    if index >= MAX_ARRAY_LENGTH {
                        return Err(RuntimeError::Range("Invalid array length".to_string()).into());
                    }
                    record.set(index, value);
                }
                // Named properties on arrays are not modeled.
                Ok(())
            }
            Value::Function(function) => {
                function.set_property(Rc::from(key), value);
                Ok(())
            }
            primitive if self.strict => Err(RuntimeError::Type(format!(
                "Cannot create property '{key}' on {} '{}'",
                primitive.type_of(),
                primitive.to_js_string()
            ))
            .into()),
            _ => Ok(()),
        }
    }

    fn frozen_write(&self, key: &str) -> EvalResult<'a, ()> {
        if self.strict {
            return Err(RuntimeError::FrozenWrite(key.to_string()).into());
        }
        debug!(property = key, "ignored write to frozen value");
        Ok(())
    }
}

fn nullish_name(value: &Value<'_>) -> &'static str {
    if matches!(value, Value::Null) {
        "null"
    } else {
        "undefined"
    }
}

fn char_at<'a>(s: &str, index: usize) -> Value<'a> {
    s.chars()
        .nth(index)
        .map_or(Value::Undefined, |c| Value::from(c.to_string()))
}

fn unsupported_operator<'a>(operator: SyntaxKind) -> Exception<'a> {
    let text = operator.punctuation_text().unwrap_or("?");
    RuntimeError::Unsupported(format!("operator '{text}'")).into()
}

/// `for … in` keys: object keys, or indices as strings.
fn enumerable_keys<'a>(value: &Value<'a>) -> Vec<Value<'a>> {
    match value {
        Value::Object(object) => object.borrow().keys().into_iter().map(Value::String).collect(),
        Value::Array(array) => (0..array.borrow().len()).map(|i| Value::from(i.to_string())).collect(),
        Value::String(s) => (0..s.chars().count()).map(|i| Value::from(i.to_string())).collect(),
        Value::Function(function) => function.properties().keys().cloned().map(Value::String).collect(),
        _ => Vec::new(),
    }
}

/// Where a duplicate declaration reported by hoisting was written: the
/// last declaration of that name in the list.
fn duplicate_site(hoisted: &HoistedDeclarations<'_>, error: &ScopeError) -> Option<TextRange> {
    let ScopeError::DuplicateDeclaration(name) = error else {
        return None;
    };
    let vars = hoisted.var_names.iter().copied();
    let functions = hoisted.functions.iter().map(|f| &f.name);
    let lexical = hoisted.lexical.iter().map(|l| l.name);
    vars.chain(functions)
        .chain(lexical)
        .filter(|id| id.text_name == *name)
        .map(|id| id.data.range)
        .max_by_key(|range| range.pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::BufferConsole;
    use bumpalo::Bump;
    use hoist_parser::parse_script;

    fn run(source: &str) -> (Result<(), String>, Vec<String>) {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (file, diagnostics) = parse_script(&arena, &interner, "unit.js", source);
        assert!(diagnostics.is_empty(), "unexpected parse diagnostics");
        let file = arena.alloc(file);
        let console = BufferConsole::new();
        let mut interpreter = Interpreter::new(interner, InterpreterOptions::default(), Box::new(console.clone()));
        let result = interpreter.run_script(file).map_err(|e| e.to_string());
        (result, console.lines())
    }

    #[test]
    fn test_default_options() {
        let options = InterpreterOptions::default();
        assert!(!options.strict);
        assert_eq!(options.max_call_depth, 512);
    }

    #[test]
    fn test_block_scope_is_popped() {
        let (result, lines) = run("let x = 1; { let x = 2; console.log(x); } console.log(x);");
        assert_eq!(result, Ok(()));
        assert_eq!(lines, vec!["2", "1"]);
    }

    #[test]
    fn test_catch_restores_chain() {
        let (result, lines) = run(
            "let depth = 'outer';
             function fail() { let depth = 'inner'; missing(); }
             try { fail(); } catch (e) { console.log(e.name, depth); }",
        );
        assert_eq!(result, Ok(()));
        assert_eq!(lines, vec!["ReferenceError outer"]);
    }

    #[test]
    fn test_duplicate_site_is_last_declaration() {
        let arena = Bump::new();
        let interner = StringInterner::new();
        let (file, _) = parse_script(&arena, &interner, "unit.js", "let a = 1;\nlet a = 2;");
        let hoisted = hoist_declarations(file.statements);
        let site = duplicate_site(&hoisted, &ScopeError::DuplicateDeclaration("a".into()));
        assert_eq!(site.map(|r| r.pos), Some(15));
    }
}
