//! AST visitor trait for traversing the syntax tree.
//!
//! Default implementations walk into children. Function bodies are entered
//! through `visit_function_body`, so a visitor that only cares about one
//! function scope can override that single method to stop at the boundary.

use crate::node::*;

pub trait AstVisitor<'a> {
    fn visit_source_file(&mut self, node: &SourceFile<'a>) {
        for stmt in node.statements.iter() {
            self.visit_statement(stmt);
        }
    }

    fn visit_statement(&mut self, stmt: &'a Statement<'a>) {
        match stmt {
            Statement::Block(n) => self.visit_block(n),
            Statement::EmptyStatement(_) => {}
            Statement::VariableStatement(n) => {
                self.visit_variable_declaration_list(&n.declaration_list)
            }
            Statement::FunctionDeclaration(n) => self.visit_function_declaration(n),
            Statement::ExpressionStatement(n) => self.visit_expression(n.expression),
            Statement::IfStatement(n) => {
                self.visit_expression(n.expression);
                self.visit_statement(n.then_statement);
                if let Some(else_stmt) = n.else_statement {
                    self.visit_statement(else_stmt);
                }
            }
            Statement::DoStatement(n) => {
                self.visit_statement(n.statement);
                self.visit_expression(n.expression);
            }
            Statement::WhileStatement(n) => {
                self.visit_expression(n.expression);
                self.visit_statement(n.statement);
            }
            Statement::ForStatement(n) => self.visit_for_statement(n),
            Statement::ForInStatement(n) => {
                self.visit_for_initializer(&n.initializer);
                self.visit_expression(n.expression);
                self.visit_statement(n.statement);
            }
            Statement::ForOfStatement(n) => {
                self.visit_for_initializer(&n.initializer);
                self.visit_expression(n.expression);
                self.visit_statement(n.statement);
            }
            Statement::ContinueStatement(_) | Statement::BreakStatement(_) => {}
            Statement::ReturnStatement(n) => {
                if let Some(expr) = n.expression {
                    self.visit_expression(expr);
                }
            }
            Statement::SwitchStatement(n) => {
                self.visit_expression(n.expression);
                for clause in n.case_block.clauses.iter() {
                    if let CaseOrDefaultClause::CaseClause(c) = clause {
                        self.visit_expression(c.expression);
                    }
                    for stmt in clause.statements().iter() {
                        self.visit_statement(stmt);
                    }
                }
            }
            Statement::ThrowStatement(n) => self.visit_expression(n.expression),
            Statement::TryStatement(n) => self.visit_try_statement(n),
        }
    }

    // -- Statements --

    fn visit_block(&mut self, node: &'a Block<'a>) {
        for stmt in node.statements.iter() {
            self.visit_statement(stmt);
        }
    }

    fn visit_variable_declaration_list(&mut self, node: &'a VariableDeclarationList<'a>) {
        for decl in node.declarations.iter() {
            self.visit_variable_declaration(node, decl);
        }
    }

    fn visit_variable_declaration(
        &mut self,
        _list: &'a VariableDeclarationList<'a>,
        node: &'a VariableDeclaration<'a>,
    ) {
        if let Some(init) = node.initializer {
            self.visit_expression(init);
        }
    }

    fn visit_function_declaration(&mut self, node: &'a FunctionDeclaration<'a>) {
        self.visit_function_body(node.parameters, node.body);
    }

    fn visit_function_body(
        &mut self,
        parameters: &'a [ParameterDeclaration<'a>],
        body: &'a Block<'a>,
    ) {
        for param in parameters.iter() {
            if let Some(init) = param.initializer {
                self.visit_expression(init);
            }
        }
        self.visit_block(body);
    }

    fn visit_for_statement(&mut self, node: &'a ForStatement<'a>) {
        if let Some(ref init) = node.initializer {
            self.visit_for_initializer(init);
        }
        if let Some(cond) = node.condition {
            self.visit_expression(cond);
        }
        if let Some(incr) = node.incrementor {
            self.visit_expression(incr);
        }
        self.visit_statement(node.statement);
    }

    fn visit_for_initializer(&mut self, node: &'a ForInitializer<'a>) {
        match node {
            ForInitializer::VariableDeclarationList(list) => {
                self.visit_variable_declaration_list(list)
            }
            ForInitializer::Expression(expr) => self.visit_expression(expr),
        }
    }

    fn visit_try_statement(&mut self, node: &'a TryStatement<'a>) {
        self.visit_block(&node.try_block);
        if let Some(ref catch) = node.catch_clause {
            self.visit_block(&catch.block);
        }
        if let Some(ref finally) = node.finally_block {
            self.visit_block(finally);
        }
    }

    // -- Expressions --

    fn visit_identifier(&mut self, _node: &'a Identifier) {}

    fn visit_expression(&mut self, expr: &'a Expression<'a>) {
        match expr {
            Expression::Identifier(id) => self.visit_identifier(id),
            Expression::NumericLiteral(_)
            | Expression::StringLiteral(_)
            | Expression::TrueKeyword(_)
            | Expression::FalseKeyword(_)
            | Expression::NullKeyword(_)
            | Expression::ThisKeyword(_)
            | Expression::OmittedExpression(_) => {}
            Expression::TemplateExpression(n) => {
                for span in n.template_spans.iter() {
                    self.visit_expression(span.expression);
                }
            }
            Expression::ArrayLiteral(n) => {
                for el in n.elements.iter() {
                    self.visit_expression(el);
                }
            }
            Expression::ObjectLiteral(n) => {
                for prop in n.properties.iter() {
                    match prop {
                        ObjectLiteralElement::PropertyAssignment(p) => {
                            if let PropertyName::Computed(key) = p.name {
                                self.visit_expression(key);
                            }
                            self.visit_expression(p.initializer);
                        }
                        ObjectLiteralElement::ShorthandPropertyAssignment(p) => {
                            self.visit_identifier(&p.name)
                        }
                    }
                }
            }
            Expression::PropertyAccess(n) => self.visit_expression(n.expression),
            Expression::ElementAccess(n) => {
                self.visit_expression(n.expression);
                self.visit_expression(n.argument_expression);
            }
            Expression::Call(n) => {
                self.visit_expression(n.expression);
                for arg in n.arguments.iter() {
                    self.visit_expression(arg);
                }
            }
            Expression::Parenthesized(n) => self.visit_expression(n.expression),
            Expression::FunctionExpression(n) => self.visit_function_body(n.parameters, n.body),
            Expression::ArrowFunction(n) => match n.body {
                ArrowFunctionBody::Block(body) => self.visit_function_body(n.parameters, body),
                ArrowFunctionBody::Expression(body) => {
                    for param in n.parameters.iter() {
                        if let Some(init) = param.initializer {
                            self.visit_expression(init);
                        }
                    }
                    self.visit_expression(body);
                }
            },
            Expression::TypeOf(n) => self.visit_expression(n.expression),
            Expression::Void(n) => self.visit_expression(n.expression),
            Expression::PrefixUnary(n) => self.visit_expression(n.operand),
            Expression::PostfixUnary(n) => self.visit_expression(n.operand),
            Expression::Binary(n) => {
                self.visit_expression(n.left);
                self.visit_expression(n.right);
            }
            Expression::Conditional(n) => {
                self.visit_expression(n.condition);
                self.visit_expression(n.when_true);
                self.visit_expression(n.when_false);
            }
        }
    }
}
