//! Uniform accessors over the statement and expression enums.

use crate::node::*;
use crate::syntax_kind::SyntaxKind;
use hoist_core::text::TextRange;

impl<'a> Statement<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Statement::Block(n) => &n.data,
            Statement::EmptyStatement(d) => d,
            Statement::VariableStatement(n) => &n.data,
            Statement::FunctionDeclaration(n) => &n.data,
            Statement::ExpressionStatement(n) => &n.data,
            Statement::IfStatement(n) => &n.data,
            Statement::DoStatement(n) => &n.data,
            Statement::WhileStatement(n) => &n.data,
            Statement::ForStatement(n) => &n.data,
            Statement::ForInStatement(n) => &n.data,
            Statement::ForOfStatement(n) => &n.data,
            Statement::ContinueStatement(d) => d,
            Statement::BreakStatement(d) => d,
            Statement::ReturnStatement(n) => &n.data,
            Statement::SwitchStatement(n) => &n.data,
            Statement::ThrowStatement(n) => &n.data,
            Statement::TryStatement(n) => &n.data,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn range(&self) -> TextRange {
        self.data().range
    }
}

impl<'a> Expression<'a> {
    pub fn data(&self) -> &NodeData {
        match self {
            Expression::Identifier(n) => &n.data,
            Expression::NumericLiteral(n) => &n.data,
            Expression::StringLiteral(n) => &n.data,
            Expression::TemplateExpression(n) => &n.data,
            Expression::TrueKeyword(d) => d,
            Expression::FalseKeyword(d) => d,
            Expression::NullKeyword(d) => d,
            Expression::ThisKeyword(d) => d,
            Expression::ArrayLiteral(n) => &n.data,
            Expression::ObjectLiteral(n) => &n.data,
            Expression::PropertyAccess(n) => &n.data,
            Expression::ElementAccess(n) => &n.data,
            Expression::Call(n) => &n.data,
            Expression::Parenthesized(n) => &n.data,
            Expression::FunctionExpression(n) => &n.data,
            Expression::ArrowFunction(n) => &n.data,
            Expression::TypeOf(n) => &n.data,
            Expression::Void(n) => &n.data,
            Expression::PrefixUnary(n) => &n.data,
            Expression::PostfixUnary(n) => &n.data,
            Expression::Binary(n) => &n.data,
            Expression::Conditional(n) => &n.data,
            Expression::OmittedExpression(d) => d,
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        self.data().kind
    }

    pub fn range(&self) -> TextRange {
        self.data().range
    }

    /// Strips any number of enclosing parentheses.
    pub fn skip_parentheses(&self) -> &Expression<'a> {
        let mut expr = self;
        while let Expression::Parenthesized(p) = expr {
            expr = p.expression;
        }
        expr
    }

    /// Whether the expression may appear on the left of `=` or as the
    /// operand of `++`/`--`.
    pub fn is_assignment_target(&self) -> bool {
        matches!(
            self.skip_parentheses(),
            Expression::Identifier(_) | Expression::PropertyAccess(_) | Expression::ElementAccess(_)
        )
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(id) => Some(id),
            _ => None,
        }
    }
}

impl<'a> PropertyName<'a> {
    /// The key text when it is known without evaluation.
    pub fn static_text(&self) -> Option<String> {
        match self {
            PropertyName::Identifier(id) => Some(id.text_name.clone()),
            PropertyName::StringLiteral(s) => Some(s.value.clone()),
            PropertyName::NumericLiteral(n) => Some(n.text_name.clone()),
            PropertyName::Computed(_) => None,
        }
    }
}

impl<'a> ForInitializer<'a> {
    pub fn declaration_list(&self) -> Option<&VariableDeclarationList<'a>> {
        match self {
            ForInitializer::VariableDeclarationList(list) => Some(list),
            ForInitializer::Expression(_) => None,
        }
    }
}
