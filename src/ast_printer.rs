use crate::ast::{
    AssignExpr, BinaryExpr, BlockStmt, Expr, ExprVisitor, ExpressionStmt, GroupingExpr,
    LiteralExpr, PrintStmt, Stmt, StmtVisitor, UnaryExpr, VarStmt, VariableExpr,
};

/// Renders an AST as parenthesized prefix notation, e.g. `(+ 1 (* 2 3))`.
/// Debug tooling only; the interpreter never goes through here.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print_expr(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut result = format!("({}", name);
        for expr in exprs {
            result.push(' ');
            result.push_str(&expr.accept(self));
        }
        result.push(')');
        result
    }
}

impl ExprVisitor<String> for AstPrinter {
    fn visit_literal_expr(&mut self, expr: &LiteralExpr) -> String {
        expr.value.to_string()
    }

    fn visit_grouping_expr(&mut self, expr: &GroupingExpr) -> String {
        self.parenthesize("group", &[&expr.expression])
    }

    fn visit_unary_expr(&mut self, expr: &UnaryExpr) -> String {
        self.parenthesize(&expr.operator.lexeme, &[&expr.expression])
    }

    fn visit_binary_expr(&mut self, expr: &BinaryExpr) -> String {
        self.parenthesize(&expr.operator.lexeme, &[&expr.left, &expr.right])
    }

    fn visit_variable_expr(&mut self, expr: &VariableExpr) -> String {
        expr.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, expr: &AssignExpr) -> String {
        let name = format!("= {}", expr.name.lexeme);
        self.parenthesize(&name, &[&expr.value])
    }
}

impl StmtVisitor<String> for AstPrinter {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) -> String {
        self.parenthesize("expr", &[&stmt.expression])
    }

    fn visit_print_stmt(&mut self, stmt: &PrintStmt) -> String {
        self.parenthesize("print", &[&stmt.expression])
    }

    fn visit_var_stmt(&mut self, stmt: &VarStmt) -> String {
        match &stmt.initializer {
            Some(initializer) => {
                let name = format!("var {}", stmt.name.lexeme);
                self.parenthesize(&name, &[initializer])
            }
            None => format!("(var {})", stmt.name.lexeme),
        }
    }

    fn visit_block_stmt(&mut self, stmt: &BlockStmt) -> String {
        let mut result = "(block".to_string();
        for statement in &stmt.statements {
            result.push(' ');
            result.push_str(&statement.accept(self));
        }
        result.push(')');
        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::token::{LiteralValue, Token, TokenType};

    fn token(token_type: TokenType, lexeme: &str) -> Token {
        Token {
            token_type,
            lexeme: lexeme.to_string(),
            literal: None,
            line: 1,
        }
    }

    fn number(value: f64) -> Expr {
        Expr::Literal(Box::new(LiteralExpr {
            value: LiteralValue::Number(value),
        }))
    }

    #[test]
    fn prints_nested_expression() {
        // -123 * (45.67)
        let expr = Expr::Binary(Box::new(BinaryExpr {
            left: Expr::Unary(Box::new(UnaryExpr {
                operator: token(TokenType::Minus, "-"),
                expression: number(123.0),
            })),
            operator: token(TokenType::Star, "*"),
            right: Expr::Grouping(Box::new(GroupingExpr {
                expression: number(45.67),
            })),
        }));

        assert_eq!(AstPrinter.print_expr(&expr), "(* (- 123) (group 45.67))");
    }

    #[test]
    fn prints_var_statement() {
        let stmt = Stmt::Var(Box::new(VarStmt {
            name: token(TokenType::Identifier, "x"),
            initializer: Some(number(1.0)),
        }));

        assert_eq!(AstPrinter.print_stmt(&stmt), "(var x 1)");
    }
}
