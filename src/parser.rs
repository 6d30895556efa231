use std::{error::Error, fmt};

use crate::{
    ast::{
        AssignExpr, BinaryExpr, BlockStmt, Expr, ExpressionStmt, GroupingExpr, LiteralExpr,
        PrintStmt, Stmt, UnaryExpr, VarStmt, VariableExpr,
    },
    diagnostics::Diagnostics,
    token::{LiteralValue, Token, TokenType},
};

/// Recursive-descent parser over the scanned token stream.
///
/// Syntax errors are reported to the [`Diagnostics`] collector; the parser
/// then synchronizes to the next statement boundary and keeps going, so a
/// single pass surfaces every independent error in the input. A statement
/// that failed to parse contributes no node to the program.
pub struct Parser<'a> {
    diagnostics: &'a mut Diagnostics,
    tokens: Vec<Token>,
    current: usize,
}

impl<'a> Parser<'a> {
    pub fn new(diagnostics: &'a mut Diagnostics, tokens: Vec<Token>) -> Parser<'a> {
        Parser {
            diagnostics,
            tokens,
            current: 0,
        }
    }

    pub fn parse(mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(statement) = self.declaration_with_sync() {
                statements.push(statement);
            }
        }

        statements
    }

    fn declaration_with_sync(&mut self) -> Option<Stmt> {
        match self.declaration() {
            Ok(statement) => Some(statement),
            Err(_) => {
                self.synchronize();
                None
            }
        }
    }

    fn synchronize(&mut self) {
        self.advance();

        loop {
            if self.is_at_end() {
                break;
            }

            if self.match_token(TokenType::Semicolon) {
                break;
            }

            use TokenType::*;
            if let Class | Fun | Var | For | If | While | Print | Return = self.peek().token_type {
                break;
            }

            self.advance();
        }
    }

    fn declaration(&mut self) -> Result<Stmt, ParserError> {
        if self.match_token(TokenType::Var) {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParserError> {
        let name = self.consume(TokenType::Identifier, "Expect variable name.")?;

        let initializer = match self.match_token(TokenType::Equal) {
            true => Some(self.expression()?),
            false => None,
        };

        self.consume(
            TokenType::Semicolon,
            "Expect ';' after variable declaration.",
        )?;

        Ok(Stmt::Var(Box::new(VarStmt { name, initializer })))
    }

    fn statement(&mut self) -> Result<Stmt, ParserError> {
        if self.match_token(TokenType::LeftBrace) {
            Ok(Stmt::Block(Box::new(BlockStmt {
                statements: self.block()?,
            })))
        } else if self.match_token(TokenType::Print) {
            self.print_stmt()
        } else {
            self.expression_stmt()
        }
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParserError> {
        let mut statements = Vec::new();

        while self.peek().token_type != TokenType::RightBrace && !self.is_at_end() {
            statements.push(self.declaration()?);
        }

        self.consume(TokenType::RightBrace, "Expect '}' after block.")?;

        Ok(statements)
    }

    fn print_stmt(&mut self) -> Result<Stmt, ParserError> {
        let expression = self.expression()?;

        self.consume(TokenType::Semicolon, "Expect ';' after value.")?;

        Ok(Stmt::Print(Box::new(PrintStmt { expression })))
    }

    fn expression_stmt(&mut self) -> Result<Stmt, ParserError> {
        let expression = self.expression()?;

        self.consume(TokenType::Semicolon, "Expect ';' after expression.")?;

        Ok(Stmt::Expression(Box::new(ExpressionStmt { expression })))
    }

    fn expression(&mut self) -> Result<Expr, ParserError> {
        self.assign_expr()
    }

    fn assign_expr(&mut self) -> Result<Expr, ParserError> {
        let expr = self.equality_expr()?;

        if self.match_token(TokenType::Equal) {
            let equals = self.previous();
            let value = self.assign_expr()?;

            return match expr {
                Expr::Variable(variable) => Ok(Expr::Assign(Box::new(AssignExpr {
                    name: variable.name,
                    value,
                }))),
                _ => {
                    // Report but keep the already-built expression; nothing
                    // here requires discarding the rest of the statement.
                    self.diagnostics
                        .parser_error(&equals, "Invalid assignment target.");
                    Ok(expr)
                }
            };
        }

        Ok(expr)
    }

    fn equality_expr(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.comparison_expr()?;

        while self.match_token(TokenType::EqualEqual) || self.match_token(TokenType::BangEqual) {
            let operator = self.previous();
            let right = self.comparison_expr()?;
            expr = Expr::Binary(Box::new(BinaryExpr {
                left: expr,
                operator,
                right,
            }))
        }

        Ok(expr)
    }

    fn comparison_expr(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.term_expr()?;

        while self.match_token(TokenType::Less)
            || self.match_token(TokenType::LessEqual)
            || self.match_token(TokenType::Greater)
            || self.match_token(TokenType::GreaterEqual)
        {
            let operator = self.previous();
            let right = self.term_expr()?;
            expr = Expr::Binary(Box::new(BinaryExpr {
                left: expr,
                operator,
                right,
            }))
        }

        Ok(expr)
    }

    fn term_expr(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.factor_expr()?;

        while self.match_token(TokenType::Plus) || self.match_token(TokenType::Minus) {
            let operator = self.previous();
            let right = self.factor_expr()?;
            expr = Expr::Binary(Box::new(BinaryExpr {
                left: expr,
                operator,
                right,
            }))
        }

        Ok(expr)
    }

    fn factor_expr(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.unary_expr()?;

        while self.match_token(TokenType::Slash) || self.match_token(TokenType::Star) {
            let operator = self.previous();
            let right = self.unary_expr()?;
            expr = Expr::Binary(Box::new(BinaryExpr {
                left: expr,
                operator,
                right,
            }))
        }

        Ok(expr)
    }

    fn unary_expr(&mut self) -> Result<Expr, ParserError> {
        if self.match_token(TokenType::Bang) || self.match_token(TokenType::Minus) {
            let operator = self.previous();
            let expression = self.unary_expr()?;
            Ok(Expr::Unary(Box::new(UnaryExpr {
                operator,
                expression,
            })))
        } else {
            self.primary_expr()
        }
    }

    fn primary_expr(&mut self) -> Result<Expr, ParserError> {
        if self.match_token(TokenType::Nil) {
            Ok(Expr::Literal(Box::new(LiteralExpr {
                value: LiteralValue::Nil,
            })))
        } else if self.match_token(TokenType::True) {
            Ok(Expr::Literal(Box::new(LiteralExpr {
                value: LiteralValue::Bool(true),
            })))
        } else if self.match_token(TokenType::False) {
            Ok(Expr::Literal(Box::new(LiteralExpr {
                value: LiteralValue::Bool(false),
            })))
        } else if self.match_token(TokenType::Number) || self.match_token(TokenType::String) {
            let token = self.previous();
            match &token.literal {
                Some(value) => Ok(Expr::Literal(Box::new(LiteralExpr {
                    value: value.clone(),
                }))),
                None => self.error(&token, "Expect expression."),
            }
        } else if self.match_token(TokenType::Identifier) {
            Ok(Expr::Variable(Box::new(VariableExpr {
                name: self.previous(),
            })))
        } else if self.match_token(TokenType::LeftParen) {
            let expression = self.expression()?;
            self.consume(TokenType::RightParen, "Expect ')' after expression.")?;
            Ok(Expr::Grouping(Box::new(GroupingExpr { expression })))
        } else {
            self.error(&self.peek().clone(), "Expect expression.")
        }
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type == TokenType::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1].clone()
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.peek().token_type == token_type {
            self.advance();
            return true;
        }

        false
    }

    fn consume(&mut self, token_type: TokenType, message: &str) -> Result<Token, ParserError> {
        let token = self.peek().clone();
        if token.token_type == token_type {
            self.advance();
            return Ok(token);
        }

        self.error(&token, message)
    }

    fn error<T>(&mut self, token: &Token, message: &str) -> Result<T, ParserError> {
        self.diagnostics.parser_error(token, message);
        Err(ParserError {})
    }
}

/// Local signal for a structural parse failure; the diagnostic itself has
/// already been recorded by the time this is raised.
#[derive(Debug)]
struct ParserError {}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParserError")
    }
}

impl Error for ParserError {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ast_printer::AstPrinter, scanner::Scanner};

    fn parse(source: &str) -> (Vec<Stmt>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = Scanner::new(&mut diagnostics, source).scan_tokens();
        let statements = Parser::new(&mut diagnostics, tokens).parse();
        (statements, diagnostics)
    }

    fn parse_to_string(source: &str) -> String {
        let (statements, diagnostics) = parse(source);
        assert!(!diagnostics.had_error(), "unexpected diagnostics");
        statements
            .iter()
            .map(|s| AstPrinter.print_stmt(s))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(parse_to_string("1 + 2 * 3;"), "(expr (+ 1 (* 2 3)))");
    }

    #[test]
    fn grouping_overrides_precedence() {
        assert_eq!(parse_to_string("(1 + 2) * 3;"), "(expr (* (group (+ 1 2)) 3))");
    }

    #[test]
    fn comparison_binds_tighter_than_equality() {
        assert_eq!(parse_to_string("1 < 2 == true;"), "(expr (== (< 1 2) true))");
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(parse_to_string("1 - 2 - 3;"), "(expr (- (- 1 2) 3))");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(parse_to_string("a = b = 1;"), "(expr (= a (= b 1)))");
    }

    #[test]
    fn unary_operators_nest() {
        assert_eq!(parse_to_string("!!true;"), "(expr (! (! true)))");
    }

    #[test]
    fn var_declaration_with_and_without_initializer() {
        assert_eq!(parse_to_string("var x = 1; var y;"), "(var x 1) (var y)");
    }

    #[test]
    fn block_collects_inner_declarations() {
        assert_eq!(
            parse_to_string("{ var x = 1; print x; }"),
            "(block (var x 1) (print x))"
        );
    }

    #[test]
    fn invalid_assignment_target_keeps_expression() {
        let (statements, diagnostics) = parse("1 = 2;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.iter().next().map(|d| d.to_string()),
            Some("[line 1] Error at '=': Invalid assignment target.".to_string())
        );
        // The left-hand side survives as an expression statement.
        assert_eq!(statements.len(), 1);
        assert_eq!(AstPrinter.print_stmt(&statements[0]), "(expr 1)");
    }

    #[test]
    fn synchronization_reports_multiple_errors_in_one_pass() {
        let (statements, diagnostics) = parse("var 1;\nvar 2;");
        assert_eq!(diagnostics.len(), 2);
        assert!(statements.is_empty());
    }

    #[test]
    fn failed_statement_does_not_poison_its_neighbors() {
        let (statements, diagnostics) = parse("var = 1;\nprint 2;");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(statements.len(), 1);
        assert_eq!(AstPrinter.print_stmt(&statements[0]), "(print 2)");
    }

    #[test]
    fn error_at_end_of_input() {
        let (_, diagnostics) = parse("print 1");
        assert_eq!(
            diagnostics.iter().next().map(|d| d.to_string()),
            Some("[line 1] Error at end: Expect ';' after value.".to_string())
        );
    }
}
