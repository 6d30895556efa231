use crate::token::{LiteralValue, Token};

/// Statement nodes. A parsed program is an ordered `Vec<Stmt>`; order is
/// evaluation order.
pub enum Stmt {
    Expression(Box<ExpressionStmt>),
    Print(Box<PrintStmt>),
    Var(Box<VarStmt>),
    Block(Box<BlockStmt>),
}

pub trait StmtVisitor<T> {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) -> T;
    fn visit_print_stmt(&mut self, stmt: &PrintStmt) -> T;
    fn visit_var_stmt(&mut self, stmt: &VarStmt) -> T;
    fn visit_block_stmt(&mut self, stmt: &BlockStmt) -> T;
}

impl Stmt {
    pub fn accept<T, V: StmtVisitor<T>>(&self, visitor: &mut V) -> T {
        use Stmt::*;
        match self {
            Expression(stmt) => visitor.visit_expression_stmt(stmt),
            Print(stmt) => visitor.visit_print_stmt(stmt),
            Var(stmt) => visitor.visit_var_stmt(stmt),
            Block(stmt) => visitor.visit_block_stmt(stmt),
        }
    }
}

pub struct ExpressionStmt {
    pub expression: Expr,
}

pub struct PrintStmt {
    pub expression: Expr,
}

pub struct VarStmt {
    pub name: Token,
    pub initializer: Option<Expr>,
}

pub struct BlockStmt {
    pub statements: Vec<Stmt>,
}

/// Expression nodes. Each node exclusively owns its children; the parser
/// produces a tree, never a graph.
pub enum Expr {
    Literal(Box<LiteralExpr>),
    Grouping(Box<GroupingExpr>),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Variable(Box<VariableExpr>),
    Assign(Box<AssignExpr>),
}

pub trait ExprVisitor<T> {
    fn visit_literal_expr(&mut self, expr: &LiteralExpr) -> T;
    fn visit_grouping_expr(&mut self, expr: &GroupingExpr) -> T;
    fn visit_unary_expr(&mut self, expr: &UnaryExpr) -> T;
    fn visit_binary_expr(&mut self, expr: &BinaryExpr) -> T;
    fn visit_variable_expr(&mut self, expr: &VariableExpr) -> T;
    fn visit_assign_expr(&mut self, expr: &AssignExpr) -> T;
}

impl Expr {
    pub fn accept<T, V: ExprVisitor<T>>(&self, visitor: &mut V) -> T {
        use Expr::*;
        match self {
            Literal(expr) => visitor.visit_literal_expr(expr),
            Grouping(expr) => visitor.visit_grouping_expr(expr),
            Unary(expr) => visitor.visit_unary_expr(expr),
            Binary(expr) => visitor.visit_binary_expr(expr),
            Variable(expr) => visitor.visit_variable_expr(expr),
            Assign(expr) => visitor.visit_assign_expr(expr),
        }
    }
}

pub struct LiteralExpr {
    pub value: LiteralValue,
}

pub struct GroupingExpr {
    pub expression: Expr,
}

pub struct UnaryExpr {
    pub operator: Token,
    pub expression: Expr,
}

pub struct BinaryExpr {
    pub left: Expr,
    pub operator: Token,
    pub right: Expr,
}

pub struct VariableExpr {
    pub name: Token,
}

pub struct AssignExpr {
    pub name: Token,
    pub value: Expr,
}
