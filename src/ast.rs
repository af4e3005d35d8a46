// program ::= stmt*
// stmt ::= print expr
//        | let ID '=' expr
//        | ID '=' expr
//        | '{' stmt* '}'
//        | if cond stmt* [else stmt*] end
//        | while cond stmt* end
//        | break
//        | continue
//        | setpixel expr expr expr
// cond ::= '(' expr [op expr] ')'
// expr ::= number
//        | ID
//        | '(' expr op expr ')'
// op ::= '+' | '-' | '*' | '/' | '==' | '<' | '>' | '&&'
//
// Every binary expression is parenthesized, so there is no precedence. The
// only exception is the condition of `if` and `while`, whose single optional
// operator is applied directly to the first operand.

use crate::{token::Span, util::intern::Interned};

#[derive(Debug, PartialEq, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum StmtKind {
    Print(Expr),
    Let {
        name: Ident,
        initializer: Expr,
    },
    Assignment {
        target: Ident,
        value: Expr,
    },
    Block {
        body: Vec<Stmt>,
    },
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    Break,
    Continue,
    /// Writes `value` into the pixel buffer at column `x`, row `y`.
    SetPixel {
        x: Expr,
        y: Expr,
        value: Expr,
    },
}

#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Number(Number),
    Id(Ident),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// A numeric literal. Literals written without a fractional part are
/// integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i32),
    Float(f32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
    Gt,
    And,
}

impl BinaryOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Eq => "==",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::And => "&&",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: Interned,
    pub span: Span,
}

impl From<Ident> for Interned {
    fn from(value: Ident) -> Self {
        value.name
    }
}

impl From<&Ident> for Interned {
    fn from(value: &Ident) -> Self {
        value.name
    }
}
