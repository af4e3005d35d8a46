use crate::{
    ast::{BinaryOperator, Expr, ExprKind, Ident, Number, Program, Stmt, StmtKind},
    lexer::{self, extract},
    token::{Span, Spanned, Token, TokenKind},
    util::intern::Interner,
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// How deeply parenthesized expressions and statement bodies may nest.
/// Parsing and code generation recurse once per level.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Lexes and parses the provided source.
///
/// The tokens buffer must be empty; it is left filled with the lexed tokens
/// so that callers may reuse its allocation.
pub fn parse_program(
    src: &str,
    tokens: &mut Vec<Token>,
    ident_interner: &mut Interner,
) -> Result<Program> {
    assert!(tokens.is_empty());
    lexer::lex(src, tokens).map_err(|error| error.span.wrap(Error::Lexer(error.inner)))?;
    parse_tokens(src, tokens, ident_interner)
}

/// Parses an already lexed token sequence. The source is used to extract
/// identifier names and literal values.
pub fn parse_tokens(src: &str, tokens: &[Token], ident_interner: &mut Interner) -> Result<Program> {
    Parser::new(src, tokens, ident_interner).parse_program()
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("expected {expected}, but got {actual}")]
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    #[error("expected statement, but got {actual}")]
    ExpectedStatement { actual: TokenKind },
    #[error("expected expression, but got {actual}")]
    ExpectedExpression { actual: TokenKind },
    #[error("expected binary operator, but got {actual}")]
    ExpectedOperator { actual: TokenKind },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("number literal out of range")]
    NumberOutOfRange,
    #[error("nesting exceeds {} levels", MAX_NESTING_DEPTH)]
    NestingTooDeep,
    #[error("{0}")]
    Lexer(lexer::Error),
}

struct Parser<'src, 'tok, 'ident> {
    src: &'src str,
    tokens: &'tok [Token],
    ident_interner: &'ident mut Interner,
    cursor: usize,
    depth: usize,
}

impl Parser<'_, '_, '_> {
    fn parse_program(&mut self) -> Result<Program> {
        let mut body = Vec::with_capacity(16);
        while self.peek().is_some() {
            body.push(self.parse_stmt()?);
        }
        Ok(Program { body })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        let token = self.advance_or_eof("statement")?;
        let kind = match token.kind {
            TokenKind::Print => StmtKind::Print(self.parse_expr()?),

            // Declaration: let ID = expr
            TokenKind::Let => {
                let name = self.parse_ident()?;
                self.consume(TokenKind::Assign)?;
                let initializer = self.parse_expr()?;
                StmtKind::Let { name, initializer }
            }

            // Assignment: ID = expr
            TokenKind::Identifier => {
                let target = self.ident(token);
                self.consume(TokenKind::Assign)?;
                let value = self.parse_expr()?;
                StmtKind::Assignment { target, value }
            }

            // Block: { stmt* }
            TokenKind::LBrace => self.nested(token, |this| {
                let body = this.parse_stmt_list(&[TokenKind::RBrace])?;
                this.consume(TokenKind::RBrace)?;
                Ok(StmtKind::Block { body })
            })?,

            // Conditional: if cond stmt* [else stmt*] end
            TokenKind::If => self.nested(token, |this| {
                let condition = this.parse_condition()?;
                let then_body = this.parse_stmt_list(&[TokenKind::Else, TokenKind::End])?;
                let else_body = if this.take(TokenKind::Else) {
                    Some(this.parse_stmt_list(&[TokenKind::End])?)
                } else {
                    None
                };
                this.consume(TokenKind::End)?;
                Ok(StmtKind::If {
                    condition,
                    then_body,
                    else_body,
                })
            })?,

            // Loop: while cond stmt* end
            TokenKind::While => self.nested(token, |this| {
                let condition = this.parse_condition()?;
                let body = this.parse_stmt_list(&[TokenKind::End])?;
                this.consume(TokenKind::End)?;
                Ok(StmtKind::While { condition, body })
            })?,

            TokenKind::Break => StmtKind::Break,
            TokenKind::Continue => StmtKind::Continue,

            // Pixel write: setpixel x y value
            TokenKind::SetPixel => {
                let x = self.parse_expr()?;
                let y = self.parse_expr()?;
                let value = self.parse_expr()?;
                StmtKind::SetPixel { x, y, value }
            }

            other => {
                let error = Error::ExpectedStatement { actual: other };
                return Err(token.span().wrap(error));
            }
        };
        let span = token.span().to(self.last_span());
        Ok(Stmt { kind, span })
    }

    /// Parses statements until one of the provided terminators (or the end of
    /// input) is found. The terminator is *not* consumed.
    fn parse_stmt_list(&mut self, terminators: &[TokenKind]) -> Result<Vec<Stmt>> {
        let mut body = Vec::with_capacity(4);
        while let Some(token) = self.peek() {
            if terminators.contains(&token.kind) {
                break;
            }
            body.push(self.parse_stmt()?);
        }
        Ok(body)
    }

    /// Parses the parenthesized condition of `if` and `while`.
    ///
    /// Unlike regular expressions, a condition may apply one operator to its
    /// first operand without an extra pair of parentheses, as in
    /// `while (x < 3)`.
    fn parse_condition(&mut self) -> Result<Expr> {
        self.consume(TokenKind::LParen)?;
        let lhs = self.parse_expr()?;
        let condition = if self.is(TokenKind::RParen) {
            lhs
        } else {
            let op = self.parse_operator()?;
            let rhs = self.parse_expr()?;
            let span = lhs.span.to(rhs.span);
            let kind = ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
            Expr { kind, span }
        };
        self.consume(TokenKind::RParen)?;
        Ok(condition)
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let token = self.advance_or_eof("expression")?;
        match token.kind {
            TokenKind::Number => {
                let number = self.parse_number(token)?;
                Ok(Expr {
                    kind: ExprKind::Number(number),
                    span: token.span(),
                })
            }
            TokenKind::Identifier => Ok(Expr {
                kind: ExprKind::Id(self.ident(token)),
                span: token.span(),
            }),

            // Binary: ( expr op expr )
            TokenKind::LParen => self.nested(token, |this| {
                let lhs = this.parse_expr()?;
                let op = this.parse_operator()?;
                let rhs = this.parse_expr()?;
                let end = this.consume(TokenKind::RParen)?;
                Ok(Expr {
                    kind: ExprKind::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    span: token.span().to(end.span()),
                })
            }),

            other => {
                let error = Error::ExpectedExpression { actual: other };
                Err(token.span().wrap(error))
            }
        }
    }

    fn parse_operator(&mut self) -> Result<BinaryOperator> {
        let token = self.advance_or_eof("binary operator")?;
        let op = match token.kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::EqEq => BinaryOperator::Eq,
            TokenKind::Less => BinaryOperator::Lt,
            TokenKind::Greater => BinaryOperator::Gt,
            TokenKind::AndAnd => BinaryOperator::And,
            other => {
                let error = Error::ExpectedOperator { actual: other };
                return Err(token.span().wrap(error));
            }
        };
        Ok(op)
    }

    fn parse_number(&self, token: Token) -> Result<Number> {
        let out_of_range = || token.span().wrap(Error::NumberOutOfRange);
        if extract::is_float(token, self.src) {
            match extract::float(token, self.src) {
                Ok(value) if value.is_finite() => Ok(Number::Float(value)),
                _ => Err(out_of_range()),
            }
        } else {
            let value = extract::int(token, self.src).map_err(|_| out_of_range())?;
            Ok(Number::Int(value))
        }
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(self.ident(token))
    }

    fn ident(&mut self, token: Token) -> Ident {
        Ident {
            name: self.ident_interner.intern(extract::ident(token, self.src)),
            span: token.span(),
        }
    }
}

impl Parser<'_, '_, '_> {
    fn new<'src, 'tok, 'ident>(
        src: &'src str,
        tokens: &'tok [Token],
        ident_interner: &'ident mut Interner,
    ) -> Parser<'src, 'tok, 'ident> {
        Parser {
            src,
            tokens,
            ident_interner,
            cursor: 0,
            depth: 0,
        }
    }

    /// Runs `f` one nesting level deeper. Fails at `opening` if that exceeds
    /// [`MAX_NESTING_DEPTH`].
    fn nested<T>(
        &mut self,
        opening: Token,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth == MAX_NESTING_DEPTH {
            return Err(opening.span().wrap(Error::NestingTooDeep));
        }
        self.depth += 1;
        let ret = f(self);
        self.depth -= 1;
        ret
    }

    /// Returns the current token, if any input is left.
    #[inline]
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).copied()
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> Option<Token> {
        let c = self.peek()?;
        self.cursor += 1;
        Some(c)
    }

    /// Returns the current token and advances. Fails if the input is
    /// exhausted, reporting what was expected instead.
    fn advance_or_eof(&mut self, expected: &'static str) -> Result<Token> {
        self.advance().ok_or_else(|| self.eof_error(expected))
    }

    /// Returns the span of the most recently consumed token.
    fn last_span(&self) -> Span {
        match self.cursor.checked_sub(1) {
            Some(prev) => self.tokens[prev].span(),
            None => Span::new_of_length(0, 0),
        }
    }

    fn eof_error(&self, expected: &'static str) -> Spanned<Error> {
        Span::new_of_length(self.src.len(), 0).wrap(Error::UnexpectedEof { expected })
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.kind == expect)
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one, returning it.
    /// If not, fails.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        match self.peek() {
            Some(c) if c.kind == expect => {
                self.cursor += 1;
                Ok(c)
            }
            Some(c) => Err(c.span().wrap(Error::Unexpected {
                actual: c.kind,
                expected: expect,
            })),
            None => Err(self.eof_error(expect.describe())),
        }
    }
}
