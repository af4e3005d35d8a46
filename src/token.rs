use std::{fmt, ops::Range};

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            len: span.len,
            lo: span.lo,
        }
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
        }
    }

    /// Returns the source text this token was scanned from.
    pub fn text<'src>(&self, src: &'src str) -> &'src str {
        self.span().substr(src)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {})", self.kind, self.span())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, u32::try_from(hi - lo).unwrap())
    }

    pub fn new_of_length(lo: usize, len: u32) -> Span {
        Span { len, lo }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    /// Returns a span which covers both `self` and `other`.
    pub fn to(&self, other: Span) -> Span {
        let lo = self.lo.min(other.lo);
        let hi = self.hi().max(other.hi());
        Span::new_of_bounds(lo..hi)
    }

    pub fn substr<'src>(&self, src: &'src str) -> &'src str {
        &src[self.lo..self.hi()]
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({self}, len: {})", self.len)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lo = self.lo;
        let hi = self.hi();
        write!(f, "{lo}..{hi}")
    }
}

/// A value tagged with the source range it refers to.
///
/// The alternate form (`{:#}`) prefixes the message with the span.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{}: ", self.span)?;
        }
        write!(f, "{}", self.inner)
    }
}

impl<T: fmt::Debug + fmt::Display> std::error::Error for Spanned<T> {}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Print,
    Let,
    If,
    Else,
    End,
    While,
    Break,
    Continue,
    SetPixel,

    Plus,
    Minus,
    Star,
    Slash,
    /// `==`
    EqEq,
    Less,
    Greater,
    /// `&&`
    AndAnd,

    LParen,
    RParen,
    LBrace,
    RBrace,
    /// `=`
    Assign,

    Identifier,
    Number,

    Whitespace,
}

/// The coarse classification of a token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenCategory {
    Number,
    Keyword,
    Identifier,
    Operator,
    Punctuation,
    Whitespace,
}

impl TokenKind {
    pub fn category(self) -> TokenCategory {
        use TokenKind::*;
        match self {
            Print | Let | If | Else | End | While | Break | Continue | SetPixel => {
                TokenCategory::Keyword
            }
            Plus | Minus | Star | Slash | EqEq | Less | Greater | AndAnd => TokenCategory::Operator,
            LParen | RParen | LBrace | RBrace | Assign => TokenCategory::Punctuation,
            Identifier => TokenCategory::Identifier,
            Number => TokenCategory::Number,
            Whitespace => TokenCategory::Whitespace,
        }
    }
}

impl TokenKind {
    /// A human-readable name of the token, as used in diagnostics.
    pub const fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Print => "`print`",
            Let => "`let`",
            If => "`if`",
            Else => "`else`",
            End => "`end`",
            While => "`while`",
            Break => "`break`",
            Continue => "`continue`",
            SetPixel => "`setpixel`",
            Plus => "`+`",
            Minus => "`-`",
            Star => "`*`",
            Slash => "`/`",
            EqEq => "`==`",
            Less => "`<`",
            Greater => "`>`",
            AndAnd => "`&&`",
            LParen => "`(`",
            RParen => "`)`",
            LBrace => "`{`",
            RBrace => "`}`",
            Assign => "`=`",
            Identifier => "identifier",
            Number => "number",
            Whitespace => "whitespace",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "print" => TokenKind::Print,
    "let" => TokenKind::Let,
    "if" => TokenKind::If,
    "else" => TokenKind::Else,
    "end" => TokenKind::End,
    "while" => TokenKind::While,
    "break" => TokenKind::Break,
    "continue" => TokenKind::Continue,
    "setpixel" => TokenKind::SetPixel,
};
