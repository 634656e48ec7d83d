use std::fmt::Display;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::{
    ExprError, Lexer,
    lex::{Eof, Token, TokenKind},
};

#[derive(Error, Debug, Diagnostic)]
#[error("Unknown name `{name}`")]
#[diagnostic(
    code(expr::unknown_name),
    help("only the constants `pi` and `e` can be referenced inside an expression")
)]
pub struct UnknownNameError {
    #[source_code]
    src: NamedSource<String>,

    #[label("not a known constant")]
    bad_bit: SourceSpan,

    pub name: String,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Unexpected `{found}`")]
#[diagnostic(code(expr::unexpected_token), help("{hint}"))]
pub struct UnexpectedTokenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    bad_bit: SourceSpan,

    pub found: String,
    hint: &'static str,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Expression nests deeper than {limit} levels")]
#[diagnostic(
    code(expr::too_deep),
    help("simplify the expression or split it across several commands")
)]
pub struct TooDeepError {
    #[source_code]
    src: NamedSource<String>,

    #[label("nesting limit reached here")]
    bad_bit: SourceSpan,

    pub limit: usize,
}

/// Deepest nesting of parentheses and prefix signs a single operand may use.
pub const MAX_DEPTH: usize = 256;

/// Named constants an expression (or a bare operand) may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub const ALL: [Constant; 2] = [Constant::Pi, Constant::E];

    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|constant| constant.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

pub struct Parser<'de> {
    lexer: Lexer<'de>,
    depth: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenTree {
    Atom(Atom),
    Cons(Op, Vec<TokenTree>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Atom {
    Number(f64),
    Constant(Constant),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Minus,
    Plus,
    Star,
    Slash,
}

impl<'de> Parser<'de> {
    pub fn new(whole: &'de str) -> Self {
        Parser {
            lexer: Lexer::new(whole),
            depth: 0,
        }
    }

    /// Parses the whole input as one expression; anything left over is an error.
    pub fn parse(mut self) -> Result<TokenTree, ExprError> {
        let tree = self.parse_within(0)?;
        match self.lexer.next() {
            None => Ok(tree),
            Some(Ok(token)) => Err(self.unexpected(token, "remove the trailing input").into()),
            Some(Err(e)) => Err(e),
        }
    }

    pub fn parse_within(&mut self, min_bp: u8) -> Result<TokenTree, ExprError> {
        if self.depth == MAX_DEPTH {
            let at = self.lexer.position();
            return Err(TooDeepError {
                src: self.lexer.named_source(),
                bad_bit: SourceSpan::from(at..at),
                limit: MAX_DEPTH,
            }
            .into());
        }
        self.depth += 1;
        let tree = self.parse_operand(min_bp);
        self.depth -= 1;
        tree
    }

    fn parse_operand(&mut self, min_bp: u8) -> Result<TokenTree, ExprError> {
        let lhs = match self.lexer.next() {
            Some(Ok(token)) => token,
            Some(Err(e)) => return Err(e),
            None => return Err(Eof::build(&self.lexer).into()),
        };

        let mut lhs = match lhs.kind {
            TokenKind::Number(n) => TokenTree::Atom(Atom::Number(n)),
            TokenKind::Ident => match Constant::lookup(lhs.literal) {
                Some(constant) => TokenTree::Atom(Atom::Constant(constant)),
                None => {
                    return Err(UnknownNameError {
                        src: self.lexer.named_source(),
                        bad_bit: span_of(&lhs),
                        name: lhs.literal.to_string(),
                    }
                    .into());
                }
            },
            TokenKind::LeftParen => {
                let inner = self.parse_within(0)?;
                match self.lexer.next() {
                    Some(Ok(Token {
                        kind: TokenKind::RightParen,
                        ..
                    })) => inner,
                    Some(Ok(token)) => {
                        return Err(self.unexpected(token, "close the parenthesis with `)`").into());
                    }
                    Some(Err(e)) => return Err(e),
                    None => return Err(Eof::build(&self.lexer).into()),
                }
            }
            TokenKind::Minus | TokenKind::Plus => {
                let op = match lhs.kind {
                    TokenKind::Minus => Op::Minus,
                    TokenKind::Plus => Op::Plus,
                    _ => unreachable!(),
                };
                let ((), r_bp) = prefix_binding_power(op);
                let rhs = self.parse_within(r_bp)?;
                TokenTree::Cons(op, vec![rhs])
            }
            TokenKind::RightParen | TokenKind::Star | TokenKind::Slash => {
                return Err(self.unexpected(lhs, "an operand is missing before this").into());
            }
        };

        loop {
            let token = match self.lexer.peek() {
                None => break,
                Some(Ok(token)) => *token,
                Some(Err(_)) => match self.lexer.next() {
                    Some(Err(e)) => return Err(e),
                    _ => unreachable!(),
                },
            };

            let op = match token.kind {
                TokenKind::Plus => Op::Plus,
                TokenKind::Minus => Op::Minus,
                TokenKind::Star => Op::Star,
                TokenKind::Slash => Op::Slash,
                TokenKind::RightParen => break,
                _ => {
                    return Err(self
                        .unexpected(token, "put an operator between the two operands")
                        .into());
                }
            };

            let (l_bp, r_bp) = infix_binding_power(op);
            if l_bp < min_bp {
                break;
            }
            self.lexer.next();

            let rhs = self.parse_within(r_bp)?;
            lhs = TokenTree::Cons(op, vec![lhs, rhs]);
        }

        Ok(lhs)
    }

    fn unexpected(&self, token: Token<'_>, hint: &'static str) -> UnexpectedTokenError {
        UnexpectedTokenError {
            src: self.lexer.named_source(),
            bad_bit: span_of(&token),
            found: token.literal.to_string(),
            hint,
        }
    }
}

fn span_of(token: &Token<'_>) -> SourceSpan {
    SourceSpan::from(token.offset..token.offset + token.literal.len())
}

fn prefix_binding_power(op: Op) -> ((), u8) {
    match op {
        Op::Minus | Op::Plus => ((), 5),
        Op::Star | Op::Slash => unreachable!("not a prefix operator: {op:?}"),
    }
}

fn infix_binding_power(op: Op) -> (u8, u8) {
    match op {
        Op::Plus | Op::Minus => (1, 2),
        Op::Star | Op::Slash => (3, 4),
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Minus => write!(f, "-"),
            Op::Plus => write!(f, "+"),
            Op::Star => write!(f, "*"),
            Op::Slash => write!(f, "/"),
        }
    }
}

impl Display for TokenTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenTree::Atom(Atom::Number(n)) => write!(f, "{n}"),
            TokenTree::Atom(Atom::Constant(c)) => write!(f, "{}", c.name()),
            TokenTree::Cons(op, trees) => {
                write!(f, "({op}")?;
                for tree in trees {
                    write!(f, " {tree}")?;
                }
                write!(f, ")")
            }
        }
    }
}
