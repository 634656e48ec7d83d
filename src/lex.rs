use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("Unexpected character '{token}'")]
#[diagnostic(
    code(expr::unexpected_character),
    help("expressions may only use digits, `+ - * /`, parentheses and the constants `pi` and `e`")
)]
pub struct SingleTokenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this character")]
    bad_bit: SourceSpan,

    pub token: char,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Malformed number `{literal}`")]
#[diagnostic(code(expr::malformed_number), help("write numbers like `3`, `0.75` or `1.5e3`"))]
pub struct NumberError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this numeric literal")]
    bad_bit: SourceSpan,

    pub literal: String,
}

#[derive(Error, Debug, Diagnostic)]
#[error("Unexpected end of expression")]
#[diagnostic(
    code(expr::unexpected_end),
    help("the expression ended early, possibly a missing operand or closing parenthesis")
)]
pub struct Eof {
    #[source_code]
    src: NamedSource<String>,

    #[label("expected more here")]
    bad_bit: SourceSpan,
}

impl Eof {
    pub fn build(lexer: &Lexer<'_>) -> Self {
        let end = lexer.whole.len();
        Eof {
            src: lexer.named_source(),
            bad_bit: SourceSpan::from(end.saturating_sub(1)..end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    Minus,
    Plus,
    Star,
    Slash,
    Ident,
    Number(f64),
}

/// Splits a single operand token such as `(3+4)/2` into arithmetic tokens.
pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
    peeked: Option<Result<Token<'de>, crate::ExprError>>,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
            peeked: None,
        }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.byte
    }

    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new("<operand>", self.whole.to_string())
    }

    pub fn peek(&mut self) -> Option<&Result<Token<'de>, crate::ExprError>> {
        if self.peeked.is_some() {
            return self.peeked.as_ref();
        }
        self.peeked = self.next();
        self.peeked.as_ref()
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, crate::ExprError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let literal = &self.rest[..c.len_utf8()];
            let offset = self.byte;
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            enum Start {
                Ident,
                Number,
            }

            let process = |kind: TokenKind| {
                Some(Ok(Token {
                    kind,
                    literal,
                    offset,
                }))
            };

            let started = match c {
                '(' => return process(TokenKind::LeftParen),
                ')' => return process(TokenKind::RightParen),
                '-' => return process(TokenKind::Minus),
                '+' => return process(TokenKind::Plus),
                '*' => return process(TokenKind::Star),
                '/' => return process(TokenKind::Slash),
                'a'..='z' | 'A'..='Z' | '_' => Start::Ident,
                '0'..='9' | '.' => Start::Number,
                ' ' | '\r' | '\t' | '\n' => continue,
                c => {
                    return Some(Err(SingleTokenError {
                        src: self.named_source(),
                        bad_bit: SourceSpan::from(offset..self.byte),
                        token: c,
                    }
                    .into()));
                }
            };

            match started {
                Start::Ident => {
                    let first_non_ident = cur
                        .find(|c| !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_'))
                        .unwrap_or(cur.len());

                    let literal = &cur[..first_non_ident];

                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    return Some(Ok(Token {
                        kind: TokenKind::Ident,
                        literal,
                        offset,
                    }));
                }
                Start::Number => {
                    let literal = &cur[..number_len(cur)];

                    let extra_bytes = literal.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    return match literal.parse() {
                        Ok(n) => Some(Ok(Token {
                            kind: TokenKind::Number(n),
                            literal,
                            offset,
                        })),
                        Err(_) => Some(Err(NumberError {
                            src: self.named_source(),
                            bad_bit: SourceSpan::from(offset..self.byte),
                            literal: literal.to_string(),
                        }
                        .into())),
                    };
                }
            }
        }
    }
}

/// Length of the numeric literal at the start of `s`: digits and dots, then an
/// exponent only when it is followed by at least one digit (so `2e` stays `2`).
fn number_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = bytes
        .iter()
        .position(|b| !(b.is_ascii_digit() || *b == b'.'))
        .unwrap_or(bytes.len());

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                exp += 1;
            }
            end = exp;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExprError;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .map(|token| token.map(|t| t.kind))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn operators_and_parens() {
        assert_eq!(
            kinds("(3+4)/2"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Number(3.0),
                TokenKind::Plus,
                TokenKind::Number(4.0),
                TokenKind::RightParen,
                TokenKind::Slash,
                TokenKind::Number(2.0),
            ]
        );
    }

    #[test]
    fn exponent_needs_digits() {
        assert_eq!(kinds("1.5e3"), vec![TokenKind::Number(1500.0)]);
        assert_eq!(kinds("2e-1"), vec![TokenKind::Number(0.2)]);
        assert_eq!(kinds("2e"), vec![TokenKind::Number(2.0), TokenKind::Ident]);
    }

    #[test]
    fn identifiers_keep_their_text() {
        let tokens: Vec<_> = Lexer::new("pi*__import__").map(Result::unwrap).collect();
        assert_eq!(tokens[0].literal, "pi");
        assert_eq!(tokens[2].literal, "__import__");
        assert_eq!(tokens[2].offset, 3);
    }

    #[test]
    fn stray_character_is_rejected() {
        let err = Lexer::new("3;4").nth(1).unwrap().unwrap_err();
        assert!(matches!(err, ExprError::Character(ref e) if e.token == ';'));
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err = Lexer::new("1.2.3").next().unwrap().unwrap_err();
        assert!(matches!(err, ExprError::Number(ref e) if e.literal == "1.2.3"));
    }
}
