use log::trace;

use crate::{CalcError, eval, parse::Constant};

/// Reserved operand naming the most recent result.
pub const LAST: &str = "last";

/// Memory of one interactive session.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Session {
    last: Option<f64>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }

    pub fn remember(&mut self, value: f64) {
        self.last = Some(value);
    }
}

/// Turns one operand token into a number.
///
/// Tried in order: `last`, a named constant, a numeric literal, and finally a
/// small arithmetic expression such as `(3+4)/2` or `pi/2`. Matching ignores
/// case throughout.
pub fn resolve(token: &str, session: &Session) -> Result<f64, CalcError> {
    let token = token.to_lowercase();

    if token == LAST {
        trace!("`{token}` is the last result");
        return session.last().ok_or(CalcError::NoPreviousResult);
    }

    if let Some(constant) = Constant::lookup(&token) {
        trace!("`{token}` is a constant");
        return Ok(constant.value());
    }

    if let Some(n) = parse_literal(&token) {
        trace!("`{token}` is a literal");
        return Ok(n);
    }

    trace!("evaluating `{token}` as an expression");
    eval::evaluate(&token).map_err(|source| CalcError::InvalidExpression {
        expr: token,
        source,
    })
}

/// A plain float literal, also accepting `_` between digits as in `1_000.5`.
fn parse_literal(token: &str) -> Option<f64> {
    if let Ok(n) = token.parse() {
        return Some(n);
    }
    let bytes = token.as_bytes();
    let grouped = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if !grouped || !token.contains('_') {
        return None;
    }
    token.replace('_', "").parse().ok()
}
