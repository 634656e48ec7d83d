use log::trace;
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    ExprError, Parser,
    parse::{Atom, Op, TokenTree},
};

#[derive(Error, Debug, Diagnostic, Clone, Copy, PartialEq, Eq)]
#[error("Division by zero")]
#[diagnostic(code(expr::division_by_zero))]
pub struct DivisionByZeroError;

/// Evaluates an arithmetic expression made of numbers, `+ - * /`, parentheses
/// and the named constants. Nothing else is reachable from here.
pub fn evaluate(source: &str) -> Result<f64, ExprError> {
    let tree = Parser::new(source).parse()?;
    trace!("parsed `{source}` as {tree}");
    eval_tree(&tree)
}

pub fn eval_tree(tree: &TokenTree) -> Result<f64, ExprError> {
    Ok(match tree {
        TokenTree::Atom(Atom::Number(n)) => *n,
        TokenTree::Atom(Atom::Constant(c)) => c.value(),
        TokenTree::Cons(op, trees) => {
            let values = trees
                .iter()
                .map(eval_tree)
                .collect::<Result<Vec<_>, _>>()?;
            match (op, values.as_slice()) {
                (Op::Minus, [num]) => -num,
                (Op::Plus, [num]) => *num,
                (Op::Minus, [lhs, rhs]) => lhs - rhs,
                (Op::Plus, [lhs, rhs]) => lhs + rhs,
                (Op::Star, [lhs, rhs]) => lhs * rhs,
                (Op::Slash, [lhs, rhs]) => {
                    if *rhs == 0.0 {
                        return Err(DivisionByZeroError.into());
                    }
                    lhs / rhs
                }
                (op, values) => unreachable!("{op} applied to {} operands", values.len()),
            }
        }
    })
}
