use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::{
    eval::DivisionByZeroError,
    lex::{Eof, NumberError, SingleTokenError},
    parse::{TooDeepError, UnexpectedTokenError, UnknownNameError},
};

/// Anything that can go wrong while turning an operand like `(3+4)/2` into a number.
#[derive(Error, Debug, Diagnostic)]
pub enum ExprError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Character(#[from] SingleTokenError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Number(#[from] NumberError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eof(#[from] Eof),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownName(#[from] UnknownNameError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnexpectedToken(#[from] UnexpectedTokenError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    TooDeep(#[from] TooDeepError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    DivisionByZero(#[from] DivisionByZeroError),
}

/// Failures raised by an operator implementation itself.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum OperatorError {
    #[error("Cannot divide by zero.")]
    #[diagnostic(code(calc::division_by_zero))]
    DivisionByZero,

    #[error("math domain error: {op} is undefined for {input}")]
    #[diagnostic(code(calc::domain))]
    Domain { op: &'static str, input: String },

    #[error("0.0 cannot be raised to a negative power")]
    #[diagnostic(code(calc::domain))]
    ZeroToNegativePower,

    #[error("math range error: {op} result is too large")]
    #[diagnostic(code(calc::range))]
    Range { op: &'static str },
}

/// Everything the interactive loop reports for a single line.
#[derive(Error, Debug, Diagnostic)]
pub enum CalcError {
    #[error("no previous result available")]
    #[diagnostic(
        code(calc::no_previous_result),
        help("`last` refers to the most recent result; compute something first")
    )]
    NoPreviousResult,

    #[error("invalid expression `{expr}`: {source}")]
    #[diagnostic(code(calc::invalid_expression))]
    InvalidExpression {
        expr: String,
        #[source]
        #[diagnostic_source]
        source: ExprError,
    },

    #[error(
        "Unfortunately you have entered an unknown command '{name}'. \
         Please type 'help', so we can try to assist you!"
    )]
    #[diagnostic(code(calc::unknown_command))]
    UnknownCommand { name: String },

    #[error(
        "Unfortunately you have entered an incorrect number of arguments: \
         '{command}' takes {expected}, got {found}. \
         Please type 'help', so we can try to assist you!"
    )]
    #[diagnostic(code(calc::wrong_argument_count))]
    WrongArgumentCount {
        command: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Operator(#[from] OperatorError),
}

/// Errors from the statistics and histogram helpers. These reach the caller
/// untouched, so each one says what is wrong and how to fix it.
#[derive(Error, Debug, Diagnostic)]
pub enum DataError {
    #[error("It looks like the input is empty, please add some data.")]
    #[diagnostic(code(data::empty_input), help("pass at least one number"))]
    EmptyInput,

    #[error("Please provide your data as numbers: {reason}")]
    #[diagnostic(code(data::invalid_data))]
    InvalidData { reason: String },

    #[error("Oops! It looks like {capability} isn't available in this build.")]
    #[diagnostic(code(data::missing_dependency), help("{remedy}"))]
    MissingDependency {
        capability: &'static str,
        remedy: &'static str,
    },

    #[error("failed to write `{}`", .path.display())]
    #[diagnostic(code(data::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
