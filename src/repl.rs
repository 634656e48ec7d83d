use std::io::{self, Write};

use log::{debug, warn};
use rustyline::{DefaultEditor, error::ReadlineError};

use crate::{
    CalcError,
    help::build_help_text,
    registry::Registry,
    resolve::{Session, resolve},
};

pub const PROMPT: &str = "Type your command here → ";
pub const WELCOME: &str = "\nHello! 👋 Welcome to the Simple Calculator.\n\
                           Type a command below, or type 'help' to see all available operations.\n";
pub const FAREWELL: &str = "\n\nGoodbye! Thanks for using the calculator.";

/// What a single read from the terminal produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Line(String),
    Eof,
    Interrupted,
}

/// Source of input lines for [`Calculator::run`].
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Input, ReadlineError>;
}

impl LineReader for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Input, ReadlineError> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.add_history_entry(line.as_str()) {
                        warn!("could not record history entry: {e}");
                    }
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(e) => Err(e),
        }
    }
}

/// Result of interpreting one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Nothing,
    Help,
    Exit,
    Value(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Calculator<'r> {
    registry: &'r Registry,
    session: Session,
    help: String,
}

impl Default for Calculator<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator<'static> {
    pub fn new() -> Self {
        Self::with_registry(Registry::builtin())
    }
}

impl<'r> Calculator<'r> {
    pub fn with_registry(registry: &'r Registry) -> Self {
        Self {
            registry,
            session: Session::new(),
            help: build_help_text(registry),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    /// Interprets one line without printing anything.
    ///
    /// The session only changes when a value is produced; any error leaves it
    /// exactly as it was.
    pub fn execute(&mut self, line: &str) -> Result<Outcome, CalcError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, operands)) = fields.split_first() else {
            return Ok(Outcome::Nothing);
        };
        let command = command.to_lowercase();

        match command.as_str() {
            "exit" | "quit" => return Ok(Outcome::Exit),
            "help" | "h" | "?" => return Ok(Outcome::Help),
            _ => {}
        }

        let Some(operator) = self.registry.lookup(&command) else {
            return self.bare_operand(fields[0], operands.is_empty(), command);
        };

        let expected = operator.arity().operands();
        if operands.len() != expected {
            return Err(CalcError::WrongArgumentCount {
                command,
                expected,
                found: operands.len(),
            });
        }

        debug!("dispatching `{command}` with {operands:?}");
        let values = operands
            .iter()
            .map(|token| resolve(token, &self.session))
            .collect::<Result<Vec<_>, _>>()?;
        let result = operator.apply(&values)?;

        self.session.remember(result);
        Ok(Outcome::Value(result))
    }

    // A lone `last`, `pi/2` or `(3+4)/2` echoes its value; anything else that
    // is not a command is reported as unknown.
    fn bare_operand(
        &mut self,
        token: &str,
        alone: bool,
        command: String,
    ) -> Result<Outcome, CalcError> {
        if !alone {
            return Err(CalcError::UnknownCommand { name: command });
        }
        match resolve(token, &self.session) {
            Ok(value) => {
                debug!("`{token}` is a bare operand");
                self.session.remember(value);
                Ok(Outcome::Value(value))
            }
            Err(CalcError::InvalidExpression { .. }) => {
                Err(CalcError::UnknownCommand { name: command })
            }
            Err(e) => Err(e),
        }
    }

    /// Interprets one line and writes whatever it produced to `out`.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        match self.execute(line) {
            Ok(Outcome::Nothing) => {}
            Ok(Outcome::Help) => writeln!(out, "{}", self.help)?,
            Ok(Outcome::Exit) => {
                writeln!(out, "{FAREWELL}")?;
                return Ok(Flow::Exit);
            }
            Ok(Outcome::Value(value)) => writeln!(out, "{}", format_value(value))?,
            Err(e) => {
                writeln!(out, "Error: {e}")?;
                debug!("{:?}", miette::Report::new(e));
            }
        }
        Ok(Flow::Continue)
    }

    /// Runs the interactive session until `exit`, end of input or an interrupt.
    pub fn run(&mut self, reader: &mut impl LineReader, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "{}", self.help)?;
        writeln!(out, "{WELCOME}")?;

        loop {
            out.flush()?;
            match reader.read_line(PROMPT) {
                Ok(Input::Line(line)) => {
                    if self.handle_line(&line, out)? == Flow::Exit {
                        return Ok(());
                    }
                }
                Ok(Input::Eof | Input::Interrupted) => break,
                Err(e) => {
                    warn!("reading input failed, ending the session: {e}");
                    break;
                }
            }
        }

        writeln!(out, "{FAREWELL}")
    }
}

/// Shortest round-trip digits; magnitudes from `1e16` up or below `1e-4` are
/// written in exponent form with a signed, two-digit exponent (`1e+300`).
pub fn format_value(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    match exponent.parse::<i32>() {
        Ok(exponent) if !(-4..16).contains(&exponent) => {
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
        }
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OperatorError;

    #[test]
    fn blank_lines_do_nothing() {
        let mut calc = Calculator::new();
        assert_eq!(calc.execute("").unwrap(), Outcome::Nothing);
        assert_eq!(calc.execute("   \t ").unwrap(), Outcome::Nothing);
        assert_eq!(calc.session().last(), None);
    }

    #[test]
    fn control_words_ignore_case() {
        let mut calc = Calculator::new();
        for word in ["exit", "QUIT", "Exit now"] {
            assert_eq!(calc.execute(word).unwrap(), Outcome::Exit);
        }
        for word in ["help", "H", "?"] {
            assert_eq!(calc.execute(word).unwrap(), Outcome::Help);
        }
    }

    #[test]
    fn results_are_remembered() {
        let mut calc = Calculator::new();
        assert_eq!(calc.execute("ADD 2 3").unwrap(), Outcome::Value(5.0));
        assert_eq!(calc.execute("multiply last last").unwrap(), Outcome::Value(25.0));
        assert_eq!(calc.session().last(), Some(25.0));
    }

    #[test]
    fn argument_count_is_checked_before_resolution() {
        let mut calc = Calculator::new();
        assert!(matches!(
            calc.execute("sqrt"),
            Err(CalcError::WrongArgumentCount {
                expected: 1,
                found: 0,
                ..
            })
        ));
        assert!(matches!(
            calc.execute("add last 1 2"),
            Err(CalcError::WrongArgumentCount {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn first_failing_operand_aborts() {
        let mut calc = Calculator::new();
        calc.execute("add 1 1").unwrap();
        assert!(matches!(
            calc.execute("add nope 1/0"),
            Err(CalcError::InvalidExpression { ref expr, .. }) if expr == "nope"
        ));
        assert_eq!(calc.session().last(), Some(2.0));
    }

    #[test]
    fn failed_operation_keeps_memory() {
        let mut calc = Calculator::new();
        calc.execute("add 4 5").unwrap();
        assert!(matches!(
            calc.execute("divide last 0"),
            Err(CalcError::Operator(OperatorError::DivisionByZero))
        ));
        assert_eq!(calc.session().last(), Some(9.0));
    }

    #[test]
    fn unknown_commands() {
        let mut calc = Calculator::new();
        assert!(matches!(
            calc.execute("foobar 1 2"),
            Err(CalcError::UnknownCommand { ref name }) if name == "foobar"
        ));
        assert!(matches!(
            calc.execute("foobar"),
            Err(CalcError::UnknownCommand { ref name }) if name == "foobar"
        ));
    }

    #[test]
    fn bare_operands_echo() {
        let mut calc = Calculator::new();
        assert!(matches!(calc.execute("last"), Err(CalcError::NoPreviousResult)));
        assert_eq!(calc.execute("(3+4)/2").unwrap(), Outcome::Value(3.5));
        assert_eq!(calc.execute("last").unwrap(), Outcome::Value(3.5));
    }

    #[test]
    fn handle_line_formats_output() {
        let mut calc = Calculator::new();
        let mut out = Vec::new();
        assert_eq!(calc.handle_line("divide 7 2", &mut out).unwrap(), Flow::Continue);
        assert_eq!(calc.handle_line("log 0", &mut out).unwrap(), Flow::Continue);
        assert_eq!(calc.handle_line("quit", &mut out).unwrap(), Flow::Exit);

        let out = String::from_utf8(out).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("3.5"));
        assert_eq!(
            lines.next(),
            Some("Error: math domain error: log is undefined for 0")
        );
        assert!(out.ends_with("Goodbye! Thanks for using the calculator.\n"));
    }

    #[test]
    fn large_and_tiny_values_use_exponents() {
        assert_eq!(format_value(5.0), "5");
        assert_eq!(format_value(-0.0001), "-0.0001");
        assert_eq!(format_value(1e15), "1000000000000000");
        assert_eq!(format_value(1e16), "1e+16");
        assert_eq!(format_value(1e300), "1e+300");
        assert_eq!(format_value(-2.5e-7), "-2.5e-07");
        assert_eq!(format_value(f64::INFINITY), "inf");

        let mut calc = Calculator::new();
        let mut out = Vec::new();
        calc.handle_line("pow 2 60", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1.152921504606847e+18\n");
    }

    #[test]
    fn deeply_nested_operand_is_reported() {
        let mut calc = Calculator::new();
        calc.execute("add 1 1").unwrap();
        let line = format!("abs {}1", "-".repeat(200_000));
        assert!(matches!(
            calc.execute(&line),
            Err(CalcError::InvalidExpression { .. })
        ));
        assert_eq!(calc.session().last(), Some(2.0));
        assert_eq!(calc.execute("abs -3").unwrap(), Outcome::Value(3.0));
    }
}
