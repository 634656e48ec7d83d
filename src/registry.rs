use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{CalcError, OperatorError, system};

pub type UnaryFn = fn(f64) -> Result<f64, OperatorError>;
pub type BinaryFn = fn(f64, f64) -> Result<f64, OperatorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Unary,
    Binary,
}

impl Arity {
    pub fn operands(self) -> usize {
        match self {
            Arity::Unary => 1,
            Arity::Binary => 2,
        }
    }
}

/// The function behind a command, tagged with how many operands it takes.
#[derive(Debug, Clone, Copy)]
pub enum Apply {
    Unary(UnaryFn),
    Binary(BinaryFn),
}

impl Apply {
    pub fn arity(self) -> Arity {
        match self {
            Apply::Unary(_) => Arity::Unary,
            Apply::Binary(_) => Arity::Binary,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Operator {
    name: &'static str,
    arity: Arity,
    apply: Apply,
}

impl Operator {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Applies the operator to already resolved operands.
    pub fn apply(&self, operands: &[f64]) -> Result<f64, CalcError> {
        let result = match (self.apply, operands) {
            (Apply::Unary(f), [x]) => f(*x)?,
            (Apply::Binary(f), [a, b]) => f(*a, *b)?,
            _ => {
                return Err(CalcError::WrongArgumentCount {
                    command: self.name.to_string(),
                    expected: self.arity.operands(),
                    found: operands.len(),
                });
            }
        };
        Ok(result)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    operators: HashMap<&'static str, Operator>,
}

static BUILTIN: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::new();

    registry.register("add", Apply::Binary(system::add));
    registry.register("subtract", Apply::Binary(system::subtract));
    registry.register("multiply", Apply::Binary(system::multiply));
    registry.register("divide", Apply::Binary(system::divide));
    registry.register("pow", Apply::Binary(system::pow));
    registry.register("max", Apply::Binary(system::max));
    registry.register("min", Apply::Binary(system::min));

    registry.register("sin", Apply::Unary(system::sin));
    registry.register("cos", Apply::Unary(system::cos));
    registry.register("tan", Apply::Unary(system::tan));
    registry.register("log", Apply::Unary(system::log));
    registry.register("log10", Apply::Unary(system::log10));
    registry.register("sqrt", Apply::Unary(system::sqrt));
    registry.register("exp", Apply::Unary(system::exp));
    registry.register("abs", Apply::Unary(system::abs));
    registry.register("round", Apply::Unary(system::round));

    registry
});

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The calculator's command table, built on first use and shared afterwards.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Adds `name` to the table; names are stored lowercase. A later
    /// registration under the same name replaces the earlier one.
    pub fn register(&mut self, name: &'static str, apply: Apply) {
        debug_assert_eq!(name, name.to_lowercase(), "command names are lowercase");
        self.operators.insert(
            name,
            Operator {
                name,
                arity: apply.arity(),
                apply,
            },
        );
    }

    pub fn lookup(&self, name: &str) -> Option<&Operator> {
        self.operators.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operator> {
        self.operators.values()
    }

    /// Names of every operator with the given arity, sorted alphabetically
    /// without regard to case.
    pub fn names(&self, arity: Arity) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .iter()
            .filter(|op| op.arity() == arity)
            .map(Operator::name)
            .collect();
        names.sort_by_key(|name| name.to_lowercase());
        names
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_arities() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.names(Arity::Binary),
            ["add", "divide", "max", "min", "multiply", "pow", "subtract"]
        );
        assert_eq!(
            registry.names(Arity::Unary),
            ["abs", "cos", "exp", "log", "log10", "round", "sin", "sqrt", "tan"]
        );
        assert_eq!(registry.len(), 16);
    }

    #[test]
    fn lookup_is_exact() {
        let registry = Registry::builtin();
        assert!(registry.lookup("add").is_some());
        assert!(registry.lookup("ADD").is_none());
        assert!(registry.lookup("ad").is_none());
    }

    #[test]
    fn apply_checks_operand_count() {
        let add = Registry::builtin().lookup("add").unwrap();
        assert_eq!(add.apply(&[2.0, 3.0]).unwrap(), 5.0);
        assert!(matches!(
            add.apply(&[2.0]),
            Err(CalcError::WrongArgumentCount {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn operator_errors_surface() {
        let divide = Registry::builtin().lookup("divide").unwrap();
        assert!(matches!(
            divide.apply(&[1.0, 0.0]),
            Err(CalcError::Operator(OperatorError::DivisionByZero))
        ));
    }

    #[test]
    fn custom_registry() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.register("neg", Apply::Unary(|x| Ok(-x)));
        let neg = registry.lookup("neg").unwrap();
        assert_eq!(neg.arity(), Arity::Unary);
        assert_eq!(neg.apply(&[4.0]).unwrap(), -4.0);
    }
}
