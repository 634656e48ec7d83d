//! Built-in operator implementations. Each one is a plain function over `f64`
//! so the registry can store it as a function pointer.

use crate::OperatorError;

pub fn add(a: f64, b: f64) -> Result<f64, OperatorError> {
    Ok(a + b)
}

pub fn subtract(a: f64, b: f64) -> Result<f64, OperatorError> {
    Ok(a - b)
}

pub fn multiply(a: f64, b: f64) -> Result<f64, OperatorError> {
    Ok(a * b)
}

pub fn divide(a: f64, b: f64) -> Result<f64, OperatorError> {
    if b == 0.0 {
        return Err(OperatorError::DivisionByZero);
    }
    Ok(a / b)
}

pub fn pow(a: f64, b: f64) -> Result<f64, OperatorError> {
    if a == 0.0 && b < 0.0 {
        return Err(OperatorError::ZeroToNegativePower);
    }
    let result = a.powf(b);
    if result.is_nan() && !a.is_nan() && !b.is_nan() {
        return Err(domain("pow", format!("{a} ** {b}")));
    }
    in_range("pow", &[a, b], result)
}

pub fn max(a: f64, b: f64) -> Result<f64, OperatorError> {
    Ok(a.max(b))
}

pub fn min(a: f64, b: f64) -> Result<f64, OperatorError> {
    Ok(a.min(b))
}

pub fn sin(x: f64) -> Result<f64, OperatorError> {
    finite_angle("sin", x).map(f64::sin)
}

pub fn cos(x: f64) -> Result<f64, OperatorError> {
    finite_angle("cos", x).map(f64::cos)
}

pub fn tan(x: f64) -> Result<f64, OperatorError> {
    finite_angle("tan", x).map(f64::tan)
}

pub fn log(x: f64) -> Result<f64, OperatorError> {
    positive("log", x).map(f64::ln)
}

pub fn log10(x: f64) -> Result<f64, OperatorError> {
    positive("log10", x).map(f64::log10)
}

pub fn sqrt(x: f64) -> Result<f64, OperatorError> {
    if x < 0.0 {
        return Err(domain("sqrt", x.to_string()));
    }
    Ok(x.sqrt())
}

pub fn exp(x: f64) -> Result<f64, OperatorError> {
    in_range("exp", &[x], x.exp())
}

pub fn abs(x: f64) -> Result<f64, OperatorError> {
    Ok(x.abs())
}

/// Rounds half to even, so `round 2.5` is 2 and `round 3.5` is 4.
pub fn round(x: f64) -> Result<f64, OperatorError> {
    if !x.is_finite() {
        return Err(domain("round", x.to_string()));
    }
    Ok(x.round_ties_even())
}

fn domain(op: &'static str, input: String) -> OperatorError {
    OperatorError::Domain { op, input }
}

fn finite_angle(op: &'static str, x: f64) -> Result<f64, OperatorError> {
    if x.is_infinite() {
        return Err(domain(op, x.to_string()));
    }
    Ok(x)
}

fn positive(op: &'static str, x: f64) -> Result<f64, OperatorError> {
    if x <= 0.0 {
        return Err(domain(op, x.to_string()));
    }
    Ok(x)
}

// finite inputs must give a finite result
fn in_range(op: &'static str, inputs: &[f64], result: f64) -> Result<f64, OperatorError> {
    if result.is_infinite() && inputs.iter().all(|x| x.is_finite()) {
        return Err(OperatorError::Range { op });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_by_zero() {
        assert_eq!(divide(1.0, 0.0), Err(OperatorError::DivisionByZero));
        assert_eq!(divide(0.0, -0.0), Err(OperatorError::DivisionByZero));
        assert_eq!(divide(7.0, 2.0), Ok(3.5));
    }

    #[test]
    fn logarithms_need_positive_input() {
        assert!(matches!(log(0.0), Err(OperatorError::Domain { op: "log", .. })));
        assert!(matches!(log10(-3.0), Err(OperatorError::Domain { op: "log10", .. })));
        assert_eq!(log10(1000.0), Ok(3.0));
        assert_eq!(log(1.0), Ok(0.0));
    }

    #[test]
    fn sqrt_of_negative() {
        assert!(matches!(sqrt(-1.0), Err(OperatorError::Domain { .. })));
        assert_eq!(sqrt(16.0), Ok(4.0));
    }

    #[test]
    fn pow_edge_cases() {
        assert_eq!(pow(2.0, 10.0), Ok(1024.0));
        assert_eq!(pow(0.0, -1.0), Err(OperatorError::ZeroToNegativePower));
        assert!(matches!(pow(-8.0, 1.0 / 3.0), Err(OperatorError::Domain { .. })));
        assert_eq!(pow(10.0, 400.0), Err(OperatorError::Range { op: "pow" }));
    }

    #[test]
    fn exp_overflow() {
        assert_eq!(exp(1000.0), Err(OperatorError::Range { op: "exp" }));
        assert_eq!(exp(0.0), Ok(1.0));
    }

    #[test]
    fn round_half_to_even() {
        assert_eq!(round(2.5), Ok(2.0));
        assert_eq!(round(3.5), Ok(4.0));
        assert_eq!(round(-2.7), Ok(-3.0));
        assert!(round(f64::INFINITY).is_err());
    }

    #[test]
    fn trig_rejects_infinity() {
        assert!(sin(f64::INFINITY).is_err());
        assert_eq!(cos(0.0), Ok(1.0));
    }
}
