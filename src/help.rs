use std::fmt::Write;

use crate::{
    parse::Constant,
    registry::{Arity, Registry},
    resolve::LAST,
};

/// Renders the command listing from whatever the registry holds, so the help
/// text can never disagree with the dispatch table.
pub fn build_help_text(registry: &Registry) -> String {
    let mut help = String::from("Available commands:\n\nBinary (op x y):\n");
    for name in registry.names(Arity::Binary) {
        let _ = writeln!(help, "  {name}");
    }

    help.push_str("\nUnary (op x):\n");
    for name in registry.names(Arity::Unary) {
        let _ = writeln!(help, "  {name}");
    }

    let constants: Vec<_> = Constant::ALL.iter().map(|c| c.name()).collect();
    let _ = write!(
        help,
        "\nOther commands:\n\
         \x20 help - show help (also h or ?)\n\
         \x20 exit - quit (also quit)\n\
         \nSpecial values:\n\
         \x20 {}, {LAST}, or expressions like 3/4 or pi/2\n",
        constants.join(", ")
    );
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Apply;

    fn section<'a>(help: &'a str, heading: &str) -> Vec<&'a str> {
        help.split(heading)
            .nth(1)
            .unwrap()
            .lines()
            .skip(1)
            .take_while(|line| !line.is_empty())
            .map(str::trim)
            .collect()
    }

    #[test]
    fn lists_every_operator_once_under_its_arity() {
        let registry = Registry::builtin();
        let help = build_help_text(registry);

        let binary = section(&help, "Binary (op x y):");
        let unary = section(&help, "Unary (op x):");
        assert_eq!(binary, registry.names(Arity::Binary));
        assert_eq!(unary, registry.names(Arity::Unary));

        for op in registry.iter() {
            let listed = help
                .lines()
                .filter(|line| line.trim() == op.name())
                .count();
            assert_eq!(listed, 1, "{} should be listed exactly once", op.name());
        }
    }

    #[test]
    fn follows_the_registry() {
        let mut registry = Registry::new();
        registry.register("zeta", Apply::Binary(|a, _| Ok(a)));
        registry.register("alpha", Apply::Binary(|_, b| Ok(b)));
        registry.register("neg", Apply::Unary(|x| Ok(-x)));

        let help = build_help_text(&registry);
        assert_eq!(section(&help, "Binary (op x y):"), ["alpha", "zeta"]);
        assert_eq!(section(&help, "Unary (op x):"), ["neg"]);
        assert!(help.contains("pi, e, last"));
    }
}
