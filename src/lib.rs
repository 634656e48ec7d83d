pub mod error;
pub mod eval;
pub mod graphics;
pub mod help;
pub mod lex;
pub mod parse;
pub mod registry;
pub mod repl;
pub mod resolve;
pub mod stats;
pub mod system;

pub use error::{CalcError, DataError, ExprError, OperatorError};
pub use lex::Lexer;
pub use parse::Parser;
pub use registry::{Apply, Arity, Operator, Registry};
pub use repl::{Calculator, Input, LineReader};
pub use resolve::{Session, resolve};
