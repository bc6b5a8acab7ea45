//! Reader for Ruby `Ripper.sexp` dumps.

mod lexer;
mod reader;

pub use lexer::{LexError, Token};
pub use reader::{parse, SexpError};
