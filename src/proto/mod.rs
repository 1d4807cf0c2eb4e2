//! Protocol buffer source handling: tokenizing, parsing and printing

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;

pub use ast::ProtoFile;
pub use lexer::LexError;
pub use parser::{parse, ParseError};
pub use printer::{print_file, KeepAll, Retain};
