pub mod assembler;
pub mod error;
pub mod label;
pub mod lexer;
pub mod msg;
pub mod parser;
pub mod util;

pub use assembler::{assemble, Assembler, Limits, Program};
pub use error::Error;
