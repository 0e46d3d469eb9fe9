pub mod error;
pub mod inst;
pub mod module;
pub mod op;
pub mod reg;

pub use error::Error;
