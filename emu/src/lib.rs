pub mod error;
pub mod hooks;
pub mod model;
pub mod serial;
pub mod stack;

pub use error::Fault;
pub use model::{Config, Machine};
