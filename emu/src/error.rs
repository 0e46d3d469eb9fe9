use thiserror::Error;

#[derive(Error, Debug)]
pub enum Fault {
    #[error("Stack underflow: the {0} stack is empty")]
    StackUnderflow(&'static str),

    #[error("Stack overflow: the {0} stack holds at most {1} values")]
    StackOverflow(&'static str, usize),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("RAM address out of range: {0}")]
    AddressOutOfRange(i64),

    #[error("Program counter out of range: {0}")]
    ProgramCounterOutOfRange(i64),

    #[error(transparent)]
    Decode(#[from] arch::Error),

    #[error("Invalid input: `{0}`")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid dump config: {0}")]
    DumpConfig(#[from] serde_yaml::Error),
}

impl Fault {
    /// Undecodable instruction words are skipped. Everything else stops the machine.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Fault::Decode(arch::Error::UnknownOpcode(_) | arch::Error::InvalidMode { .. })
        )
    }
}
