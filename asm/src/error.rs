use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown operation: `{0}`")]
    UnknownMnemonic(String),

    #[error("More argument required")]
    MissingArgument,

    #[error("Token longer than 63 bytes: `{0}`")]
    TokenTooLong(String),

    #[error("Invalid operand syntax: `{0}`")]
    InvalidOperandSyntax(String),

    #[error("Undefined label: `{0}`")]
    UnresolvedSymbol(String),

    #[error("Re-defined label: `{0}`")]
    RedefinedLabel(String),

    #[error("Broken fixup at word {0}")]
    BrokenFixup(usize),

    #[error("Too many {0}: the limit is {1}")]
    CapacityExceeded(&'static str, usize),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}
