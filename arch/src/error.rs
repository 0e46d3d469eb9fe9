use thiserror::Error;

use crate::op::Opcode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Module header
    #[error("Invalid signature: {0:02X?}")]
    InvalidSignature([u8; 8]),

    #[error("Unsupported module version: {0}")]
    InvalidVersion(u64),

    #[error("Truncated module: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("{0} unexpected bytes after the last instruction")]
    TrailingBytes(usize),

    // Instruction words
    #[error("Unknown opcode in word 0x{0:016X}")]
    UnknownOpcode(u64),

    #[error("Invalid addressing mode 0b{flags:03b} for {op}")]
    InvalidMode { op: Opcode, flags: u64 },

    #[error("Invalid register index: {0}")]
    InvalidRegister(u64),

    #[error("Missing operand word at {0}")]
    MissingOperandWord(usize),
}
