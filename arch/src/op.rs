use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, EnumString, Display,
)]
#[repr(u8)]
pub enum Opcode {
    PUSH = 1,
    ADD,
    SUB,
    MUL,
    DIV,
    SQRT,
    SIN,
    COS,
    POP,
    OUT,
    IN,
    DUMP,
    JMP,
    JA,
    HLT,
    CALL,
    RET,
    DRAW,
}

impl Opcode {
    /// Mnemonics are case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        s.to_uppercase().parse::<Self>().ok()
    }
}

/// What follows a mnemonic in source, and what follows the opcode word in a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    None,
    /// PUSH/POP operand with addressing-mode flags
    Operand,
    /// Code address of JMP/JA/CALL
    Target,
}

impl Opcode {
    pub fn arg(&self) -> Arg {
        use Opcode::*;
        match self {
            PUSH | POP => Arg::Operand,
            JMP | JA | CALL => Arg::Target,
            ADD | SUB | MUL | DIV | SQRT | SIN | COS | OUT | IN | DUMP | HLT | RET | DRAW => {
                Arg::None
            }
        }
    }
}

// ----------------------------------------------------------------------------

/// Addressing-mode flags, packed above the 5-bit opcode field.
pub struct Mode;

impl Mode {
    pub const OPCODE: u64 = 0b0001_1111;
    pub const IMMEDIATE: u64 = 0b0010_0000;
    pub const REGISTER: u64 = 0b0100_0000;
    pub const MEMORY: u64 = 0b1000_0000;
    pub const FLAGS: u64 = Self::IMMEDIATE | Self::REGISTER | Self::MEMORY;
}

/// Placeholder word emitted for an unknown mnemonic. Its opcode field is not a valid `Opcode`.
pub const ERR: u64 = 0x1F;
