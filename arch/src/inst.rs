use crate::{
    error::Error,
    op::{Arg, Mode, Opcode},
    reg::Reg,
};

use color_print::cformat;
use std::fmt;

/// Source or destination of PUSH/POP, one variant per addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// `5`
    Imm(i64),
    /// `[5]`
    Mem(i64),
    /// `a`
    Reg(Reg),
    /// `[a]`
    RegMem(Reg),
    /// `a + 5`
    RegImm(Reg, i64),
    /// `[a + 5]`
    RegImmMem(Reg, i64),
}

impl Operand {
    pub fn mode(&self) -> u64 {
        match self {
            Operand::Imm(_) => Mode::IMMEDIATE,
            Operand::Mem(_) => Mode::IMMEDIATE | Mode::MEMORY,
            Operand::Reg(_) => Mode::REGISTER,
            Operand::RegMem(_) => Mode::REGISTER | Mode::MEMORY,
            Operand::RegImm(..) => Mode::REGISTER | Mode::IMMEDIATE,
            Operand::RegImmMem(..) => Mode::REGISTER | Mode::IMMEDIATE | Mode::MEMORY,
        }
    }

    /// (register, immediate, memory)
    pub fn parts(&self) -> (Option<Reg>, Option<i64>, bool) {
        match *self {
            Operand::Imm(imm) => (None, Some(imm), false),
            Operand::Mem(imm) => (None, Some(imm), true),
            Operand::Reg(reg) => (Some(reg), None, false),
            Operand::RegMem(reg) => (Some(reg), None, true),
            Operand::RegImm(reg, imm) => (Some(reg), Some(imm), false),
            Operand::RegImmMem(reg, imm) => (Some(reg), Some(imm), true),
        }
    }

    /// Trailing words: the register index first, then the immediate.
    fn words(&self) -> Vec<u64> {
        let (reg, imm, _) = self.parts();
        reg.map(u64::from)
            .into_iter()
            .chain(imm.map(|imm| imm as u64))
            .collect()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Imm(imm) => write!(f, "{}", imm),
            Operand::Mem(imm) => write!(f, "[{}]", imm),
            Operand::Reg(reg) => write!(f, "{}", reg),
            Operand::RegMem(reg) => write!(f, "[{}]", reg),
            Operand::RegImm(reg, imm) => write!(f, "{} + {}", reg, imm),
            Operand::RegImmMem(reg, imm) => write!(f, "[{} + {}]", reg, imm),
        }
    }
}

// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inst {
    PUSH(Operand),
    POP(Operand),
    ADD,
    SUB,
    MUL,
    DIV,
    SQRT,
    SIN,
    COS,
    OUT,
    IN,
    DUMP,
    JMP(i64),
    JA(i64),
    HLT,
    CALL(i64),
    RET,
    DRAW,
}

impl Inst {
    pub fn opcode(&self) -> Opcode {
        match self {
            Inst::PUSH(_) => Opcode::PUSH,
            Inst::POP(_) => Opcode::POP,
            Inst::ADD => Opcode::ADD,
            Inst::SUB => Opcode::SUB,
            Inst::MUL => Opcode::MUL,
            Inst::DIV => Opcode::DIV,
            Inst::SQRT => Opcode::SQRT,
            Inst::SIN => Opcode::SIN,
            Inst::COS => Opcode::COS,
            Inst::OUT => Opcode::OUT,
            Inst::IN => Opcode::IN,
            Inst::DUMP => Opcode::DUMP,
            Inst::JMP(_) => Opcode::JMP,
            Inst::JA(_) => Opcode::JA,
            Inst::HLT => Opcode::HLT,
            Inst::CALL(_) => Opcode::CALL,
            Inst::RET => Opcode::RET,
            Inst::DRAW => Opcode::DRAW,
        }
    }

    /// Build an operand-less instruction. `None` for PUSH/POP/JMP/JA/CALL.
    pub fn simple(op: Opcode) -> Option<Inst> {
        use Opcode::*;
        match op {
            ADD => Some(Inst::ADD),
            SUB => Some(Inst::SUB),
            MUL => Some(Inst::MUL),
            DIV => Some(Inst::DIV),
            SQRT => Some(Inst::SQRT),
            SIN => Some(Inst::SIN),
            COS => Some(Inst::COS),
            OUT => Some(Inst::OUT),
            IN => Some(Inst::IN),
            DUMP => Some(Inst::DUMP),
            HLT => Some(Inst::HLT),
            RET => Some(Inst::RET),
            DRAW => Some(Inst::DRAW),
            PUSH | POP | JMP | JA | CALL => None,
        }
    }

    /// Build a JMP/JA/CALL. `None` for every other opcode.
    pub fn branch(op: Opcode, target: i64) -> Option<Inst> {
        match op {
            Opcode::JMP => Some(Inst::JMP(target)),
            Opcode::JA => Some(Inst::JA(target)),
            Opcode::CALL => Some(Inst::CALL(target)),
            _ => None,
        }
    }

    /// Number of words including the opcode word.
    pub fn len(&self) -> usize {
        match self {
            Inst::PUSH(operand) | Inst::POP(operand) => 1 + operand.words().len(),
            Inst::JMP(_) | Inst::JA(_) | Inst::CALL(_) => 2,
            _ => 1,
        }
    }
}

// ----------------------------------------------------------------------------
// Word format

impl Inst {
    pub fn to_words(&self) -> Vec<u64> {
        let opcode = u8::from(self.opcode()) as u64;
        match self {
            Inst::PUSH(operand) | Inst::POP(operand) => {
                let mut words = vec![opcode | operand.mode()];
                words.extend(operand.words());
                words
            }
            Inst::JMP(target) | Inst::JA(target) | Inst::CALL(target) => {
                vec![opcode, *target as u64]
            }
            _ => vec![opcode],
        }
    }

    /// Decode the instruction whose opcode word is `words[pc]`.
    pub fn from_words(words: &[u64], pc: usize) -> Result<Inst, Error> {
        let word = *words.get(pc).ok_or(Error::MissingOperandWord(pc))?;
        if word & !(Mode::OPCODE | Mode::FLAGS) != 0 {
            return Err(Error::UnknownOpcode(word));
        }
        let op = Opcode::try_from((word & Mode::OPCODE) as u8)
            .map_err(|_| Error::UnknownOpcode(word))?;
        let flags = word & Mode::FLAGS;
        let arg = |n: usize| {
            words
                .get(pc + n)
                .copied()
                .ok_or(Error::MissingOperandWord(pc + n))
        };

        match op.arg() {
            Arg::Operand => {
                let operand = decode_operand(op, flags, arg)?;
                Ok(match op {
                    Opcode::PUSH => Inst::PUSH(operand),
                    _ => Inst::POP(operand),
                })
            }
            _ if flags != 0 => Err(Error::InvalidMode {
                op,
                flags: flags >> 5,
            }),
            Arg::Target => Inst::branch(op, arg(1)? as i64).ok_or(Error::UnknownOpcode(word)),
            Arg::None => Inst::simple(op).ok_or(Error::UnknownOpcode(word)),
        }
    }
}

fn decode_operand(
    op: Opcode,
    flags: u64,
    arg: impl Fn(usize) -> Result<u64, Error>,
) -> Result<Operand, Error> {
    let reg = |word: u64| {
        u8::try_from(word)
            .ok()
            .and_then(|idx| Reg::try_from(idx).ok())
            .ok_or(Error::InvalidRegister(word))
    };
    let has = |flag: u64| flags & flag != 0;

    match (has(Mode::REGISTER), has(Mode::IMMEDIATE), has(Mode::MEMORY)) {
        (false, true, false) => Ok(Operand::Imm(arg(1)? as i64)),
        (false, true, true) => Ok(Operand::Mem(arg(1)? as i64)),
        (true, false, false) => Ok(Operand::Reg(reg(arg(1)?)?)),
        (true, false, true) => Ok(Operand::RegMem(reg(arg(1)?)?)),
        (true, true, false) => Ok(Operand::RegImm(reg(arg(1)?)?, arg(2)? as i64)),
        (true, true, true) => Ok(Operand::RegImmMem(reg(arg(1)?)?, arg(2)? as i64)),
        (false, false, _) => Err(Error::InvalidMode {
            op,
            flags: flags >> 5,
        }),
    }
}

// ----------------------------------------------------------------------------
// Display

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.opcode().to_string().to_lowercase();
        match self {
            Inst::PUSH(operand) | Inst::POP(operand) => write!(f, "{} {}", name, operand),
            Inst::JMP(target) | Inst::JA(target) | Inst::CALL(target) => {
                write!(f, "{} {}", name, target)
            }
            _ => write!(f, "{}", name),
        }
    }
}

impl Inst {
    pub fn cformat(&self) -> String {
        let name = self.opcode().to_string().to_lowercase();
        match self {
            Inst::PUSH(operand) | Inst::POP(operand) => {
                cformat!("<r>{:<6}</><b>{}</>", name, operand)
            }
            Inst::JMP(target) | Inst::JA(target) | Inst::CALL(target) => {
                cformat!("<r>{:<6}</><y>0x{:0>4X}</>", name, target)
            }
            _ => cformat!("<r>{:<6}</>", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_inst {
        ($($name:ident: $inst:expr => $words:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let inst = $inst;
                    let words = inst.to_words();
                    assert_eq!(words, $words);
                    assert_eq!(inst.len(), words.len());
                    assert_eq!(Inst::from_words(&words, 0), Ok(inst));
                }
            )*
        }
    }

    test_inst! {
        test_push_imm: Inst::PUSH(Operand::Imm(5)) => vec![0b0010_0001, 5],
        test_push_mem: Inst::PUSH(Operand::Mem(7)) => vec![0b1010_0001, 7],
        test_push_reg: Inst::PUSH(Operand::Reg(Reg::A)) => vec![0b0100_0001, 1],
        test_push_reg_mem: Inst::PUSH(Operand::RegMem(Reg::B)) => vec![0b1100_0001, 2],
        test_push_reg_imm: Inst::PUSH(Operand::RegImm(Reg::C, 3)) => vec![0b0110_0001, 3, 3],
        test_push_reg_imm_mem: Inst::PUSH(Operand::RegImmMem(Reg::A, 4)) => vec![0b1110_0001, 1, 4],
        test_pop_reg: Inst::POP(Operand::Reg(Reg::B)) => vec![0b0100_1001, 2],
        test_pop_mem: Inst::POP(Operand::Mem(255)) => vec![0b1010_1001, 255],
        test_push_negative: Inst::PUSH(Operand::Imm(-1)) => vec![0b0010_0001, u64::MAX],
        test_add: Inst::ADD => vec![2],
        test_hlt: Inst::HLT => vec![15],
        test_jmp: Inst::JMP(12) => vec![13, 12],
        test_ja: Inst::JA(0) => vec![14, 0],
        test_call: Inst::CALL(40) => vec![16, 40],
        test_ret: Inst::RET => vec![17],
        test_draw: Inst::DRAW => vec![18],
    }

    #[test]
    fn decode_at_offset() {
        let words = [15, 0b0110_0001, 2, 9, 2];
        assert_eq!(
            Inst::from_words(&words, 1),
            Ok(Inst::PUSH(Operand::RegImm(Reg::B, 9)))
        );
        assert_eq!(Inst::from_words(&words, 4), Ok(Inst::ADD));
    }

    #[test]
    fn decode_errors() {
        use crate::op::ERR;
        assert_eq!(Inst::from_words(&[0], 0), Err(Error::UnknownOpcode(0)));
        assert_eq!(Inst::from_words(&[ERR], 0), Err(Error::UnknownOpcode(ERR)));
        assert_eq!(
            Inst::from_words(&[0x100 | 2], 0),
            Err(Error::UnknownOpcode(0x102))
        );
        // flags on an operand-less opcode
        assert_eq!(
            Inst::from_words(&[Mode::IMMEDIATE | 2], 0),
            Err(Error::InvalidMode {
                op: Opcode::ADD,
                flags: 0b001
            })
        );
        // memory flag alone has nothing to address
        assert_eq!(
            Inst::from_words(&[Mode::MEMORY | 1, 0], 0),
            Err(Error::InvalidMode {
                op: Opcode::PUSH,
                flags: 0b100
            })
        );
        assert_eq!(
            Inst::from_words(&[Mode::REGISTER | 1, 4], 0),
            Err(Error::InvalidRegister(4))
        );
        assert_eq!(
            Inst::from_words(&[Mode::REGISTER | Mode::IMMEDIATE | 1, 1], 0),
            Err(Error::MissingOperandWord(2))
        );
        assert_eq!(Inst::from_words(&[13], 0), Err(Error::MissingOperandWord(1)));
    }

    #[test]
    fn display() {
        assert_eq!(Inst::PUSH(Operand::RegImmMem(Reg::A, -2)).to_string(), "push [a + -2]");
        assert_eq!(Inst::POP(Operand::Mem(3)).to_string(), "pop [3]");
        assert_eq!(Inst::CALL(8).to_string(), "call 8");
        assert_eq!(Inst::SQRT.to_string(), "sqrt");
    }
}
