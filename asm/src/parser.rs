use arch::{
    inst::{Inst, Operand},
    op::{Arg, Opcode},
    reg::Reg,
};
use color_print::cformat;

use crate::{
    error::Error,
    label::Labels,
    lexer::{next_word, words, Span},
    msg::Loc,
};

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Code(Code),
    Label(String),
    /// Unrecognized mnemonic, assembled as the error marker word
    Unknown(String),
}

impl Stmt {
    /// Parse one source line. Blank and comment-only lines give `None`.
    pub fn parse(src: &str, line: Span) -> Result<Option<Stmt>, Error> {
        let code = line.code(src);
        let Some((head, rest)) = next_word(src, code)? else {
            return Ok(None);
        };

        // main:
        if let Some(name) = head.strip_suffix(':') {
            if name.is_empty() {
                return Err(Error::InvalidOperandSyntax(head.to_string()));
            }
            expect_end(src, rest)?;
            return Ok(Some(Stmt::Label(name.to_string())));
        }

        let Some(op) = Opcode::parse(head) else {
            return Ok(Some(Stmt::Unknown(head.to_string())));
        };
        let code = match op.arg() {
            Arg::None => {
                expect_end(src, rest)?;
                let inst = Inst::simple(op).ok_or(Error::UnknownMnemonic(head.to_string()))?;
                Code::Inst(inst)
            }
            Arg::Operand => {
                // every word still has to fit in a token
                words(src, rest)?;
                let operand = parse_operand(rest.text(src))?;
                Code::Inst(match op {
                    Opcode::PUSH => Inst::PUSH(operand),
                    _ => Inst::POP(operand),
                })
            }
            Arg::Target => Code::Branch(op, Target::parse(src, rest)?),
        };
        Ok(Some(Stmt::Code(code)))
    }
}

fn expect_end(src: &str, rest: Span) -> Result<(), Error> {
    match next_word(src, rest)? {
        None => Ok(()),
        Some(_) => Err(Error::InvalidOperandSyntax(rest.text(src).trim().to_string())),
    }
}

// ----------------------------------------------------------------------------
// Operation

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    Inst(Inst),
    /// JMP/JA/CALL whose target may still be a label
    Branch(Opcode, Target),
}

impl Code {
    /// Turn into a concrete instruction placed at `pc`. A label not defined
    /// yet is emitted as a placeholder and recorded for patching.
    pub fn resolve(&self, labels: &mut Labels, pc: usize, loc: &Loc) -> Result<Inst, Error> {
        match self {
            Code::Inst(inst) => Ok(*inst),
            Code::Branch(op, target) => {
                let addr = match target {
                    Target::Literal(addr) => *addr,
                    Target::Label(name) => labels.reference(name, pc + 1, loc)?,
                };
                Inst::branch(*op, addr).ok_or(Error::UnknownMnemonic(op.to_string()))
            }
        }
    }

    pub fn cformat(&self, labels: &Labels) -> String {
        match self {
            Code::Inst(inst) => inst.cformat(),
            Code::Branch(op, target) => {
                let name = op.to_string().to_lowercase();
                cformat!("<r>{:<6}</>{}", name, target.cfmt(labels))
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Branch target

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Literal(i64),
    Label(String),
}

impl Target {
    fn parse(src: &str, rest: Span) -> Result<Target, Error> {
        let words = words(src, rest)?;
        let word = match words.as_slice() {
            [] => return Err(Error::MissingArgument),
            [word] => *word,
            _ => return Err(Error::InvalidOperandSyntax(rest.text(src).trim().to_string())),
        };
        if let Some(name) = word.strip_suffix(':') {
            if !name.is_empty() {
                return Ok(Target::Label(name.to_string()));
            }
        }
        parse_with_prefix(word)
            .map(Target::Literal)
            .ok_or(Error::InvalidOperandSyntax(word.to_string()))
    }

    fn cfmt(&self, labels: &Labels) -> String {
        match self {
            Target::Label(name) => match labels.get_val(name) {
                Some(addr) => cformat!("<g>0x{:0>4X}({})</>", addr, name),
                None => cformat!("<r,u>{}</>", name),
            },
            Target::Literal(addr) => cformat!("<y>0x{:0>4X}</>", addr),
        }
    }
}

// ----------------------------------------------------------------------------
// Operand

/// Classify a PUSH/POP operand by whether it names a register, adds an
/// offset with `+`, and is wrapped in `[...]`.
pub fn parse_operand(text: &str) -> Result<Operand, Error> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::MissingArgument);
    }
    let invalid = || Error::InvalidOperandSyntax(text.to_string());

    let bracket = match (text.starts_with('['), text.ends_with(']')) {
        (true, true) => true,
        (false, false) => false,
        _ => return Err(invalid()),
    };
    let inner = if bracket {
        text[1..text.len() - 1].trim()
    } else {
        text
    };
    if inner.is_empty() || inner.contains(['[', ']']) {
        return Err(invalid());
    }

    // a leading `+` is the sign of a literal, not an offset
    let (head, offset) = match inner.split_once('+') {
        Some((head, offset)) if !head.trim().is_empty() => (head.trim(), Some(offset.trim())),
        _ => (inner, None),
    };

    match (Reg::parse(head), offset, bracket) {
        (None, None, false) => parse_with_prefix(head).map(Operand::Imm).ok_or_else(invalid),
        (None, None, true) => parse_with_prefix(head).map(Operand::Mem).ok_or_else(invalid),
        (Some(reg), None, false) => Ok(Operand::Reg(reg)),
        (Some(reg), None, true) => Ok(Operand::RegMem(reg)),
        (Some(reg), Some(offset), bracket) => {
            let imm = parse_with_prefix(offset).ok_or_else(invalid)?;
            Ok(match bracket {
                false => Operand::RegImm(reg, imm),
                true => Operand::RegImmMem(reg, imm),
            })
        }
        (None, Some(_), _) => Err(invalid()),
    }
}

/// Signed integer with an optional `0x`, `0o` or `0b` prefix.
pub fn parse_with_prefix(s: &str) -> Option<i64> {
    let (neg, digits) = match s.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, num) = match digits.get(..2) {
        Some("0x") | Some("0X") => (16, &digits[2..]),
        Some("0o") | Some("0O") => (8, &digits[2..]),
        Some("0b") | Some("0B") => (2, &digits[2..]),
        _ => (10, digits),
    };
    if !num.chars().next()?.is_ascii_alphanumeric() {
        return None;
    }
    let mag = u64::from_str_radix(num, radix).ok()?;
    if neg {
        match mag {
            0..=0x7FFF_FFFF_FFFF_FFFF => Some(-(mag as i64)),
            0x8000_0000_0000_0000 => Some(i64::MIN),
            _ => None,
        }
    } else {
        i64::try_from(mag).ok()
    }
}
