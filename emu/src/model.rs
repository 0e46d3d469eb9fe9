use arch::{
    inst::{Inst, Operand},
    module::Module,
    reg::Reg,
};
use color_print::cprintln;

use crate::{error::Fault, hooks::Hook, serial::Console, stack::Stack};

pub const RAM_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub stack_depth: usize,
    pub call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stack_depth: 1024,
            call_depth: 1024,
        }
    }
}

/// Storage cell an operand resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Reg(usize),
    Ram(usize),
}

#[derive(Debug)]
pub enum Event {
    None,
    Dump,
    Draw,
    Halt,
    /// Undecodable word, stepped over
    Skipped(Fault),
}

/// Record of one executed step, handed to the hooks.
#[derive(Debug)]
pub struct Trace {
    pub pc: usize,
    pub inst: Option<Inst>,
    pub event: Event,
}

pub struct Machine {
    code: Vec<u64>,
    pc: usize,
    regs: [i64; Reg::COUNT],
    ram: [i64; RAM_SIZE],
    stack: Stack,
    calls: Stack,
    halted: bool,
}

// Accessors
impl Machine {
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn code(&self) -> &[u64] {
        &self.code
    }

    pub fn regs(&self) -> &[i64; Reg::COUNT] {
        &self.regs
    }

    pub fn ram(&self) -> &[i64; RAM_SIZE] {
        &self.ram
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn calls(&self) -> &Stack {
        &self.calls
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn get(&self, slot: Slot) -> i64 {
        match slot {
            Slot::Reg(idx) => self.regs[idx],
            Slot::Ram(addr) => self.ram[addr],
        }
    }

    fn set(&mut self, slot: Slot, value: i64) {
        match slot {
            Slot::Reg(idx) => self.regs[idx] = value,
            Slot::Ram(addr) => self.ram[addr] = value,
        }
    }
}

impl Machine {
    pub fn new(module: Module, config: Config) -> Self {
        Machine {
            code: module.words,
            pc: 0,
            regs: [0; Reg::COUNT],
            ram: [0; RAM_SIZE],
            stack: Stack::new("operand", config.stack_depth),
            calls: Stack::new("call", config.call_depth),
            halted: false,
        }
    }

    pub fn load(bytes: &[u8], config: Config) -> Result<Self, Fault> {
        Ok(Machine::new(Module::from_bytes(bytes)?, config))
    }

    /// Effective location of a PUSH/POP operand. A register is read first,
    /// an immediate is added into the scratch slot, and a memory flag turns
    /// the value into a RAM address.
    pub fn locate(&mut self, operand: &Operand) -> Result<Slot, Fault> {
        let (reg, imm, memory) = operand.parts();
        let mut value = 0;
        let mut slot = Slot::Reg(Reg::SCRATCH);
        if let Some(reg) = reg {
            value = self.regs[reg.index()];
            slot = Slot::Reg(reg.index());
        }
        if let Some(imm) = imm {
            value = value.wrapping_add(imm);
            self.regs[Reg::SCRATCH] = value;
            slot = Slot::Reg(Reg::SCRATCH);
        }
        if memory {
            let addr = usize::try_from(value)
                .ok()
                .filter(|addr| *addr < RAM_SIZE)
                .ok_or(Fault::AddressOutOfRange(value))?;
            slot = Slot::Ram(addr);
        }
        Ok(slot)
    }

    /// Fetch, decode and dispatch one instruction.
    pub fn exec(&mut self, console: &mut dyn Console) -> Result<Trace, Fault> {
        let pc = self.pc;
        if pc >= self.code.len() {
            return Err(Fault::ProgramCounterOutOfRange(pc as i64));
        }
        let inst = match Inst::from_words(&self.code, pc) {
            Ok(inst) => inst,
            Err(e) => {
                let fault = Fault::Decode(e);
                if !fault.is_recoverable() {
                    return Err(fault);
                }
                self.pc += 1;
                return Ok(Trace {
                    pc,
                    inst: None,
                    event: Event::Skipped(fault),
                });
            }
        };
        let event = self.dispatch(inst, console)?;
        Ok(Trace {
            pc,
            inst: Some(inst),
            event,
        })
    }

    fn dispatch(&mut self, inst: Inst, console: &mut dyn Console) -> Result<Event, Fault> {
        let next = self.pc + inst.len();
        let mut event = Event::None;

        match inst {
            Inst::PUSH(operand) => {
                let slot = self.locate(&operand)?;
                let value = self.get(slot);
                self.stack.push(value)?;
            }
            Inst::POP(operand) => {
                let slot = self.locate(&operand)?;
                let value = self.stack.pop()?;
                self.set(slot, value);
            }
            Inst::ADD => self.binary(|b, a| Ok(b.wrapping_add(a)))?,
            Inst::SUB => self.binary(|b, a| Ok(b.wrapping_sub(a)))?,
            Inst::MUL => self.binary(|b, a| Ok(b.wrapping_mul(a)))?,
            Inst::DIV => self.binary(|b, a| match a {
                0 => Err(Fault::DivisionByZero),
                _ => Ok(b.wrapping_div(a)),
            })?,
            Inst::SQRT => self.unary(|a| if a >= 0 { (a as f64).sqrt() as i64 } else { 0 })?,
            Inst::SIN => self.unary(|a| (a as f64).sin() as i64)?,
            Inst::COS => self.unary(|a| (a as f64).cos() as i64)?,
            Inst::OUT => {
                let a = self.stack.pop()?;
                console.write_int(a)?;
            }
            Inst::IN => {
                let value = console.read_int()?;
                self.stack.push(value)?;
            }
            Inst::DUMP => event = Event::Dump,
            Inst::DRAW => event = Event::Draw,
            Inst::JMP(target) => return self.jump(target),
            Inst::JA(target) => {
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                if a > b {
                    return self.jump(target);
                }
            }
            Inst::CALL(target) => {
                let ret = self.pc as i64;
                self.calls.push(ret)?;
                return self.jump(target);
            }
            Inst::RET => {
                let ret = self.calls.pop()?;
                return self.jump(ret.wrapping_add(2));
            }
            Inst::HLT => {
                self.halted = true;
                return Ok(Event::Halt);
            }
        }

        self.pc = next;
        Ok(event)
    }

    fn jump(&mut self, target: i64) -> Result<Event, Fault> {
        self.pc = usize::try_from(target).map_err(|_| Fault::ProgramCounterOutOfRange(target))?;
        Ok(Event::None)
    }

    /// Pops `a` then `b` and pushes `f(b, a)`.
    fn binary(&mut self, f: impl Fn(i64, i64) -> Result<i64, Fault>) -> Result<(), Fault> {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        self.stack.push(f(b, a)?)
    }

    fn unary(&mut self, f: impl Fn(i64) -> i64) -> Result<(), Fault> {
        let a = self.stack.pop()?;
        self.stack.push(f(a))
    }

    /// Run until HLT, a fatal fault, or `tmax` steps. Returns the number of
    /// executed steps.
    pub fn run(
        &mut self,
        console: &mut dyn Console,
        hooks: &mut [Box<dyn Hook>],
        tmax: Option<u64>,
    ) -> Result<u64, Fault> {
        for hook in hooks.iter_mut() {
            hook.init(self);
        }

        let tmax = tmax.unwrap_or(u64::MAX);
        let mut time = 0;
        while time < tmax && !self.halted {
            let trace = self.exec(console)?;
            if let Event::Skipped(fault) = &trace.event {
                cprintln!("<yellow,bold>warn</>: {} at 0x{:04X}", fault, trace.pc);
            }
            for hook in hooks.iter_mut() {
                hook.exec(time, &trace, self);
            }
            time += 1;
        }
        Ok(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::op::ERR;

    struct Silent;

    impl Console for Silent {
        fn read_int(&mut self) -> Result<i64, Fault> {
            Err(Fault::InvalidInput(String::new()))
        }
        fn write_int(&mut self, _value: i64) -> Result<(), Fault> {
            Ok(())
        }
    }

    fn machine(insts: &[Inst]) -> Machine {
        let words = insts.iter().flat_map(|inst| inst.to_words()).collect();
        Machine::new(Module::new(words), Config::default())
    }

    #[test]
    fn locate() {
        let mut m = machine(&[]);
        m.regs[Reg::B.index()] = 10;

        assert_eq!(m.locate(&Operand::Reg(Reg::B)).unwrap(), Slot::Reg(2));
        assert_eq!(m.locate(&Operand::RegMem(Reg::B)).unwrap(), Slot::Ram(10));

        assert_eq!(m.locate(&Operand::Imm(7)).unwrap(), Slot::Reg(0));
        assert_eq!(m.regs[0], 7);

        assert_eq!(m.locate(&Operand::RegImm(Reg::B, 5)).unwrap(), Slot::Reg(0));
        assert_eq!(m.regs[0], 15);

        assert_eq!(m.locate(&Operand::RegImmMem(Reg::B, -3)).unwrap(), Slot::Ram(7));
        assert_eq!(m.locate(&Operand::Mem(255)).unwrap(), Slot::Ram(255));
    }

    #[test]
    fn locate_out_of_range() {
        let mut m = machine(&[]);
        assert!(matches!(
            m.locate(&Operand::Mem(256)),
            Err(Fault::AddressOutOfRange(256))
        ));
        assert!(matches!(
            m.locate(&Operand::RegImmMem(Reg::A, -1)),
            Err(Fault::AddressOutOfRange(-1))
        ));
    }

    #[test]
    fn pc_advances_by_length() {
        let mut m = machine(&[
            Inst::PUSH(Operand::RegImm(Reg::A, 1)),
            Inst::POP(Operand::Reg(Reg::C)),
            Inst::HLT,
        ]);
        m.exec(&mut Silent).unwrap();
        assert_eq!(m.pc(), 3);
        m.exec(&mut Silent).unwrap();
        assert_eq!(m.pc(), 5);
        assert_eq!(m.regs()[Reg::C.index()], 1);
        assert!(matches!(m.exec(&mut Silent).unwrap().event, Event::Halt));
        assert!(m.is_halted());
    }

    #[test]
    fn skip_undecodable_word() {
        let mut words = vec![ERR, 0x22];
        words.extend(Inst::HLT.to_words());
        let mut m = Machine::new(Module::new(words), Config::default());
        let steps = m.run(&mut Silent, &mut [], None).unwrap();
        assert_eq!(steps, 3);
        assert!(m.is_halted());
    }

    #[test]
    fn fatal_decode() {
        let mut m = Machine::new(Module::new(vec![0x41, 9]), Config::default());
        assert!(matches!(
            m.exec(&mut Silent),
            Err(Fault::Decode(arch::Error::InvalidRegister(9)))
        ));
        let mut m = Machine::new(Module::new(vec![0x21]), Config::default());
        assert!(matches!(
            m.exec(&mut Silent),
            Err(Fault::Decode(arch::Error::MissingOperandWord(1)))
        ));
    }

    #[test]
    fn fall_off_the_end() {
        let mut m = machine(&[Inst::PUSH(Operand::Imm(1))]);
        assert!(matches!(
            m.run(&mut Silent, &mut [], None),
            Err(Fault::ProgramCounterOutOfRange(2))
        ));
        let mut m = machine(&[Inst::JMP(-4)]);
        assert!(matches!(
            m.exec(&mut Silent),
            Err(Fault::ProgramCounterOutOfRange(-4))
        ));
    }

    #[test]
    fn tmax() {
        let mut m = machine(&[Inst::JMP(0)]);
        assert_eq!(m.run(&mut Silent, &mut [], Some(10)).unwrap(), 10);
        assert!(!m.is_halted());
    }

    #[test]
    fn transcendental() {
        let mut m = machine(&[
            Inst::PUSH(Operand::Imm(17)),
            Inst::SQRT,
            Inst::PUSH(Operand::Imm(-4)),
            Inst::SQRT,
            Inst::PUSH(Operand::Imm(0)),
            Inst::COS,
            Inst::PUSH(Operand::Imm(2)),
            Inst::SIN,
            Inst::HLT,
        ]);
        m.run(&mut Silent, &mut [], None).unwrap();
        assert_eq!(m.stack().iter().copied().collect::<Vec<_>>(), vec![4, 0, 1, 0]);
    }

    #[test]
    fn call_depth() {
        let config = Config {
            call_depth: 3,
            ..Config::default()
        };
        let words = Inst::CALL(0).to_words();
        let mut m = Machine::new(Module::new(words), config);
        assert!(matches!(
            m.run(&mut Silent, &mut [], None),
            Err(Fault::StackOverflow("call", 3))
        ));
        assert_eq!(m.calls().len(), 3);
    }
}
