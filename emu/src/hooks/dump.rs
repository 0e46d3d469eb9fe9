use arch::reg::Reg;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

use crate::{
    error::Fault,
    model::{Event, Machine, Trace, RAM_SIZE},
};

use super::Hook;

#[derive(Debug)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    list: List,
}

/// Breakpoints keyed by program counter.
#[derive(Debug, Default, Serialize, Deserialize)]
struct List(HashMap<usize, Config>);

#[derive(Debug, Serialize, Deserialize)]
struct Config {
    #[serde(default)]
    stack: bool,
    #[serde(default)]
    ram: Vec<usize>,
}

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, Fault> {
        let list = match &file {
            Some(fname) => serde_yaml::from_reader(BufReader::new(File::open(fname)?))?,
            None => List::default(),
        };
        Ok(Self { file, all, list })
    }

    pub fn from_yaml(yaml: &str, all: bool) -> Result<Self, Fault> {
        Ok(Self {
            file: None,
            all,
            list: serde_yaml::from_str(yaml)?,
        })
    }

    fn get(&self, pc: usize) -> Option<&Config> {
        self.list.0.get(&pc)
    }

    pub fn breakpoints(&self) -> usize {
        self.list.0.len()
    }
}

impl Hook for Dump {
    fn init(&mut self, _machine: &Machine) {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.breakpoints(), fname);
        }
    }

    fn exec(&mut self, _time: u64, trace: &Trace, machine: &Machine) {
        if let Event::Dump = trace.event {
            self.print_reg(machine);
            self.print_stack(machine);
            self.print_ram(machine, &(0..RAM_SIZE).collect::<Vec<_>>());
        } else if let Some(cfg) = self.get(trace.pc) {
            self.print_reg(machine);
            if cfg.stack {
                self.print_stack(machine);
            }
            self.print_ram(machine, &cfg.ram);
        } else if self.all {
            self.print_reg(machine);
        }
    }
}

impl Dump {
    fn print_reg(&self, machine: &Machine) {
        let regs = machine.regs();
        println!(" +--------------+--------------+--------------+--------------+");
        println!(
            " | pc: {:>8X} | x0: {:>8} |  a: {:>8} |  b: {:>8} |",
            machine.pc(),
            regs[Reg::SCRATCH],
            regs[Reg::A.index()],
            regs[Reg::B.index()],
        );
        println!(
            " | sp: {:>8} | cs: {:>8} |  c: {:>8} | top: {:>7} |",
            machine.stack().len(),
            machine.calls().len(),
            regs[Reg::C.index()],
            machine
                .stack()
                .peek()
                .map_or("-".to_string(), |top| top.to_string()),
        );
        println!(" +--------------+--------------+--------------+--------------+");
    }

    fn print_stack(&self, machine: &Machine) {
        for (depth, value) in machine.stack().iter().rev().enumerate() {
            println!(" | stack[{:>4}] : {:>20}                         |", depth, value);
        }
        for (depth, ret) in machine.calls().iter().rev().enumerate() {
            println!(" |  call[{:>4}] : {:>20X}                         |", depth, ret);
        }
        println!(" +-------------------------------------------------------------+");
    }

    fn print_ram(&self, machine: &Machine, addrs: &[usize]) {
        let ram = machine.ram();
        for addr in addrs {
            match ram.get(*addr) {
                Some(0) if addrs.len() == RAM_SIZE => {}
                Some(value) => {
                    println!(" |  ram[{:0>4X}] : {:>20}                         |", addr, value)
                }
                None => println!(" |  ram[{:0>4X}] : out of range                                 |", addr),
            }
        }
        println!(" +-------------------------------------------------------------+");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints() {
        let yaml = "\
4:
  stack: true
  ram: [0, 16]
12:
  ram: [255]
";
        let dump = Dump::from_yaml(yaml, false).unwrap();
        assert_eq!(dump.breakpoints(), 2);
        let cfg = dump.get(4).unwrap();
        assert!(cfg.stack);
        assert_eq!(cfg.ram, vec![0, 16]);
        let cfg = dump.get(12).unwrap();
        assert!(!cfg.stack);
        assert!(dump.get(5).is_none());
    }

    #[test]
    fn bad_yaml() {
        assert!(matches!(
            Dump::from_yaml("4: [1, 2", false),
            Err(Fault::DumpConfig(_))
        ));
    }

    #[test]
    fn no_file() {
        let dump = Dump::arg(None, true).unwrap();
        assert_eq!(dump.breakpoints(), 0);
    }
}
