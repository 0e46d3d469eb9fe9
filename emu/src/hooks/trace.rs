use color_print::cprintln;

use crate::model::{Machine, Trace as Step};

use super::Hook;

/// Prints every executed instruction.
#[derive(Debug, Default)]
pub struct Trace;

impl Hook for Trace {
    fn init(&mut self, machine: &Machine) {
        println!(" * Trace {} words", machine.code().len());
    }

    fn exec(&mut self, time: u64, step: &Step, _machine: &Machine) {
        if let Some(inst) = &step.inst {
            cprintln!("[{:0>4}] <blue>{:04X}</> {}", time, step.pc, inst.cformat());
        }
    }
}
