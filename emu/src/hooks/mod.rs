pub mod draw;
pub mod dump;
pub mod trace;

use crate::model::{Machine, Trace};

/// Observer called once before the run and after every executed step.
pub trait Hook {
    fn init(&mut self, _machine: &Machine) {}
    fn exec(&mut self, time: u64, trace: &Trace, machine: &Machine);
}
