#![allow(dead_code)]

use std::collections::VecDeque;

use skemu::{serial::Console, Config, Fault, Machine};

/// In-memory console: IN takes from `input`, OUT appends to `output`.
#[derive(Debug, Default)]
pub struct Tape {
    pub input: VecDeque<i64>,
    pub output: Vec<i64>,
}

impl Console for Tape {
    fn read_int(&mut self) -> Result<i64, Fault> {
        self.input
            .pop_front()
            .ok_or(Fault::InvalidInput("end of input".to_string()))
    }

    fn write_int(&mut self, value: i64) -> Result<(), Fault> {
        self.output.push(value);
        Ok(())
    }
}

pub struct Run {
    pub result: Result<u64, Fault>,
    pub output: Vec<i64>,
    pub machine: Machine,
}

pub fn run(src: &str, input: &[i64]) -> Run {
    let program = skasm::assemble(src).unwrap();
    let bytes = program.module().to_bytes();
    let mut machine = Machine::load(&bytes, Config::default()).unwrap();
    let mut tape = Tape {
        input: input.iter().copied().collect(),
        output: vec![],
    };
    let result = machine.run(&mut tape, &mut [], Some(100_000));
    Run {
        result,
        output: tape.output,
        machine,
    }
}
