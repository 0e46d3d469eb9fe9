use crate::model::{Event, Machine, Trace, RAM_SIZE};

use super::Hook;

const WIDTH: usize = 16;

/// Prints RAM as a 16x16 picture whenever DRAW runs.
#[derive(Debug, Default)]
pub struct Draw;

impl Hook for Draw {
    fn exec(&mut self, _time: u64, trace: &Trace, machine: &Machine) {
        if let Event::Draw = trace.event {
            print!("{}", render(machine.ram()));
        }
    }
}

/// `#` for a non-zero cell, `.` for zero, one row per line.
pub fn render(ram: &[i64; RAM_SIZE]) -> String {
    ram.chunks(WIDTH)
        .map(|row| {
            let mut line: String = row
                .iter()
                .map(|cell| if *cell != 0 { '#' } else { '.' })
                .collect();
            line.push('\n');
            line
        })
        .collect()
}
