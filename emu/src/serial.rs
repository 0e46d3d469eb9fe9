use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::error::Fault;

/// Where IN reads from and OUT writes to.
pub trait Console {
    fn read_int(&mut self) -> Result<i64, Fault>;
    fn write_int(&mut self, value: i64) -> Result<(), Fault>;
}

/// Console over a reader and a writer. Input is a stream of whitespace-separated
/// decimal integers. Output is one integer per line.
pub struct Serial {
    read_buf: Box<dyn BufRead>,
    write_buf: Box<dyn Write>,
    pending: VecDeque<String>,
}

impl Serial {
    pub fn new(read_buf: Box<dyn BufRead>, write_buf: Box<dyn Write>) -> Serial {
        Serial {
            read_buf,
            write_buf,
            pending: VecDeque::new(),
        }
    }

    /// Files when given, stdin and stdout otherwise.
    pub fn arg(read_file: Option<String>, write_file: Option<String>) -> Result<Serial, Fault> {
        let read_buf: Box<dyn BufRead> = match read_file {
            Some(file) => Box::new(std::io::BufReader::new(std::fs::File::open(file)?)),
            None => Box::new(std::io::BufReader::new(std::io::stdin())),
        };
        let write_buf: Box<dyn Write> = match write_file {
            Some(file) => Box::new(std::io::BufWriter::new(std::fs::File::create(file)?)),
            None => Box::new(std::io::stdout()),
        };
        Ok(Serial::new(read_buf, write_buf))
    }
}

impl Console for Serial {
    fn read_int(&mut self) -> Result<i64, Fault> {
        let token = loop {
            if let Some(token) = self.pending.pop_front() {
                break token;
            }
            let mut line = String::new();
            if self.read_buf.read_line(&mut line)? == 0 {
                return Err(Fault::InvalidInput("end of input".to_string()));
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        };
        token.parse().map_err(|_| Fault::InvalidInput(token))
    }

    fn write_int(&mut self, value: i64) -> Result<(), Fault> {
        writeln!(self.write_buf, "{}", value)?;
        self.write_buf.flush()?;
        Ok(())
    }
}

impl Drop for Serial {
    fn drop(&mut self) {
        let _ = self.write_buf.flush();
    }
}
