use color_print::cprintln;

use crate::error::Error;

/// Position of a source line, kept with its text for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    pub file: String,
    pub idx: usize,
    pub raw: String,
}

impl Loc {
    pub fn new(file: &str, idx: usize, raw: &str) -> Self {
        Loc {
            file: file.to_string(),
            idx,
            raw: raw.to_string(),
        }
    }

    pub fn pos(&self) -> String {
        format!("{}:{}", self.file, self.idx + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
}

#[derive(Debug)]
pub struct Diag {
    pub level: Level,
    pub error: Error,
    pub loc: Option<Loc>,
    /// Earlier line the error refers back to
    pub note: Option<Loc>,
}

impl Diag {
    pub fn error(error: Error, loc: Option<Loc>) -> Self {
        Diag {
            level: Level::Error,
            error,
            loc,
            note: None,
        }
    }

    pub fn warn(error: Error, loc: Option<Loc>) -> Self {
        Diag {
            level: Level::Warn,
            error,
            loc,
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<Loc>) -> Self {
        self.note = note;
        self
    }

    pub fn print(&self) {
        match self.level {
            Level::Error => cprintln!("<red,bold>error</>: {}", self.error),
            Level::Warn => cprintln!("<yellow,bold>warn</>: {}", self.error),
        }
        if let Some(loc) = &self.loc {
            print_loc(loc);
        }
        if let Some(note) = &self.note {
            cprintln!("<green,bold>note</>: Already defined here.");
            print_loc(note);
        }
    }
}

fn print_loc(loc: &Loc) {
    cprintln!("     <blue>--></> <underline>{}</>", loc.pos());
    cprintln!("      <blue>|</>");
    cprintln!(" <blue>{:>4} |</> {}", loc.idx + 1, loc.raw);
    cprintln!("      <blue>|</>");
}
