use arch::{module::Module, op::ERR};

use crate::{
    error::Error,
    label::Labels,
    lexer::Lines,
    msg::{Diag, Loc},
    parser::Stmt,
};

/// Capacity limits of one assembly run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_words: usize,
    pub max_labels: usize,
    pub max_fixups: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_words: 65536,
            max_labels: 1024,
            max_fixups: 4096,
        }
    }
}

/// A parsed source line and the words it produced.
#[derive(Debug, Clone)]
pub struct Line {
    pub loc: Loc,
    pub stmt: Option<Stmt>,
    pub pc: usize,
    pub len: usize,
}

#[derive(Debug)]
pub struct Program {
    pub words: Vec<u64>,
    pub lines: Vec<Line>,
    pub labels: Labels,
}

impl Program {
    pub fn module(&self) -> Module {
        Module::new(self.words.clone())
    }
}

/// Single pass over every input, then back-patching of forward references.
pub struct Assembler {
    limits: Limits,
    words: Vec<u64>,
    labels: Labels,
    lines: Vec<Line>,
    warnings: Vec<Diag>,
}

impl Assembler {
    pub fn new(limits: Limits) -> Self {
        Assembler {
            limits,
            words: vec![],
            labels: Labels::new(&limits),
            lines: vec![],
            warnings: vec![],
        }
    }

    /// Address of the next emitted word.
    pub fn pc(&self) -> usize {
        self.words.len()
    }

    pub fn warnings(&self) -> &[Diag] {
        &self.warnings
    }

    /// Assemble one source file. Labels are shared with earlier files.
    pub fn feed(&mut self, file: &str, src: &str) -> Result<(), Diag> {
        for (idx, span) in Lines::new(src).enumerate() {
            let loc = Loc::new(file, idx, span.text(src));
            let pc = self.pc();
            let stmt = Stmt::parse(src, span).map_err(|e| Diag::error(e, Some(loc.clone())))?;

            match &stmt {
                None => {}
                Some(Stmt::Label(name)) => {
                    if let Err(e) = self.labels.define(name, pc as i64, &loc) {
                        let prev = self.labels.get(name).map(|label| label.loc.clone());
                        return Err(Diag::error(e, Some(loc)).with_note(prev));
                    }
                }
                Some(Stmt::Code(code)) => {
                    let inst = code
                        .resolve(&mut self.labels, pc, &loc)
                        .map_err(|e| Diag::error(e, Some(loc.clone())))?;
                    self.emit(&inst.to_words())
                        .map_err(|e| Diag::error(e, Some(loc.clone())))?;
                }
                Some(Stmt::Unknown(word)) => {
                    self.emit(&[ERR])
                        .map_err(|e| Diag::error(e, Some(loc.clone())))?;
                    self.warnings.push(Diag::warn(
                        Error::UnknownMnemonic(word.clone()),
                        Some(loc.clone()),
                    ));
                }
            }

            self.lines.push(Line {
                loc,
                stmt,
                pc,
                len: self.pc() - pc,
            });
        }
        Ok(())
    }

    fn emit(&mut self, words: &[u64]) -> Result<(), Error> {
        if self.words.len() + words.len() > self.limits.max_words {
            return Err(Error::CapacityExceeded("words", self.limits.max_words));
        }
        self.words.extend_from_slice(words);
        Ok(())
    }

    /// Patch forward references. Fails on the first label never defined.
    pub fn finish(mut self) -> Result<Program, Diag> {
        if let Err(e) = self.labels.resolve_all(&mut self.words) {
            let loc = match &e {
                Error::UnresolvedSymbol(name) => {
                    self.labels.get(name).map(|label| label.loc.clone())
                }
                _ => None,
            };
            return Err(Diag::error(e, loc));
        }
        Ok(Program {
            words: self.words,
            lines: self.lines,
            labels: self.labels,
        })
    }
}

/// Assemble a single in-memory source with default limits.
pub fn assemble(src: &str) -> Result<Program, Diag> {
    let mut asm = Assembler::new(Limits::default());
    asm.feed("<input>", src)?;
    asm.finish()
}
