use indexmap::IndexMap;

use crate::{assembler::Limits, error::Error, msg::Loc};

/// Value written in place of a label that is not defined yet.
pub const UNRESOLVED: i64 = -1;

#[derive(Debug, Clone)]
pub struct Label {
    pub addr: Option<i64>,
    /// Definition line, or the first reference while undefined
    pub loc: Loc,
}

/// Word that has to be patched once `label` is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixup {
    pub offset: usize,
    pub label: usize,
}

/// Symbol table shared by every input file. A label id is its insertion index.
#[derive(Debug)]
pub struct Labels {
    labels: IndexMap<String, Label>,
    fixups: Vec<Fixup>,
    max_labels: usize,
    max_fixups: usize,
}

impl Labels {
    pub fn new(limits: &Limits) -> Self {
        Labels {
            labels: IndexMap::new(),
            fixups: vec![],
            max_labels: limits.max_labels,
            max_fixups: limits.max_fixups,
        }
    }

    fn entry(&mut self, name: &str, loc: &Loc) -> Result<usize, Error> {
        if let Some(id) = self.labels.get_index_of(name) {
            return Ok(id);
        }
        if self.labels.len() >= self.max_labels {
            return Err(Error::CapacityExceeded("labels", self.max_labels));
        }
        let label = Label {
            addr: None,
            loc: loc.clone(),
        };
        Ok(self.labels.insert_full(name.to_string(), label).0)
    }

    pub fn define(&mut self, name: &str, addr: i64, loc: &Loc) -> Result<(), Error> {
        let id = self.entry(name, loc)?;
        let label = &mut self.labels[id];
        if label.addr.is_some() {
            return Err(Error::RedefinedLabel(name.to_string()));
        }
        label.addr = Some(addr);
        label.loc = loc.clone();
        Ok(())
    }

    /// Address of `name`. An undefined label yields [`UNRESOLVED`] and queues
    /// a fixup for the word at `offset`.
    pub fn reference(&mut self, name: &str, offset: usize, loc: &Loc) -> Result<i64, Error> {
        let id = self.entry(name, loc)?;
        if let Some(addr) = self.labels[id].addr {
            return Ok(addr);
        }
        if self.fixups.len() >= self.max_fixups {
            return Err(Error::CapacityExceeded("fixups", self.max_fixups));
        }
        self.fixups.push(Fixup { offset, label: id });
        Ok(UNRESOLVED)
    }

    /// Patch every queued fixup into `words`. The queue is drained.
    pub fn resolve_all(&mut self, words: &mut [u64]) -> Result<(), Error> {
        for fixup in std::mem::take(&mut self.fixups) {
            let (name, label) = self
                .labels
                .get_index(fixup.label)
                .ok_or(Error::BrokenFixup(fixup.offset))?;
            let addr = label
                .addr
                .ok_or_else(|| Error::UnresolvedSymbol(name.to_string()))?;
            let word = words
                .get_mut(fixup.offset)
                .ok_or(Error::BrokenFixup(fixup.offset))?;
            *word = addr as u64;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    pub fn get_val(&self, name: &str) -> Option<i64> {
        self.labels.get(name).and_then(|label| label.addr)
    }

    pub fn fixups(&self) -> &[Fixup] {
        &self.fixups
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Label)> {
        self.labels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(idx: usize) -> Loc {
        Loc::new("test.sk", idx, "")
    }

    #[test]
    fn backward_reference() {
        let mut labels = Labels::new(&Limits::default());
        labels.define("loop", 4, &loc(0)).unwrap();
        assert_eq!(labels.reference("loop", 9, &loc(3)).unwrap(), 4);
        assert!(labels.fixups().is_empty());
    }

    #[test]
    fn forward_references_are_patched() {
        let mut labels = Labels::new(&Limits::default());
        let mut words = vec![13, 0, 16, 0, 15];
        words[1] = labels.reference("end", 1, &loc(0)).unwrap() as u64;
        words[3] = labels.reference("end", 3, &loc(1)).unwrap() as u64;
        assert_eq!(words[1], UNRESOLVED as u64);
        assert_eq!(labels.fixups().len(), 2);

        labels.define("end", 4, &loc(2)).unwrap();
        labels.resolve_all(&mut words).unwrap();
        assert_eq!(words, vec![13, 4, 16, 4, 15]);
        assert!(labels.fixups().is_empty());
    }

    #[test]
    fn redefinition() {
        let mut labels = Labels::new(&Limits::default());
        labels.define("main", 0, &loc(0)).unwrap();
        assert!(matches!(
            labels.define("main", 7, &loc(5)),
            Err(Error::RedefinedLabel(name)) if name == "main"
        ));
        assert_eq!(labels.get("main").unwrap().loc.idx, 0);
        assert_eq!(labels.get_val("main"), Some(0));
    }

    #[test]
    fn unresolved() {
        let mut labels = Labels::new(&Limits::default());
        labels.reference("nowhere", 1, &loc(0)).unwrap();
        let mut words = vec![13, 0];
        assert!(matches!(
            labels.resolve_all(&mut words),
            Err(Error::UnresolvedSymbol(name)) if name == "nowhere"
        ));
    }

    #[test]
    fn label_ids_follow_first_sighting() {
        let mut labels = Labels::new(&Limits::default());
        labels.reference("b", 1, &loc(0)).unwrap();
        labels.define("a", 2, &loc(1)).unwrap();
        labels.define("b", 3, &loc(2)).unwrap();
        let names: Vec<&String> = labels.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(labels.get("b").unwrap().loc.idx, 2);
    }

    #[test]
    fn broken_fixup() {
        let mut labels = Labels::new(&Limits::default());
        labels.define("end", 2, &loc(0)).unwrap();
        labels.fixups.push(Fixup { offset: 9, label: 0 });
        let mut words = vec![13, 0];
        assert!(matches!(
            labels.resolve_all(&mut words),
            Err(Error::BrokenFixup(9))
        ));

        labels.fixups.push(Fixup { offset: 1, label: 5 });
        assert!(matches!(
            labels.resolve_all(&mut words),
            Err(Error::BrokenFixup(1))
        ));
        assert_eq!(words, vec![13, 0]);
    }

    #[test]
    fn capacity() {
        let limits = Limits {
            max_labels: 1,
            max_fixups: 1,
            ..Limits::default()
        };
        let mut labels = Labels::new(&limits);
        labels.reference("x", 1, &loc(0)).unwrap();
        assert!(matches!(
            labels.reference("x", 3, &loc(1)),
            Err(Error::CapacityExceeded("fixups", 1))
        ));
        assert!(matches!(
            labels.define("y", 0, &loc(2)),
            Err(Error::CapacityExceeded("labels", 1))
        ));
    }
}
