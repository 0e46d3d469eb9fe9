use arch::inst::Inst;
use color_print::cformat;

use crate::{assembler::Program, label::Labels, parser::Stmt};

/// Print an address/word/source listing of an assembled program.
pub fn print_dump(program: &Program) {
    for line in &program.lines {
        if line.loc.idx == 0 {
            let file = &line.loc.file;
            println!(
                "{}+------[{}]{}",
                "-".repeat(29),
                file,
                "-".repeat(45usize.saturating_sub(file.len()))
            );
        }

        let comment = line
            .loc
            .raw
            .split_once(';')
            .map(|(_, c)| format!(";{}", c))
            .unwrap_or_default();
        let line_num = line.loc.idx + 1;

        let body = match &line.stmt {
            None => format!("{:29}| {:>4}: {}", "", line_num, comment),
            Some(Stmt::Label(name)) => {
                let label = cformat!("<g>{}:</>", name);
                format!("{:29}| {:>4}: {} {}", "", line_num, label, comment)
            }
            Some(Stmt::Code(code)) => {
                let words = words_of(program, line.pc, line.len);
                let inst = match Inst::from_words(&program.words, line.pc) {
                    Ok(inst) => inst.cformat(),
                    Err(_) => code.cformat(&program.labels),
                };
                format!(
                    "[{:04X}] {:<22}| {:>4}:   {} {}",
                    line.pc,
                    hex(words),
                    line_num,
                    inst,
                    comment
                )
            }
            Some(Stmt::Unknown(word)) => {
                format!(
                    "[{:04X}] {}| {:>4}:   {} {}",
                    line.pc,
                    cformat!("<r,s>{:<22}</>", hex(words_of(program, line.pc, line.len))),
                    line_num,
                    cformat!("<r,u>{}</>", word),
                    comment
                )
            }
        };
        println!("{}", body);
    }
    println!("-----------------------------+-----------------------------------------------------");
    for row in label_rows(&program.labels) {
        println!("{}", row);
    }
}

/// One row per label: address and where it was defined.
fn label_rows(labels: &Labels) -> Vec<String> {
    labels
        .iter()
        .map(|(name, label)| {
            let addr = match label.addr {
                Some(addr) => format!("{:04X}", addr),
                None => "????".to_string(),
            };
            format!("[{}] {:<24}| {}", addr, name, label.loc.pos())
        })
        .collect()
}

fn words_of(program: &Program, pc: usize, len: usize) -> &[u64] {
    program.words.get(pc..pc + len).unwrap_or(&[])
}

fn hex(words: &[u64]) -> String {
    words
        .iter()
        .map(|word| format!("{:X}", word))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble;

    #[test]
    fn symbol_table() {
        let program = assemble("jmp end:\nstart:\nhlt\nend:\nret\n").unwrap();
        let rows = label_rows(&program.labels);
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("[0003] end"));
        assert!(rows[0].ends_with("<input>:4"));
        assert!(rows[1].starts_with("[0002] start"));
    }
}
