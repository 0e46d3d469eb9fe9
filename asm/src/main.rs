use std::io::Write;

use skasm::{msg::Diag, util::print_dump, Assembler, Error, Limits};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input files, assembled in order into one program
    #[clap(default_value = "main.sk")]
    input: Vec<String>,

    /// Output file
    #[clap(short, long, default_value = "main.sk.bin")]
    output: String,

    /// Dump assembly code
    #[clap(short, long)]
    dump: bool,

    /// Maximum number of instruction words
    #[clap(long, default_value_t = Limits::default().max_words)]
    max_words: usize,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("SK64 Assembler by kanade-k-1228");
    if let Err(diag) = run(&args) {
        diag.print();
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Diag> {
    let limits = Limits {
        max_words: args.max_words,
        ..Limits::default()
    };
    let mut asm = Assembler::new(limits);

    println!("1. Read Files and Parse Lines");
    let fed = feed_all(&mut asm, &args.input);
    for warn in asm.warnings() {
        warn.print();
    }
    fed?;

    println!("2. Resolve Label & Generate Binary");
    let program = asm.finish()?;
    println!("  > {}", &args.output);
    let mut file = std::fs::File::create(&args.output)
        .map_err(|e| Diag::error(Error::FileCreate(args.output.clone(), e), None))?;
    file.write_all(&program.module().to_bytes())
        .map_err(|e| Diag::error(Error::FileWrite(args.output.clone(), e), None))?;

    if args.dump {
        print_dump(&program);
    }
    Ok(())
}

fn feed_all(asm: &mut Assembler, paths: &[String]) -> Result<(), Diag> {
    for path in paths {
        println!("  < {}", path);
        let src = std::fs::read_to_string(path).map_err(|e| {
            let error = match e.kind() {
                std::io::ErrorKind::NotFound => Error::FileOpen(path.clone(), e),
                _ => Error::FileRead(path.clone(), e),
            };
            Diag::error(error, None)
        })?;
        asm.feed(path, &src)?;
    }
    Ok(())
}
