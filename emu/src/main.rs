use clap::Parser;
use color_print::cprintln;

use skemu::{
    hooks::{draw::Draw, dump::Dump, trace::Trace, Hook},
    serial::Serial,
    Config, Fault, Machine,
};

#[derive(Parser, Debug)]
#[clap(
    name = "SK64 Emulator",
    author = "kanade-k-1228",
    version = "v1.0.0",
    about = "Emulator for SK64 stack machine"
)]
struct Args {
    #[arg(short = 't', long)]
    tmax: Option<u64>,

    #[arg(short, long)]
    dump_cfg: Option<String>,

    #[arg(short = 'a', long)]
    dump_all: bool,

    /// Print every executed instruction
    #[arg(long)]
    trace: bool,

    /// Read IN values from a file instead of stdin
    #[arg(short, long)]
    input: Option<String>,

    /// Write OUT values to a file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    #[arg(long, default_value_t = Config::default().stack_depth)]
    stack_depth: usize,

    #[arg(default_value = "main.sk.bin")]
    input_file: String,
}

fn main() {
    let args = Args::parse();
    println!("SK64 Emulator by kanade-k-1228");

    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.input_file);
    println!("+-----------------------------------------------+");

    // ------------------------------------------------------------------------
    // Initialize state machine model
    let config = Config {
        stack_depth: args.stack_depth,
        ..Config::default()
    };
    let mut machine = match std::fs::read(&args.input_file)
        .map_err(Fault::from)
        .and_then(|bytes| Machine::load(&bytes, config))
    {
        Ok(machine) => machine,
        Err(fault) => {
            cprintln!("<red,bold>error</>: {}", fault);
            cprintln!("     <blue>--></> <underline>{}</>", args.input_file);
            std::process::exit(1);
        }
    };

    // ------------------------------------------------------------------------
    // Initialize hooks
    println!("[INIT]");
    let (mut console, mut hooks) = match setup(&args) {
        Ok(setup) => setup,
        Err(fault) => {
            cprintln!("<red,bold>error</>: {}", fault);
            std::process::exit(1);
        }
    };

    // ------------------------------------------------------------------------
    // Main loop
    let result = machine.run(&mut console, &mut hooks, args.tmax);
    drop(console);

    // Exit
    println!("=================================================");
    match result {
        Ok(steps) => println!("{} steps", steps),
        Err(fault) => {
            cprintln!("<red,bold>error</>: {}", fault);
            cprintln!("     <blue>--></> pc = 0x{:04X}", machine.pc());
            std::process::exit(1);
        }
    }
}

fn setup(args: &Args) -> Result<(Serial, Vec<Box<dyn Hook>>), Fault> {
    let console = Serial::arg(args.input.clone(), args.output.clone())?;
    let mut hooks: Vec<Box<dyn Hook>> = vec![
        Box::new(Dump::arg(args.dump_cfg.clone(), args.dump_all)?),
        Box::new(Draw),
    ];
    if args.trace {
        hooks.push(Box::new(Trace));
    }
    Ok((console, hooks))
}
