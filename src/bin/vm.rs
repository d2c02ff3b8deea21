use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use vasm::logging;
use vasm::vm::Vm;

/// Bytecode interpreter for images produced by the vasm assembler.
#[derive(Parser)]
#[command(name = "vm", version)]
struct Opts {
    /// Program image (.bin)
    image: PathBuf,

    /// Stop after this many steps (0 = run until the program halts)
    #[arg(long, default_value_t = 0)]
    limit: u64,
}

fn main() {
    let opts = Opts::parse();

    let image = match fs::read(&opts.image) {
        Ok(image) => image,
        Err(err) => {
            logging::error(format!("cannot open file {}: {}", opts.image.display(), err));
            process::exit(1);
        }
    };

    let mut vm = Vm::new();
    vm.load_image(&image);
    println!("Loaded {} bytes from {}", image.len(), opts.image.display());

    let steps = if opts.limit > 0 {
        let steps = vm.run_with_limit(opts.limit);
        if vm.running {
            println!("\ninfinite loop.");
        }
        steps
    } else {
        vm.run()
    };

    println!("\nprogram completed in {} steps.", steps);
}
