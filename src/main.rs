use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use vasm::diagnostics::{DiagnosticSink, ErrorCode, Severity};
use vasm::{assembler, disasm, dump};

/// Two-pass assembler for the vasm register machine.
#[derive(Parser)]
#[command(name = "vasm", version)]
struct Opts {
    /// Source file (.vasm)
    input: PathBuf,

    /// Output image (.bin); required unless --vasm is given
    output: Option<PathBuf>,

    /// Hex-dump the generated code section
    #[arg(short, long)]
    debug: bool,

    /// Print a disassembly listing instead of writing the image
    #[arg(short, long)]
    vasm: bool,

    /// Dump the label table
    #[arg(short, long)]
    labels: bool,

    /// Suppress progress output
    #[arg(short, long)]
    silent: bool,

    /// Dump the data section
    #[arg(short = 'D', long = "data")]
    dump_data: bool,
}

fn fatal_exit(code: ErrorCode, message: String) -> ! {
    let mut sink = DiagnosticSink::new();
    sink.push(code, Severity::Fatal, 0, 0, "", message);
    sink.render();
    process::exit(1);
}

fn main() {
    let opts = Opts::parse();

    if opts.input.extension().and_then(|ext| ext.to_str()) != Some("vasm") {
        fatal_exit(
            ErrorCode::FileOpen,
            "input file must have .vasm extension".to_string(),
        );
    }

    let output = if opts.vasm {
        None
    } else {
        match &opts.output {
            Some(path) => {
                if path.extension().and_then(|ext| ext.to_str()) != Some("bin") {
                    fatal_exit(
                        ErrorCode::FileOpen,
                        "output file must have .bin extension".to_string(),
                    );
                }
                Some(path.clone())
            }
            None => {
                eprintln!("Usage: vasm <input_file.vasm> <output_file.bin> [flags]");
                process::exit(1);
            }
        }
    };

    if !opts.silent {
        println!("Assembling {}...", opts.input.display());
    }

    let assembly = match assembler::assemble_from_file(&opts.input.to_string_lossy()) {
        Ok(assembly) => assembly,
        Err(sink) => {
            sink.render();
            process::exit(1);
        }
    };

    if !assembly.warnings.is_empty() {
        assembly.warnings.render();
    }

    if opts.vasm {
        print!("{}", disasm::listing(&assembly));
        return;
    }

    if let Some(path) = output {
        let image = assembly.image();
        if let Err(err) = fs::write(&path, &image) {
            fatal_exit(
                ErrorCode::FileWrite,
                format!("could not write file '{}': {}", path.display(), err),
            );
        }
        if !opts.silent {
            println!(
                "{} - {} bytes code, {} bytes data -> {}",
                "OK".green(),
                assembly.code.len(),
                assembly.data.len(),
                path.display()
            );
        }
    }

    if opts.labels {
        dump::dump_labels(&assembly);
    }
    if opts.debug {
        dump::debug_hex(&assembly);
    }
    if opts.dump_data {
        dump::dump_data_section(&assembly);
    }
}
