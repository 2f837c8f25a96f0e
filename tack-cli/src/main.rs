//! Entrypoint for CLI
use std::{env, error::Error, fs, path::Path};

use log::{error, info};

static USAGE: &str = r#"
usage: tack CMD FILE

commands:
    compile    Compile source classes to stack machine code and a syntax tree
    translate  Translate stack machine code to assembly
    asm        Assemble into 16-bit binary words
    build      Run the whole pipeline on a source file

examples:
    tack compile Main.tack
    tack translate Main.vm
    tack asm Main.asm
    tack build Main.tack
"#;

type CliResult = Result<(), Box<dyn Error>>;

/// File stem used to scope static variables and generated labels.
fn unit_name(filepath: &str) -> String {
    Path::new(filepath)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Main".to_string())
}

fn sibling(filepath: &str, extension: &str) -> String {
    Path::new(filepath)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}

fn run_compiler(filepath: &str) -> CliResult {
    info!("compiling {}", filepath);
    let source = fs::read_to_string(filepath)?;

    let compiled = match tack_compiler::compile_str(&source) {
        Ok(compiled) => compiled,
        Err(err) => {
            error!("{}", err);
            return Err(err.into());
        }
    };

    let vm_path = sibling(filepath, "vm");
    fs::write(&vm_path, compiled.vm_text())?;
    info!("wrote {}", vm_path);

    let tree_path = sibling(filepath, "xml");
    fs::write(&tree_path, &compiled.tree)?;
    info!("wrote {}", tree_path);

    Ok(())
}

fn run_translator(filepath: &str) -> CliResult {
    info!("translating {}", filepath);
    let source = fs::read_to_string(filepath)?;

    let unit = unit_name(filepath);
    let asm = match tack::vm::translate_program(&[(unit.as_str(), source.as_str())]) {
        Ok(asm) => asm,
        Err(err) => {
            error!("{}", err);
            return Err(err.into());
        }
    };

    let asm_path = sibling(filepath, "asm");
    fs::write(&asm_path, asm)?;
    info!("wrote {}", asm_path);

    Ok(())
}

fn run_assembler(filepath: &str) -> CliResult {
    info!("assembling {}", filepath);
    let source = fs::read_to_string(filepath)?;

    let words = match tack::asm::assemble(&source) {
        Ok(words) => words,
        Err(err) => {
            error!("{}", err);
            return Err(err.into());
        }
    };

    let out_path = sibling(filepath, "hack");
    fs::write(&out_path, tack::asm::to_binary_text(&words))?;
    info!("wrote {} ({} words)", out_path, words.len());

    Ok(())
}

fn run_build(filepath: &str) -> CliResult {
    run_compiler(filepath)?;
    run_translator(&sibling(filepath, "vm"))?;
    run_assembler(&sibling(filepath, "asm"))?;
    Ok(())
}

fn main() -> CliResult {
    simple_logger::SimpleLogger::new().env().init().unwrap();

    match parse_args() {
        Some(Cmd::Compile { filepath }) => run_compiler(&filepath)?,
        Some(Cmd::Translate { filepath }) => run_translator(&filepath)?,
        Some(Cmd::Asm { filepath }) => run_assembler(&filepath)?,
        Some(Cmd::Build { filepath }) => run_build(&filepath)?,
        None => {
            println!("{USAGE}");
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next() {
        Some(cmd) => match cmd.as_str() {
            "compile" => Some(Cmd::Compile {
                filepath: args.next()?,
            }),
            "translate" => Some(Cmd::Translate {
                filepath: args.next()?,
            }),
            "asm" => Some(Cmd::Asm {
                filepath: args.next()?,
            }),
            "build" => Some(Cmd::Build {
                filepath: args.next()?,
            }),
            _ => None,
        },
        None => None,
    }
}

enum Cmd {
    /// Source to stack machine code plus syntax tree echo
    Compile { filepath: String },
    /// Stack machine code to assembly
    Translate { filepath: String },
    /// Assembly to binary words
    Asm { filepath: String },
    /// The whole pipeline
    Build { filepath: String },
}
