use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use quack_codegen::CodegenOptions;
use quack_driver::{dump_tree, emit, load_program, lower, write_output, DriverError};
use quack_ir::CheckedProgram;

#[derive(Parser)]
#[command(
    name = "qkc",
    version = "0.1.0",
    about = "Quack compiler back end",
    long_about = "Lowers a type-checked Quack program (JSON interchange form)\n\
                  to a C translation unit for the Quack runtime."
)]
struct Cli {
    /// Checked program to compile
    input: PathBuf,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump the tagged tree as JSON instead of generating code
    #[arg(long)]
    json: bool,

    /// Runtime header named in the generated `#include`
    #[arg(long, default_value = "Builtins.h")]
    runtime_header: String,

    /// Leave out section banner comments
    #[arg(long)]
    no_banners: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = CodegenOptions {
        runtime_header: cli.runtime_header.clone(),
        banners: !cli.no_banners,
    };

    if cli.verbose {
        eprintln!("Compiling: {}", cli.input.display());
        eprintln!("\n[Phase 1] Loading checked program...");
    }
    let program = match load_program(&cli.input) {
        Ok(program) => program,
        Err(err) => {
            report(&err, None);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &program, &options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, Some(&program));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, program: &CheckedProgram, options: &CodegenOptions) -> Result<(), DriverError> {
    let text = if cli.json {
        if cli.verbose {
            eprintln!("[Phase 2] Dumping tree...");
        }
        dump_tree(program)?
    } else {
        if cli.verbose {
            eprintln!(
                "[Phase 2] Lowering {} class(es) and the entry point...",
                program.classes.len()
            );
        }
        let ir = lower(program)?;
        if cli.verbose {
            let bodies: usize = ir.classes.iter().map(|c| c.methods.len() + 1).sum::<usize>() + 1;
            eprintln!("  {} bodies lowered", bodies);
            eprintln!("[Phase 3] Generating C...");
        }
        emit(&ir, options)?
    };

    match &cli.output {
        Some(path) => {
            write_output(path, &text)?;
            if cli.verbose {
                eprintln!("\nWrote {}", path.display());
            }
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Prints `err` to stderr, labelled against the Quack source when possible.
fn report(err: &DriverError, program: Option<&CheckedProgram>) {
    let located = program
        .and_then(|p| p.source.as_ref())
        .zip(err.span())
        .and_then(|(path, span)| {
            fs::read_to_string(path)
                .ok()
                .map(|source| (path.display().to_string(), source, span))
        });

    match located {
        Some((filename, source, span)) => {
            report_error(err.code(), &err.to_string(), span.start, span.end, &filename, &source)
        }
        None => eprintln!("error[{}]: {}", err.code(), err),
    }
}

fn report_error(code: &str, message: &str, start: usize, end: usize, filename: &str, source: &str) {
    let span = (filename, start..end);
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_code(code)
        .with_message(message)
        .with_label(Label::new(span).with_message("here").with_color(Color::Red))
        .finish()
        .eprint((filename, Source::from(source)));
    if printed.is_err() {
        eprintln!("error[{}]: {}", code, message);
    }
}
