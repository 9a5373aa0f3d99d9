//! rvcc - C subset compiler for 32-bit RISC-V
//!
//! Usage: rvcc [OPTIONS] <SOURCE>

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use rvcc::backend::BackendConfig;
use rvcc::common::{DiagnosticReporter, DiagnosticStyle};
use rvcc::driver::Pipeline;
use rvcc::frontend::FrontendConfig;
use std::fs;
use std::path::PathBuf;
use std::process;

/// Diagnostic layout
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Diagnostics {
    /// Offending line with a caret under the error column
    #[default]
    Caret,
    /// Labelled report with file name and line numbers
    Rich,
}

impl From<Diagnostics> for DiagnosticStyle {
    fn from(value: Diagnostics) -> Self {
        match value {
            Diagnostics::Caret => DiagnosticStyle::Caret,
            Diagnostics::Rich => DiagnosticStyle::Rich,
        }
    }
}

#[derive(ClapParser, Debug)]
#[command(name = "rvcc")]
#[command(version)]
#[command(about = "C subset compiler emitting RV32 assembly", long_about = None)]
struct Args {
    /// Program text, or a path when --file is given
    #[arg(required = true)]
    source: String,

    /// Read the program from the file named by SOURCE
    #[arg(short, long)]
    file: bool,

    /// Write assembly here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Interleave explanatory comments in the assembly
    #[arg(long)]
    annotate: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump the typed AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Diagnostic style
    #[arg(long, value_enum, default_value = "caret")]
    diagnostics: Diagnostics,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let (name, source) = if args.file {
        let source = fs::read_to_string(&args.source)
            .with_context(|| format!("failed to read {}", args.source))?;
        (args.source.clone(), source)
    } else {
        ("<input>".to_string(), args.source.clone())
    };

    let pipeline = Pipeline::new(
        FrontendConfig {
            dump_tokens: args.dump_tokens,
            dump_ast: args.dump_ast,
        },
        BackendConfig {
            annotate: args.annotate,
        },
    );

    let asm = match pipeline.compile(&source) {
        Ok(asm) => asm,
        Err(err) => {
            DiagnosticReporter::new(name, source)
                .with_style(args.diagnostics.into())
                .report_error(&err);
            process::exit(1);
        }
    };

    match &args.output {
        Some(path) => fs::write(path, asm)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", asm),
    }

    log::debug!("wrote assembly for {}", name);
    Ok(())
}
