mod cli;
mod compiler;

#[cfg(test)]
mod tests;

use std::sync::Once;

use clap::Parser as _;
use cli::{Cli, Command};
use luna_backend::CodegenError;
use luna_diagnostic::{DiagnosticEmitter, PlainDiagnosticEmitter, PrettyDiagnosticEmitter};

use crate::compiler::{Compiler, Emit};

#[derive(thiserror::Error, Debug)]
enum CompilerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("error during codegen: {0}")]
    Codegen(#[from] CodegenError),

    #[error("errors while compiling")]
    HadErrors,
}

type CompilerResult<T> = Result<T, CompilerError>;

static TRACING_INIT: Once = Once::new();

/// Installs a subscriber, but only when `RUST_LOG` asks for one.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> CompilerResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            input,
            source,
            output,
            emit,
            color,
            plain,
        } => {
            let (name, source) = if source {
                ("<unnamed>".to_owned(), input)
            } else {
                let source = std::fs::read_to_string(&input)?;
                (input, source)
            };

            tracing::debug!(%name, ?emit, "building");

            let result = if plain {
                let emitter = PlainDiagnosticEmitter::new(std::io::stderr());
                build(Compiler::new(emitter), &name, &source, emit)
            } else {
                let emitter = PrettyDiagnosticEmitter::new(color.into());
                build(Compiler::new(emitter), &name, &source, emit)
            }?;

            match output {
                Some(path) => std::fs::write(path, result)?,
                None => print!("{result}"),
            }

            Ok(())
        }
    }
}

fn build<D: DiagnosticEmitter>(
    mut compiler: Compiler<D>,
    name: &str,
    source: &str,
    emit: Emit,
) -> CompilerResult<String> {
    match emit {
        Emit::Cpp => compiler.compile_source(name, source),
        _ => compiler.emit(name, source, emit),
    }
}
