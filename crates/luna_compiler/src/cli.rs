use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use luna_diagnostic::termcolor::ColorChoice;

use crate::compiler::Emit;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a program to C++.
    Build {
        /// The input file.
        input: String,

        /// Whether the given input should be used directly as the source instead
        /// of as the source file path.
        #[clap(long, short, action)]
        source: bool,

        /// The output file. If not specified, prints to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after the given stage and print its result.
        #[arg(long, value_enum, default_value_t = Emit::Cpp)]
        emit: Emit,

        #[arg(long, value_enum, default_value_t = Color::Auto)]
        color: Color,

        /// Print diagnostics without colors or source gutters.
        #[arg(long)]
        plain: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Auto,
    Always,
    Never,
}

impl From<Color> for ColorChoice {
    fn from(color: Color) -> Self {
        match color {
            Color::Auto => ColorChoice::Auto,
            Color::Always => ColorChoice::Always,
            Color::Never => ColorChoice::Never,
        }
    }
}
