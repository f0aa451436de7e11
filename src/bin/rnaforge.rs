use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

mod commands;

use commands::{IoParameters, InputFormat};
use commands::{align, annotate, convert, info};

#[derive(Parser, Debug)]
#[command(
    name = "rnaforge",
    about = "A command-line tool for reading, converting, and annotating RNA secondary and tertiary structures.",
    version,
    author,
    arg_required_else_help = true
)]
struct Cli {
    /// Input file path. When omitted, stdin is used.
    #[arg(short, long, value_name = "FILE", global = true)]
    input: Option<PathBuf>,
    /// Output file path. When omitted, stdout is used.
    #[arg(short, long, value_name = "FILE", global = true)]
    output: Option<PathBuf>,
    /// Force the input format instead of inferring it from the extension.
    #[arg(long = "format", value_enum, global = true)]
    input_format: Option<InputFormat>,
    /// Seed for sequences generated for sequence-less dot-bracket records.
    #[arg(long, value_name = "SEED", global = true)]
    seed: Option<u64>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the parsed input without writing structures.
    Info(info::InfoArgs),
    /// Convert any supported input to dot-bracket.
    Convert(convert::ConvertArgs),
    /// Derive base pairs from PDB coordinates.
    Annotate(annotate::AnnotateArgs),
    /// Project a Stockholm consensus structure onto its sequences.
    Align(align::AlignArgs),
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let io_params = IoParameters {
        input: cli.input.clone(),
        output: cli.output.clone(),
        input_format: cli.input_format,
        seed: cli.seed,
    };

    match cli.command {
        Command::Info(args) => info::run(&io_params, &args)?,
        Command::Convert(args) => convert::run(&io_params, &args)?,
        Command::Annotate(args) => annotate::run(&io_params, &args)?,
        Command::Align(args) => align::run(&io_params, &args)?,
    }

    Ok(())
}
