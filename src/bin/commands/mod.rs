use std::fmt;
use std::fs::File;
use std::io::{self as stdio, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;

use rna_forge::io::{
    Alignment, IoContext, read_bpseq, read_bracket, read_ct, read_pdb_structures, read_rnaml,
    read_stockholm, write_bracket,
};
use rna_forge::ops::annotate;
use rna_forge::{SecondaryStructure, TertiaryStructure};

pub mod align;
pub mod annotate;
pub mod convert;
pub mod info;

/// Input formats understood by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// PDB coordinate records.
    #[value(name = "pdb")]
    Pdb,
    /// Dot-bracket records.
    #[value(name = "bracket")]
    Bracket,
    /// Six-column connectivity table.
    #[value(name = "ct")]
    Ct,
    /// Three-column BPSeq table.
    #[value(name = "bpseq")]
    BpSeq,
    /// RNAML document.
    #[value(name = "rnaml")]
    Rnaml,
    /// Stockholm alignment.
    #[value(name = "stockholm")]
    Stockholm,
}

impl InputFormat {
    /// Attempts to infer a format from a file path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdb" | "ent" => Some(Self::Pdb),
            "db" | "dbn" | "dot" | "bracket" | "vienna" => Some(Self::Bracket),
            "ct" => Some(Self::Ct),
            "bpseq" => Some(Self::BpSeq),
            "xml" | "rnaml" => Some(Self::Rnaml),
            "sto" | "stk" | "stockholm" => Some(Self::Stockholm),
            _ => None,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Pdb => write!(f, "PDB"),
            InputFormat::Bracket => write!(f, "dot-bracket"),
            InputFormat::Ct => write!(f, "CT"),
            InputFormat::BpSeq => write!(f, "BPSeq"),
            InputFormat::Rnaml => write!(f, "RNAML"),
            InputFormat::Stockholm => write!(f, "Stockholm"),
        }
    }
}

/// Aggregated IO parameters shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct IoParameters {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub input_format: Option<InputFormat>,
    pub seed: Option<u64>,
}

impl IoParameters {
    /// Reader configuration derived from the command line.
    pub fn io_context(&self) -> IoContext {
        let context = IoContext::new_default();
        match self.seed {
            Some(seed) => context.with_rng_seed(seed),
            None => context,
        }
    }
}

/// Parsed input, grouped by what the source format yields.
pub enum LoadedInput {
    Tertiary(Vec<TertiaryStructure>),
    Secondary(Vec<SecondaryStructure>),
    Alignments(Vec<Alignment>),
}

/// Resolves the input format, falling back to the file extension.
pub fn resolve_input_format(params: &IoParameters) -> Result<InputFormat> {
    if let Some(explicit) = params.input_format {
        Ok(explicit)
    } else if let Some(path) = &params.input {
        InputFormat::from_path(path).ok_or_else(|| {
            anyhow!(
                "Unable to infer input format from '{}'. Please specify --format.",
                path.display()
            )
        })
    } else {
        bail!("Reading from stdin requires an explicit --format.")
    }
}

/// Parses the configured input with the given context.
pub fn load_input(params: &IoParameters, context: &IoContext) -> Result<LoadedInput> {
    let format = resolve_input_format(params)?;
    let source = params
        .input
        .as_ref()
        .map_or_else(|| "stdin".to_string(), |p| p.display().to_string());

    let reader = open_input(params)?;
    let loaded = match format {
        InputFormat::Pdb => {
            LoadedInput::Tertiary(read_pdb_structures(reader, context).map_err(anyhow::Error::new)?)
        }
        InputFormat::Bracket => {
            LoadedInput::Secondary(read_bracket(reader, context).map_err(anyhow::Error::new)?)
        }
        InputFormat::Ct => {
            LoadedInput::Secondary(vec![read_ct(reader).map_err(anyhow::Error::new)?])
        }
        InputFormat::BpSeq => {
            LoadedInput::Secondary(vec![read_bpseq(reader).map_err(anyhow::Error::new)?])
        }
        InputFormat::Rnaml => {
            LoadedInput::Secondary(read_rnaml(reader).map_err(anyhow::Error::new)?)
        }
        InputFormat::Stockholm => {
            LoadedInput::Alignments(read_stockholm(reader, context).map_err(anyhow::Error::new)?)
        }
    };

    log::info!("loaded {} input from {}", format, source);
    Ok(loaded)
}

/// Reduces any input to secondary structures, annotating coordinate chains on the way.
pub fn into_secondary(loaded: LoadedInput) -> Vec<SecondaryStructure> {
    match loaded {
        LoadedInput::Tertiary(chains) => chains
            .into_iter()
            .map(|chain| annotate(Arc::new(chain)))
            .collect(),
        LoadedInput::Secondary(structures) => structures,
        LoadedInput::Alignments(families) => families
            .into_iter()
            .flat_map(|family| family.structures)
            .collect(),
    }
}

fn open_input(params: &IoParameters) -> Result<Box<dyn BufRead>> {
    if let Some(path) = &params.input {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file {}", path.display()))?;
        Ok(Box::new(BufReader::new(file)))
    } else {
        let stdin = stdio::stdin();
        if stdin.is_terminal() {
            bail!(
                "No --input provided and stdin is a TTY. Provide -i/--input or pipe a file into rnaforge."
            );
        }
        Ok(Box::new(BufReader::new(stdin.lock())))
    }
}

/// Writes structures as dot-bracket records to the configured output.
pub fn save_bracket(structures: &[SecondaryStructure], params: &IoParameters) -> Result<()> {
    match &params.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_bracket(&mut writer, structures)
                .with_context(|| format!("Failed to write dot-bracket to {}", path.display()))?;
            writer.flush().context("Failed to flush output writer")?;
        }
        None => {
            let stdout = stdio::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_bracket(&mut writer, structures)
                .context("Failed to write dot-bracket to stdout")?;
            writer.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(())
}

/// Wraps long-running operations with a spinner rendered to stderr.
pub fn run_with_spinner<T, F>(message: &str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let result = work();

    match &result {
        Ok(_) => spinner.finish_with_message(format!("{} ✓", message)),
        Err(_) => spinner.abandon_with_message(format!("{} ✗", message)),
    }

    result
}

/// Draws a rounded box around a section title.
pub fn print_boxed_label<W: Write>(writer: &mut W, title: &str) -> stdio::Result<()> {
    let inner = format!(" {title} ");
    let width = inner.chars().count();
    writeln!(writer, "╭{}╮", "─".repeat(width))?;
    writeln!(writer, "│{}│", inner)?;
    writeln!(writer, "╰{}╯", "─".repeat(width))?;
    Ok(())
}

/// Formats an optional spread with two decimals.
pub fn format_spread(spread: Option<f64>) -> String {
    spread.map_or_else(|| "-".to_string(), |s| format!("{s:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_inferred_from_extensions() {
        assert_eq!(
            InputFormat::from_path(Path::new("1ehz.PDB")),
            Some(InputFormat::Pdb)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("RF00005.sto")),
            Some(InputFormat::Stockholm)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("trna.bpseq")),
            Some(InputFormat::BpSeq)
        );
        assert_eq!(InputFormat::from_path(Path::new("notes.txt")), None);
    }

    #[test]
    fn stdin_requires_explicit_format() {
        let params = IoParameters::default();
        assert!(resolve_input_format(&params).is_err());

        let params = IoParameters {
            input_format: Some(InputFormat::Ct),
            ..IoParameters::default()
        };
        assert_eq!(resolve_input_format(&params).unwrap(), InputFormat::Ct);
    }
}
