use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use clap::Args;
use prettytable::{Table, format, row};

use rna_forge::SecondaryStructure;
use rna_forge::io::Alignment;

use crate::commands::{
    IoParameters, LoadedInput, format_spread, load_input, print_boxed_label, run_with_spinner,
    save_bracket,
};

/// Projects the consensus structure of a Stockholm alignment onto its sequences.
#[derive(Debug, Default, Args)]
pub struct AlignArgs {
    /// Report the spread of aligned lengths for every helix and junction.
    #[arg(long)]
    pub statistics: bool,
    /// Write only the consensus structure of each family.
    #[arg(long)]
    pub consensus_only: bool,
}

/// Reads the alignment and writes the consensus followed by every projected sequence.
pub fn run(params: &IoParameters, args: &AlignArgs) -> Result<()> {
    let context = params
        .io_context()
        .with_consensus_statistics(args.statistics);

    let families = run_with_spinner("Projecting consensus structure", || {
        match load_input(params, &context)? {
            LoadedInput::Alignments(families) => Ok(families),
            _ => bail!("The align command needs a Stockholm input."),
        }
    })?;

    if args.statistics {
        for family in &families {
            print_statistics(family)?;
        }
    }

    let structures: Vec<SecondaryStructure> = families
        .into_iter()
        .flat_map(|family| {
            let mut records = vec![family.consensus];
            if !args.consensus_only {
                records.extend(family.structures);
            }
            records
        })
        .collect();

    save_bracket(&structures, params)
}

fn print_statistics(family: &Alignment) -> Result<()> {
    let mut stderr = io::stderr().lock();
    let title = family
        .description
        .as_deref()
        .unwrap_or_else(|| family.consensus.name());
    print_boxed_label(&mut stderr, title)?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Element", "Location", "Spread"]);
    for (index, helix) in family.consensus.helices().iter().enumerate() {
        table.add_row(row![
            format!("Helix {}", index + 1),
            helix.location,
            format_spread(helix.spread)
        ]);
    }
    for junction in family.consensus.junctions() {
        table.add_row(row![
            format!("{} junction", junction.kind),
            junction.location,
            format_spread(junction.spread)
        ]);
    }
    table
        .print(&mut stderr)
        .context("Failed to render alignment statistics")?;
    writeln!(&mut stderr)?;
    Ok(())
}
