use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use rna_forge::io::Alignment;
use rna_forge::{SecondaryStructure, TertiaryStructure};

use crate::commands::{IoParameters, LoadedInput, load_input, print_boxed_label, run_with_spinner};

/// Report-only command that summarizes the parsed input.
#[derive(Debug, Default, Args)]
pub struct InfoArgs {}

/// Parses the input and prints summary tables to stderr.
pub fn run(params: &IoParameters, _args: &InfoArgs) -> Result<()> {
    let context = params.io_context();
    let loaded = run_with_spinner("Analyzing input", || load_input(params, &context))?;

    let mut stderr = io::stderr().lock();
    print_boxed_label(&mut stderr, "RNA Forge Report")?;
    writeln!(&mut stderr)?;

    match &loaded {
        LoadedInput::Tertiary(chains) => print_chains(&mut stderr, chains)?,
        LoadedInput::Secondary(structures) => {
            print_structures(&mut stderr, "Structures", structures)?
        }
        LoadedInput::Alignments(families) => {
            for family in families {
                print_family(&mut stderr, family)?;
            }
        }
    }
    Ok(())
}

fn print_chains<W: Write>(writer: &mut W, chains: &[TertiaryStructure]) -> Result<()> {
    print_boxed_label(writer, "Chain Breakdown")?;
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Chain", "Residues", "Atoms", "First", "Last"]);
    for chain in chains {
        let first = chain.numbering.get(1).cloned().unwrap_or_default();
        let last = chain
            .numbering
            .get(chain.residue_count())
            .cloned()
            .unwrap_or_default();
        table.add_row(row![
            chain.chain_id,
            chain.residue_count(),
            chain.atom_count(),
            first,
            last
        ]);
    }
    table
        .print(writer)
        .context("Failed to render chain summary")?;
    writeln!(writer)?;

    if let Some(metadata) = chains.first().map(|c| &c.metadata) {
        print_boxed_label(writer, "Entry")?;
        let mut summary = Table::new();
        summary.set_format(*format::consts::FORMAT_BOX_CHARS);
        summary.set_titles(row!["Field", "Value"]);
        summary.add_row(row!["Title", metadata.title.as_deref().unwrap_or("-")]);
        summary.add_row(row!["First author", metadata.authors.as_deref().unwrap_or("-")]);
        summary.add_row(row!["Published", metadata.pub_date.as_deref().unwrap_or("-")]);
        summary
            .print(writer)
            .context("Failed to render entry summary")?;
    }
    Ok(())
}

fn print_structures<W: Write>(
    writer: &mut W,
    title: &str,
    structures: &[SecondaryStructure],
) -> Result<()> {
    print_boxed_label(writer, title)?;
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row![
        "Name",
        "Length",
        "Nested Pairs",
        "Tertiary Pairs",
        "Helices",
        "Junctions",
        "Pseudoknots"
    ]);
    for structure in structures {
        table.add_row(row![
            structure.name(),
            structure.length(),
            structure.secondaries().len(),
            structure.tertiaries().len(),
            structure.helices().len(),
            structure.junctions().len(),
            structure.pseudoknots().len()
        ]);
    }
    table
        .print(writer)
        .context("Failed to render structure summary")?;
    writeln!(writer)?;
    Ok(())
}

fn print_family<W: Write>(writer: &mut W, family: &Alignment) -> Result<()> {
    print_boxed_label(writer, "Alignment Family")?;
    let mut summary = Table::new();
    summary.set_format(*format::consts::FORMAT_BOX_CHARS);
    summary.set_titles(row!["Field", "Value"]);
    summary.add_row(row!["ID", family.id.as_deref().unwrap_or("-")]);
    summary.add_row(row!["Accession", family.accession.as_deref().unwrap_or("-")]);
    summary.add_row(row!["Description", family.description.as_deref().unwrap_or("-")]);
    summary.add_row(row!["Type", family.family_type.as_deref().unwrap_or("-")]);
    summary.add_row(row!["Sequences", family.aligned.len()]);
    summary.add_row(row!["Columns", family.columns()]);
    summary.add_row(row![
        "Retained Pseudoknot Locations",
        family.consensus.retained_locations().len()
    ]);
    summary
        .print(writer)
        .context("Failed to render alignment summary")?;
    writeln!(writer)?;

    print_structures(
        writer,
        "Consensus",
        std::slice::from_ref(&family.consensus),
    )?;
    print_structures(writer, "Aligned Sequences", &family.structures)
}
