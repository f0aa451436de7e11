use anyhow::Result;
use clap::Args;

use crate::commands::{
    IoParameters, LoadedInput, into_secondary, load_input, run_with_spinner, save_bracket,
};

/// Rewrites any supported input as dot-bracket records.
#[derive(Debug, Default, Args)]
pub struct ConvertArgs {
    /// Emit only the consensus structure of each alignment family.
    #[arg(long)]
    pub consensus: bool,
}

/// Loads the input and writes one dot-bracket record per structure.
pub fn run(params: &IoParameters, args: &ConvertArgs) -> Result<()> {
    let context = params.io_context();
    let structures = run_with_spinner("Reading structures", || {
        let loaded = load_input(params, &context)?;
        Ok(match loaded {
            LoadedInput::Alignments(families) if args.consensus => families
                .into_iter()
                .map(|family| family.consensus)
                .collect(),
            other => into_secondary(other),
        })
    })?;

    save_bracket(&structures, params)
}
