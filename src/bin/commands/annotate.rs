use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Args;

use rna_forge::ops::{AnnotateConfig, annotate_with};

use crate::commands::{IoParameters, LoadedInput, load_input, run_with_spinner, save_bracket};

/// Derives base pairs from atomic coordinates.
#[derive(Debug, Args)]
pub struct AnnotateArgs {
    /// Lower bound of the mean hydrogen-bond length (Å).
    #[arg(long, default_value_t = 2.5)]
    pub hbond_min: f64,
    /// Upper bound of the mean hydrogen-bond length (Å).
    #[arg(long, default_value_t = 3.5)]
    pub hbond_max: f64,
    /// Lower bound of the C1'–C1' distance (Å).
    #[arg(long, default_value_t = 8.0)]
    pub c1_min: f64,
    /// Upper bound of the C1'–C1' distance (Å).
    #[arg(long, default_value_t = 12.0)]
    pub c1_max: f64,
    /// Extra residue names to skip while reading.
    #[arg(long = "ignore", value_name = "NAME")]
    pub ignore: Vec<String>,
    /// Chain labels to skip while reading.
    #[arg(long = "ignore-chain", value_name = "CHAIN")]
    pub ignore_chains: Vec<String>,
}

/// Annotates every nucleic chain of a coordinate file and writes dot-bracket records.
pub fn run(params: &IoParameters, args: &AnnotateArgs) -> Result<()> {
    let context = params
        .io_context()
        .with_ignored(&args.ignore)
        .with_ignored_chains(&args.ignore_chains);
    let config = AnnotateConfig {
        hbond_min: args.hbond_min,
        hbond_max: args.hbond_max,
        c1_min: args.c1_min,
        c1_max: args.c1_max,
    };
    if config.hbond_min > config.hbond_max || config.c1_min > config.c1_max {
        bail!("Distance windows must have their minimum below their maximum.");
    }

    let LoadedInput::Tertiary(chains) = load_input(params, &context)? else {
        bail!("The annotate command needs a coordinate (PDB) input.");
    };

    let structures = run_with_spinner("Annotating base pairs", || {
        Ok(chains
            .into_iter()
            .map(|chain| annotate_with(Arc::new(chain), &config))
            .collect::<Vec<_>>())
    })?;

    save_bracket(&structures, params)
}
