//! Geometric base-pair annotation for coordinate structures.
//!
//! Every unordered residue pair whose base types form an A–U or G–C family is tested
//! against two distance windows: the mean length of the family's donor–acceptor hydrogen
//! bonds and the separation of the two `C1'` atoms. Pairs missing any required atom are
//! skipped. The scan is quadratic in the number of residues and runs on the rayon pool when
//! the `parallel` feature is enabled.

use crate::model::base_pair::BasePair;
use crate::model::residue::Residue;
use crate::model::secondary::SecondaryStructure;
use crate::model::tertiary::TertiaryStructure;
use crate::utils::parallel::*;
use log::debug;
use std::sync::Arc;

const GLYCOSIDIC_CARBON: &str = "C1'";

/// Distance windows, in ångströms, that a residue pair must satisfy to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotateConfig {
    /// Lower bound of the mean hydrogen-bond donor–acceptor distance.
    pub hbond_min: f64,
    /// Upper bound of the mean hydrogen-bond donor–acceptor distance.
    pub hbond_max: f64,
    /// Lower bound of the `C1'`–`C1'` distance.
    pub c1_min: f64,
    /// Upper bound of the `C1'`–`C1'` distance.
    pub c1_max: f64,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            hbond_min: 2.5,
            hbond_max: 3.5,
            c1_min: 8.0,
            c1_max: 12.0,
        }
    }
}

/// Derives a secondary structure from geometry with the default windows.
///
/// # Examples
///
/// ```
/// use rna_forge::io::{read_pdb_structures, IoContext};
/// use rna_forge::ops::annotate;
/// use std::io::Cursor;
/// use std::sync::Arc;
///
/// let pdb = "ATOM      1  O4'   G A   1       0.000   0.000   0.000  1.00 20.00           O\n";
/// let chains = read_pdb_structures(Cursor::new(pdb), &IoContext::new_default()).unwrap();
/// let chain = Arc::new(chains.into_iter().next().unwrap());
/// let ss = annotate(chain.clone());
/// assert!(ss.secondaries().is_empty());
/// assert!(Arc::ptr_eq(ss.source.as_ref().unwrap(), &chain));
/// ```
pub fn annotate(structure: Arc<TertiaryStructure>) -> SecondaryStructure {
    annotate_with(structure, &AnnotateConfig::default())
}

/// Derives a secondary structure from geometry.
///
/// # Arguments
///
/// * `structure` - Chain to scan; the result keeps a reference to it.
/// * `config` - Distance windows a pair must fall into.
///
/// # Returns
///
/// A [`SecondaryStructure`] over the chain's sequence whose pairs are sorted by 5′
/// position. Its RNA carries the chain's residue labels as tertiary numbering.
pub fn annotate_with(
    structure: Arc<TertiaryStructure>,
    config: &AnnotateConfig,
) -> SecondaryStructure {
    let residues = structure.residues();

    let mut pairs: Vec<BasePair> = residues
        .par_iter()
        .enumerate()
        .flat_map(|(i, first)| {
            residues[i + 1..]
                .iter()
                .filter(|second| accepts(first, second, config))
                .map(|second| BasePair::new(first.position, second.position))
                .collect::<Vec<_>>()
        })
        .collect();
    pairs.sort_by_key(|p| (p.start(), p.end()));

    debug!(
        "chain '{}': {} geometric pairs among {} residues",
        structure.chain_id,
        pairs.len(),
        residues.len()
    );

    let mut rna = structure.rna.clone();
    rna.tertiary_numbering = Some(structure.numbering.clone());

    SecondaryStructure::from_base_pairs(rna, pairs).with_source(structure)
}

/// Whether two residues satisfy both distance windows.
fn accepts(first: &Residue, second: &Residue, config: &AnnotateConfig) -> bool {
    let Some(bonds) = first.kind.hydrogen_bond_atoms(&second.kind) else {
        return false;
    };

    let Some(hbond_mean) = mean_bond_length(first, second, bonds) else {
        return false;
    };
    let Some(c1_distance) = first
        .atom_or_legacy(GLYCOSIDIC_CARBON)
        .zip(second.atom_or_legacy(GLYCOSIDIC_CARBON))
        .and_then(|(a, b)| a.distance(b))
    else {
        return false;
    };

    (config.hbond_min..=config.hbond_max).contains(&hbond_mean)
        && (config.c1_min..=config.c1_max).contains(&c1_distance)
}

/// Mean donor–acceptor distance, or `None` if any listed atom is missing.
fn mean_bond_length(
    first: &Residue,
    second: &Residue,
    bonds: &[(&str, &str)],
) -> Option<f64> {
    let mut total = 0.0;
    for (on_first, on_second) in bonds {
        let a = first.atom(on_first)?;
        let b = second.atom(on_second)?;
        total += a.distance(b)?;
    }
    Some(total / bonds.len() as f64)
}
