//! # RNA Forge
//!
//! **RNA Forge** is a pure-Rust toolkit for RNA structural bioinformatics. It reads the text
//! formats structure pipelines exchange, normalizes them into one typed model of
//! sequences, base pairs and coordinates, and can derive secondary structure directly from
//! atomic geometry.
//!
//! ## Features
//!
//! - **Coordinate parsing** – A single-pass PDB reader rebuilds nucleic-acid chains, their
//!   residues and atoms, keeping external residue labels as a numbering system and
//!   dropping protein, solvent and ion records.
//! - **Secondary-structure formats** – Dot-bracket (with pseudoknot layers), CT, BPSeq and
//!   RNAML readers, plus dot-bracket and PDB writers.
//! - **Alignment projection** – The Stockholm reader builds a consensus structure, resolves
//!   its pseudoknots against deletion evidence in the alignment, and projects it onto every
//!   aligned sequence with column numbering preserved.
//! - **Geometric annotation** – `ops::annotate` finds Watson–Crick pairs from hydrogen-bond
//!   and glycosidic-carbon distances, in parallel when the `parallel` feature is enabled.
//! - **Derived groupings** – Helices, junctions and pseudoknots are computed on demand and
//!   memoized per structure.
//!
//! ## Example
//!
//! ```
//! use rna_forge::{Rna, SecondaryStructure};
//!
//! let ss = SecondaryStructure::from_bracket(
//!     Rna::new("toy", "GGGAAAUCCAGCGAAAGCUGG"),
//!     "(((....)))((((...))))",
//! )
//! .unwrap();
//!
//! assert_eq!(ss.helices().len(), 2);
//! assert_eq!(ss.junctions().len(), 2);
//! assert!(ss.pseudoknots().is_empty());
//! ```

mod model;
mod utils;

pub mod io;
pub mod ops;

pub use model::atom::Atom;
pub use model::base_pair::BasePair;
pub use model::location::{Block, Location};
pub use model::notation::NotationError;
pub use model::numbering::NumberingSystem;
pub use model::residue::Residue;
pub use model::rna::Rna;
pub use model::secondary::{Helix, Junction, JunctionKind, Pseudoknot, SecondaryStructure};
pub use model::tertiary::{Metadata, TertiaryStructure};
pub use model::types::{Edge, Orientation, Point, ResidueKind};
