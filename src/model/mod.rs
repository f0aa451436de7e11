//! Core data structures modeling RNA molecules in two and three dimensions.
//!
//! Coordinate files populate [`tertiary::TertiaryStructure`] values built from
//! [`residue::Residue`] and [`atom::Atom`]; every secondary-structure source produces a
//! [`secondary::SecondaryStructure`] whose base pairs, locations, and numbering systems are
//! defined here as well.

pub mod atom;
pub mod base_pair;
pub mod location;
pub mod notation;
pub mod numbering;
pub mod residue;
pub mod rna;
pub mod secondary;
pub mod tertiary;
pub mod types;
