//! Shared primitive types used across the structural model.
//!
//! Coordinates are `nalgebra` points in ångströms. Residue identity is a closed tagged
//! variant so geometry routines can dispatch on it exhaustively, and base-pair edges and
//! orientations follow the Leontis–Westhof vocabulary used by pairing-exchange formats.

use nalgebra::Point3;
use std::fmt;

/// Cartesian coordinate in ångströms.
pub type Point = Point3<f64>;

/// Euclidean distance between two points.
pub fn distance(a: &Point, b: &Point) -> f64 {
    nalgebra::distance(a, b)
}

/// Canonical hydrogen-bond donor/acceptor atom pairs for an A–U pair, Adenine first.
const ADENINE_URACIL_BONDS: &[(&str, &str)] = &[("N6", "O4"), ("N1", "N3")];
/// Uracil-first view of [`ADENINE_URACIL_BONDS`].
const URACIL_ADENINE_BONDS: &[(&str, &str)] = &[("O4", "N6"), ("N3", "N1")];
/// Canonical hydrogen-bond atom pairs for a C–G pair, Cytosine first.
const CYTOSINE_GUANINE_BONDS: &[(&str, &str)] = &[("N4", "O6"), ("N3", "N1"), ("O2", "N2")];
/// Guanine-first view of [`CYTOSINE_GUANINE_BONDS`].
const GUANINE_CYTOSINE_BONDS: &[(&str, &str)] = &[("O6", "N4"), ("N1", "N3"), ("N2", "O2")];

/// Nucleotide identity of a three-dimensional residue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    Adenine,
    Uracil,
    Guanine,
    Cytosine,
    /// Any other residue; carries the residue name as printed in the source record.
    Other(String),
}

impl ResidueKind {
    /// Classifies a residue name from a coordinate record.
    ///
    /// Ribo- and deoxyribo- spellings of the four canonical bases are recognised; anything
    /// else (modified nucleotides, thymine, ligands) becomes [`ResidueKind::Other`].
    pub fn from_residue_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "A" | "RA" | "DA" | "ADE" | "A5" | "A3" => Self::Adenine,
            "U" | "RU" | "DU" | "URA" | "URI" | "U5" | "U3" => Self::Uracil,
            "G" | "RG" | "DG" | "GUA" | "G5" | "G3" => Self::Guanine,
            "C" | "RC" | "DC" | "CYT" | "C5" | "C3" => Self::Cytosine,
            other => Self::Other(other.to_string()),
        }
    }

    /// One-letter sequence code.
    pub fn one_letter_code(&self) -> char {
        match self {
            Self::Adenine => 'A',
            Self::Uracil => 'U',
            Self::Guanine => 'G',
            Self::Cytosine => 'C',
            Self::Other(name) if matches!(name.as_str(), "T" | "DT" | "THY") => 'T',
            Self::Other(_) => 'X',
        }
    }

    /// Donor/acceptor atom name pairs tested when this residue is paired with `partner`.
    ///
    /// Each tuple names the atom on `self` first. Only the Watson–Crick A–U and G–C families
    /// are defined; every other combination (including G–U wobble) returns `None`.
    pub fn hydrogen_bond_atoms(&self, partner: &ResidueKind) -> Option<&'static [(&'static str, &'static str)]> {
        match (self, partner) {
            (Self::Adenine, Self::Uracil) => Some(ADENINE_URACIL_BONDS),
            (Self::Uracil, Self::Adenine) => Some(URACIL_ADENINE_BONDS),
            (Self::Cytosine, Self::Guanine) => Some(CYTOSINE_GUANINE_BONDS),
            (Self::Guanine, Self::Cytosine) => Some(GUANINE_CYTOSINE_BONDS),
            _ => None,
        }
    }
}

impl fmt::Display for ResidueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adenine => write!(f, "Adenine"),
            Self::Uracil => write!(f, "Uracil"),
            Self::Guanine => write!(f, "Guanine"),
            Self::Cytosine => write!(f, "Cytosine"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Interacting edge of a base in a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Edge {
    #[default]
    WatsonCrick,
    Hoogsteen,
    Sugar,
    SingleHBond,
    Unknown,
}

impl Edge {
    /// Decodes a pairing-exchange edge code.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "S" | "s" => Self::Sugar,
            "H" => Self::Hoogsteen,
            "W" | "+" | "-" => Self::WatsonCrick,
            "!" | "?" => Self::SingleHBond,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::WatsonCrick => "W",
            Self::Hoogsteen => "H",
            Self::Sugar => "S",
            Self::SingleHBond => "!",
            Self::Unknown => "?",
        };
        write!(f, "{}", code)
    }
}

/// Relative glycosidic bond orientation of a base pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Cis,
    Trans,
    Unknown,
}

impl Orientation {
    /// Decodes a pairing-exchange orientation code (`c`/`t`, case-insensitive).
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "C" => Self::Cis,
            "T" => Self::Trans,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cis => write!(f, "cis"),
            Self::Trans => write!(f, "trans"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
