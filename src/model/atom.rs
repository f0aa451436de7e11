//! Named atom with an optional Cartesian position.
//!
//! Atoms are owned by exactly one [`Residue`](super::residue::Residue). Coordinate files
//! always supply a position, but model builders may allocate placeholder atoms whose
//! position is filled later, so distance helpers return `None` instead of guessing.

use super::types::{Point, distance};
use smol_str::SmolStr;
use std::fmt;

/// Labeled atom; the position may be unfilled.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom name as it appears in coordinate files (e.g. `C1'`).
    pub name: SmolStr,
    /// Cartesian coordinates in ångströms, when known.
    pub pos: Option<Point>,
}

impl Atom {
    /// Creates an atom at a known position.
    pub fn new(name: &str, pos: Point) -> Self {
        Self {
            name: SmolStr::new(name),
            pos: Some(pos),
        }
    }

    /// Creates an atom whose coordinates have not been filled in.
    pub fn unplaced(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            pos: None,
        }
    }

    /// Euclidean distance to another atom, or `None` if either position is unfilled.
    pub fn distance(&self, other: &Atom) -> Option<f64> {
        match (&self.pos, &other.pos) {
            (Some(a), Some(b)) => Some(distance(a, b)),
            _ => None,
        }
    }

    /// Best-effort element symbol derived from the atom name.
    ///
    /// Nucleic-acid atom names start with their element letter once leading digits are
    /// stripped, which is enough for the element column of written coordinate records.
    pub fn element_symbol(&self) -> char {
        self.name
            .chars()
            .find(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('X')
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pos {
            Some(p) => write!(
                f,
                "Atom {{ name: \"{}\", pos: [{:.3}, {:.3}, {:.3}] }}",
                self.name, p.x, p.y, p.z
            ),
            None => write!(f, "Atom {{ name: \"{}\", pos: unplaced }}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_distance_calculates_correctly() {
        let a = Atom::new("N1", Point::new(0.0, 0.0, 0.0));
        let b = Atom::new("N3", Point::new(3.0, 4.0, 0.0));

        let dist = a.distance(&b).expect("both atoms placed");
        assert!((dist - 5.0).abs() < 1e-10);
    }

    #[test]
    fn atom_distance_is_none_when_unplaced() {
        let a = Atom::new("N1", Point::new(0.0, 0.0, 0.0));
        let b = Atom::unplaced("N3");

        assert!(a.distance(&b).is_none());
        assert!(b.distance(&a).is_none());
    }

    #[test]
    fn element_symbol_skips_leading_digits() {
        assert_eq!(Atom::unplaced("C1'").element_symbol(), 'C');
        assert_eq!(Atom::unplaced("1H5'").element_symbol(), 'H');
        assert_eq!(Atom::unplaced("OP1").element_symbol(), 'O');
    }

    #[test]
    fn atom_display_formats_position() {
        let atom = Atom::new("P", Point::new(1.234, -5.678, 9.012));
        assert_eq!(
            format!("{}", atom),
            "Atom { name: \"P\", pos: [1.234, -5.678, 9.012] }"
        );
        assert_eq!(
            format!("{}", Atom::unplaced("P")),
            "Atom { name: \"P\", pos: unplaced }"
        );
    }
}
