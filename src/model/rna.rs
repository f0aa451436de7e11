//! Named RNA sequence with optional numbering systems.

use super::numbering::NumberingSystem;
use rand::Rng;
use std::fmt;

const BASES: [char; 4] = ['A', 'U', 'G', 'C'];

/// Named, 1-indexed RNA sequence.
///
/// The alignment numbering maps ungapped positions to the alignment columns they were
/// taken from; the tertiary numbering maps positions to residue labels from a coordinate
/// file. Both are absent for sequences read from plain secondary-structure formats.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rna {
    pub name: String,
    sequence: String,
    pub alignment_numbering: Option<NumberingSystem<usize>>,
    pub tertiary_numbering: Option<NumberingSystem<String>>,
}

impl Rna {
    pub fn new(name: &str, sequence: &str) -> Self {
        Self {
            name: name.to_string(),
            sequence: sequence.to_string(),
            alignment_numbering: None,
            tertiary_numbering: None,
        }
    }

    /// Builds a uniformly random A/U/G/C sequence of the requested length.
    pub fn random(name: &str, length: usize, rng: &mut impl Rng) -> Self {
        let sequence: String = (0..length)
            .map(|_| BASES[rng.random_range(0..BASES.len())])
            .collect();
        Self::new(name, &sequence)
    }

    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Residue at a 1-based position.
    pub fn residue_at(&self, position: usize) -> Option<char> {
        if position == 0 {
            return None;
        }
        self.sequence.as_bytes().get(position - 1).map(|b| *b as char)
    }

    /// Appends a residue; used while a coordinate file is streamed.
    pub fn push(&mut self, residue: char) {
        self.sequence.push(residue);
    }

    /// Replaces the residue at a 1-based position. Out-of-range positions are ignored.
    pub(crate) fn set_residue(&mut self, position: usize, residue: char) {
        if position == 0 || position > self.sequence.len() {
            return;
        }
        let mut bytes = std::mem::take(&mut self.sequence).into_bytes();
        bytes[position - 1] = residue as u8;
        self.sequence = String::from_utf8(bytes).unwrap_or_default();
    }
}

impl fmt::Display for Rna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rna {{ name: \"{}\", length: {} }}", self.name, self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn residue_at_is_one_based() {
        let rna = Rna::new("r", "GCAU");
        assert_eq!(rna.residue_at(0), None);
        assert_eq!(rna.residue_at(1), Some('G'));
        assert_eq!(rna.residue_at(4), Some('U'));
        assert_eq!(rna.residue_at(5), None);
    }

    #[test]
    fn random_sequence_has_requested_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let rna = Rna::random("r", 40, &mut rng);
        assert_eq!(rna.len(), 40);
        assert!(rna.sequence().chars().all(|c| BASES.contains(&c)));
    }

    #[test]
    fn push_and_set_residue_edit_the_sequence() {
        let mut rna = Rna::new("r", "");
        rna.push('A');
        rna.push('C');
        rna.set_residue(2, 'G');
        rna.set_residue(9, 'U');
        assert_eq!(rna.sequence(), "AG");
    }
}
