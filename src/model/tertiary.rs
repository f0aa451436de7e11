use super::numbering::NumberingSystem;
use super::residue::Residue;
use super::rna::Rna;
use std::fmt;

/// File-level annotations shared by every chain parsed from one coordinate file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Title in sentence case.
    pub title: Option<String>,
    /// First listed author only.
    pub authors: Option<String>,
    /// Publication year, or `"To be published"`.
    pub pub_date: Option<String>,
}

/// One nucleic-acid chain with its residues and numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct TertiaryStructure {
    /// Chain label from the source file.
    pub chain_id: String,
    pub rna: Rna,
    pub metadata: Metadata,
    /// Absolute 1-based position to external residue label.
    pub numbering: NumberingSystem<String>,
    residues: Vec<Residue>,
}

impl TertiaryStructure {
    pub fn new(chain_id: &str, rna: Rna) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            rna,
            metadata: Metadata::default(),
            numbering: NumberingSystem::new(),
            residues: Vec::new(),
        }
    }

    /// Appends a residue, extending the numbering with its label.
    pub fn add_residue(&mut self, residue: Residue) {
        debug_assert_eq!(
            residue.position,
            self.residues.len() + 1,
            "residues must be appended in absolute order"
        );
        self.numbering
            .insert(residue.position, residue.label.clone());
        self.residues.push(residue);
    }

    /// Residue at an absolute 1-based position.
    pub fn residue(&self, position: usize) -> Option<&Residue> {
        position
            .checked_sub(1)
            .and_then(|index| self.residues.get(index))
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    /// Most recently appended residue; atoms stream into it during parsing.
    pub(crate) fn last_residue_mut(&mut self) -> Option<&mut Residue> {
        self.residues.last_mut()
    }

    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn iter_residues(&self) -> std::slice::Iter<'_, Residue> {
        self.residues.iter()
    }

    pub fn atom_count(&self) -> usize {
        self.residues.iter().map(Residue::atom_count).sum()
    }
}

impl fmt::Display for TertiaryStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TertiaryStructure {{ chain: \"{}\", residues: {}, atoms: {} }}",
            self.chain_id,
            self.residue_count(),
            self.atom_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::ResidueKind;

    #[test]
    fn add_residue_extends_numbering() {
        let mut ts = TertiaryStructure::new("A", Rna::new("A", "GC"));
        ts.add_residue(Residue::new(ResidueKind::Guanine, "G", 1, "15"));
        ts.add_residue(Residue::new(ResidueKind::Cytosine, "C", 2, "15A"));

        assert_eq!(ts.residue_count(), 2);
        assert_eq!(ts.numbering.get(2).map(String::as_str), Some("15A"));
        assert_eq!(ts.numbering.position_of(&"15".to_string()), Some(1));
        assert_eq!(ts.residue(1).unwrap().kind, ResidueKind::Guanine);
        assert!(ts.residue(0).is_none());
        assert!(ts.residue(3).is_none());
    }
}
