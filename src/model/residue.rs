use super::atom::Atom;
use super::types::ResidueKind;
use std::fmt;

/// Three-dimensional nucleotide residue within a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub kind: ResidueKind,
    /// Residue name exactly as printed in the source record.
    pub name: String,
    /// Absolute 1-based position within the chain.
    pub position: usize,
    /// External label (sequence number plus insertion code) from the source record.
    pub label: String,
    atoms: Vec<Atom>,
}

impl Residue {
    pub fn new(kind: ResidueKind, name: &str, position: usize, label: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            position,
            label: label.to_string(),
            atoms: Vec::new(),
        }
    }

    /// Adds an atom, replacing any earlier atom with the same name.
    pub fn add_atom(&mut self, atom: Atom) {
        match self.atoms.iter_mut().find(|a| a.name == atom.name) {
            Some(existing) => *existing = atom,
            None => self.atoms.push(atom),
        }
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.name == name)
    }

    /// Looks up an atom, accepting the legacy `*` spelling for primed sugar atoms.
    pub fn atom_or_legacy(&self, name: &str) -> Option<&Atom> {
        self.atom(name)
            .or_else(|| self.atom(&name.replace('\'', "*")))
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atom(name).is_some()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter_atoms(&self) -> std::slice::Iter<'_, Atom> {
        self.atoms.iter()
    }
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Residue {{ position: {}, label: \"{}\", name: \"{}\" ({}), atoms: {} }}",
            self.position,
            self.label,
            self.name,
            self.kind,
            self.atom_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Point;

    #[test]
    fn residue_add_atom_replaces_duplicates() {
        let mut residue = Residue::new(ResidueKind::Adenine, "A", 1, "12");
        residue.add_atom(Atom::new("N1", Point::new(0.0, 0.0, 0.0)));
        residue.add_atom(Atom::new("N1", Point::new(1.0, 0.0, 0.0)));

        assert_eq!(residue.atom_count(), 1);
        assert_eq!(residue.atom("N1").unwrap().pos.unwrap().x, 1.0);
    }

    #[test]
    fn residue_atom_or_legacy_accepts_star_spelling() {
        let mut residue = Residue::new(ResidueKind::Guanine, "G", 3, "7");
        residue.add_atom(Atom::new("C1*", Point::new(0.0, 0.0, 0.0)));

        assert!(residue.atom("C1'").is_none());
        assert!(residue.atom_or_legacy("C1'").is_some());
    }

    #[test]
    fn residue_display_reports_label_and_kind() {
        let residue = Residue::new(ResidueKind::Uracil, "U", 2, "10A");
        assert_eq!(
            residue.to_string(),
            "Residue { position: 2, label: \"10A\", name: \"U\" (Uracil), atoms: 0 }"
        );
        assert!(residue.is_empty());
    }
}
