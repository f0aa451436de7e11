use crate::io::error::Error;
use crate::model::{
    atom::Atom,
    residue::Residue,
    tertiary::{Metadata, TertiaryStructure},
    types::ResidueKind,
};
use std::io::Write;

/// Writes chains as fixed-column PDB records, one `TER` per chain and a closing `END`.
///
/// Metadata of the first chain becomes the file header. Atoms without coordinates are
/// omitted.
pub fn write_structures<W: Write>(
    writer: W,
    structures: &[TertiaryStructure],
) -> Result<(), Error> {
    let mut ctx = WriterContext::new(writer);

    if let Some(first) = structures.first() {
        ctx.write_header(&first.metadata)?;
    }

    for structure in structures {
        ctx.write_chain(structure)?;
    }

    ctx.write_end()
}

struct WriterContext<W> {
    writer: W,
    current_serial: usize,
}

impl<W: Write> WriterContext<W> {
    fn new(writer: W) -> Self {
        Self {
            writer,
            current_serial: 1,
        }
    }

    fn write_header(&mut self, metadata: &Metadata) -> Result<(), Error> {
        if let Some(title) = &metadata.title {
            writeln!(self.writer, "TITLE     {}", title.to_uppercase()).map_err(Error::from_io)?;
        }
        if let Some(author) = &metadata.authors {
            writeln!(self.writer, "AUTHOR    {}", author).map_err(Error::from_io)?;
        }
        match metadata.pub_date.as_deref() {
            Some(date) if date.eq_ignore_ascii_case("to be published") => {
                writeln!(self.writer, "JRNL        REF    TO BE PUBLISHED")
                    .map_err(Error::from_io)?;
            }
            Some(year) => {
                writeln!(self.writer, "{:<62}{:>4}", "JRNL        REF", year)
                    .map_err(Error::from_io)?;
            }
            None => {}
        }
        Ok(())
    }

    fn write_chain(&mut self, structure: &TertiaryStructure) -> Result<(), Error> {
        for residue in structure.iter_residues() {
            for atom in residue.iter_atoms() {
                self.write_atom_record(atom, residue, &structure.chain_id)?;
            }
        }

        if let Some(last) = structure.residues().last() {
            self.write_ter_record(last, &structure.chain_id)?;
        }
        Ok(())
    }

    fn write_atom_record(
        &mut self,
        atom: &Atom,
        residue: &Residue,
        chain_id: &str,
    ) -> Result<(), Error> {
        let Some(pos) = atom.pos else {
            return Ok(());
        };

        let record_type = match residue.kind {
            ResidueKind::Other(_) => "HETATM",
            _ => "ATOM  ",
        };

        let atom_name = if atom.name.len() >= 4 {
            format!("{:<4}", atom.name.chars().take(4).collect::<String>())
        } else {
            format!(" {:<3}", atom.name)
        };

        let (res_seq, insertion_code) = split_label(&residue.label);

        writeln!(
            self.writer,
            "{:6}{:5} {:4} {}{:1}{:>4}{:1}   {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}          {:>2}",
            record_type,
            self.current_serial % 100000,
            atom_name,
            residue_field(&residue.name),
            chain_id.chars().next().unwrap_or(' '),
            res_seq,
            insertion_code,
            pos.x,
            pos.y,
            pos.z,
            1.00,
            0.00,
            atom.element_symbol()
        )
        .map_err(Error::from_io)?;

        self.current_serial += 1;
        Ok(())
    }

    fn write_ter_record(&mut self, residue: &Residue, chain_id: &str) -> Result<(), Error> {
        let (res_seq, insertion_code) = split_label(&residue.label);

        writeln!(
            self.writer,
            "TER   {:5}      {}{:1}{:>4}{:1}",
            self.current_serial % 100000,
            residue_field(&residue.name),
            chain_id.chars().next().unwrap_or(' '),
            res_seq,
            insertion_code
        )
        .map_err(Error::from_io)?;

        self.current_serial += 1;
        Ok(())
    }

    fn write_end(&mut self) -> Result<(), Error> {
        writeln!(self.writer, "END   ").map_err(Error::from_io)
    }
}

/// Columns 18-21: three-letter names right-justified, four-letter names spill into 21.
fn residue_field(name: &str) -> String {
    if name.chars().count() > 3 {
        name.chars().take(4).collect()
    } else {
        format!("{:>3} ", name)
    }
}

/// Splits a residue label such as `"15A"` into its sequence number and insertion code.
fn split_label(label: &str) -> (&str, char) {
    match label.char_indices().last() {
        Some((index, code)) if index > 0 && code.is_ascii_alphabetic() => (&label[..index], code),
        _ => (label, ' '),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::context::IoContext;
    use crate::io::pdb::reader;
    use crate::model::rna::Rna;
    use crate::model::types::Point;
    use std::io::Cursor;

    fn parse_float(slice: &str) -> f64 {
        slice.trim().parse::<f64>().expect("valid float")
    }

    fn sample_chain() -> TertiaryStructure {
        let mut ts = TertiaryStructure::new("A", Rna::new("A", "GC"));

        let mut g = Residue::new(ResidueKind::Guanine, "G", 1, "15");
        g.add_atom(Atom::new("P", Point::new(1.0, 2.0, 3.0)));
        g.add_atom(Atom::new("O4'", Point::new(1.5, 2.5, 3.5)));
        g.add_atom(Atom::unplaced("C1'"));

        let mut c = Residue::new(ResidueKind::Cytosine, "C", 2, "15A");
        c.add_atom(Atom::new("O4'", Point::new(-4.0, 5.0, 6.25)));

        ts.add_residue(g);
        ts.add_residue(c);
        ts.metadata = Metadata {
            title: Some("Small duplex".to_string()),
            authors: Some("A.SMITH".to_string()),
            pub_date: Some("2004".to_string()),
        };
        ts
    }

    #[test]
    fn write_structures_emits_atoms_ter_and_end() {
        let mut buffer = Vec::new();
        write_structures(&mut buffer, &[sample_chain()]).expect("writer should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 8, "unexpected lines: {lines:?}");

        assert_eq!(lines[0], "TITLE     SMALL DUPLEX");
        assert_eq!(lines[1], "AUTHOR    A.SMITH");
        assert_eq!(&lines[2][62..66], "2004");

        let atom = lines[3];
        assert_eq!(&atom[0..6], "ATOM  ");
        assert_eq!(atom[6..11].trim(), "1");
        assert_eq!(atom[12..16].trim(), "P");
        assert_eq!(atom[17..20].trim(), "G");
        assert_eq!(&atom[21..22], "A");
        assert_eq!(atom[22..26].trim(), "15");
        assert!((parse_float(&atom[30..38]) - 1.0).abs() < 1e-3);
        assert!((parse_float(&atom[46..54]) - 3.0).abs() < 1e-3);
        assert_eq!(atom[76..78].trim(), "P");

        let inserted = lines[5];
        assert_eq!(inserted[22..26].trim(), "15");
        assert_eq!(&inserted[26..27], "A");

        assert!(lines[6].starts_with("TER   "));
        assert_eq!(lines[6][6..11].trim(), "4");
        assert_eq!(lines[7], "END   ");
    }

    #[test]
    fn written_chains_read_back_identically() {
        let original = sample_chain();
        let mut buffer = Vec::new();
        write_structures(&mut buffer, std::slice::from_ref(&original)).expect("write");

        let parsed = reader::read(Cursor::new(buffer), &IoContext::new_default()).expect("read");
        assert_eq!(parsed.len(), 1);
        let chain = &parsed[0];

        assert_eq!(chain.chain_id, "A");
        assert_eq!(chain.rna.sequence(), "GC");
        assert_eq!(chain.numbering.get(2).map(String::as_str), Some("15A"));
        assert_eq!(chain.metadata, original.metadata);

        let o4 = chain.residue(2).and_then(|r| r.atom("O4'")).and_then(|a| a.pos);
        let o4 = o4.expect("O4' should survive");
        assert!((o4.z - 6.25).abs() < 1e-3);
        assert!(chain.residue(1).unwrap().atom("C1'").is_none());
    }

    #[test]
    fn split_label_separates_insertion_code() {
        assert_eq!(split_label("15A"), ("15", 'A'));
        assert_eq!(split_label("-3"), ("-3", ' '));
        assert_eq!(split_label("A"), ("A", ' '));
    }
}
